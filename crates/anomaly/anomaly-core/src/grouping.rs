//! Gap-based grouping of flagged days into ranges.

use anomaly_api::GapThresholdPolicy;
use anomaly_spi::{RangeGrouper, UnusualRange};
use chrono::NaiveDateTime;
use tracing::debug;

use crate::stats;

/// Merge threshold, in days, for the given inter-flag gaps.
///
/// Returns `0.0` for an empty gap list.
pub fn gap_threshold(gaps: &[f64], policy: GapThresholdPolicy) -> f64 {
    match policy {
        GapThresholdPolicy::MeanPlusStdDev => stats::mean(gaps) + stats::std_dev(gaps),
        GapThresholdPolicy::Median => stats::median(gaps),
    }
}

/// Splits sorted flagged timestamps wherever the gap to the next one exceeds
/// an adaptive threshold.
#[derive(Debug, Clone, Copy, Default)]
pub struct GapGrouper {
    policy: GapThresholdPolicy,
}

impl GapGrouper {
    pub fn new(policy: GapThresholdPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> GapThresholdPolicy {
        self.policy
    }
}

impl RangeGrouper for GapGrouper {
    fn group(&self, flagged: &[NaiveDateTime]) -> Vec<UnusualRange> {
        let mut dates = flagged.to_vec();
        dates.sort();
        dates.dedup();

        let Some(&first) = dates.first() else {
            return Vec::new();
        };
        if dates.len() == 1 {
            return vec![UnusualRange::single(first)];
        }

        // Whole days, truncated towards zero.
        let gaps: Vec<f64> = dates
            .windows(2)
            .map(|w| (w[1] - w[0]).num_days() as f64)
            .collect();
        let threshold = gap_threshold(&gaps, self.policy);

        let mut ranges = Vec::new();
        let mut run_start = first;
        for (i, gap) in gaps.iter().enumerate() {
            if *gap > threshold {
                ranges.push(UnusualRange {
                    start: run_start,
                    end: dates[i],
                });
                run_start = dates[i + 1];
            }
        }
        ranges.push(UnusualRange {
            start: run_start,
            end: dates[dates.len() - 1],
        });

        debug!(
            flagged = dates.len(),
            threshold,
            ranges = ranges.len(),
            "grouped flagged days"
        );
        ranges
    }
}
