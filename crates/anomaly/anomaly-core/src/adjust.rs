//! Widening of single-day ranges.

use anomaly_spi::UnusualRange;
use chrono::{Duration, NaiveDateTime};

/// Turns degenerate single-point ranges into short windows.
///
/// A range that starts before the last observed timestamp is extended
/// forward by `margin_days`; one sitting at (or past) the end of the series
/// is extended backward instead. Non-degenerate ranges pass through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeAdjuster {
    margin_days: i64,
}

impl RangeAdjuster {
    pub fn new(margin_days: i64) -> Self {
        Self { margin_days }
    }

    pub fn margin_days(&self) -> i64 {
        self.margin_days
    }

    pub fn adjust(&self, range: UnusualRange, series_max: NaiveDateTime) -> UnusualRange {
        if !range.is_degenerate() {
            return range;
        }
        let margin = Duration::days(self.margin_days);
        if range.start < series_max {
            UnusualRange {
                start: range.start,
                end: range.start + margin,
            }
        } else {
            UnusualRange {
                start: range.start - margin,
                end: range.end,
            }
        }
    }

    pub fn adjust_all(&self, ranges: &[UnusualRange], series_max: NaiveDateTime) -> Vec<UnusualRange> {
        ranges
            .iter()
            .map(|r| self.adjust(*r, series_max))
            .collect()
    }
}

impl Default for RangeAdjuster {
    fn default() -> Self {
        Self::new(2)
    }
}
