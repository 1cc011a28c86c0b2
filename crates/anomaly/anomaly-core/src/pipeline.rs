//! End-to-end unusual range pipeline.
//!
//! ```text
//! validate -> daily changes -> volatility fit -> threshold test
//!          -> gap grouping -> widening -> format and order
//! ```
//!
//! Every call is a pure function of the series and the configuration.

use anomaly_api::{DetectionConfig, PriceSeriesInput, RangeOrdering};
use anomaly_spi::{
    AnomalyError, DateRange, FormattedRange, RangeGrouper, Result, TimeSeries, UnusualDayDetector,
    UnusualDayMask, UnusualRange, VolatilityForecast, VolatilityModel,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, info, info_span};

use crate::adjust::RangeAdjuster;
use crate::garch::Garch11;
use crate::grouping::GapGrouper;
use crate::threshold::ThresholdDetector;

/// Intermediate and final results of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionReport {
    pub model: String,
    /// Dates the daily changes were realized on.
    pub change_dates: Vec<NaiveDateTime>,
    pub daily_changes: Vec<f64>,
    pub forecast: VolatilityForecast,
    pub mask: UnusualDayMask,
    /// Ranges as grouped, before widening.
    pub raw_ranges: Vec<UnusualRange>,
    /// Ranges after widening single-day entries.
    pub adjusted_ranges: Vec<UnusualRange>,
    /// Final calendar-day ranges, coalesced and ordered.
    pub ranges: Vec<FormattedRange>,
}

impl DetectionReport {
    /// Timestamps of every flagged day.
    pub fn flagged_dates(&self) -> Vec<NaiveDateTime> {
        self.mask
            .indices()
            .into_iter()
            .map(|i| self.change_dates[i])
            .collect()
    }

    pub fn has_anomalies(&self) -> bool {
        !self.mask.is_clear()
    }
}

/// Detection pipeline over a pluggable volatility model.
#[derive(Debug, Clone)]
pub struct UnusualRangePipeline<V = Garch11> {
    config: DetectionConfig,
    model: V,
    detector: ThresholdDetector,
    grouper: GapGrouper,
    adjuster: RangeAdjuster,
}

impl UnusualRangePipeline<Garch11> {
    /// Pipeline backed by GARCH(1,1) with the configured optimizer settings.
    pub fn new(config: DetectionConfig) -> Result<Self> {
        let model = Garch11::from_config(config.garch);
        Self::with_model(config, model)
    }
}

impl<V: VolatilityModel> UnusualRangePipeline<V> {
    pub fn with_model(config: DetectionConfig, model: V) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            detector: ThresholdDetector::from_config(&config)?,
            grouper: GapGrouper::new(config.gap_policy),
            adjuster: RangeAdjuster::new(config.widen_days),
            model,
            config,
        })
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn model(&self) -> &V {
        &self.model
    }

    /// Run every stage and return the full report.
    ///
    /// A clear mask is not an error here; the report simply has no ranges.
    pub fn analyze(&self, series: &TimeSeries) -> Result<DetectionReport> {
        let span = info_span!(
            "unusual_ranges",
            points = series.len(),
            confidence_level = self.config.confidence_level
        );
        let _guard = span.enter();

        let daily_changes = series.daily_changes();
        let change_dates = series.change_dates();

        let forecast = self.model.fit(&daily_changes)?;
        debug!(model = self.model.name(), "volatility fitted");

        let mask = self.detector.detect(&daily_changes, &forecast)?;

        let flagged: Vec<NaiveDateTime> = mask.indices().into_iter().map(|i| change_dates[i]).collect();
        let raw_ranges = self.grouper.group(&flagged);
        let adjusted_ranges = self
            .adjuster
            .adjust_all(&raw_ranges, series.last_timestamp());
        let ranges = finalize(&adjusted_ranges, self.config.ordering);

        info!(
            flagged = flagged.len(),
            ranges = ranges.len(),
            "detection complete"
        );

        Ok(DetectionReport {
            model: self.model.name().to_string(),
            change_dates,
            daily_changes,
            forecast,
            mask,
            raw_ranges,
            adjusted_ranges,
            ranges,
        })
    }

    /// Run the pipeline, failing with `NoAnomaliesFound` when nothing is flagged.
    pub fn run(&self, series: &TimeSeries) -> Result<Vec<FormattedRange>> {
        let report = self.analyze(series)?;
        if !report.has_anomalies() {
            return Err(AnomalyError::NoAnomaliesFound {
                confidence_level: self.config.confidence_level,
            });
        }
        Ok(report.ranges)
    }

    pub fn run_input(&self, input: &PriceSeriesInput) -> Result<Vec<FormattedRange>> {
        self.run(&input.to_time_series()?)
    }
}

/// Detect unusual ranges with default settings at the given confidence level.
pub fn unusual_ranges(
    input: &PriceSeriesInput,
    confidence_level: f64,
) -> Result<Vec<FormattedRange>> {
    UnusualRangePipeline::new(DetectionConfig::new(confidence_level))?.run_input(input)
}

/// Reduce to calendar days, merge ranges sharing a day, then order.
fn finalize(ranges: &[UnusualRange], ordering: RangeOrdering) -> Vec<FormattedRange> {
    let mut days: Vec<DateRange> = ranges.iter().map(|r| r.to_date_range()).collect();
    days.sort();

    let mut merged: Vec<DateRange> = Vec::with_capacity(days.len());
    for range in days {
        if let Some(last) = merged.last_mut() {
            if last.overlaps(&range) {
                last.end = last.end.max(range.end);
                continue;
            }
        }
        merged.push(range);
    }

    if ordering == RangeOrdering::SpanDescending {
        merged.sort_by(|a, b| b.span_days().cmp(&a.span_days()).then(a.start.cmp(&b.start)));
    }

    merged.iter().map(DateRange::format).collect()
}
