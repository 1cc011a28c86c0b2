//! Unusual Range Detection Core
//!
//! Implementations of every pipeline stage: the GARCH(1,1) volatility fit,
//! the threshold tests, gap-based grouping, degenerate-range widening and the
//! orchestrating pipeline.

mod adjust;
mod garch;
mod grouping;
mod pipeline;
#[cfg(feature = "async")]
mod runner;
mod simplex;
mod stats;
mod threshold;

pub use adjust::RangeAdjuster;
pub use garch::{Garch11, GarchFit};
pub use grouping::{gap_threshold, GapGrouper};
pub use pipeline::{unusual_ranges, DetectionReport, UnusualRangePipeline};
#[cfg(feature = "async")]
pub use runner::{detect_with_timeout, run_with_timeout};
pub use threshold::{critical_value, ThresholdDetector};
