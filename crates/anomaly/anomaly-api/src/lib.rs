//! Unusual Range Detection API
//!
//! Configuration types and the input contract consumed from the data-fetch
//! collaborator.

mod config;
mod input;

// Re-export SPI types
pub use anomaly_spi::{AnomalyError, FormattedRange, Result, TimeSeries};

pub use config::{DetectionConfig, GapThresholdPolicy, GarchConfig, RangeOrdering, TestPolicy};
pub use input::{parse_timestamp, PriceSeriesInput};
