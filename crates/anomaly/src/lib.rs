//! # anomaly
//!
//! Detection of statistically unusual price-movement ranges.
//!
//! Given a `time`/`price` series the pipeline fits a GARCH(1,1) volatility
//! model to the daily changes, flags days whose change is improbable at the
//! requested confidence level, groups flagged days separated by small gaps
//! into ranges, widens single-day ranges, and returns `YYYY-MM-DD` pairs.
//!
//! ```no_run
//! use anomaly::{unusual_ranges, PriceSeriesInput};
//!
//! let input = PriceSeriesInput::new(
//!     vec!["2024-01-01".into(), "2024-01-02".into(), "2024-01-03".into()],
//!     vec![100.0, 101.0, 250.0],
//! );
//! match unusual_ranges(&input, 0.05) {
//!     Ok(ranges) => println!("{:?}", ranges),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

// Re-export everything from SPI
pub use anomaly_spi::*;

// Re-export everything from API
pub use anomaly_api::*;

// Re-export everything from Core
pub use anomaly_core::*;

/// Commonly used types.
pub mod prelude {
    pub use anomaly_api::{
        DetectionConfig, GapThresholdPolicy, PriceSeriesInput, RangeOrdering, TestPolicy,
    };
    pub use anomaly_core::{unusual_ranges, DetectionReport, Garch11, UnusualRangePipeline};
    pub use anomaly_spi::{AnomalyError, FormattedRange, Result, TimeSeries, VolatilityModel};
}
