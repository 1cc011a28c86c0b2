//! Unusual Range Detection Service Provider Interface
//!
//! Defines the contracts, error type and data model shared by every stage of
//! the unusual price-range pipeline.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::{RangeGrouper, UnusualDayDetector, VolatilityModel};
pub use error::{AnomalyError, Result};
pub use model::{
    DateRange, FormattedRange, Observation, TimeSeries, UnusualDayMask, UnusualRange,
    VolatilityForecast,
};
