//! Contract definitions for unusual range detection.
//!
//! This module contains trait definitions that pipeline stages implement.

mod day_detector;
mod range_grouper;
mod volatility_model;

pub use day_detector::UnusualDayDetector;
pub use range_grouper::RangeGrouper;
pub use volatility_model::VolatilityModel;
