//! Data models for unusual range detection.
//!
//! Every value here is created fresh for one pipeline invocation and dropped
//! when the call returns.

mod forecast;
mod mask;
mod observation;
mod range;

pub use forecast::VolatilityForecast;
pub use mask::UnusualDayMask;
pub use observation::{Observation, TimeSeries};
pub use range::{DateRange, FormattedRange, UnusualRange};
