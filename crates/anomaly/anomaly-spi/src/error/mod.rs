//! Error types for unusual range detection.
//!
//! This module contains the error enum and the Result alias.

mod anomaly_error;

pub use anomaly_error::{AnomalyError, Result};
