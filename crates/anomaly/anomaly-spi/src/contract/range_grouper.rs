//! Range grouper trait definition.

use chrono::NaiveDateTime;

use crate::model::UnusualRange;

/// Collapses flagged timestamps into contiguous ranges.
pub trait RangeGrouper: Send + Sync {
    /// Group flagged timestamps into chronologically ordered raw ranges.
    ///
    /// Input order does not matter. Single-element runs come back as
    /// degenerate ranges.
    fn group(&self, flagged: &[NaiveDateTime]) -> Vec<UnusualRange>;
}
