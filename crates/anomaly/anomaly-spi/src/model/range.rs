//! Unusual range types.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{AnomalyError, Result};

/// A block of unusual activity between two observed timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnusualRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl UnusualRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self> {
        if start > end {
            return Err(AnomalyError::InvalidInput(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Degenerate range covering a single flagged timestamp.
    pub fn single(at: NaiveDateTime) -> Self {
        Self { start: at, end: at }
    }

    pub fn is_degenerate(&self) -> bool {
        self.start == self.end
    }

    /// Calendar-day view of this range.
    pub fn to_date_range(&self) -> DateRange {
        DateRange {
            start: self.start.date(),
            end: self.end.date(),
        }
    }
}

/// Inclusive calendar-day range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AnomalyError::InvalidInput(format!(
                "range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of whole days between start and end.
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Whether the two inclusive ranges share at least one day.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn format(&self) -> FormattedRange {
        FormattedRange(
            self.start.format("%Y-%m-%d").to_string(),
            self.end.format("%Y-%m-%d").to_string(),
        )
    }
}

/// `[start, end]` pair of `YYYY-MM-DD` strings; serializes as a JSON array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedRange(pub String, pub String);

impl FormattedRange {
    pub fn start(&self) -> &str {
        &self.0
    }

    pub fn end(&self) -> &str {
        &self.1
    }
}

impl From<FormattedRange> for (String, String) {
    fn from(range: FormattedRange) -> Self {
        (range.0, range.1)
    }
}
