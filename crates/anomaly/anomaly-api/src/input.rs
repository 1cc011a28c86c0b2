//! Input contract: parallel `time` and `price` arrays.

use anomaly_spi::{AnomalyError, Result, TimeSeries};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Raw price series as delivered by the data-fetch collaborator.
///
/// Both fields are optional at the serde level so that a missing key surfaces
/// as `InvalidInput` rather than a deserializer error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceSeriesInput {
    pub time: Option<Vec<String>>,
    pub price: Option<Vec<f64>>,
}

impl PriceSeriesInput {
    pub fn new(time: Vec<String>, price: Vec<f64>) -> Self {
        Self {
            time: Some(time),
            price: Some(price),
        }
    }

    /// Validate and convert into a [`TimeSeries`].
    pub fn to_time_series(&self) -> Result<TimeSeries> {
        let time = self
            .time
            .as_ref()
            .ok_or_else(|| AnomalyError::InvalidInput("data must contain a 'time' array".into()))?;
        let price = self.price.as_ref().ok_or_else(|| {
            AnomalyError::InvalidInput("data must contain a 'price' array".into())
        })?;

        if time.len() != price.len() {
            return Err(AnomalyError::InvalidInput(format!(
                "length mismatch: {} timestamps, {} prices",
                time.len(),
                price.len()
            )));
        }

        let timestamps = time
            .iter()
            .map(|t| parse_timestamp(t))
            .collect::<Result<Vec<_>>>()?;

        TimeSeries::from_parts(timestamps, price.clone())
    }
}

/// Parse an ISO-8601 date or datetime.
///
/// Accepts `YYYY-MM-DD`, naive datetimes with `T` or space separators and
/// optional fractional seconds, and offset datetimes (converted to UTC).
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let s = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Ok(dt.naive_utc());
        }
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight);
    }

    Err(AnomalyError::InvalidInput(format!(
        "unrecognized timestamp '{}'",
        raw
    )))
}
