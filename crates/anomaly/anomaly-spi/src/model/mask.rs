//! Unusual day mask.

use serde::{Deserialize, Serialize};

/// Boolean flags aligned with the daily changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnusualDayMask {
    /// `true` where the day's change exceeded its threshold.
    pub flags: Vec<bool>,
    /// Critical z-value the mask was computed with.
    pub critical_value: f64,
}

impl UnusualDayMask {
    pub fn new(flags: Vec<bool>, critical_value: f64) -> Self {
        Self {
            flags,
            critical_value,
        }
    }

    /// Indices of flagged days.
    pub fn indices(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter_map(|(i, &flagged)| if flagged { Some(i) } else { None })
            .collect()
    }

    pub fn count(&self) -> usize {
        self.flags.iter().filter(|&&x| x).count()
    }

    /// True when no day is flagged.
    pub fn is_clear(&self) -> bool {
        !self.flags.iter().any(|&x| x)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
