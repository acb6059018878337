#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Tolerance used when comparing point values.
pub const EPSILON: f64 = 1e-6;

/// A point value and whether some limit reduced it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Points {
    /// The (possibly limited) value.
    value:  f64,
    /// Whether a rule or range limited the value.
    capped: bool,
}

impl Points {
    /// Creates a new point value. `-0.0` is stored as `0.0`.
    pub fn new(value: f64, capped: bool) -> Self {
        Self {
            value: if value == 0.0 { 0.0 } else { value },
            capped,
        }
    }

    /// Zero points, not capped.
    pub fn zero() -> Self {
        Self::new(0.0, false)
    }

    /// Returns the value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns whether the value was limited.
    pub fn capped(&self) -> bool {
        self.capped
    }

    /// Clamps the value into `[min, max]`, marking it capped if it moved.
    pub fn clamp(self, min: f64, max: f64) -> Self {
        if self.value < min {
            Self::new(min, true)
        } else if self.value > max {
            Self::new(max, true)
        } else {
            self
        }
    }
}

impl Display for Points {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}P", format_points(self.value))?;
        if self.capped {
            write!(f, " (capped)")?;
        }
        Ok(())
    }
}

/// Formats a point value with at most two decimals and no trailing zeros.
pub fn format_points(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = format!("{rounded:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
