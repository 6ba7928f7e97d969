//! Unit conversion utilities
//!
//! Handles conversion between Metric (mm) and Imperial (inch) lengths and
//! parsing of unit-tagged parameter values such as `"250 mm/s"`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::UnitError;

/// Millimetres per inch
pub const MM_PER_INCH: f64 = 25.4;

/// Measurement system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementSystem {
    /// Metric system (mm)
    #[default]
    Metric,
    /// Imperial system (inches)
    Imperial,
}

impl MeasurementSystem {
    /// Convert a length in this system to millimetres
    pub fn to_mm(self, value: f64) -> f64 {
        match self {
            Self::Metric => value,
            Self::Imperial => value * MM_PER_INCH,
        }
    }
}

impl fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => write!(f, "Metric"),
            Self::Imperial => write!(f, "Imperial"),
        }
    }
}

impl FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" | "mm" => Ok(Self::Metric),
            "imperial" | "inch" | "in" => Ok(Self::Imperial),
            _ => Err(format!("Unknown measurement system: {}", s)),
        }
    }
}

/// Physical unit attached to a process parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalUnit {
    /// Watt
    Watt,
    /// Millimetres per second
    MillimetrePerSecond,
    /// Microseconds
    Microsecond,
    /// Millimetres
    Millimetre,
    /// Plain number
    Unitless,
}

impl PhysicalUnit {
    /// Unit label as written in parameter files
    pub fn label(self) -> &'static str {
        match self {
            Self::Watt => "W",
            Self::MillimetrePerSecond => "mm/s",
            Self::Microsecond => "us",
            Self::Millimetre => "mm",
            Self::Unitless => "",
        }
    }
}

impl fmt::Display for PhysicalUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse a `<number> <unit>` string and check the unit
///
/// The unit comparison is exact except that `µs` is accepted for `us`.
/// A unitless value must not carry any suffix.
pub fn parse_tagged(text: &str, expected: PhysicalUnit) -> Result<f32, UnitError> {
    let text = text.trim();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let unit = unit.trim();

    let value = number
        .trim()
        .parse::<f32>()
        .map_err(|_| UnitError::InvalidNumber {
            text: text.to_string(),
        })?;

    let normalized = if unit == "µs" { "us" } else { unit };
    if normalized != expected.label() {
        return Err(UnitError::Mismatch {
            expected: expected.label().to_string(),
            found: unit.to_string(),
        });
    }

    Ok(value)
}

/// Format a value with its unit, the inverse of [`parse_tagged`]
pub fn format_tagged(value: f32, unit: PhysicalUnit) -> String {
    match unit {
        PhysicalUnit::Unitless => format!("{}", value),
        _ => format!("{} {}", value, unit.label()),
    }
}
