//! Unit conversion utilities
//!
//! Gerber lengths arrive in inches or millimetres. Every length read by
//! the interpreter is converted once into integer internal units so the
//! downstream plotter never sees a floating-point coordinate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Millimetres in one inch
pub const MM_PER_INCH: f64 = 25.4;

/// Length units of a Gerber image (`%MOIN*%` / `%MOMM*%`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Inches
    Inch,
    /// Millimetres
    Millimeter,
}

impl Default for Units {
    fn default() -> Self {
        Self::Inch
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inch => write!(f, "in"),
            Self::Millimeter => write!(f, "mm"),
        }
    }
}

impl FromStr for Units {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "IN" => Ok(Self::Inch),
            "MM" => Ok(Self::Millimeter),
            _ => Err(Error::InvalidUnits {
                token: s.to_string(),
            }),
        }
    }
}

impl Units {
    /// Internal units per one unit of `self`
    ///
    /// * `internal_per_inch` - resolution of the internal grid
    pub fn conversion_scale(self, internal_per_inch: f64) -> f64 {
        match self {
            Self::Inch => internal_per_inch,
            Self::Millimeter => internal_per_inch / MM_PER_INCH,
        }
    }

    /// Convert a length in `self` to rounded internal units
    pub fn to_internal(self, value: f64, internal_per_inch: f64) -> i64 {
        (value * self.conversion_scale(internal_per_inch)).round() as i64
    }
}

impl From<Units> for gerber_types::Unit {
    fn from(units: Units) -> Self {
        match units {
            Units::Inch => Self::Inches,
            Units::Millimeter => Self::Millimeters,
        }
    }
}

impl From<gerber_types::Unit> for Units {
    fn from(unit: gerber_types::Unit) -> Self {
        match unit {
            gerber_types::Unit::Inches => Self::Inch,
            gerber_types::Unit::Millimeters => Self::Millimeter,
        }
    }
}

/// An integer (x, y) pair in internal units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntPoint {
    pub x: i64,
    pub y: i64,
}

impl IntPoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Both components set to `v`
    pub fn splat(v: i64) -> Self {
        Self { x: v, y: v }
    }
}

impl fmt::Display for IntPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
