//! Coordinate format (`%FS...*%`)
//!
//! Describes how the digits of an X/Y coordinate in a data block are to
//! be read: how many integer and decimal digits each axis carries, which
//! zeros are left out, and whether values are absolute or incremental.

use serde::{Deserialize, Serialize};

/// Digits of one coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisFormat {
    /// Digits before the implied decimal point
    pub integer_digits: u8,
    /// Digits after the implied decimal point
    pub decimal_digits: u8,
}

impl AxisFormat {
    pub fn new(integer_digits: u8, decimal_digits: u8) -> Self {
        Self {
            integer_digits,
            decimal_digits,
        }
    }
}

impl Default for AxisFormat {
    fn default() -> Self {
        Self::new(3, 4)
    }
}

/// Which zeros are omitted from coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ZeroSuppression {
    /// `L`: leading zeros omitted
    #[default]
    Leading,
    /// `T`: trailing zeros omitted
    Trailing,
}

/// `A` absolute or `I` incremental coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CoordinateNotation {
    #[default]
    Absolute,
    Incremental,
}

/// Full coordinate format of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoordinateFormat {
    pub zero_suppression: ZeroSuppression,
    pub notation: CoordinateNotation,
    pub x: AxisFormat,
    pub y: AxisFormat,
    /// Digits of the `N` sequence number, when declared
    pub sequence_digits: Option<u8>,
}

impl CoordinateFormat {
    pub fn omits_trailing_zeros(&self) -> bool {
        self.zero_suppression == ZeroSuppression::Trailing
    }

    pub fn is_incremental(&self) -> bool {
        self.notation == CoordinateNotation::Incremental
    }
}
