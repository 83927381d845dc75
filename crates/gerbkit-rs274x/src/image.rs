//! Image-level state set by extended commands
//!
//! One [`ImageState`] exists per loaded layer. It starts with defaults
//! and is updated command by command; nothing resets it mid-file.

use gerbkit_core::{IntPoint, Units};
use serde::{Deserialize, Serialize};

use crate::format::CoordinateFormat;

/// Image or layer polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Polarity {
    /// Dark on clear
    #[default]
    Positive,
    /// Clear on dark
    Negative,
}

/// Dark maps to positive, clear to negative
impl From<Polarity> for gerber_types::Polarity {
    fn from(polarity: Polarity) -> Self {
        match polarity {
            Polarity::Positive => Self::Dark,
            Polarity::Negative => Self::Clear,
        }
    }
}

impl From<gerber_types::Polarity> for Polarity {
    fn from(polarity: gerber_types::Polarity) -> Self {
        match polarity {
            gerber_types::Polarity::Dark => Self::Positive,
            gerber_types::Polarity::Clear => Self::Negative,
        }
    }
}

/// Image and format state of one Gerber layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageState {
    /// Units from `%MO..*%`
    pub units: Units,
    /// Coordinate format from `%FS..*%`
    pub format: CoordinateFormat,
    /// Text of `%IN..*%`
    pub name: String,
    /// Last `%LN..*%` text seen
    pub layer_name: Option<String>,
    /// `%IP..*%`
    pub image_polarity: Polarity,
    /// `%LP..*%`
    pub layer_polarity: Polarity,
    /// A/B offset from `%OF..*%`, in internal units
    pub offset: IntPoint,
}

impl ImageState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_metric(&self) -> bool {
        self.units == Units::Millimeter
    }

    pub fn is_image_negative(&self) -> bool {
        self.image_polarity == Polarity::Negative
    }

    pub fn is_layer_negative(&self) -> bool {
        self.layer_polarity == Polarity::Negative
    }
}
