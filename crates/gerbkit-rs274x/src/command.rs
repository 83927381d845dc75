//! RS-274X extended command codes
//!
//! Every extended command starts with a two-letter code. The set is
//! closed: anything not listed here is reported as an unknown command.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-letter extended command code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandCode {
    /// `FS` coordinate format
    FormatStatement,
    /// `AS` axis select
    AxisSelect,
    /// `MI` mirror image
    MirrorImage,
    /// `MO` units
    ModeOfUnits,
    /// `OF` image offset in A/B
    Offset,
    /// `SF` scale factor
    ScaleFactor,
    /// `IN` image name
    ImageName,
    /// `IJ` image justify
    ImageJustify,
    /// `IO` image offset
    ImageOffset,
    /// `IP` image polarity
    ImagePolarity,
    /// `IR` image rotation
    ImageRotation,
    /// `PF` plotter film
    PlotterFilm,
    /// `IF` include file
    IncludeFile,
    /// `AD` aperture definition
    ApertureDefinition,
    /// `AM` aperture macro
    ApertureMacro,
    /// `LN` layer name
    LayerName,
    /// `LP` layer polarity
    LayerPolarity,
    /// `KO` knockout
    Knockout,
    /// `SR` step and repeat
    StepAndRepeat,
    /// `RO` rotate
    Rotate,
}

impl CommandCode {
    /// Every supported code
    pub const ALL: [CommandCode; 20] = [
        Self::FormatStatement,
        Self::AxisSelect,
        Self::MirrorImage,
        Self::ModeOfUnits,
        Self::Offset,
        Self::ScaleFactor,
        Self::ImageName,
        Self::ImageJustify,
        Self::ImageOffset,
        Self::ImagePolarity,
        Self::ImageRotation,
        Self::PlotterFilm,
        Self::IncludeFile,
        Self::ApertureDefinition,
        Self::ApertureMacro,
        Self::LayerName,
        Self::LayerPolarity,
        Self::Knockout,
        Self::StepAndRepeat,
        Self::Rotate,
    ];

    /// Decode two command characters.
    ///
    /// Older plotters write step-and-repeat as `SP` and plotter film as
    /// `PM`; both spellings are accepted.
    pub fn decode(first: u8, second: u8) -> Option<Self> {
        let code = match (first, second) {
            (b'F', b'S') => Self::FormatStatement,
            (b'A', b'S') => Self::AxisSelect,
            (b'M', b'I') => Self::MirrorImage,
            (b'M', b'O') => Self::ModeOfUnits,
            (b'O', b'F') => Self::Offset,
            (b'S', b'F') => Self::ScaleFactor,
            (b'I', b'N') => Self::ImageName,
            (b'I', b'J') => Self::ImageJustify,
            (b'I', b'O') => Self::ImageOffset,
            (b'I', b'P') => Self::ImagePolarity,
            (b'I', b'R') => Self::ImageRotation,
            (b'P', b'F') | (b'P', b'M') => Self::PlotterFilm,
            (b'I', b'F') => Self::IncludeFile,
            (b'A', b'D') => Self::ApertureDefinition,
            (b'A', b'M') => Self::ApertureMacro,
            (b'L', b'N') => Self::LayerName,
            (b'L', b'P') => Self::LayerPolarity,
            (b'K', b'O') => Self::Knockout,
            (b'S', b'R') | (b'S', b'P') => Self::StepAndRepeat,
            (b'R', b'O') => Self::Rotate,
            _ => return None,
        };
        Some(code)
    }

    /// Canonical two-letter spelling
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FormatStatement => "FS",
            Self::AxisSelect => "AS",
            Self::MirrorImage => "MI",
            Self::ModeOfUnits => "MO",
            Self::Offset => "OF",
            Self::ScaleFactor => "SF",
            Self::ImageName => "IN",
            Self::ImageJustify => "IJ",
            Self::ImageOffset => "IO",
            Self::ImagePolarity => "IP",
            Self::ImageRotation => "IR",
            Self::PlotterFilm => "PF",
            Self::IncludeFile => "IF",
            Self::ApertureDefinition => "AD",
            Self::ApertureMacro => "AM",
            Self::LayerName => "LN",
            Self::LayerPolarity => "LP",
            Self::Knockout => "KO",
            Self::StepAndRepeat => "SR",
            Self::Rotate => "RO",
        }
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_round_trips_canonical_spelling() {
        for code in CommandCode::ALL {
            let bytes = code.as_str().as_bytes();
            assert_eq!(CommandCode::decode(bytes[0], bytes[1]), Some(code));
        }
    }

    #[test]
    fn test_legacy_spellings() {
        assert_eq!(
            CommandCode::decode(b'S', b'P'),
            Some(CommandCode::StepAndRepeat)
        );
        assert_eq!(CommandCode::decode(b'P', b'M'), Some(CommandCode::PlotterFilm));
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(CommandCode::decode(b'Z', b'Z'), None);
        assert_eq!(CommandCode::decode(b'f', b's'), None);
    }
}
