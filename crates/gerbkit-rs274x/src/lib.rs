//! # GerbKit RS-274X
//!
//! Streaming interpreter for the extended (`%...%`) commands of RS-274X
//! Gerber files. It rebuilds the coordinate format, units, offsets,
//! polarity, aperture table and aperture macros of a PCB layer; drawing
//! the layer is left to the consumer of those tables.
//!
//! ```no_run
//! use gerbkit_rs274x::Rs274xInterpreter;
//!
//! let mut interp = Rs274xInterpreter::new();
//! interp.parse_str("%FSLAX24Y24*%\n%MOIN*%\n%ADD10C,0.010*%\n")?;
//! assert!(interp.apertures().get(10).is_some_and(|a| a.defined));
//! # Ok::<(), gerbkit_rs274x::Rs274xError>(())
//! ```

pub mod aperture;
pub mod command;
pub mod config;
pub mod cursor;
pub mod error;
pub mod format;
pub mod image;
pub mod include;
pub mod interpreter;
pub mod macros;
pub mod scanner;

pub use gerber_types;

pub use aperture::{ApertureDefinition, ApertureShape, ApertureTable, DrillShape};
pub use command::CommandCode;
pub use config::{ConfigError, ConfigResult, InterpreterConfig};
pub use cursor::LineCursor;
pub use error::{CommandError, CommandResult, Rs274xError, Rs274xResult};
pub use format::{AxisFormat, CoordinateFormat, CoordinateNotation, ZeroSuppression};
pub use image::{ImageState, Polarity};
pub use include::{FsIncludeResolver, IncludeResolver, MemoryIncludeResolver};
pub use interpreter::{CommandOutcome, ParseSummary, Rs274xInterpreter};
pub use macros::{ApertureMacro, MacroParam, MacroPrimitive, MacroSet, PrimitiveKind};
