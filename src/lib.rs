//! # GerbKit
//!
//! Reads the extended commands of RS-274X (Gerber) photoplotter files and
//! rebuilds the state a PCB layer viewer needs before drawing:
//! - Coordinate format, units, offsets and polarity
//! - The D-code aperture table
//! - Aperture macros
//! - Nested include files
//!
//! ## Architecture
//!
//! GerbKit is organized as a workspace with multiple crates:
//!
//! 1. **gerbkit-core** - Units, internal-unit conversion, diagnostics, errors
//! 2. **gerbkit-rs274x** - Extended command interpreter
//! 3. **gerbkit** - This crate; re-exports and logging setup

use std::path::Path;

use anyhow::Context;

pub use gerbkit_core::{Error, IntPoint, Message, MessageLevel, MessageLog, Result, Units};

pub use gerbkit_rs274x::{
    ApertureDefinition, ApertureMacro, ApertureShape, ApertureTable, AxisFormat, CommandCode,
    CommandError, CommandOutcome, ConfigError, CoordinateFormat, CoordinateNotation, DrillShape,
    FsIncludeResolver, ImageState, IncludeResolver, InterpreterConfig, LineCursor, MacroParam,
    MacroPrimitive, MacroSet, MemoryIncludeResolver, ParseSummary, Polarity, PrimitiveKind,
    Rs274xError, Rs274xInterpreter, ZeroSuppression,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(())
}

/// Parse a Gerber layer from disk.
///
/// Relative include files are looked up next to `path` unless the
/// configuration names another directory.
pub fn load_layer(path: &Path, config: Option<InterpreterConfig>) -> anyhow::Result<Rs274xInterpreter> {
    let mut config = config.unwrap_or_default();
    if config.include_dir.is_none() {
        config.include_dir = path.parent().map(Path::to_path_buf);
    }
    let mut interp = Rs274xInterpreter::with_config(config).context("invalid configuration")?;
    let summary = interp
        .parse_file(path)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        blocks = summary.extended_blocks,
        failed = summary.failed_commands,
        "layer loaded"
    );
    Ok(interp)
}
