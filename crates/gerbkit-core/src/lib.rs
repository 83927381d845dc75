//! # GerbKit Core
//!
//! Core types and utilities shared by the GerbKit crates.
//! Provides measurement units and internal-unit conversion,
//! the diagnostic message log, and the common error type.

pub mod error;
pub mod message;
pub mod units;

pub use error::{Error, Result};
pub use message::{Message, MessageLevel, MessageLog};
pub use units::{IntPoint, Units, MM_PER_INCH};
