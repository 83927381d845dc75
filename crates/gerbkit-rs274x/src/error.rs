//! Error types for the RS-274X interpreter.
//!
//! Two tiers: [`Rs274xError`] aborts the whole parse (the stream ran out
//! or could not be read), while [`CommandError`] only fails the single
//! command being dispatched. The driver resynchronises on the next block
//! terminator after a `CommandError` and carries on.

use std::io;
use thiserror::Error;

use crate::command::CommandCode;

/// Errors that stop the parse of a block or file.
#[derive(Error, Debug)]
pub enum Rs274xError {
    /// The input ended while a terminator was still expected.
    #[error("Unexpected end of file while looking for a block terminator")]
    UnexpectedEof,

    /// A physical line does not fit in the line buffer.
    #[error("Line exceeds buffer capacity of {capacity} bytes")]
    LineTooLong { capacity: usize },

    /// The driver was asked to parse an extended block without a leading `%`.
    #[error("Extended command block must start with '%'")]
    NotAtBlockStart,

    /// I/O error while reading the stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errors confined to one dispatched command.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// A field could not be extracted from the command text.
    #[error("Malformed {command} command: {reason}")]
    MalformedToken { command: String, reason: String },

    /// The two-character code is not part of the command set.
    #[error("Unknown command <{0}>")]
    UnknownCommand(String),

    /// The command is recognised but deliberately rejected.
    #[error("Command <{0}> not supported")]
    Unsupported(CommandCode),

    /// Aperture definition without the `D` prefix.
    #[error("Aperture definition must start with 'D'")]
    MissingDcodePrefix,

    /// The include stack is full.
    #[error("Too many include files (maximum {max})")]
    IncludeDepthExceeded { max: usize },

    /// An include file could not be opened.
    #[error("Include file <{name}> not found")]
    IncludeNotFound { name: String },
}

impl CommandError {
    pub(crate) fn malformed(command: CommandCode, reason: impl Into<String>) -> Self {
        Self::MalformedToken {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for parse operations.
pub type Rs274xResult<T> = Result<T, Rs274xError>;

/// Result type alias for a single command handler.
pub type CommandResult<T> = Result<T, CommandError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_error_display() {
        let err = CommandError::Unsupported(CommandCode::MirrorImage);
        assert_eq!(err.to_string(), "Command <MI> not supported");

        let err = CommandError::IncludeDepthExceeded { max: 10 };
        assert_eq!(err.to_string(), "Too many include files (maximum 10)");

        let err = CommandError::malformed(CommandCode::FormatStatement, "unexpected 'Q'");
        assert_eq!(err.to_string(), "Malformed FS command: unexpected 'Q'");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "short read");
        let err: Rs274xError = io_err.into();
        assert!(matches!(err, Rs274xError::Io(_)));
    }
}
