//! Error handling for GerbKit
//!
//! Errors shared by every layer of the interpreter. Parser-specific
//! failures live in the RS-274X crate; this type covers the pieces
//! that are independent of the command set.

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A unit token other than `IN` or `MM`
    #[error("Invalid units token: {token}")]
    InvalidUnits {
        /// The token that was read.
        token: String,
    },
}

/// Result type alias using the core error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidUnits {
            token: "CM".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid units token: CM");
    }
}
