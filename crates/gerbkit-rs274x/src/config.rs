//! Interpreter configuration
//!
//! Loaded from JSON; every field has a default so a partial file (or
//! none at all) is fine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cursor::DEFAULT_LINE_CAPACITY;

/// Errors while loading or validating a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Upper bound on pre-allocated D-code slots
pub const MAX_DCODE_SLOTS: i64 = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpreterConfig {
    /// Resolution of the internal integer grid
    pub internal_units_per_inch: f64,
    /// Maximum number of nested include files
    pub max_include_depth: usize,
    /// Longest physical line accepted, in bytes
    pub line_buffer_capacity: usize,
    /// First pre-allocated D-code
    pub first_dcode: i64,
    /// Last pre-allocated D-code
    pub last_dcode: i64,
    /// Directory relative include names are resolved against
    pub include_dir: Option<PathBuf>,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            internal_units_per_inch: 10000.0,
            max_include_depth: 10,
            line_buffer_capacity: DEFAULT_LINE_CAPACITY,
            first_dcode: 10,
            last_dcode: 999,
            include_dir: None,
        }
    }
}

impl InterpreterConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.internal_units_per_inch.is_finite() && self.internal_units_per_inch > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "internal_units_per_inch must be positive, got {}",
                self.internal_units_per_inch
            )));
        }
        if self.line_buffer_capacity == 0 {
            return Err(ConfigError::Invalid(
                "line_buffer_capacity must be non-zero".to_string(),
            ));
        }
        match self.last_dcode.checked_sub(self.first_dcode) {
            Some(span) if span < 0 => Err(ConfigError::Invalid(format!(
                "empty D-code range {}..={}",
                self.first_dcode, self.last_dcode
            ))),
            Some(span) if span < MAX_DCODE_SLOTS => Ok(()),
            _ => Err(ConfigError::Invalid(format!(
                "D-code range {}..={} exceeds {} slots",
                self.first_dcode, self.last_dcode, MAX_DCODE_SLOTS
            ))),
        }
    }

    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn save_to_file(&self, path: &Path) -> ConfigResult<()> {
        self.validate()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = InterpreterConfig::from_json_str(r#"{ "max_include_depth": 3 }"#).unwrap();
        assert_eq!(config.max_include_depth, 3);
        assert_eq!(config.internal_units_per_inch, 10000.0);
        assert_eq!(config.first_dcode, 10);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = InterpreterConfig {
            internal_units_per_inch: 0.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = InterpreterConfig {
            first_dcode: 20,
            last_dcode: 10,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        assert!(matches!(
            InterpreterConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_oversized_dcode_range_is_rejected() {
        let config = InterpreterConfig {
            first_dcode: 0,
            last_dcode: i64::MAX,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = InterpreterConfig {
            first_dcode: i64::MIN,
            last_dcode: i64::MAX,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let json = r#"{ "first_dcode": 10, "last_dcode": 1000000000000 }"#;
        assert!(matches!(
            InterpreterConfig::from_json_str(json),
            Err(ConfigError::Invalid(_))
        ));

        let config = InterpreterConfig {
            first_dcode: 10,
            last_dcode: 10 + MAX_DCODE_SLOTS - 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
