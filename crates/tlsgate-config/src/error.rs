// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use std::path::PathBuf;
use thiserror::Error;

/// Every failure the configuration layer can report.
///
/// The first three variants are rule violations found by the validators;
/// the rest come from the collaborators (option registration, environment
/// reads, configuration files).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A value that no rule accepts
    #[error("Invalid configuration value for '{key}': {reason}")]
    InvalidValue {
        /// Offending option key
        key: String,
        /// What is wrong with it
        reason: String,
    },

    /// Options that cannot be combined
    #[error("Conflicting configuration values: {0}")]
    Conflict(String),

    /// An option that requires another one
    #[error("Missing configuration dependency: {0}")]
    MissingDependency(String),

    /// Value of the wrong kind for its declaration
    #[error("Option '{key}' holds the wrong kind of value, expected {expected}")]
    TypeMismatch {
        /// Offending option key
        key: String,
        /// Kind the declaration asks for
        expected: &'static str,
    },

    /// Read of a key with no value
    #[error("Option '{0}' was not supplied")]
    NotSupplied(String),

    /// Key or flag registered twice
    #[error("Option declared twice: {0}")]
    DuplicateOption(String),

    /// Declaration with an empty key or flag
    #[error("Malformed option declaration: {0}")]
    MalformedOption(String),

    /// File value that is neither a string nor a boolean
    #[error("Unsupported value for option '{key}': only strings and booleans are accepted")]
    UnsupportedValue {
        /// Offending option key
        key: String,
    },

    /// IO error while reading a file
    #[error("IO error reading configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parse error
    #[error("Failed to parse TOML configuration: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// YAML parse error
    #[error("Failed to parse YAML configuration: {0}")]
    YamlParseError(#[from] serde_yaml::Error),

    /// JSON parse error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonParseError(#[from] serde_json::error::Error),

    /// File extension with no known format
    #[error("Unsupported configuration format: {0}. Supported formats: toml, yaml, json")]
    UnsupportedFormat(String),

    /// Missing configuration file
    #[error("Configuration file not found at path: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Path without an extension
    #[error("Invalid configuration path: {}", .0.display())]
    InvalidPath(PathBuf),
}

impl ConfigError {
    /// Create an invalid value error
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        ConfigError::Conflict(message.into())
    }

    /// Create a missing dependency error
    pub fn missing_dependency(message: impl Into<String>) -> Self {
        ConfigError::MissingDependency(message.into())
    }

    /// Create a type mismatch error
    pub fn type_mismatch(key: impl Into<String>, expected: &'static str) -> Self {
        ConfigError::TypeMismatch {
            key: key.into(),
            expected,
        }
    }

    /// True for the three rule-violation kinds raised by the validators.
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            ConfigError::InvalidValue { .. }
                | ConfigError::Conflict(_)
                | ConfigError::MissingDependency(_)
        )
    }
}

/// Result alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_violation_kinds() {
        assert!(ConfigError::invalid_value("ssl.mode", "unsupported mode x").is_rule_violation());
        assert!(ConfigError::conflict("both").is_rule_violation());
        assert!(ConfigError::missing_dependency("ca").is_rule_violation());
        assert!(!ConfigError::type_mismatch("ssl", "a switch").is_rule_violation());
        assert!(!ConfigError::DuplicateOption("ssl.mode".to_string()).is_rule_violation());
    }

    #[test]
    fn test_display_includes_key() {
        let err = ConfigError::invalid_value("ssl.mode", "unsupported mode tls");
        let text = err.to_string();
        assert!(text.contains("ssl.mode"));
        assert!(text.contains("unsupported mode tls"));
    }
}
