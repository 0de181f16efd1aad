//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Why configuration could not be produced.
///
/// Field-level problems name the dotted path of the offending key
/// (`auth.token_symmetric_key`) or, for overrides, the environment variable.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An explicitly named config file does not exist.
    #[error("config file {} does not exist", path.display())]
    FileNotFound {
        /// Path as given.
        path: PathBuf,
    },

    /// The config file exists but could not be read.
    #[error("cannot read config file {}", path.display())]
    ReadError {
        /// Path as given.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML or an unknown key.
    #[error("invalid TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Malformed JSON or an unknown key.
    #[error("invalid JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// An override variable is unknown or its value does not parse.
    #[error("environment override {var}: {reason}")]
    EnvParseError {
        /// Full variable name.
        var: String,
        /// What was expected.
        reason: &'static str,
    },

    /// A key parsed but its value is unusable.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue {
        /// Dotted key path.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Input that cannot be attributed to a single key, such as an
    /// unsupported file format or a broken `.env` file.
    #[error("configuration rejected: {0}")]
    ValidationError(String),
}

impl ConfigError {
    pub(crate) fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub(crate) fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn env(var: &str, reason: &'static str) -> Self {
        Self::EnvParseError {
            var: var.to_string(),
            reason,
        }
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// Dotted key path or variable name this error is about, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::EnvParseError { var, .. } => Some(var.as_str()),
            Self::InvalidValue { field, .. } => Some(*field),
            _ => None,
        }
    }
}
