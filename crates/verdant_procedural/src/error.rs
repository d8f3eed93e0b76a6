//! # World Error Types
//!
//! Generation itself never fails: every input is an in-process coordinate
//! and a fixed seed. The only recoverable failures come from loading and
//! validating configuration. Misuse of the window (extending before it was
//! created) is a programming error and panics instead.

use thiserror::Error;

/// Errors that can occur while configuring a world.
#[derive(Error, Debug)]
pub enum WorldError {
    /// Configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration text is not valid TOML for [`crate::WorldConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A configuration value is out of its allowed range.
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl WorldError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for world configuration.
pub type WorldResult<T> = Result<T, WorldError>;
