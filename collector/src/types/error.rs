//! Configuration errors

use thiserror::Error;

/// Result type for configuration handling
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Missing or invalid configuration, detected before any network or storage call
#[derive(Error, Debug, Clone, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ConfigError {
    /// A required variable is unset or blank
    #[error("Required environment variable {0} is not set")]
    Missing(&'static str),

    /// The contract name cannot be used as a key prefix
    #[error("Invalid contract name {value:?}: {reason}")]
    InvalidContract {
        /// Offending contract name
        value: String,
        /// Why it was refused
        reason: &'static str,
    },

    /// `APP_ENV` holds an unknown stage
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// A numeric tunable does not parse
    #[error("Invalid value for {var}: {value:?}")]
    InvalidNumber {
        /// Variable name
        var: &'static str,
        /// Raw value
        value: String,
    },
}

impl ConfigError {
    /// Stable, machine-readable name of the failure kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}
