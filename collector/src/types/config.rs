//! Per-invocation run configuration

use std::env;
use std::fmt;

use snapshot_storage::StorageTarget;

use super::{ConfigError, ConfigResult};

/// Variable holding the contract (city) name
pub const CONTRACT_VAR: &str = "CONTRACT";
/// Variable holding the station API key
pub const API_KEY_VAR: &str = "API_KEY";
/// Variable holding the destination bucket name
pub const BUCKET_NAME_VAR: &str = "BUCKET_NAME";

/// Provider identifier for a city's station network, e.g. `paris`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Contract(String);

impl Contract {
    /// Creates a contract from a raw name, trimming surrounding whitespace
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` for a blank name and
    /// `ConfigError::InvalidContract` when the name contains a `/`
    pub fn new(name: impl Into<String>) -> ConfigResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::Missing(CONTRACT_VAR));
        }
        if name.contains('/') {
            return Err(ConfigError::InvalidContract {
                value: name,
                reason: "must not contain '/'",
            });
        }
        Ok(Self(name))
    }

    /// Contract name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// API key for the station provider. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a raw API key
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` when the key is blank
    pub fn new(key: impl Into<String>) -> ConfigResult<Self> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(ConfigError::Missing(API_KEY_VAR));
        }
        Ok(Self(key))
    }

    pub(crate) fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Raw configuration as read from the environment, not yet validated
#[derive(Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Contract name
    pub contract: String,
    /// Station API key
    pub api_key: String,
    /// Destination bucket name
    pub bucket_name: String,
}

impl RunConfig {
    /// Creates a run configuration from raw values
    #[must_use]
    pub fn new(
        contract: impl Into<String>,
        api_key: impl Into<String>,
        bucket_name: impl Into<String>,
    ) -> Self {
        Self {
            contract: contract.into(),
            api_key: api_key.into(),
            bucket_name: bucket_name.into(),
        }
    }

    /// Reads `CONTRACT`, `API_KEY` and `BUCKET_NAME`; unset variables become empty
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            contract: env::var(CONTRACT_VAR).unwrap_or_default(),
            api_key: env::var(API_KEY_VAR).unwrap_or_default(),
            bucket_name: env::var(BUCKET_NAME_VAR).unwrap_or_default(),
        }
    }

    /// Checks every field, in the order contract, key, bucket
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found
    pub fn validate(&self) -> ConfigResult<ValidatedConfig> {
        let contract = Contract::new(self.contract.as_str())?;
        let credential = Credential::new(self.api_key.as_str())?;
        let target = StorageTarget::new(self.bucket_name.as_str())
            .ok_or(ConfigError::Missing(BUCKET_NAME_VAR))?;

        Ok(ValidatedConfig {
            contract,
            credential,
            target,
        })
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("contract", &self.contract)
            .field("api_key", &"<redacted>")
            .field("bucket_name", &self.bucket_name)
            .finish()
    }
}

/// Configuration that passed validation
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    /// Contract to fetch
    pub contract: Contract,
    /// Provider API key
    pub credential: Credential,
    /// Destination bucket
    pub target: StorageTarget,
}
