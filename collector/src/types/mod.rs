mod config;
mod environment;
mod error;

pub use config::{
    Contract, Credential, RunConfig, ValidatedConfig, API_KEY_VAR, BUCKET_NAME_VAR, CONTRACT_VAR,
};
pub use environment::Environment;
pub use error::{ConfigError, ConfigResult};
