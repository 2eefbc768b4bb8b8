//! Environment configuration for different deployment stages

use std::env;
use std::path::Path;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use aws_credential_types::Credentials;
use tracing::warn;

use super::{ConfigError, ConfigResult};

const DEFAULT_STATION_API_URL: &str = "https://api.jcdecaux.com";
const DEFAULT_STATION_API_TIMEOUT_SECS: u64 = 5;
const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 10;
const LOCALSTACK_ENDPOINT: &str = "http://localhost:4566";

/// Application environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Loads a `.env` file from the working directory, if any, then reads the stage
    ///
    /// Variables already set in the process environment win over the file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvironment` if `APP_ENV` contains an invalid value
    pub fn load() -> ConfigResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Same as [`Environment::load`] with an explicit dotenv file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvironment` if `APP_ENV` contains an invalid value
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        dotenvy::from_path(path).ok();
        Self::from_env()
    }

    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvironment` if `APP_ENV` contains an invalid value
    pub fn from_env() -> ConfigResult<Self> {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(ConfigError::InvalidEnvironment(env)),
        }
    }

    /// Whether logs should be emitted as JSON lines
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Log filter directive, from `LOG_LEVEL` or the stage default
    #[must_use]
    pub fn log_filter(&self) -> String {
        env::var("LOG_LEVEL")
            .ok()
            .map(|val| val.trim().to_lowercase())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| match self {
                Self::Production | Self::Staging => "info".to_string(),
                Self::Development => "debug".to_string(),
            })
    }

    /// Base URL of the station provider API
    #[must_use]
    pub fn station_api_url(&self) -> String {
        env::var("STATION_API_URL").unwrap_or_else(|_| DEFAULT_STATION_API_URL.to_string())
    }

    /// Ceiling for the whole upstream request
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidNumber` if `STATION_API_TIMEOUT_SECS` is not a positive integer
    pub fn station_api_timeout(&self) -> ConfigResult<Duration> {
        secs_from_env("STATION_API_TIMEOUT_SECS", DEFAULT_STATION_API_TIMEOUT_SECS)
    }

    /// Ceiling for the snapshot upload
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidNumber` if `STORAGE_TIMEOUT_SECS` is not a positive integer
    pub fn storage_timeout(&self) -> ConfigResult<Duration> {
        secs_from_env("STORAGE_TIMEOUT_SECS", DEFAULT_STORAGE_TIMEOUT_SECS)
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub fn override_aws_endpoint_url(&self) -> Option<String> {
        env::var("AWS_ENDPOINT_URL").ok().or_else(|| match self {
            // Regular AWS endpoints for production and staging
            Self::Production | Self::Staging => None,
            // LocalStack endpoint for development
            Self::Development => Some(LOCALSTACK_ENDPOINT.to_string()),
        })
    }

    /// Static AWS credentials from `KEY_ID` and `KEY_SECRET`, when both are set
    #[must_use]
    pub fn static_credentials(&self) -> Option<Credentials> {
        let key_id = env::var("KEY_ID").ok().filter(|v| !v.is_empty())?;
        let key_secret = env::var("KEY_SECRET").ok().filter(|v| !v.is_empty())?;
        Some(Credentials::from_keys(key_id, key_secret, None))
    }

    /// AWS configuration with a single attempt per call and a bounded operation timeout
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidNumber` if the storage timeout is malformed
    pub async fn aws_config(&self) -> ConfigResult<aws_config::SdkConfig> {
        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(self.storage_timeout()?)
            .build();

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .retry_config(RetryConfig::disabled())
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            loader = loader.endpoint_url(endpoint_url);
        }

        if let Some(credentials) = self.static_credentials() {
            warn!("Using static AWS access keys instead of the default credential chain");
            loader = loader.credentials_provider(credentials);
        }

        Ok(loader.load().await)
    }

    /// AWS S3 service configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidNumber` if the storage timeout is malformed
    pub async fn s3_client_config(&self) -> ConfigResult<aws_sdk_s3::Config> {
        let aws_config = self.aws_config().await?;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // Override "force path style" to true for compatibility with LocalStack
        // https://github.com/awslabs/aws-sdk-rust/discussions/874
        if matches!(self, Self::Development) {
            builder.set_force_path_style(Some(true));
        }

        Ok(builder.build())
    }
}

fn secs_from_env(var: &'static str, default: u64) -> ConfigResult<Duration> {
    match env::var(var) {
        Ok(value) => match value.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(ConfigError::InvalidNumber { var, value }),
        },
        Err(_) => Ok(Duration::from_secs(default)),
    }
}
