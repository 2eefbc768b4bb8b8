//! Invocation entry point: validate, fetch, write, report

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snapshot_storage::StorageError;
use tracing::{error, info, info_span, warn, Instrument};

use crate::snapshot::{SnapshotKey, SnapshotWriter};
use crate::station_api::{FetchError, StationApi};
use crate::types::{ConfigError, RunConfig};

/// Pipeline stage a failure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Configuration validation
    Config,
    /// Upstream request
    Fetch,
    /// Snapshot upload
    Write,
}

/// Terminal outcome of one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Configuration was missing or invalid; nothing was called
    ConfigError(ConfigError),
    /// The upstream request failed; nothing was written
    FetchError(FetchError),
    /// The dataset was fetched but the store did not acknowledge it
    WriteError(StorageError),
    /// The snapshot was stored
    Success {
        /// Key of the stored snapshot
        key: SnapshotKey,
        /// Number of station records in the snapshot
        record_count: usize,
        /// Instant the key was derived from
        captured_at: DateTime<Utc>,
    },
}

impl Outcome {
    /// Whether the snapshot was stored
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Failing phase, `None` on success
    #[must_use]
    pub const fn phase(&self) -> Option<Phase> {
        match self {
            Self::ConfigError(_) => Some(Phase::Config),
            Self::FetchError(_) => Some(Phase::Fetch),
            Self::WriteError(_) => Some(Phase::Write),
            Self::Success { .. } => None,
        }
    }

    /// Machine-readable outcome kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigError(e) => e.kind(),
            Self::FetchError(e) => e.kind(),
            Self::WriteError(e) => e.kind(),
            Self::Success { .. } => "success",
        }
    }

    /// HTTP-style status code reported to the scheduler
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Success { .. } => 200,
            Self::FetchError(FetchError::Timeout) => 504,
            Self::FetchError(
                FetchError::ClientRejected { status }
                | FetchError::ServerUnavailable { status }
                | FetchError::UnexpectedStatus { status },
            ) => *status,
            Self::FetchError(FetchError::ConnectionFailure(_) | FetchError::MalformedResponse(_)) => {
                502
            }
            Self::WriteError(StorageError::TransientUnavailable(_)) => 503,
            Self::ConfigError(_) | Self::WriteError(_) => 500,
        }
    }
}

/// Scheduler event envelope. Every field is optional and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvocationEvent {
    /// Event source, e.g. `aws.events`
    pub source: Option<String>,
    /// Event id assigned by the scheduler
    pub id: Option<String>,
    /// Scheduled time
    pub time: Option<DateTime<Utc>>,
}

/// Runtime information about the current invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    /// Identifier attached to every log line of the invocation
    pub request_id: String,
}

impl InvocationContext {
    /// Creates a context with the given request id
    #[must_use]
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
        }
    }

    /// Creates a context with a random request id
    #[must_use]
    pub fn generate() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Whether the invocation succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    /// Snapshot stored
    Success,
    /// Any failure
    Error,
}

/// Details of a stored snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    /// Number of stations stored
    pub station_count: usize,
    /// Object key
    pub snapshot_key: String,
    /// Capture time
    pub timestamp: DateTime<Utc>,
}

/// Body of the invocation response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    /// Success or error
    pub status: ResponseStatus,
    /// Human-readable summary
    pub message: String,
    /// Failing phase
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Phase>,
    /// Failure kind, e.g. `client_rejected`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Present on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SnapshotMetadata>,
}

/// Structured result returned to the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    /// HTTP-style status code
    pub status_code: u16,
    /// Response body
    pub body: ResponseBody,
}

impl InvocationResponse {
    /// Whether the invocation stored a snapshot
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.body.status == ResponseStatus::Success
    }
}

impl From<&Outcome> for InvocationResponse {
    fn from(outcome: &Outcome) -> Self {
        let body = match outcome {
            Outcome::Success {
                key,
                record_count,
                captured_at,
            } => ResponseBody {
                status: ResponseStatus::Success,
                message: format!("Stored {record_count} stations at {key}"),
                phase: None,
                kind: None,
                metadata: Some(SnapshotMetadata {
                    station_count: *record_count,
                    snapshot_key: key.to_string(),
                    timestamp: *captured_at,
                }),
            },
            Outcome::ConfigError(e) => error_body(outcome, e.to_string()),
            Outcome::FetchError(e) => error_body(outcome, e.to_string()),
            Outcome::WriteError(e) => error_body(outcome, e.to_string()),
        };

        Self {
            status_code: outcome.status_code(),
            body,
        }
    }
}

fn error_body(outcome: &Outcome, message: String) -> ResponseBody {
    ResponseBody {
        status: ResponseStatus::Error,
        message,
        phase: outcome.phase(),
        kind: Some(outcome.kind().to_string()),
        metadata: None,
    }
}

/// Checks `config` before any client is built and reports a failure as the
/// response to return
///
/// # Errors
///
/// Returns the `ConfigError` response if the configuration is missing or invalid
pub fn preflight(config: &RunConfig) -> Result<(), InvocationResponse> {
    config.validate().map(|_| ()).map_err(|e| {
        error!(kind = e.kind(), "Configuration error: {e}");
        InvocationResponse::from(&Outcome::ConfigError(e))
    })
}

/// Fetch-validate-persist pipeline for one contract
pub struct Collector {
    station_api: Arc<dyn StationApi>,
    writer: SnapshotWriter,
}

impl Collector {
    /// Creates a collector from its collaborators
    #[must_use]
    pub fn new(station_api: Arc<dyn StationApi>, writer: SnapshotWriter) -> Self {
        Self {
            station_api,
            writer,
        }
    }

    /// Runs the pipeline once and returns its terminal outcome
    pub async fn run(&self, config: &RunConfig) -> Outcome {
        let validated = match config.validate() {
            Ok(validated) => validated,
            Err(e) => {
                error!(kind = e.kind(), "Configuration error: {e}");
                return Outcome::ConfigError(e);
            }
        };

        let dataset = match self
            .station_api
            .fetch_stations(&validated.contract, &validated.credential)
            .await
        {
            Ok(dataset) => dataset,
            Err(e) => {
                error!(
                    contract = %validated.contract,
                    kind = e.kind(),
                    status = e.status(),
                    "Failed to fetch station data: {e}"
                );
                return Outcome::FetchError(e);
            }
        };

        let record_count = dataset.record_count();
        info!(
            contract = %validated.contract,
            station_count = record_count,
            "Successfully retrieved station data"
        );
        if dataset.is_empty() {
            warn!(contract = %validated.contract, "Provider returned no stations, storing an empty snapshot");
        }

        match self
            .writer
            .write(&dataset, &validated.contract, &validated.target)
            .await
        {
            Ok(stored) => {
                info!(
                    bucket = %validated.target,
                    snapshot_key = %stored.key,
                    station_count = record_count,
                    size_bytes = stored.size_bytes,
                    "Snapshot stored"
                );
                Outcome::Success {
                    key: stored.key,
                    record_count,
                    captured_at: stored.captured_at,
                }
            }
            Err(e) => {
                error!(
                    bucket = %validated.target,
                    kind = e.kind(),
                    transient = e.is_transient(),
                    "Failed to store snapshot: {e}"
                );
                Outcome::WriteError(e)
            }
        }
    }

    /// Entry point for one scheduled invocation
    pub async fn handle(
        &self,
        config: &RunConfig,
        event: &InvocationEvent,
        context: &InvocationContext,
    ) -> InvocationResponse {
        let span = info_span!(
            "invocation",
            request_id = %context.request_id,
            event_source = event.source.as_deref().unwrap_or("unknown"),
            event_id = event.id.as_deref().unwrap_or("none"),
        );

        async {
            info!(scheduled_time = ?event.time, "Invocation started");
            let outcome = self.run(config).await;
            let response = InvocationResponse::from(&outcome);
            info!(
                status_code = response.status_code,
                outcome = outcome.kind(),
                "Invocation finished"
            );
            response
        }
        .instrument(span)
        .await
    }
}
