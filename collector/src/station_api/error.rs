//! Error types for the station API client

use thiserror::Error;

/// Result type for station API calls
pub type FetchResult<T> = Result<T, FetchError>;

/// Classified failures of a single upstream request
#[derive(Error, Debug, Clone, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum FetchError {
    /// The request did not complete within its timeout
    #[error("Station API request timed out")]
    Timeout,

    /// DNS, TCP or TLS failure before a response was received
    #[error("Station API connection failed: {0}")]
    ConnectionFailure(String),

    /// The provider refused the request (4xx), usually a bad key or contract
    #[error("Station API rejected the request with status {status}")]
    ClientRejected {
        /// HTTP status code
        status: u16,
    },

    /// The provider failed to serve the request (5xx)
    #[error("Station API unavailable, status {status}")]
    ServerUnavailable {
        /// HTTP status code
        status: u16,
    },

    /// A non-success status outside the 4xx and 5xx ranges
    #[error("Station API answered with unexpected status {status}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
    },

    /// The transport succeeded but the body is not a JSON array
    #[error("Invalid JSON response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    /// Classifies a non-success HTTP status
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            400..=499 => Self::ClientRejected { status },
            500..=599 => Self::ServerUnavailable { status },
            _ => Self::UnexpectedStatus { status },
        }
    }

    /// Stable, machine-readable name of the failure kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// HTTP status of the upstream response, when one was received
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ClientRejected { status }
            | Self::ServerUnavailable { status }
            | Self::UnexpectedStatus { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        // The request URL carries the API key in its query string
        let error = error.without_url();

        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::MalformedResponse(error.to_string())
        } else {
            Self::ConnectionFailure(error.to_string())
        }
    }
}
