mod error;

use std::time::{Duration, Instant};

use reqwest::{header, Client};
use tracing::{debug, info, warn};

pub use error::{FetchError, FetchResult};

use crate::dataset::StationDataset;
use crate::types::{Contract, Credential};

/// Path of the station listing endpoint
const STATIONS_PATH: &str = "/vls/v1/stations";
/// Upstream error bodies are logged up to this many characters
const ERROR_BODY_EXCERPT_CHARS: usize = 200;

/// Trait for the bike-sharing station provider
#[async_trait::async_trait]
pub trait StationApi: Send + Sync {
    /// Fetches the current status of every station in `contract`.
    /// Exactly one request is made; there is no retry.
    async fn fetch_stations(
        &self,
        contract: &Contract,
        credential: &Credential,
    ) -> FetchResult<StationDataset>;
}

/// HTTP client for the `JCDecaux` VLS API
pub struct JcDecauxClient {
    base_url: String,
    http_client: Client,
}

impl JcDecauxClient {
    /// Creates a new client
    ///
    /// # Arguments
    ///
    /// * `base_url` - Scheme and host of the API, e.g. `https://api.jcdecaux.com`
    /// * `timeout` - Ceiling for the whole request, body included
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialised
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn stations_url(&self) -> String {
        format!("{}{STATIONS_PATH}", self.base_url)
    }
}

#[async_trait::async_trait]
impl StationApi for JcDecauxClient {
    async fn fetch_stations(
        &self,
        contract: &Contract,
        credential: &Credential,
    ) -> FetchResult<StationDataset> {
        let endpoint = self.stations_url();
        info!(contract = %contract, endpoint = %endpoint, "Requesting station data");

        let started = Instant::now();
        let response = self
            .http_client
            .get(&endpoint)
            .query(&[
                ("contract", contract.as_str()),
                ("apiKey", credential.expose_secret()),
            ])
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            contract = %contract,
            status = status.as_u16(),
            elapsed_ms,
            "Station API response received"
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let excerpt: String = body.chars().take(ERROR_BODY_EXCERPT_CHARS).collect();
            warn!(
                contract = %contract,
                status = status.as_u16(),
                error_message = %excerpt,
                "Station API request failed"
            );
            return Err(FetchError::from_status(status.as_u16()));
        }

        let body = response.bytes().await?;
        let dataset = StationDataset::from_slice(&body)
            .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

        debug!(
            contract = %contract,
            station_count = dataset.record_count(),
            "Station payload parsed"
        );

        Ok(dataset)
    }
}
