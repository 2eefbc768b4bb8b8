use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use collector::{
    clock::FixedClock, handler::Collector, snapshot::SnapshotWriter, station_api::JcDecauxClient,
    types::RunConfig,
};
use serde_json::{json, Value};
use snapshot_storage::{MemoryStore, StorageTarget};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_CONTRACT: &str = "paris";
pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_BUCKET: &str = "test-bucket";
pub const STATIONS_PATH: &str = "/vls/v1/stations";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init()
        .ok();
}

/// Instant every test clock is frozen at
pub fn test_instant() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 14, 8, 15, 0).unwrap()
}

/// `count` station records in the provider's format
pub fn sample_stations(count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|n| {
                json!({
                    "number": 123 + n,
                    "contract_name": TEST_CONTRACT,
                    "name": format!("Test Station {n}"),
                    "address": "123 Test Street",
                    "position": { "lat": 48.8566, "lng": 2.3522 },
                    "banking": true,
                    "bonus": false,
                    "status": "OPEN",
                    "bike_stands": 20,
                    "available_bike_stands": 10,
                    "available_bikes": 10,
                    "last_update": 1_617_282_000_000_u64
                })
            })
            .collect(),
    )
}

pub fn test_target() -> StorageTarget {
    StorageTarget::new(TEST_BUCKET).unwrap()
}

pub fn valid_config() -> RunConfig {
    RunConfig::new(TEST_CONTRACT, TEST_API_KEY, TEST_BUCKET)
}

/// Mounts a stations endpoint answering `response`, expecting `calls` requests
pub async fn mount_stations(server: &MockServer, response: ResponseTemplate, calls: u64) {
    Mock::given(method("GET"))
        .and(path(STATIONS_PATH))
        .and(query_param("contract", TEST_CONTRACT))
        .and(query_param("apiKey", TEST_API_KEY))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

/// Stubbed upstream, in-memory store and a collector wired to both
pub struct TestContext {
    pub server: MockServer,
    pub store: Arc<MemoryStore>,
    pub collector: Collector,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_store(MemoryStore::new()).await
    }

    pub async fn with_store(store: MemoryStore) -> Self {
        Self::with_store_and_clock(store, test_instant()).await
    }

    pub async fn with_store_and_clock(store: MemoryStore, at: DateTime<Utc>) -> Self {
        setup_test_env();

        let server = MockServer::start().await;
        let store = Arc::new(store);

        let station_api =
            Arc::new(JcDecauxClient::new(server.uri(), Duration::from_secs(2)).unwrap());
        let writer = SnapshotWriter::new(
            store.clone(),
            Arc::new(FixedClock::new(at)),
            Duration::from_secs(2),
        );

        Self {
            server,
            store,
            collector: Collector::new(station_api, writer),
        }
    }
}
