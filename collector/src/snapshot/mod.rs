//! Snapshot serialization and upload
mod key;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use snapshot_storage::{
    SnapshotStore, StorageError, StorageResult, StorageTarget, JSON_CONTENT_TYPE,
};
use tracing::debug;

pub use key::SnapshotKey;

use crate::{clock::Clock, dataset::StationDataset, types::Contract};

/// A snapshot the store acknowledged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSnapshot {
    /// Key the snapshot was written to
    pub key: SnapshotKey,
    /// Instant the key was derived from
    pub captured_at: DateTime<Utc>,
    /// Size of the object body
    pub size_bytes: usize,
}

/// Writes datasets to the object store under time-derived keys
pub struct SnapshotWriter {
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    timeout: Duration,
}

impl SnapshotWriter {
    /// Creates a new snapshot writer
    ///
    /// # Arguments
    ///
    /// * `store` - Object store receiving the snapshots
    /// * `clock` - Time source for key derivation
    /// * `timeout` - Ceiling for a single upload
    #[must_use]
    pub fn new(store: Arc<dyn SnapshotStore>, clock: Arc<dyn Clock>, timeout: Duration) -> Self {
        Self {
            store,
            clock,
            timeout,
        }
    }

    /// Serializes `dataset` and puts it once to `target`
    ///
    /// # Errors
    ///
    /// Returns `StorageError::SerializationFailure` if the dataset cannot be encoded,
    /// `StorageError::TransientUnavailable` if the upload exceeds the timeout, and
    /// the store's classified error otherwise
    pub async fn write(
        &self,
        dataset: &StationDataset,
        contract: &Contract,
        target: &StorageTarget,
    ) -> StorageResult<StoredSnapshot> {
        let captured_at = self.clock.now();
        let key = SnapshotKey::new(contract, captured_at);

        let body = dataset
            .to_json_bytes()
            .map_err(|e| StorageError::SerializationFailure(e.to_string()))?;
        let size_bytes = body.len();

        debug!(bucket = %target, key = %key, size_bytes, "Writing snapshot");

        let upload = self
            .store
            .put_object(target, key.as_str(), body, JSON_CONTENT_TYPE);

        match tokio::time::timeout(self.timeout, upload).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(StorageError::TransientUnavailable(format!(
                    "upload did not complete within {}ms",
                    self.timeout.as_millis()
                )))
            }
        }

        Ok(StoredSnapshot {
            key,
            captured_at,
            size_bytes,
        })
    }
}
