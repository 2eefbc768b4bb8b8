//! In-memory snapshot store for tests

use std::collections::BTreeMap;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex, PoisonError,
};
use std::time::Duration;

use crate::{SnapshotStore, StorageError, StorageResult, StorageTarget};

/// An object captured by [`MemoryStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object body exactly as written
    pub body: Vec<u8>,
    /// Declared content type
    pub content_type: String,
}

/// Snapshot store that keeps objects in memory and counts every put
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), StoredObject>>,
    put_calls: AtomicUsize,
    failure: Option<StorageError>,
    delay: Option<Duration>,
}

impl MemoryStore {
    /// Creates an empty store that accepts every write
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects every write with `error`
    #[must_use]
    pub fn failing_with(error: StorageError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Makes every put wait `delay` before completing
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of put calls received, successful or not
    #[must_use]
    pub fn put_count(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    /// Returns the object stored at `key` in `target`, if any
    #[must_use]
    pub fn object(&self, target: &StorageTarget, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(target.bucket().to_string(), key.to_string()))
            .cloned()
    }

    /// All stored keys in lexical order, across buckets
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .map(|(_, key)| key.clone())
            .collect()
    }
}

#[async_trait::async_trait]
impl SnapshotStore for MemoryStore {
    async fn put_object(
        &self,
        target: &StorageTarget,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                (target.bucket().to_string(), key.to_string()),
                StoredObject {
                    body,
                    content_type: content_type.to_string(),
                },
            );
        Ok(())
    }
}
