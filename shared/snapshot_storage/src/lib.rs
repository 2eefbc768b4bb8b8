//! Object storage for station snapshots
//!
//! This crate provides the storage seam used by the collector: a
//! [`SnapshotStore`] trait, the S3-backed implementation and, behind the
//! `test-utils` feature, an in-memory store for tests.

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

mod error;
#[cfg(feature = "test-utils")]
mod memory;
mod s3;

use std::fmt;

pub use error::{classify_rejection, StorageError, StorageResult};
#[cfg(feature = "test-utils")]
pub use memory::{MemoryStore, StoredObject};
pub use s3::S3SnapshotStore;

/// Content type declared on every snapshot object
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Destination bucket for snapshots
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageTarget {
    bucket: String,
}

impl StorageTarget {
    /// Creates a target for the given bucket name
    ///
    /// Returns `None` when the name is empty or only whitespace.
    #[must_use]
    pub fn new(bucket: impl Into<String>) -> Option<Self> {
        let bucket = bucket.into().trim().to_string();
        if bucket.is_empty() {
            None
        } else {
            Some(Self { bucket })
        }
    }

    /// Bucket name
    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

impl fmt::Display for StorageTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.bucket)
    }
}

/// A store that accepts whole objects in a single atomic put
#[async_trait::async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Writes `body` to `key` in `target`, replacing nothing and reading nothing.
    ///
    /// # Errors
    ///
    /// Returns a classified [`StorageError`] when the store does not
    /// acknowledge the write. A failed call leaves no object behind.
    async fn put_object(
        &self,
        target: &StorageTarget,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()>;
}
