//! S3-backed snapshot store

use std::sync::Arc;

use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use tracing::{debug, error, info};

use crate::{SnapshotStore, StorageError, StorageResult, StorageTarget};

/// Snapshot store writing through the S3 `PutObject` API
pub struct S3SnapshotStore {
    s3_client: Arc<S3Client>,
}

impl S3SnapshotStore {
    /// Creates a new store from a pre-configured S3 client
    ///
    /// Timeouts and retry behaviour are taken from the client's configuration.
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>) -> Self {
        Self { s3_client }
    }
}

#[async_trait::async_trait]
impl SnapshotStore for S3SnapshotStore {
    async fn put_object(
        &self,
        target: &StorageTarget,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()> {
        let size_bytes = body.len();
        debug!(bucket = %target, key, size_bytes, "Uploading snapshot");

        let result = self
            .s3_client
            .put_object()
            .bucket(target.bucket())
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await;

        match result {
            Ok(_) => {
                info!(bucket = %target, key, size_bytes, "Snapshot uploaded");
                Ok(())
            }
            Err(e) => {
                let err = StorageError::from(e);
                error!(bucket = %target, key, kind = err.kind(), "S3 upload failed: {err}");
                Err(err)
            }
        }
    }
}
