//! Error types for snapshot storage operations

use aws_sdk_s3::{
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    operation::put_object::PutObjectError,
};
use thiserror::Error;

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while writing a snapshot to the object store
#[derive(Error, Debug, Clone, PartialEq, Eq, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum StorageError {
    /// The store refused the caller's credentials or policy
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The target bucket does not exist
    #[error("Storage target not found: {0}")]
    TargetMissing(String),

    /// The store could not be reached or answered with a 5xx
    #[error("Storage temporarily unavailable: {0}")]
    TransientUnavailable(String),

    /// The dataset could not be encoded into the object body
    #[error("Failed to serialize snapshot: {0}")]
    SerializationFailure(String),

    /// Any other rejection by the store
    #[error("Storage rejected the write: {0}")]
    Rejected(String),
}

impl StorageError {
    /// Stable, machine-readable name of the failure kind
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Whether a later invocation could reasonably succeed without operator action
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::TransientUnavailable(_))
    }
}

/// Maps an S3 error code and HTTP status onto a storage failure kind.
///
/// Error codes take precedence over the status so that, for example, a
/// `RequestTimeout` (reported as 400) is still treated as transient.
#[must_use]
pub fn classify_rejection(code: Option<&str>, status: u16, message: String) -> StorageError {
    match code {
        Some(
            "AccessDenied" | "AllAccessDisabled" | "InvalidAccessKeyId"
            | "SignatureDoesNotMatch" | "ExpiredToken" | "InvalidToken",
        ) => return StorageError::AccessDenied(message),
        Some("NoSuchBucket") => return StorageError::TargetMissing(message),
        Some("SlowDown" | "ServiceUnavailable" | "InternalError" | "RequestTimeout") => {
            return StorageError::TransientUnavailable(message)
        }
        _ => {}
    }

    match status {
        401 | 403 => StorageError::AccessDenied(message),
        404 => StorageError::TargetMissing(message),
        500..=599 => StorageError::TransientUnavailable(message),
        _ => StorageError::Rejected(message),
    }
}

impl From<SdkError<PutObjectError>> for StorageError {
    fn from(error: SdkError<PutObjectError>) -> Self {
        match &error {
            SdkError::ServiceError(service_err) => classify_rejection(
                service_err.err().code(),
                service_err.raw().status().as_u16(),
                DisplayErrorContext(&error).to_string(),
            ),
            SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
                Self::TransientUnavailable(DisplayErrorContext(&error).to_string())
            }
            _ => Self::Rejected(DisplayErrorContext(&error).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use aws_sdk_s3::config::http::HttpResponse;
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_smithy_runtime_api::http::StatusCode;
    use aws_smithy_types::body::SdkBody;

    use super::*;

    #[test]
    fn test_error_codes_take_precedence_over_status() {
        assert_eq!(
            classify_rejection(Some("AccessDenied"), 400, "denied".to_string()),
            StorageError::AccessDenied("denied".to_string())
        );
        assert_eq!(
            classify_rejection(Some("NoSuchBucket"), 400, "gone".to_string()),
            StorageError::TargetMissing("gone".to_string())
        );
        assert_eq!(
            classify_rejection(Some("RequestTimeout"), 400, "slow".to_string()),
            StorageError::TransientUnavailable("slow".to_string())
        );
    }

    #[test]
    fn test_status_fallback_without_known_code() {
        assert!(matches!(
            classify_rejection(None, 403, String::new()),
            StorageError::AccessDenied(_)
        ));
        assert!(matches!(
            classify_rejection(Some("Unknown"), 404, String::new()),
            StorageError::TargetMissing(_)
        ));
        assert!(matches!(
            classify_rejection(None, 503, String::new()),
            StorageError::TransientUnavailable(_)
        ));
        assert!(matches!(
            classify_rejection(Some("InvalidRequest"), 400, String::new()),
            StorageError::Rejected(_)
        ));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(StorageError::AccessDenied(String::new()).kind(), "access_denied");
        assert_eq!(StorageError::TargetMissing(String::new()).kind(), "target_missing");
        assert_eq!(
            StorageError::TransientUnavailable(String::new()).kind(),
            "transient_unavailable"
        );
        assert_eq!(
            StorageError::SerializationFailure(String::new()).kind(),
            "serialization_failure"
        );
        assert_eq!(StorageError::Rejected(String::new()).kind(), "rejected");
    }

    fn service_error(code: &str, status: u16) -> SdkError<PutObjectError> {
        let metadata = ErrorMetadata::builder()
            .code(code)
            .message("rejected by the store")
            .build();
        let raw = HttpResponse::new(StatusCode::try_from(status).unwrap(), SdkBody::empty());
        SdkError::service_error(PutObjectError::generic(metadata), raw)
    }

    #[test]
    fn test_sdk_timeout_is_transient() {
        let err = StorageError::from(SdkError::<PutObjectError>::timeout_error(
            "operation timed out",
        ));
        assert_eq!(err.kind(), "transient_unavailable");
        assert!(err.is_transient());
    }

    #[test]
    fn test_sdk_construction_failure_is_rejected() {
        let err = StorageError::from(SdkError::<PutObjectError>::construction_failure(
            "bucket must not be empty",
        ));
        assert_eq!(err.kind(), "rejected");
    }

    #[test]
    fn test_sdk_service_errors_use_code_and_status() {
        assert_eq!(
            StorageError::from(service_error("NoSuchBucket", 404)).kind(),
            "target_missing"
        );
        assert_eq!(
            StorageError::from(service_error("AccessDenied", 403)).kind(),
            "access_denied"
        );
        assert_eq!(
            StorageError::from(service_error("SlowDown", 503)).kind(),
            "transient_unavailable"
        );
        assert_eq!(
            StorageError::from(service_error("InvalidRequest", 400)).kind(),
            "rejected"
        );
    }

    #[test]
    fn test_sdk_service_error_message_keeps_code() {
        let err = StorageError::from(service_error("NoSuchBucket", 404));
        assert!(err.to_string().contains("NoSuchBucket"), "{err}");
    }

    #[test]
    fn test_only_unavailability_is_transient() {
        assert!(StorageError::TransientUnavailable(String::new()).is_transient());
        assert!(!StorageError::AccessDenied(String::new()).is_transient());
        assert!(!StorageError::TargetMissing(String::new()).is_transient());
    }
}
