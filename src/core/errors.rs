use std::path::PathBuf;

/// Error returned by a `ClusterApi` implementation.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error returned by an `ObjectStore` implementation.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// All failures of a backup run.
///
/// Every variant is fatal: the run stops at the first error and the
/// process exits non-zero. Artifacts already written stay on disk.
#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    #[error(
        "Invalid configuration: {detail}\n\n  \
         Provide either SECRET_NAME, or both LABEL_KEY and LABEL_VALUE,\n  \
         together with NAMESPACE, BUCKET_NAME, S3_FOLDER, S3_REGION,\n  \
         AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY and AGE_PUBLIC_KEY."
    )]
    ConfigInvalid { detail: String },

    #[error(
        "Cannot reach the Kubernetes API: {detail}\n\n  \
         This job must run inside a pod with a mounted service account token."
    )]
    ClusterUnavailable { detail: String },

    #[error("Cluster identity unavailable: {detail}")]
    IdentityUnavailable { detail: String },

    #[error("Cluster identity malformed: field '{field}' not found in {record}")]
    IdentityMalformed { record: String, field: String },

    #[error("Secret selection failed: {source}")]
    SelectionFailed {
        #[source]
        source: ApiError,
    },

    #[error("Unable to save secrets in {path}: {reason}")]
    SerializationFailed { path: PathBuf, reason: String },

    #[error(
        "Invalid age recipient key: {reason}\n\n  \
         AGE_PUBLIC_KEY must be an X25519 public key (age1...)."
    )]
    InvalidRecipientKey { reason: String },

    #[error("Cannot open {path} for encryption: {reason}")]
    EncryptionIoFailed { path: PathBuf, reason: String },

    #[error(
        "Encryption stream failed: {reason}\n\n  \
         The encrypted output is incomplete and must not be used."
    )]
    EncryptionStreamFailed { reason: String },

    #[error("Upload to s3://{bucket}/{key} failed: {source}")]
    UploadFailed {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BackupError>;
