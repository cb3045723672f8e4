//! Document storage error types.

use carevault_crypto::CryptoError;

use crate::types::DocumentId;

/// Errors raised by a [`RecordStore`](crate::store::RecordStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A persisted field could not be decoded.
    #[error("record {id} has a corrupt {field}: {reason}")]
    Corrupt {
        id: DocumentId,
        field: &'static str,
        reason: String,
    },

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The backend cannot serve requests right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The record cannot be represented by this backend.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

/// Errors produced by [`DocumentVault`](crate::vault::DocumentVault) operations.
///
/// Cipher failures on retrieval are translated into [`DocumentCorrupted`]
/// so callers reason about documents, not cipher internals.
///
/// [`DocumentCorrupted`]: VaultError::DocumentCorrupted
#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    /// Uploads must contain at least one byte.
    #[error("document is empty")]
    EmptyDocument,

    /// A required descriptive field was absent or blank.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The upload exceeds the configured size limit.
    #[error("document is {size} bytes, limit is {limit} bytes")]
    DocumentTooLarge { size: usize, limit: usize },

    /// No document exists with this id.
    #[error("document {0} not found")]
    NotFound(DocumentId),

    /// The stored document failed authentication: tampered data or a changed key.
    #[error("document {0} is corrupted or was encrypted with a different key")]
    DocumentCorrupted(DocumentId),

    /// The persistence backend failed. Safe to retry with backoff.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The store refused the record as written.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Encryption failed before anything was persisted.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl VaultError {
    /// Stable machine-readable identifier for API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::EmptyDocument => "empty_document",
            Self::MissingField(_) => "missing_field",
            Self::DocumentTooLarge { .. } => "document_too_large",
            Self::NotFound(_) => "not_found",
            Self::DocumentCorrupted(_) => "document_corrupted",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::InvalidRecord(_) => "invalid_record",
            Self::Crypto(_) => "crypto_error",
        }
    }

    /// Whether a caller may retry the same request later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

/// Undecodable rows become [`VaultError::DocumentCorrupted`]; only backend
/// failures become [`VaultError::StorageUnavailable`].
impl From<StoreError> for VaultError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Corrupt { id, .. } => Self::DocumentCorrupted(id),
            StoreError::InvalidRecord(reason) => Self::InvalidRecord(reason),
            other => Self::StorageUnavailable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_row_is_not_transient() {
        let err = VaultError::from(StoreError::Corrupt {
            id: 4,
            field: "tags",
            reason: "expected value".into(),
        });
        assert!(matches!(err, VaultError::DocumentCorrupted(4)));
        assert!(!err.is_transient());
    }

    #[test]
    fn rejected_record_is_not_transient() {
        let err = VaultError::from(StoreError::InvalidRecord("size out of range".into()));
        assert_eq!(err.kind(), "invalid_record");
        assert!(!err.is_transient());
    }

    #[test]
    fn backend_failure_is_transient() {
        let err = VaultError::from(StoreError::Unavailable("pool closed".into()));
        assert!(matches!(err, VaultError::StorageUnavailable(_)));
        assert!(err.is_transient());
    }
}
