//! Persistence contract consumed by the vault.

use async_trait::async_trait;

use crate::{
    error::StoreError,
    types::{DocumentId, DocumentMetadata, EncryptedRecord, NewRecord, OwnerId},
};

/// Storage backend for encrypted records.
///
/// Implementations must make `insert` atomic (the whole record or nothing)
/// and must never alter a record after it is written.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record and return its assigned id.
    async fn insert(&self, record: NewRecord) -> Result<DocumentId, StoreError>;

    /// Load one record, including its sealed payload.
    async fn get_by_id(&self, id: DocumentId) -> Result<Option<EncryptedRecord>, StoreError>;

    /// Metadata of every record owned by `owner_id`, newest first.
    async fn list_by_owner(&self, owner_id: OwnerId)
    -> Result<Vec<DocumentMetadata>, StoreError>;

    /// Remove a record. Returns `false` if it did not exist.
    async fn delete(&self, id: DocumentId) -> Result<bool, StoreError>;
}
