use std::collections::BTreeMap;

use {async_trait::async_trait, tokio::sync::RwLock};

use crate::{
    error::StoreError,
    store::RecordStore,
    types::{DocumentId, DocumentMetadata, EncryptedRecord, NewRecord, OwnerId},
};

#[derive(Default)]
struct Inner {
    last_id: DocumentId,
    records: BTreeMap<DocumentId, EncryptedRecord>,
}

/// In-process record store. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: RwLock<Inner>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Apply `f` to a stored record in place.
    ///
    /// Records are immutable through [`RecordStore`]; this exists so tests can
    /// simulate an attacker with write access to the storage layer.
    #[doc(hidden)]
    pub async fn tamper(&self, id: DocumentId, f: impl FnOnce(&mut EncryptedRecord)) -> bool {
        match self.inner.write().await.records.get_mut(&id) {
            Some(record) => {
                f(record);
                true
            },
            None => false,
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: NewRecord) -> Result<DocumentId, StoreError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let id = inner.last_id;
        inner.records.insert(id, record.into_record(id));
        Ok(id)
    }

    async fn get_by_id(&self, id: DocumentId) -> Result<Option<EncryptedRecord>, StoreError> {
        Ok(self.inner.read().await.records.get(&id).cloned())
    }

    async fn list_by_owner(
        &self,
        owner_id: OwnerId,
    ) -> Result<Vec<DocumentMetadata>, StoreError> {
        let inner = self.inner.read().await;
        let mut items: Vec<DocumentMetadata> = inner
            .records
            .values()
            .filter(|r| r.metadata.owner_id == owner_id)
            .map(|r| r.metadata.clone())
            .collect();
        items.sort_by(|a, b| {
            b.uploaded_at
                .cmp(&a.uploaded_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(items)
    }

    async fn delete(&self, id: DocumentId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.records.remove(&id).is_some())
    }
}
