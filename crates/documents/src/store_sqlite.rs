//! SQLite-backed record store.

use {async_trait::async_trait, carevault_crypto::SealedBox, sqlx::SqlitePool};

use crate::{
    codec,
    error::StoreError,
    store::RecordStore,
    types::{DocumentId, DocumentMetadata, EncryptedRecord, NewRecord, OwnerId},
};

/// SQLite-backed record store.
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the documents table schema.
    ///
    /// Production schema is managed by sqlx migrations
    /// ([`run_migrations`](crate::run_migrations)). This method is retained for
    /// tests that use in-memory databases.
    #[doc(hidden)]
    pub async fn init(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                owner_id       INTEGER NOT NULL,
                filename       TEXT    NOT NULL,
                content_type   TEXT    NOT NULL,
                document_type  TEXT    NOT NULL,
                size_bytes     INTEGER NOT NULL,
                tags           TEXT    NOT NULL DEFAULT '[]',
                cipher_version INTEGER NOT NULL,
                nonce          TEXT    NOT NULL,
                auth_tag       TEXT    NOT NULL,
                ciphertext     TEXT    NOT NULL,
                uploaded_at    INTEGER NOT NULL
            )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_documents_owner_uploaded
             ON documents (owner_id, uploaded_at DESC)",
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

/// Metadata columns only. Listing never reads the sealed payload.
#[derive(sqlx::FromRow)]
struct MetadataRow {
    id: i64,
    owner_id: i64,
    filename: String,
    content_type: String,
    document_type: String,
    size_bytes: i64,
    tags: String,
    uploaded_at: i64,
}

impl TryFrom<MetadataRow> for DocumentMetadata {
    type Error = StoreError;

    fn try_from(r: MetadataRow) -> Result<Self, Self::Error> {
        let tags = serde_json::from_str(&r.tags).map_err(|e| StoreError::Corrupt {
            id: r.id,
            field: "tags",
            reason: e.to_string(),
        })?;
        Ok(Self {
            id: r.id,
            owner_id: r.owner_id,
            filename: r.filename,
            content_type: r.content_type,
            document_type: r.document_type,
            size_bytes: r.size_bytes.max(0) as u64,
            uploaded_at: r.uploaded_at,
            tags,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    #[sqlx(flatten)]
    metadata: MetadataRow,
    cipher_version: i64,
    nonce: String,
    auth_tag: String,
    ciphertext: String,
}

fn decode_field(id: DocumentId, field: &'static str, text: &str) -> Result<Vec<u8>, StoreError> {
    codec::decode(text).map_err(|e| StoreError::Corrupt {
        id,
        field,
        reason: e.to_string(),
    })
}

impl TryFrom<RecordRow> for EncryptedRecord {
    type Error = StoreError;

    fn try_from(r: RecordRow) -> Result<Self, Self::Error> {
        let id = r.metadata.id;
        let cipher_version = u8::try_from(r.cipher_version).map_err(|e| StoreError::Corrupt {
            id,
            field: "cipher_version",
            reason: e.to_string(),
        })?;
        let sealed = SealedBox {
            ciphertext: decode_field(id, "ciphertext", &r.ciphertext)?,
            nonce: decode_field(id, "nonce", &r.nonce)?,
            tag: decode_field(id, "auth_tag", &r.auth_tag)?,
        };
        Ok(Self {
            metadata: r.metadata.try_into()?,
            cipher_version,
            sealed,
        })
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn insert(&self, record: NewRecord) -> Result<DocumentId, StoreError> {
        let tags = serde_json::to_string(&record.tags)?;
        let size_bytes = i64::try_from(record.size_bytes)
            .map_err(|e| StoreError::InvalidRecord(format!("size out of range: {e}")))?;

        let result = sqlx::query(
            "INSERT INTO documents
             (owner_id, filename, content_type, document_type, size_bytes, tags,
              cipher_version, nonce, auth_tag, ciphertext, uploaded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.owner_id)
        .bind(&record.filename)
        .bind(&record.content_type)
        .bind(&record.document_type)
        .bind(size_bytes)
        .bind(&tags)
        .bind(i64::from(record.cipher_version))
        .bind(codec::encode(&record.sealed.nonce))
        .bind(codec::encode(&record.sealed.tag))
        .bind(codec::encode(&record.sealed.ciphertext))
        .bind(record.uploaded_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn get_by_id(&self, id: DocumentId) -> Result<Option<EncryptedRecord>, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT id, owner_id, filename, content_type, document_type, size_bytes, tags,
                    uploaded_at, cipher_version, nonce, auth_tag, ciphertext
             FROM documents WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(EncryptedRecord::try_from).transpose()
    }

    async fn list_by_owner(
        &self,
        owner_id: OwnerId,
    ) -> Result<Vec<DocumentMetadata>, StoreError> {
        let rows = sqlx::query_as::<_, MetadataRow>(
            "SELECT id, owner_id, filename, content_type, document_type, size_bytes, tags,
                    uploaded_at
             FROM documents
             WHERE owner_id = ?
             ORDER BY uploaded_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DocumentMetadata::try_from).collect()
    }

    async fn delete(&self, id: DocumentId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
