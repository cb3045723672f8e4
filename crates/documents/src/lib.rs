//! Encrypted document storage for patient uploads.
//!
//! [`DocumentVault`] accepts plaintext documents, seals them with a
//! [`CipherBox`](carevault_crypto::CipherBox) and persists the ciphertext,
//! nonce and tag through a [`RecordStore`]. Callers only ever see plaintext
//! and non-confidential metadata.

pub mod codec;
pub mod error;
pub mod store;
pub mod store_memory;
pub mod store_sqlite;
pub mod types;
pub mod vault;

pub use {
    error::{StoreError, VaultError},
    store::RecordStore,
    store_memory::MemoryRecordStore,
    store_sqlite::SqliteRecordStore,
    types::{
        DocumentId, DocumentMetadata, EncryptedRecord, NewRecord, OwnerId, RetrievedDocument,
        StoreDocument,
    },
    vault::{DEFAULT_MAX_DOCUMENT_BYTES, DocumentVault},
};

/// Run database migrations for the documents crate.
///
/// Creates the `documents` table. Should be called at application startup
/// before the vault serves any request.
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .set_ignore_missing(true)
        .run(pool)
        .await?;
    Ok(())
}
