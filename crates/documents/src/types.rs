//! Document records and request/response shapes.

use {
    carevault_crypto::SealedBox,
    serde::{Deserialize, Serialize},
};

/// Identifier assigned by the record store on insert.
pub type DocumentId = i64;

/// Opaque patient identifier supplied by the caller.
///
/// Its authenticity is established by the identity layer in front of the
/// vault, never by the vault itself.
pub type OwnerId = i64;

/// Upload request: everything needed to store one document.
#[derive(Clone)]
pub struct StoreDocument {
    pub owner_id: OwnerId,
    pub filename: String,
    pub content_type: String,
    pub document_type: String,
    pub tags: Vec<String>,
    pub bytes: Vec<u8>,
}

impl StoreDocument {
    pub fn new(
        owner_id: OwnerId,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        document_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            owner_id,
            filename: filename.into(),
            content_type: content_type.into(),
            document_type: document_type.into(),
            tags: Vec::new(),
            bytes,
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

impl std::fmt::Debug for StoreDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreDocument")
            .field("owner_id", &self.owner_id)
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("document_type", &self.document_type)
            .field("tags", &self.tags)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Non-confidential description of a stored document.
///
/// This is the only view of a record that leaves the vault on `store` and
/// `list`; it carries no ciphertext, nonce or tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub id: DocumentId,
    pub owner_id: OwnerId,
    pub filename: String,
    pub content_type: String,
    pub document_type: String,
    /// Plaintext size in bytes.
    pub size_bytes: u64,
    /// Unix epoch milliseconds.
    pub uploaded_at: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// A record about to be inserted; the store assigns its id.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub owner_id: OwnerId,
    pub filename: String,
    pub content_type: String,
    pub document_type: String,
    pub size_bytes: u64,
    pub uploaded_at: i64,
    pub tags: Vec<String>,
    pub cipher_version: u8,
    pub sealed: SealedBox,
}

impl NewRecord {
    /// Attach the store-assigned id.
    pub fn into_record(self, id: DocumentId) -> EncryptedRecord {
        EncryptedRecord {
            metadata: DocumentMetadata {
                id,
                owner_id: self.owner_id,
                filename: self.filename,
                content_type: self.content_type,
                document_type: self.document_type,
                size_bytes: self.size_bytes,
                uploaded_at: self.uploaded_at,
                tags: self.tags,
            },
            cipher_version: self.cipher_version,
            sealed: self.sealed,
        }
    }
}

/// The persisted form of one document. Immutable once written.
#[derive(Debug, Clone)]
pub struct EncryptedRecord {
    pub metadata: DocumentMetadata,
    pub cipher_version: u8,
    pub sealed: SealedBox,
}

/// Decrypted document plus what a transport needs to deliver it.
pub struct RetrievedDocument {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub filename: String,
}

impl std::fmt::Debug for RetrievedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievedDocument")
            .field("content_type", &self.content_type)
            .field("filename", &self.filename)
            .field("len", &self.bytes.len())
            .finish()
    }
}
