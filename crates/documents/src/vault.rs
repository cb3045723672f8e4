//! Document vault: validate, seal, persist, and the reverse.

use std::{path::Path, sync::Arc};

use carevault_crypto::{AesGcmCipher, Cipher, CipherBox, CryptoError, EncryptionKey};

use crate::{
    error::{StoreError, VaultError},
    store::RecordStore,
    types::{DocumentId, DocumentMetadata, NewRecord, OwnerId, RetrievedDocument, StoreDocument},
};

/// Default upload limit: 25 MiB.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 25 * 1024 * 1024;

/// Encrypted document storage.
///
/// Generic over [`Cipher`] but defaults to [`AesGcmCipher`]. Holds no mutable
/// state, so one instance serves concurrent requests behind an `Arc`.
pub struct DocumentVault<C: Cipher = AesGcmCipher> {
    cipher: CipherBox<C>,
    store: Arc<dyn RecordStore>,
    max_document_bytes: usize,
}

impl DocumentVault<AesGcmCipher> {
    /// Create a vault with the default AES-256-GCM cipher.
    pub fn new(key: EncryptionKey, store: Arc<dyn RecordStore>) -> Self {
        Self::with_cipher_box(CipherBox::new(key), store)
    }
}

impl<C: Cipher> DocumentVault<C> {
    pub fn with_cipher_box(cipher: CipherBox<C>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            cipher,
            store,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }

    pub fn with_max_document_bytes(mut self, limit: usize) -> Self {
        self.max_document_bytes = limit;
        self
    }

    pub fn max_document_bytes(&self) -> usize {
        self.max_document_bytes
    }

    /// Encrypt and persist a document.
    ///
    /// All input is validated before any cryptographic work. The returned
    /// metadata never includes the sealed payload.
    pub async fn store(&self, request: StoreDocument) -> Result<DocumentMetadata, VaultError> {
        let StoreDocument {
            owner_id,
            filename,
            content_type,
            document_type,
            tags,
            bytes,
        } = request;

        if bytes.is_empty() {
            return Err(VaultError::EmptyDocument);
        }
        if bytes.len() > self.max_document_bytes {
            return Err(VaultError::DocumentTooLarge {
                size: bytes.len(),
                limit: self.max_document_bytes,
            });
        }
        let filename = sanitize_filename(&filename).ok_or(VaultError::MissingField("filename"))?;
        let content_type = required("content_type", &content_type)?;
        let document_type = required("document_type", &document_type)?;
        let tags = normalize_tags(tags);

        let sealed = self.cipher.encrypt(&bytes, &owner_aad(owner_id))?;
        let size_bytes = bytes.len() as u64;
        let uploaded_at = chrono::Utc::now().timestamp_millis();

        let record = NewRecord {
            owner_id,
            filename: filename.clone(),
            content_type: content_type.clone(),
            document_type: document_type.clone(),
            size_bytes,
            uploaded_at,
            tags: tags.clone(),
            cipher_version: self.cipher.version_tag(),
            sealed,
        };

        let id = self.store.insert(record).await.map_err(|e| {
            #[cfg(feature = "tracing")]
            tracing::warn!(owner_id, error = %e, "failed to persist document");
            VaultError::from(e)
        })?;

        #[cfg(feature = "tracing")]
        tracing::info!(id, owner_id, size_bytes, "document stored");

        Ok(DocumentMetadata {
            id,
            owner_id,
            filename,
            content_type,
            document_type,
            size_bytes,
            uploaded_at,
            tags,
        })
    }

    /// Load and decrypt a document.
    ///
    /// A record that fails authentication is reported as
    /// [`VaultError::DocumentCorrupted`], never as missing.
    pub async fn retrieve(&self, id: DocumentId) -> Result<RetrievedDocument, VaultError> {
        let record = match self.store.get_by_id(id).await {
            Ok(Some(record)) => record,
            Ok(None) => return Err(VaultError::NotFound(id)),
            Err(e @ StoreError::Corrupt { .. }) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(id, error = %e, "stored document has an undecodable field");
                return Err(e.into());
            },
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(id, error = %e, "failed to load document");
                return Err(e.into());
            },
        };

        let aad = owner_aad(record.metadata.owner_id);
        let bytes = self
            .cipher
            .decrypt_versioned(record.cipher_version, &record.sealed, &aad)
            .map_err(|e| match e {
                CryptoError::AuthenticationFailed
                | CryptoError::CorruptCiphertext(_)
                | CryptoError::InvalidNonceLength { .. }
                | CryptoError::UnsupportedCipherVersion(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(id, error = %e, "document failed authentication");
                    VaultError::DocumentCorrupted(id)
                },
                other => VaultError::Crypto(other),
            })?;

        #[cfg(feature = "tracing")]
        tracing::debug!(id, "document retrieved");

        Ok(RetrievedDocument {
            bytes,
            content_type: record.metadata.content_type,
            filename: record.metadata.filename,
        })
    }

    /// Metadata of every document owned by `owner_id`, newest first.
    ///
    /// One undecodable row fails the whole listing with
    /// [`VaultError::DocumentCorrupted`] naming that row.
    pub async fn list(&self, owner_id: OwnerId) -> Result<Vec<DocumentMetadata>, VaultError> {
        self.store.list_by_owner(owner_id).await.map_err(|e| {
            #[cfg(feature = "tracing")]
            tracing::warn!(owner_id, error = %e, "failed to list documents");
            VaultError::from(e)
        })
    }

    /// Metadata of a single document.
    pub async fn metadata(&self, id: DocumentId) -> Result<DocumentMetadata, VaultError> {
        match self.store.get_by_id(id).await? {
            Some(record) => Ok(record.metadata),
            None => Err(VaultError::NotFound(id)),
        }
    }

    /// Permanently remove a document.
    pub async fn delete(&self, id: DocumentId) -> Result<(), VaultError> {
        if !self.store.delete(id).await? {
            return Err(VaultError::NotFound(id));
        }

        #[cfg(feature = "tracing")]
        tracing::info!(id, "document deleted");

        Ok(())
    }
}

/// Associated data binding a ciphertext to its owner.
fn owner_aad(owner_id: OwnerId) -> Vec<u8> {
    format!("document:{owner_id}").into_bytes()
}

fn required(field: &'static str, value: &str) -> Result<String, VaultError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(VaultError::MissingField(field));
    }
    Ok(value.to_string())
}

/// Keep only the final path component of a client-supplied filename.
fn sanitize_filename(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();
    let name = Path::new(last).file_name()?.to_str()?.trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
