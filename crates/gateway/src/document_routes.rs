//! Document endpoints.
//!
//! `POST /api/patients/{owner_id}/documents` accepts the raw document as the
//! request body. Descriptive fields travel in headers:
//! - `Content-Type`: media type of the document (required)
//! - `X-Filename`: original filename (required)
//! - `X-Document-Type`: document classification, e.g. `lab_result` (required)
//! - `X-Document-Tags`: comma-separated tags (optional)

use {
    axum::{
        Json,
        body::Bytes,
        extract::{Path, State, rejection::BytesRejection},
        http::{HeaderMap, HeaderValue, StatusCode, header},
        response::{IntoResponse, Response},
    },
    carevault_documents::{DocumentId, OwnerId, StoreDocument, VaultError},
    tracing::warn,
};

use crate::server::AppState;

pub const FILENAME_HEADER: &str = "x-filename";
pub const DOCUMENT_TYPE_HEADER: &str = "x-document-type";
pub const DOCUMENT_TAGS_HEADER: &str = "x-document-tags";

/// `POST /api/patients/{owner_id}/documents`
pub async fn upload_document(
    State(state): State<AppState>,
    Path(owner_id): Path<OwnerId>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let status = rejection.status();
            let code = if status == StatusCode::PAYLOAD_TOO_LARGE {
                "document_too_large"
            } else {
                "invalid_body"
            };
            return (
                status,
                Json(serde_json::json!({
                    "ok": false,
                    "error": rejection.body_text(),
                    "code": code,
                })),
            )
                .into_response();
        },
    };

    let request = StoreDocument::new(
        owner_id,
        header_str(&headers, FILENAME_HEADER),
        header_str(&headers, header::CONTENT_TYPE.as_str()),
        header_str(&headers, DOCUMENT_TYPE_HEADER),
        body.to_vec(),
    )
    .with_tags(header_str(&headers, DOCUMENT_TAGS_HEADER).split(','));

    match state.vault.store(request).await {
        Ok(metadata) => (StatusCode::CREATED, Json(metadata)).into_response(),
        Err(e) => vault_error_response(e),
    }
}

/// `GET /api/patients/{owner_id}/documents`
pub async fn list_documents(
    State(state): State<AppState>,
    Path(owner_id): Path<OwnerId>,
) -> Response {
    match state.vault.list(owner_id).await {
        Ok(documents) => Json(documents).into_response(),
        Err(e) => vault_error_response(e),
    }
}

/// `GET /api/documents/{id}`
///
/// Responds with the decrypted bytes as an attachment.
pub async fn download_document(
    State(state): State<AppState>,
    Path(id): Path<DocumentId>,
) -> Response {
    let document = match state.vault.retrieve(id).await {
        Ok(document) => document,
        Err(e) => return vault_error_response(e),
    };

    let content_type = HeaderValue::from_str(&document.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = HeaderValue::from_str(&content_disposition(&document.filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    (
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
            (
                header::X_CONTENT_TYPE_OPTIONS,
                HeaderValue::from_static("nosniff"),
            ),
        ],
        document.bytes,
    )
        .into_response()
}

/// `GET /api/documents/{id}/metadata`
pub async fn document_metadata(
    State(state): State<AppState>,
    Path(id): Path<DocumentId>,
) -> Response {
    match state.vault.metadata(id).await {
        Ok(metadata) => Json(metadata).into_response(),
        Err(e) => vault_error_response(e),
    }
}

/// `DELETE /api/documents/{id}`
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<DocumentId>,
) -> Response {
    match state.vault.delete(id).await {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(e) => vault_error_response(e),
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// `attachment; filename="..."` with quotes, backslashes and control
/// characters replaced.
fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("attachment; filename=\"{safe}\"")
}

pub(crate) fn status_for(err: &VaultError) -> StatusCode {
    match err {
        VaultError::EmptyDocument
        | VaultError::MissingField(_)
        | VaultError::InvalidRecord(_) => StatusCode::BAD_REQUEST,
        VaultError::DocumentTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        VaultError::NotFound(_) => StatusCode::NOT_FOUND,
        VaultError::DocumentCorrupted(_) => StatusCode::UNPROCESSABLE_ENTITY,
        VaultError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        VaultError::Crypto(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn vault_error_response(err: VaultError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        warn!(code = err.kind(), error = %err, "document request failed");
    }
    (
        status,
        Json(serde_json::json!({
            "ok": false,
            "error": err.to_string(),
            "code": err.kind(),
        })),
    )
        .into_response()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, carevault_crypto::CryptoError};

    #[test]
    fn disposition_quotes_filename() {
        assert_eq!(
            content_disposition("lab report.pdf"),
            "attachment; filename=\"lab report.pdf\""
        );
    }

    #[test]
    fn disposition_neutralizes_header_breakers() {
        assert_eq!(
            content_disposition("a\"b\\c\r\nd.pdf"),
            "attachment; filename=\"a_b_c__d.pdf\""
        );
    }

    #[test]
    fn error_status_mapping() {
        assert_eq!(status_for(&VaultError::EmptyDocument), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&VaultError::MissingField("filename")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&VaultError::DocumentTooLarge { size: 2, limit: 1 }),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            status_for(&VaultError::InvalidRecord("size".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_for(&VaultError::NotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&VaultError::DocumentCorrupted(1)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&VaultError::StorageUnavailable("down".into())),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            status_for(&VaultError::Crypto(CryptoError::EntropyUnavailable(
                "no rng".into()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
