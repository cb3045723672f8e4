use std::sync::Arc;

use {
    axum::{
        Json, Router,
        extract::{DefaultBodyLimit, State},
        response::IntoResponse,
        routing::get,
    },
    carevault_documents::DocumentVault,
    tower_http::{
        cors::{Any, CorsLayer},
        trace::TraceLayer,
    },
    tracing::info,
};

use crate::document_routes::{
    delete_document, download_document, document_metadata, list_documents, upload_document,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub vault: Arc<DocumentVault>,
    pub version: &'static str,
}

impl AppState {
    pub fn new(vault: Arc<DocumentVault>) -> Self {
        Self {
            vault,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

// ── Server startup ───────────────────────────────────────────────────────────

/// Build the router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // The vault enforces the exact limit; the route limit only stops the body
    // from being buffered in full.
    let body_limit = state.vault.max_document_bytes().saturating_add(1);

    let documents = Router::new()
        .route(
            "/api/patients/{owner_id}/documents",
            get(list_documents).post(upload_document),
        )
        .route(
            "/api/documents/{id}",
            get(download_document).delete(delete_document),
        )
        .route("/api/documents/{id}/metadata", get(document_metadata))
        .layer(DefaultBodyLimit::max(body_limit));

    Router::new()
        .route("/health", get(health_handler))
        .merge(documents)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind `bind:port` and serve until ctrl-c.
pub async fn start_server(bind: &str, port: u16, vault: Arc<DocumentVault>) -> anyhow::Result<()> {
    let app = build_app(AppState::new(vault));

    let listener = tokio::net::TcpListener::bind((bind, port)).await?;
    info!(addr = %listener.local_addr()?, "carevault listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("carevault stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.version,
    }))
}
