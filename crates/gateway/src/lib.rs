//! HTTP surface for the document vault.
//!
//! Thin axum routes over [`DocumentVault`](carevault_documents::DocumentVault):
//! uploads arrive as raw bodies with descriptive headers, downloads return the
//! decrypted bytes. Authentication is handled upstream.

pub mod document_routes;
pub mod server;

pub use server::{AppState, build_app, start_server};
