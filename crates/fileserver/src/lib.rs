//! The remote file server.
//!
//! Both synthesis services front their storage with this HTTP contract:
//! multipart upload into a category bucket, download with a fallback
//! resolution strategy. The wire shapes (`filePath`, `originalName`,
//! `{success:false, error}`) are fixed for interoperability with existing
//! clients.

pub mod config;
pub mod error;
pub mod handlers;
pub mod resolve;
pub mod state;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the file server router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/file/upload", post(handlers::upload))
        .route("/file/download", get(handlers::download))
        .with_state(state)
}
