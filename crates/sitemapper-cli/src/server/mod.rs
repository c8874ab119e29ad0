//! HTTP service exposing extraction and archiving.
//!
//! | Route | Method | Success |
//! |-------|--------|---------|
//! | `/extract` | `POST {"url": ...}` | `200 {"success": true, "count": N, "urls": [...]}` |
//! | `/archive` | `POST {"urls": [...]}` | `200` zip attachment `sitemap_urls.zip` |
//! | `/health` | `GET` | `200 {"status": "ok", "version": ...}` |
//!
//! Any other method on these routes gets `405 {"error": "Method not allowed"}`.
//! Request bodies larger than `server.max_request_bytes` get `413`.
//! Each request builds its own walk state; nothing is shared between requests
//! except the HTTP client pool.

pub mod error;
mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use sitemapper_core::{ArchiveBuilder, Config, SitemapExtractor};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    extractor: Arc<SitemapExtractor>,
    archiver: Arc<ArchiveBuilder>,
    max_request_bytes: usize,
}

impl AppState {
    /// Build handler state from resolved configuration.
    pub fn from_config(config: &Config) -> sitemapper_core::Result<Self> {
        Ok(Self {
            extractor: Arc::new(SitemapExtractor::with_config(config)?),
            archiver: Arc::new(ArchiveBuilder::from_config(&config.archive)),
            max_request_bytes: config.server.max_request_bytes,
        })
    }
}

/// Build the service router.
pub fn router(state: AppState) -> Router {
    let body_limit = DefaultBodyLimit::max(state.max_request_bytes);
    Router::new()
        .route(
            "/extract",
            post(routes::extract).fallback(routes::method_not_allowed),
        )
        .route(
            "/archive",
            post(routes::archive).fallback(routes::method_not_allowed),
        )
        .route(
            "/health",
            get(routes::health).fallback(routes::method_not_allowed),
        )
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
