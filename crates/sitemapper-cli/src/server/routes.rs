//! Request handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, error};

use super::AppState;
use super::error::ApiError;

/// Body of `POST /extract`.
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    #[serde(default)]
    pub url: Option<String>,
}

/// Successful `POST /extract` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub count: usize,
    pub urls: Vec<String>,
}

/// Body of `POST /archive`.
#[derive(Debug, Deserialize)]
pub struct ArchiveRequest {
    #[serde(default)]
    pub urls: Vec<String>,
}

const ARCHIVE_DISPOSITION: &str = "attachment; filename=\"sitemap_urls.zip\"";

pub async fn extract(
    State(state): State<AppState>,
    payload: Result<Json<ExtractRequest>, JsonRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| rejected(&rejection, ApiError::InvalidUrl))?;
    let url = request.url.unwrap_or_default();

    let report = state.extractor.extract(&url).await?;

    Ok(Json(ExtractResponse {
        success: true,
        count: report.urls.len(),
        urls: report.urls,
    }))
}

pub async fn archive(
    State(state): State<AppState>,
    payload: Result<Json<ArchiveRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) =
        payload.map_err(|rejection| rejected(&rejection, ApiError::NoUrlsToArchive))?;

    let archiver = Arc::clone(&state.archiver);
    let bytes = tokio::task::spawn_blocking(move || archiver.build(&request.urls))
        .await
        .map_err(|e| {
            error!(error = %e, "Archive task failed");
            ApiError::ArchiveFailed
        })??;

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("application/zip")),
        (
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static(ARCHIVE_DISPOSITION),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(bytes.len())),
    ];
    Ok((headers, bytes).into_response())
}

/// Oversized bodies get their own status; any other unreadable body maps to `fallback`.
fn rejected(rejection: &JsonRejection, fallback: ApiError) -> ApiError {
    debug!(%rejection, "Unreadable request body");
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        fallback
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
