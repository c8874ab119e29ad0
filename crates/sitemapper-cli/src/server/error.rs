//! Mapping of core errors onto HTTP responses.
//!
//! Every error body is `{"error": "<message>"}`. Internal details are logged,
//! not returned.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sitemapper_core::Error as CoreError;
use tracing::{debug, error, warn};

/// Errors returned by the HTTP handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Missing, empty or malformed sitemap URL, or an unreadable request body.
    InvalidUrl,
    /// The walk completed without finding any page URL.
    NoUrlsFound,
    /// The root sitemap could not be fetched or parsed.
    FetchFailed(String),
    /// An archive was requested without URLs.
    NoUrlsToArchive,
    /// Building the archive failed.
    ArchiveFailed,
    /// The route exists but not for this method.
    MethodNotAllowed,
    /// The request body is larger than `server.max_request_bytes`.
    PayloadTooLarge,
    /// The extraction was cancelled before completion.
    Cancelled,
    /// Anything else.
    Internal,
}

impl ApiError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUrl | Self::NoUrlsToArchive => StatusCode::BAD_REQUEST,
            Self::NoUrlsFound => StatusCode::NOT_FOUND,
            Self::FetchFailed(_) => StatusCode::BAD_GATEWAY,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            Self::ArchiveFailed | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::InvalidUrl => "Invalid Sitemap URL".to_string(),
            Self::NoUrlsFound => "No URLs found in sitemap.".to_string(),
            Self::FetchFailed(reason) => format!("Failed to fetch sitemap: {reason}"),
            Self::NoUrlsToArchive => "No URLs to archive".to_string(),
            Self::ArchiveFailed => "Failed to create archive".to_string(),
            Self::MethodNotAllowed => "Method not allowed".to_string(),
            Self::PayloadTooLarge => "Request body too large".to_string(),
            Self::Cancelled => "Extraction cancelled".to_string(),
            Self::Internal => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(reason) => {
                debug!(%reason, "Rejected sitemap URL");
                Self::InvalidUrl
            },
            CoreError::NoUrlsFound => Self::NoUrlsFound,
            CoreError::FetchFailed { url, reason } => {
                warn!(%url, %reason, "Root sitemap fetch failed");
                Self::FetchFailed(reason)
            },
            CoreError::EmptyInput => Self::NoUrlsToArchive,
            CoreError::ArchiveWriteFailed(_) | CoreError::Io(_) => {
                error!(error = %err, "Archive build failed");
                Self::ArchiveFailed
            },
            CoreError::Cancelled => Self::Cancelled,
            other => {
                error!(error = %other, category = other.category(), "Unhandled request error");
                Self::Internal
            },
        }
    }
}
