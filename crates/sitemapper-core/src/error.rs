//! Error types and handling for sitemapper-core operations.
//!
//! Errors fall into two groups:
//!
//! - **Call-level errors** are returned from [`extract`](crate::extract::SitemapExtractor::extract)
//!   or [`build`](crate::archive::ArchiveBuilder::build) and end the call:
//!   [`Error::InvalidInput`], [`Error::FetchFailed`], [`Error::NoUrlsFound`],
//!   [`Error::EmptyInput`], [`Error::ArchiveWriteFailed`], [`Error::Cancelled`].
//! - **Branch-level errors** describe a single sub-sitemap that could not be
//!   used: [`Error::BranchFetchFailed`], [`Error::BranchParseFailed`] and
//!   [`Error::LimitExceeded`]. The walker absorbs these into
//!   [`ExtractReport::skipped`](crate::extract::ExtractReport::skipped) and keeps going.
//!
//! ```rust
//! use sitemapper_core::Error;
//!
//! let err = Error::InvalidInput("not a url".to_string());
//! assert_eq!(err.category(), "invalid_input");
//! assert!(!err.is_branch_failure());
//! ```

use thiserror::Error;

/// The main error type for sitemapper-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The caller supplied a malformed or empty sitemap URL.
    ///
    /// Checked before any network I/O takes place.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The root sitemap could not be fetched or parsed.
    ///
    /// This is the only fetch failure that fails a whole extraction.
    #[error("Failed to fetch sitemap '{url}': {reason}")]
    FetchFailed {
        /// Root sitemap URL.
        url: String,
        /// Underlying transport or parse failure.
        reason: String,
    },

    /// A nested sitemap was unreachable, returned a non-2xx status or an empty body.
    #[error("Skipped sitemap '{url}': {reason}")]
    BranchFetchFailed {
        /// URL of the nested sitemap.
        url: String,
        /// Underlying transport failure.
        reason: String,
    },

    /// A nested sitemap was fetched but its body was not well-formed XML.
    #[error("Skipped unparsable sitemap '{url}': {reason}")]
    BranchParseFailed {
        /// URL of the nested sitemap.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// A nested sitemap was not fetched because a walk limit was reached.
    #[error("Skipped sitemap '{url}': {reason}")]
    LimitExceeded {
        /// URL of the sitemap that was not fetched.
        url: String,
        /// Which limit was hit.
        reason: String,
    },

    /// The walk succeeded but collected zero page URLs.
    #[error("No URLs found in sitemap")]
    NoUrlsFound,

    /// An archive was requested for an empty URL list.
    #[error("Nothing to archive: URL list is empty")]
    EmptyInput,

    /// Writing the archive failed. No partial output is produced.
    #[error("Archive write failed: {0}")]
    ArchiveWriteFailed(String),

    /// The extraction was cancelled before the root sitemap was fetched.
    #[error("Extraction cancelled")]
    Cancelled,

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client error outside of a sitemap fetch (for example, client construction).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// XML or body decoding failed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Self::ArchiveWriteFailed(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl Error {
    /// Returns `true` for failures that only abandon one branch of a walk.
    #[must_use]
    pub const fn is_branch_failure(&self) -> bool {
        matches!(
            self,
            Self::BranchFetchFailed { .. } | Self::BranchParseFailed { .. } | Self::LimitExceeded { .. }
        )
    }

    /// Get the error category as a string identifier for logging.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::FetchFailed { .. } => "fetch_failed",
            Self::BranchFetchFailed { .. } => "branch_fetch_failed",
            Self::BranchParseFailed { .. } => "branch_parse_failed",
            Self::LimitExceeded { .. } => "limit_exceeded",
            Self::NoUrlsFound => "no_urls_found",
            Self::EmptyInput => "empty_input",
            Self::ArchiveWriteFailed(_) => "archive_write_failed",
            Self::Cancelled => "cancelled",
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
