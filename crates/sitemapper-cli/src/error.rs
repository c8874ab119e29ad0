//! CLI error handling with semantic exit codes.
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Command completed successfully |
//! | 1 | `Internal` | Unexpected/internal error |
//! | 2 | `Usage` | Invalid URL, empty input, or bad configuration |
//! | 3 | `NotFound` | The sitemap walk found no page URLs |
//! | 5 | `Network` | The root sitemap could not be fetched or parsed |
//! | 6 | `Timeout` | The root sitemap request timed out |
//! | 130 | `Interrupted` | Cancelled with Ctrl-C |
//!
//! ```bash
//! sitemapper extract "$URL" > urls.txt
//! case $? in
//!     0) echo "ok" ;;
//!     3) echo "sitemap is empty" ;;
//!     5) echo "sitemap unreachable" ;;
//! esac
//! ```

use sitemapper_core::Error as CoreError;
use std::fmt;

/// Semantic error category determining the exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Unexpected or internal error (exit code 1).
    Internal = 1,
    /// Invalid arguments, input, or configuration (exit code 2).
    Usage = 2,
    /// Nothing was found (exit code 3).
    NotFound = 3,
    /// Network or fetch failure (exit code 5).
    Network = 5,
    /// Operation timed out (exit code 6).
    Timeout = 6,
    /// Interrupted by the user (exit code 130).
    Interrupted = 130,
}

impl ErrorCategory {
    /// Get the exit code for this category.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Get a short description of this error category.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Internal => "internal error",
            Self::Usage => "usage error",
            Self::NotFound => "not found",
            Self::Network => "network error",
            Self::Timeout => "timeout",
            Self::Interrupted => "interrupted",
        }
    }

    /// Categorize a core library error.
    #[must_use]
    pub fn from_core(err: &CoreError) -> Self {
        match err {
            CoreError::InvalidInput(_) | CoreError::EmptyInput | CoreError::Config(_) => {
                Self::Usage
            },
            CoreError::NoUrlsFound => Self::NotFound,
            CoreError::FetchFailed { reason, .. } if reason.contains("timed out") => Self::Timeout,
            CoreError::Network(e) if e.is_timeout() => Self::Timeout,
            CoreError::FetchFailed { .. } | CoreError::Network(_) => Self::Network,
            CoreError::Cancelled => Self::Interrupted,
            _ => Self::Internal,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// A CLI error with a semantic category for exit code mapping.
///
/// Wraps an `anyhow::Error` so the full context chain survives.
#[derive(Debug)]
pub struct CliError {
    /// The semantic category of this error.
    pub category: ErrorCategory,
    /// The underlying error with full context.
    pub source: anyhow::Error,
}

impl CliError {
    /// Create a new CLI error with explicit category.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Create a usage error.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Determine the exit code from an `anyhow::Error`.
///
/// Explicit [`CliError`]s win; otherwise a wrapped core error is categorized.
/// Anything else is an internal error.
#[must_use]
pub fn exit_code_from_error(err: &anyhow::Error) -> u8 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return cli_err.exit_code();
    }
    if let Some(core_err) = err.downcast_ref::<CoreError>() {
        return ErrorCategory::from_core(core_err).exit_code();
    }
    ErrorCategory::Internal.exit_code()
}
