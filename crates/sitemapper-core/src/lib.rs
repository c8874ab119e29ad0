//! # sitemapper-core
//!
//! Core functionality for sitemapper: recursive sitemap URL extraction and
//! URL-list archiving.
//!
//! The crate is organized around a few components:
//!
//! - **Extraction**: [`SitemapExtractor`] walks a sitemap and any nested sitemap
//!   indexes, returning deduplicated page URLs
//! - **Parsing**: [`sitemap::parse_document`] classifies XML bodies as index, urlset, or unknown
//! - **Archiving**: [`ArchiveBuilder`] packs a URL list into a single-entry zip
//! - **Configuration**: layered TOML and environment settings in [`Config`]
//!
//! ## Quick Start
//!
//! ```no_run
//! use sitemapper_core::{ArchiveBuilder, Config, SitemapExtractor};
//!
//! # async fn example() -> sitemapper_core::Result<()> {
//! let config = Config::load()?;
//! let extractor = SitemapExtractor::with_config(&config)?;
//!
//! let report = extractor.extract("https://example.com/sitemap.xml").await?;
//! let zip_bytes = ArchiveBuilder::from_config(&config.archive).build(&report.urls)?;
//! std::fs::write("sitemap_urls.zip", zip_bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`]. Failures of nested sitemaps never
//! surface as errors; they are collected in [`ExtractReport::skipped`].

/// Zip packaging of URL lists
pub mod archive;
/// Configuration management
pub mod config;
/// Error types and result aliases
pub mod error;
/// Recursive sitemap walking
pub mod extract;
/// HTTP fetching of sitemap bodies
pub mod fetcher;
/// Sitemap XML parsing
pub mod sitemap;

pub use archive::ArchiveBuilder;
pub use config::{ArchiveConfig, ArchiveStaging, Config, FetchConfig, LimitsConfig, ServerConfig};
pub use error::{Error, Result};
pub use extract::{ExtractReport, SitemapExtractor, extract_urls, validate_sitemap_url};
pub use fetcher::SitemapFetcher;
pub use sitemap::SitemapDocument;
