//! # CLI Structure and Argument Parsing
//!
//! `sitemapper` follows a command-subcommand pattern built with `clap` derive:
//!
//! - **Global options**: logging verbosity, log format, config file
//! - **`serve`**: run the HTTP extraction/archive service
//! - **`extract`**: walk a sitemap once and print the page URLs
//! - **`archive`**: pack a newline-delimited URL list into a zip
//!
//! ```bash
//! sitemapper serve --bind 0.0.0.0:8080
//! sitemapper extract https://example.com/sitemap.xml --format json
//! sitemapper extract https://example.com/sitemap.xml | sitemapper archive -o urls.zip
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use sitemapper_core::Config;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Main CLI structure for the `sitemapper` command
#[derive(Parser, Clone, Debug)]
#[command(name = "sitemapper")]
#[command(version)]
#[command(about = "sitemapper - recursive sitemap URL extraction", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true, conflicts_with_all = ["verbose", "debug"])]
    pub quiet: bool,

    /// Enable debug logging (alias of `--verbose`)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Log line format written to stderr
    #[arg(long = "log-format", global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Disable all ANSI colors in output (also respects `NO_COLOR` env)
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Path to configuration file (overrides `SITEMAPPER_CONFIG` and autodiscovery)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

/// Available subcommands for the `sitemapper` CLI
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Run the HTTP service until interrupted
    Serve {
        /// Socket address to bind (`host:port`); overrides `server.bind`
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Extract page URLs from a sitemap (recursing into sitemap indexes)
    Extract(ExtractArgs),

    /// Pack a newline-delimited URL list into a zip archive
    Archive(ArchiveArgs),
}

/// Arguments for `sitemapper extract`.
#[derive(Args, Clone, Debug)]
pub struct ExtractArgs {
    /// Root sitemap URL (http or https)
    #[arg(value_name = "URL")]
    pub url: String,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Maximum sitemap index nesting depth
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Maximum number of sitemap documents to fetch
    #[arg(long, value_name = "N")]
    pub max_sitemaps: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Maximum concurrent sitemap fetches
    #[arg(long, value_name = "N")]
    pub concurrency: Option<usize>,

    /// Also write the URLs to a zip archive at this path
    #[arg(long, value_name = "FILE")]
    pub archive: Option<PathBuf>,
}

impl ExtractArgs {
    /// Apply command-line overrides on top of the resolved configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(depth) = self.max_depth {
            config.limits.max_depth = depth;
        }
        if let Some(max) = self.max_sitemaps {
            config.limits.max_sitemaps = max;
        }
        if let Some(secs) = self.timeout {
            config.fetch.timeout_secs = secs;
        }
        if let Some(concurrency) = self.concurrency {
            config.fetch.concurrency = concurrency;
        }
    }
}

/// Arguments for `sitemapper archive`.
#[derive(Args, Clone, Debug)]
pub struct ArchiveArgs {
    /// File of newline-delimited URLs, or `-` for stdin
    #[arg(short = 'i', long, value_name = "FILE", default_value = "-")]
    pub input: String,

    /// Path of the zip archive to write
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: PathBuf,
}
