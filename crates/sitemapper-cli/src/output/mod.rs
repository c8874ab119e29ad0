//! # Output Formatting
//!
//! Extraction results are printed in one of two formats:
//!
//! - **text**: one URL per line on stdout, suitable for piping
//! - **json**: a single object mirroring the HTTP `/extract` response, plus diagnostics
//!
//! ```json
//! {
//!   "success": true,
//!   "count": 2,
//!   "urls": ["https://example.com/a", "https://example.com/b"],
//!   "sitemapsVisited": 3,
//!   "skipped": [{"category": "branch_fetch_failed", "message": "..."}]
//! }
//! ```

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use sitemapper_core::ExtractReport;
use std::io::{self, Write};

/// Output format for command results
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One URL per line (default)
    #[default]
    Text,
    /// Single JSON object
    Json,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractJson<'a> {
    success: bool,
    count: usize,
    urls: &'a [String],
    sitemaps_visited: usize,
    skipped: Vec<SkippedJson>,
}

#[derive(Serialize)]
struct SkippedJson {
    category: &'static str,
    message: String,
}

/// Render an extraction report in the requested format.
pub fn render_extract(report: &ExtractReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(report.urls.join("\n")),
        OutputFormat::Json => {
            let payload = ExtractJson {
                success: true,
                count: report.urls.len(),
                urls: &report.urls,
                sitemaps_visited: report.sitemaps_visited,
                skipped: report
                    .skipped
                    .iter()
                    .map(|err| SkippedJson {
                        category: err.category(),
                        message: err.to_string(),
                    })
                    .collect(),
            };
            Ok(serde_json::to_string_pretty(&payload)?)
        },
    }
}

/// Print an extraction report to stdout.
///
/// A closed pipe (`sitemapper extract ... | head`) is not treated as an error.
pub fn print_extract(report: &ExtractReport, format: OutputFormat) -> Result<()> {
    let rendered = render_extract(report, format)?;
    let mut stdout = io::stdout().lock();
    if let Err(e) = writeln!(stdout, "{rendered}").and_then(|()| stdout.flush()) {
        if e.kind() != io::ErrorKind::BrokenPipe {
            return Err(e.into());
        }
    }
    Ok(())
}
