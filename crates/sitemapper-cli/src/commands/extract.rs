//! `extract` command: walk a sitemap once and print its page URLs.

use anyhow::{Context, Result};
use colored::Colorize;
use sitemapper_core::{ArchiveBuilder, Config, SitemapExtractor};
use tokio_util::sync::CancellationToken;

use crate::cli::ExtractArgs;
use crate::output::{OutputFormat, print_extract};

/// Execute the extract command.
pub async fn execute(args: &ExtractArgs, mut config: Config, quiet: bool) -> Result<()> {
    args.apply_to(&mut config);
    config.validate()?;

    let extractor = SitemapExtractor::with_config(&config)?;

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };
    let result = extractor.extract_with_cancel(&args.url, cancel).await;
    interrupt.abort();
    let report = result?;

    print_extract(&report, args.format)?;

    if let Some(path) = &args.archive {
        let bytes = ArchiveBuilder::from_config(&config.archive).build(&report.urls)?;
        std::fs::write(path, bytes)
            .with_context(|| format!("failed to write archive {}", path.display()))?;
    }

    if matches!(args.format, OutputFormat::Text) && !quiet {
        let mut summary = format!(
            "{} {} URLs from {} sitemaps",
            "✓".green(),
            report.urls.len(),
            report.sitemaps_visited
        );
        if !report.skipped.is_empty() {
            summary.push_str(&format!(" ({} skipped)", report.skipped.len()).yellow().to_string());
        }
        if let Some(path) = &args.archive {
            summary.push_str(&format!(", archived to {}", path.display()));
        }
        eprintln!("{summary}");
    }

    Ok(())
}
