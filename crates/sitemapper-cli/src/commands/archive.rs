//! `archive` command: pack a newline-delimited URL list into a zip.

use anyhow::{Context, Result};
use colored::Colorize;
use sitemapper_core::{ArchiveBuilder, Config};
use std::io::Read;

use crate::cli::ArchiveArgs;

/// Execute the archive command.
pub fn execute(args: &ArchiveArgs, config: &Config, quiet: bool) -> Result<()> {
    let input = read_input(&args.input)?;
    let urls = parse_url_lines(&input);

    let bytes = ArchiveBuilder::from_config(&config.archive).build(&urls)?;
    std::fs::write(&args.output, &bytes)
        .with_context(|| format!("failed to write archive {}", args.output.display()))?;

    if !quiet {
        eprintln!(
            "{} Archived {} URLs to {} ({} bytes)",
            "✓".green(),
            urls.len(),
            args.output.display(),
            bytes.len()
        );
    }
    Ok(())
}

fn read_input(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read URLs from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read {source}"))
    }
}

/// Split input into URLs, one per line. Surrounding whitespace is trimmed and
/// blank lines are dropped; order and duplicates are kept.
pub fn parse_url_lines(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
