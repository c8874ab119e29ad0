//! sitemapper - recursive sitemap URL extraction and URL-list archiving

use colored::Colorize;
use std::process::ExitCode;

use sitemapper_cli::error::exit_code_from_error;

#[tokio::main]
async fn main() -> ExitCode {
    match sitemapper_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "Error:".red().bold());
            ExitCode::from(exit_code_from_error(&err))
        },
    }
}
