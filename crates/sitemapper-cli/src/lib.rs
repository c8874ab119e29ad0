//! sitemapper CLI - recursive sitemap URL extraction
//!
//! Entry point shared by the `sitemapper` binary. Command implementations live
//! in their own modules; the HTTP service lives in [`server`].

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
pub mod error;
mod output;
pub mod server;
mod utils;

use cli::{Cli, Commands};
use utils::{initialize_logging, load_config};

/// Execute the sitemapper CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns an error if configuration cannot be resolved or the command fails.
/// Use [`error::exit_code_from_error`] to turn it into a process exit code.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => commands::serve(bind, config).await,
        Commands::Extract(args) => commands::extract_urls(&args, config, cli.quiet).await,
        Commands::Archive(args) => commands::archive_urls(&args, &config, cli.quiet),
    }
}
