//! Logging initialization and configuration.
//!
//! Sets up the tracing subscriber and color control based on CLI flags and
//! environment variables. Logs always go to stderr so stdout stays pipeable.

use anyhow::Result;
use colored::control as color_control;
use tracing::Level;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::cli::{Cli, Commands, LogFormat};

/// Pick the log level from global flags and the selected command.
///
/// The long-running service logs at INFO by default; one-shot commands only
/// surface warnings (such as skipped sitemaps) unless asked.
pub fn default_level(cli: &Cli) -> Level {
    if cli.verbose || cli.debug {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else if matches!(cli.command, Commands::Serve { .. }) {
        Level::INFO
    } else {
        Level::WARN
    }
}

/// Initialize the logging subsystem based on CLI flags.
///
/// `RUST_LOG`, when set and valid, replaces the flag-derived level.
///
/// # Errors
///
/// Returns an error if the global tracing subscriber cannot be set.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::default().add_directive(LevelFilter::from_level(default_level(cli)).into())
    });

    let no_color = cli.no_color || std::env::var_os("NO_COLOR").is_some();

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_ansi(!no_color)
        .with_writer(std::io::stderr);

    match cli.log_format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }

    if no_color {
        color_control::set_override(false);
    }
    Ok(())
}
