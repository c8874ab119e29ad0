//! Configuration resolution for the binary.

use anyhow::{Context, Result};
use sitemapper_core::Config;
use std::path::Path;
use tracing::debug;

/// Resolve configuration: defaults, then the config file, then `SITEMAPPER_*`
/// environment overrides. Command flags are applied later by each command.
///
/// An explicit `--config` path must exist; the autodiscovered file may be absent.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_with_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::load()?,
    };
    debug!(?config, "Resolved configuration");
    Ok(config)
}
