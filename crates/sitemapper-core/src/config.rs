//! Configuration management for sitemapper.
//!
//! Configuration is stored in TOML and resolved in layers:
//!
//! 1. **Defaults** (see [`Config::default`])
//! 2. **Config file**: an explicit path, `$SITEMAPPER_CONFIG`, or
//!    `<platform config dir>/sitemapper/config.toml`
//! 3. **Environment variables**: `SITEMAPPER_*` overrides
//!
//! Command-line flags are applied on top by the binary.
//!
//! ## Example Configuration File
//!
//! ```toml
//! [fetch]
//! timeout_secs = 30
//! concurrency = 8
//! max_body_bytes = 52428800
//!
//! [limits]
//! max_depth = 8
//! max_sitemaps = 1000
//!
//! [archive]
//! entry_name = "sitemap_urls.txt"
//! staging = "temp_file"
//!
//! [server]
//! bind = "127.0.0.1:8080"
//! max_request_bytes = 268435456
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "SITEMAPPER_CONFIG";

/// Largest sitemap body accepted, before and after decompression (the sitemap
/// protocol's 50 MiB cap).
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Largest JSON request body the HTTP service accepts.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 256 * 1024 * 1024;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP fetch behaviour.
    pub fetch: FetchConfig,
    /// Bounds on the recursive walk.
    pub limits: LimitsConfig,
    /// Archive output settings.
    pub archive: ArchiveConfig,
    /// HTTP service settings.
    pub server: ServerConfig,
}

/// HTTP fetch settings used while walking sitemaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every sitemap request.
    pub user_agent: String,
    /// Maximum redirects followed per request.
    pub max_redirects: usize,
    /// Maximum number of sitemap fetches in flight at once.
    pub concurrency: usize,
    /// Largest sitemap body accepted, raw or decompressed.
    pub max_body_bytes: usize,
}

/// Limits that bound work against very wide or very deep sitemap indexes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum index nesting depth. The root sitemap is depth 0.
    pub max_depth: usize,
    /// Maximum number of sitemap documents fetched in one extraction.
    pub max_sitemaps: usize,
}

/// Where the archive is assembled before its bytes are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveStaging {
    /// Build the archive in a growable in-memory buffer.
    Memory,
    /// Build the archive in an anonymous temporary file, removed when the build ends.
    #[default]
    TempFile,
}

/// Archive output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Name of the single text entry inside the archive.
    pub entry_name: String,
    /// Staging strategy.
    pub staging: ArchiveStaging,
}

/// HTTP service settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind, `host:port`.
    pub bind: String,
    /// Largest request body accepted by the JSON routes.
    pub max_request_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("sitemapper/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 5,
            concurrency: 8,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_sitemaps: 1000,
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            entry_name: "sitemap_urls.txt".to_string(),
            staging: ArchiveStaging::TempFile,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
        }
    }
}

impl FetchConfig {
    /// Per-request timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the default location, then apply environment overrides.
    ///
    /// A missing config file is not an error; defaults are used instead.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(Self::default_path);
        let mut config = match path {
            Some(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit TOML file, then apply environment overrides.
    pub fn load_with_path(path: &Path) -> Result<Self> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file without applying environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config {}: {e}", path.display())))
    }

    /// Platform config file location:
    /// - Linux: `~/.config/sitemapper/config.toml`
    /// - macOS: `~/Library/Application Support/dev.outfitter.sitemapper/config.toml`
    /// - Windows: `%APPDATA%\outfitter\sitemapper\config\config.toml`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "outfitter", "sitemapper")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply `SITEMAPPER_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Split out so tests do not
    /// have to mutate the process environment.
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SITEMAPPER_FETCH_TIMEOUT_SECS") {
            self.fetch.timeout_secs = parse_env("SITEMAPPER_FETCH_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("SITEMAPPER_CONCURRENCY") {
            self.fetch.concurrency = parse_env("SITEMAPPER_CONCURRENCY", &v)?;
        }
        if let Some(v) = lookup("SITEMAPPER_MAX_DEPTH") {
            self.limits.max_depth = parse_env("SITEMAPPER_MAX_DEPTH", &v)?;
        }
        if let Some(v) = lookup("SITEMAPPER_MAX_SITEMAPS") {
            self.limits.max_sitemaps = parse_env("SITEMAPPER_MAX_SITEMAPS", &v)?;
        }
        if let Some(v) = lookup("SITEMAPPER_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = lookup("SITEMAPPER_MAX_REQUEST_BYTES") {
            self.server.max_request_bytes = parse_env("SITEMAPPER_MAX_REQUEST_BYTES", &v)?;
        }
        Ok(())
    }

    /// Reject values that would make the walk or the archive unusable.
    pub fn validate(&self) -> Result<()> {
        if self.fetch.timeout_secs == 0 {
            return Err(Error::Config("fetch.timeout_secs must be at least 1".into()));
        }
        if self.fetch.concurrency == 0 {
            return Err(Error::Config("fetch.concurrency must be at least 1".into()));
        }
        if self.fetch.max_body_bytes == 0 {
            return Err(Error::Config("fetch.max_body_bytes must be at least 1".into()));
        }
        if self.server.max_request_bytes == 0 {
            return Err(Error::Config("server.max_request_bytes must be at least 1".into()));
        }
        if self.limits.max_sitemaps == 0 {
            return Err(Error::Config("limits.max_sitemaps must be at least 1".into()));
        }
        if self.archive.entry_name.trim().is_empty() {
            return Err(Error::Config("archive.entry_name must not be empty".into()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} has an invalid value: {value:?}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic, clippy::disallowed_macros)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.fetch.concurrency, 8);
        assert_eq!(config.limits.max_depth, 8);
        assert_eq!(config.limits.max_sitemaps, 1000);
        assert_eq!(config.archive.entry_name, "sitemap_urls.txt");
        assert_eq!(config.archive.staging, ArchiveStaging::TempFile);
        assert!(config.fetch.user_agent.starts_with("sitemapper/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_file_overrides_every_section() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[fetch]\nmax_body_bytes = 1024\n\n[archive]\nstaging = \"memory\"\n\n\
             [server]\nbind = \"0.0.0.0:80\"\nmax_request_bytes = 4096\n",
        )?;

        let loaded = Config::load_from(&path)?;
        assert_eq!(loaded.fetch.max_body_bytes, 1024);
        assert_eq!(loaded.archive.staging, ArchiveStaging::Memory);
        assert_eq!(loaded.server.bind, "0.0.0.0:80");
        assert_eq!(loaded.server.max_request_bytes, 4096);
        Ok(())
    }

    #[test]
    fn test_partial_file_keeps_defaults() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("config.toml");
        fs::write(&path, "[limits]\nmax_depth = 2\n")?;

        let loaded = Config::load_from(&path)?;
        assert_eq!(loaded.limits.max_depth, 2);
        assert_eq!(loaded.limits.max_sitemaps, 1000);
        assert_eq!(loaded.fetch, FetchConfig::default());
        Ok(())
    }

    #[test]
    fn test_config_parse_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[limits\nmax_depth = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = Config::load_from(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }

    #[test]
    fn test_env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("SITEMAPPER_FETCH_TIMEOUT_SECS", "5"),
            ("SITEMAPPER_CONCURRENCY", "2"),
            ("SITEMAPPER_MAX_DEPTH", " 4 "),
            ("SITEMAPPER_MAX_SITEMAPS", "10"),
            ("SITEMAPPER_BIND", "0.0.0.0:9000"),
            ("SITEMAPPER_MAX_REQUEST_BYTES", "1048576"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| (*v).to_string()))
            .unwrap();

        assert_eq!(config.fetch.timeout(), Duration::from_secs(5));
        assert_eq!(config.fetch.concurrency, 2);
        assert_eq!(config.limits.max_depth, 4);
        assert_eq!(config.limits.max_sitemaps, 10);
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.server.max_request_bytes, 1_048_576);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|key| (key == "SITEMAPPER_MAX_DEPTH").then(|| "deep".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("SITEMAPPER_MAX_DEPTH"));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.fetch.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.fetch.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.limits.max_sitemaps = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.fetch.max_body_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.max_request_bytes = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.archive.entry_name = "   ".into();
        assert!(config.validate().is_err());
    }

    proptest! {
        #[test]
        fn test_limits_roundtrip(max_depth in 0usize..64, max_sitemaps in 1usize..100_000) {
            let mut config = Config::default();
            config.limits = LimitsConfig { max_depth, max_sitemaps };
            let text = toml::to_string_pretty(&config).unwrap();
            let parsed: Config = toml::from_str(&text).unwrap();
            prop_assert_eq!(parsed.limits, config.limits);
        }
    }
}
