//! Bootstrap configuration loading and config file resolution
//!
//! The kiosk reads a single TOML bootstrap file at startup. Settings cannot
//! change while running; restart to pick up edits.
//!
//! # Config file resolution priority
//!
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`KIOSK_CONFIG`)
//! 3. Platform config directory
//! 4. Compiled defaults (no file at all)
//!
//! A missing file is never fatal: the resolver warns and the compiled
//! defaults are used.

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "KIOSK_CONFIG";

/// Directory name used under the platform config/data directories
const APP_DIR: &str = "kiosk-rotator";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP status surface port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Fixed interstitial duration in seconds
    #[serde(default = "default_interstitial_secs")]
    pub interstitial_secs: u64,

    /// Period of the content refresh timer in seconds
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Delay before re-issuing a failed activation fetch
    #[serde(default = "default_fetch_retry_secs")]
    pub fetch_retry_secs: u64,

    /// Playback variant driving each queue
    #[serde(default)]
    pub variant: VariantKind,

    /// Column count for the grid variant (layout hint for the renderer)
    #[serde(default = "default_grid_columns")]
    pub grid_columns: usize,

    /// Catalog provider settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Rotation groups, cycled round-robin in file order
    #[serde(default = "default_groups")]
    pub groups: Vec<GroupConfig>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which playback variant consumes a queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    /// One item at a time, advancing the queue index
    Linear,
    /// Leaderboard grid: cells play one at a time, queue index untouched
    #[default]
    Grid,
}

/// Which catalog provider backs the rotation groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    /// PostgREST-style HTTP leaderboard
    Http,
    /// One JSON file per group in a local directory
    #[default]
    Directory,
}

/// Catalog provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub kind: CatalogKind,

    /// Base URL of the REST catalog (http kind)
    #[serde(default)]
    pub base_url: Option<String>,

    /// API key sent as `apikey` and bearer token (http kind)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Prefix for media asset URLs (http kind)
    #[serde(default)]
    pub assets_url: Option<String>,

    /// Table embedded into each leaderboard row (http kind)
    #[serde(default = "default_songs_resource")]
    pub songs_resource: String,

    /// Maximum number of items requested per group
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Directory holding `<source>.json` files (directory kind)
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            kind: CatalogKind::default(),
            base_url: None,
            api_key: None,
            assets_url: None,
            songs_resource: default_songs_resource(),
            limit: default_limit(),
            directory: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// One rotation group (room or catalog)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GroupConfig {
    /// Display name, unique across groups
    pub name: String,

    /// Catalog identifier; defaults to `name`
    #[serde(default)]
    pub source: Option<String>,
}

impl GroupConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
        }
    }

    /// Catalog identifier passed to the provider
    pub fn source(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_port() -> u16 {
    5750
}

fn default_interstitial_secs() -> u64 {
    50
}

fn default_refresh_interval_secs() -> u64 {
    60 * 60
}

fn default_fetch_retry_secs() -> u64 {
    5
}

fn default_grid_columns() -> usize {
    2
}

fn default_songs_resource() -> String {
    "memesongs".to_string()
}

fn default_limit() -> usize {
    20
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_groups() -> Vec<GroupConfig> {
    vec![GroupConfig {
        name: "leaderboard".to_string(),
        source: Some("weekly_song_plays".to_string()),
    }]
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            interstitial_secs: default_interstitial_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            fetch_retry_secs: default_fetch_retry_secs(),
            variant: VariantKind::default(),
            grid_columns: default_grid_columns(),
            catalog: CatalogConfig::default(),
            groups: default_groups(),
            logging: LoggingConfig::default(),
        }
    }
}

impl TomlConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from `path`, or compiled defaults when `path` is
    /// `None` or does not exist
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            warn!("No config file found, using compiled defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            warn!(
                "Config file {} not found, using compiled defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.groups.is_empty() {
            return Err(Error::Config(
                "at least one rotation group is required".to_string(),
            ));
        }
        if self.interstitial_secs == 0 {
            return Err(Error::Config("interstitial_secs must be > 0".to_string()));
        }
        if self.refresh_interval_secs == 0 {
            return Err(Error::Config(
                "refresh_interval_secs must be > 0".to_string(),
            ));
        }
        if self.fetch_retry_secs == 0 {
            return Err(Error::Config("fetch_retry_secs must be > 0".to_string()));
        }
        if self.catalog.limit == 0 {
            return Err(Error::Config("catalog.limit must be >= 1".to_string()));
        }
        if self.grid_columns == 0 {
            return Err(Error::Config("grid_columns must be >= 1".to_string()));
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.name.trim().is_empty() {
                return Err(Error::Config("group name must not be empty".to_string()));
            }
            if !seen.insert(group.name.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate group name '{}'",
                    group.name
                )));
            }
        }
        Ok(())
    }
}

/// Config file resolver following the priority order in the module docs
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self { cli_path }
    }

    /// Resolve the config file path, if any source names one
    ///
    /// CLI and environment paths are returned even when the file is
    /// missing so the loader can warn about the exact path.
    pub fn resolve(&self) -> Option<PathBuf> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            return Some(path.clone());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Platform config directory
        platform_config_file()
    }
}

/// First existing platform config file
fn platform_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc").join(APP_DIR).join("config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default directory for the directory catalog
pub fn default_catalog_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR).join("catalog"))
        .unwrap_or_else(|| PathBuf::from("./kiosk_data/catalog"))
}
