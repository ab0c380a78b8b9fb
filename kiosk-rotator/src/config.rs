//! kiosk-rotator runtime configuration
//!
//! Flattens the bootstrap TOML file and command-line overrides into the
//! values the engine runs with. CLI values win over file values.

use crate::playback::PlaybackVariant;
use crate::rotation::RotationConfig;
use crate::Result;
use kiosk_common::config::{CatalogConfig, GroupConfig, TomlConfig};
use kiosk_common::time::secs_to_duration;
use std::path::Path;
use std::time::Duration;

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Kiosk rotator configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub rotation: RotationConfig,
    pub refresh_interval: Duration,
    pub catalog: CatalogConfig,
    pub groups: Vec<GroupConfig>,
}

impl Config {
    pub fn from_toml(toml: TomlConfig, overrides: CliOverrides) -> Self {
        Self {
            port: overrides.port.unwrap_or(toml.port),
            log_level: overrides.log_level.unwrap_or(toml.logging.level),
            rotation: RotationConfig {
                interstitial: secs_to_duration(toml.interstitial_secs),
                fetch_retry: secs_to_duration(toml.fetch_retry_secs),
                variant: PlaybackVariant::from_config(toml.variant, toml.grid_columns),
            },
            refresh_interval: secs_to_duration(toml.refresh_interval_secs),
            catalog: toml.catalog,
            groups: toml.groups,
        }
    }

    /// Load the bootstrap file at `path` (defaults when absent) and apply
    /// overrides
    pub fn load(path: Option<&Path>, overrides: CliOverrides) -> Result<Self> {
        let toml = TomlConfig::load(path)?;
        Ok(Self::from_toml(toml, overrides))
    }

    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub fn log_filter(&self) -> String {
        let level = &self.log_level;
        format!(
            "kiosk_rotator={},kiosk_common={},tower_http={}",
            level, level, level
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiosk_common::config::VariantKind;

    #[test]
    fn test_defaults_flatten() {
        let config = Config::from_toml(TomlConfig::default(), CliOverrides::default());
        assert_eq!(config.port, 5750);
        assert_eq!(config.rotation.interstitial, Duration::from_secs(50));
        assert_eq!(config.rotation.fetch_retry, Duration::from_secs(5));
        assert_eq!(config.refresh_interval, Duration::from_secs(3600));
        assert_eq!(config.rotation.variant, PlaybackVariant::Grid { columns: 2 });
        assert_eq!(config.log_filter(), "kiosk_rotator=info,kiosk_common=info,tower_http=info");
    }

    #[test]
    fn test_cli_overrides_win() {
        let toml = TomlConfig {
            port: 7000,
            variant: VariantKind::Linear,
            ..TomlConfig::default()
        };
        let config = Config::from_toml(
            toml,
            CliOverrides {
                port: Some(8080),
                log_level: Some("debug".to_string()),
            },
        );
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.rotation.variant, PlaybackVariant::Linear);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml")), CliOverrides::default())
            .unwrap();
        assert_eq!(config.groups.len(), 1);
    }
}
