//! Configuration loading and config file resolution tests
//!
//! Covers graceful degradation (missing file => defaults) and the
//! CLI > environment > platform resolution order.
//!
//! Tests that manipulate KIOSK_CONFIG are marked with #[serial] so they
//! never run in parallel.

use kiosk_common::config::{ConfigResolver, TomlConfig, VariantKind, CONFIG_ENV_VAR};
use kiosk_common::Error;
use serial_test::serial;
use std::env;
use std::io::Write;
use std::path::PathBuf;

#[test]
fn test_load_none_uses_defaults() {
    let config = TomlConfig::load(None).unwrap();
    assert_eq!(config.interstitial_secs, 50);
    assert_eq!(config.port, 5750);
}

#[test]
fn test_load_missing_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let config = TomlConfig::load(Some(&path)).unwrap();
    assert_eq!(config.refresh_interval_secs, 3600);
}

#[test]
fn test_load_existing_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        interstitial_secs = 20
        variant = "linear"

        [[groups]]
        name = "room-a"

        [[groups]]
        name = "room-b"
        "#
    )
    .unwrap();

    let config = TomlConfig::load(Some(file.path())).unwrap();
    assert_eq!(config.interstitial_secs, 20);
    assert_eq!(config.variant, VariantKind::Linear);
    let names: Vec<_> = config.groups.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["room-a", "room-b"]);
}

#[test]
fn test_load_invalid_file_is_config_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "groups = []").unwrap();

    let result = TomlConfig::load(Some(file.path()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_resolver_cli_wins_over_env() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/kiosk-from-env.toml");

    let resolver = ConfigResolver::new(Some(PathBuf::from("/tmp/kiosk-from-cli.toml")));
    assert_eq!(
        resolver.resolve(),
        Some(PathBuf::from("/tmp/kiosk-from-cli.toml"))
    );

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_resolver_env_used_without_cli() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/kiosk-from-env.toml");

    let resolver = ConfigResolver::new(None);
    assert_eq!(
        resolver.resolve(),
        Some(PathBuf::from("/tmp/kiosk-from-env.toml"))
    );

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_resolver_empty_env_is_ignored() {
    env::set_var(CONFIG_ENV_VAR, "");

    let resolver = ConfigResolver::new(None);
    let resolved = resolver.resolve();
    // Falls through to the platform lookup, which never yields the empty path
    assert_ne!(resolved, Some(PathBuf::from("")));

    env::remove_var(CONFIG_ENV_VAR);
}
