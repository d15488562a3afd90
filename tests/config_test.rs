//! Integration tests for Settings config loading with layered merge semantics.
//!
//! These tests pass an explicit environment source, so they are not affected by
//! `RSTREE_*` variables of the calling shell. A global config in the user's home
//! directory would still be layered underneath; CI runs without one.

use std::fs;

use config::Environment;
use tempfile::TempDir;

use rstree::config::{OutputFormat, Settings, SettingsError};
use rstree::domain::DomainError;

fn env(pairs: &[(&str, &str)]) -> Environment {
    let vars: config::Map<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Environment::with_prefix("RSTREE")
        .prefix_separator("_")
        .separator("__")
        .source(Some(vars))
}

#[test]
fn given_local_config_when_load_then_overrides_defaults() {
    // Arrange
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rstree.toml");
    fs::write(
        &path,
        r#"
max_depth = 2
format = "json"

[fields]
id = "code"
parent_id = "parent"
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load_with_env(Some(&path), env(&[])).expect("load settings");

    // Assert
    assert_eq!(settings.max_depth, Some(2));
    assert_eq!(settings.format, OutputFormat::Json);
    assert_eq!(settings.fields.id, "code");
    assert_eq!(settings.fields.parent_id, "parent");
    // Unspecified fields keep their defaults
    assert_eq!(settings.fields.weight, "weight");

    let config = settings.tree_config().unwrap();
    assert_eq!(config.id_field(), "code");
    assert_eq!(config.max_depth(), Some(2));
}

#[test]
fn given_env_and_local_config_when_load_then_env_wins() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rstree.toml");
    fs::write(&path, "max_depth = 2\n[fields]\nname = \"title\"\n").unwrap();

    let settings = Settings::load_with_env(
        Some(&path),
        env(&[("RSTREE_MAX_DEPTH", "5"), ("RSTREE_FIELDS__NAME", "label")]),
    )
    .unwrap();

    assert_eq!(settings.max_depth, Some(5));
    assert_eq!(settings.fields.name, "label");
}

#[test]
fn given_missing_local_config_when_load_then_read_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let result = Settings::load_with_env(Some(&path), env(&[]));

    assert!(matches!(result, Err(SettingsError::Read { .. })));
}

#[test]
fn given_malformed_local_config_when_load_then_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rstree.toml");
    fs::write(&path, "max_depth = \"deep\"\n").unwrap();

    let result = Settings::load_with_env(Some(&path), env(&[]));

    assert!(matches!(result, Err(SettingsError::Parse { .. })));
}

#[test]
fn given_negative_depth_in_config_when_building_tree_config_then_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rstree.toml");
    fs::write(&path, "max_depth = -1\n").unwrap();

    // Loading succeeds; validation happens when the TreeConfig is constructed
    let settings = Settings::load_with_env(Some(&path), env(&[])).unwrap();
    let result = settings.tree_config();

    assert!(matches!(
        result,
        Err(SettingsError::Invalid(DomainError::Configuration(_)))
    ));
}

#[test]
fn given_conflicting_field_names_when_building_tree_config_then_rejected() {
    let settings = Settings::load_with_env(None, env(&[("RSTREE_FIELDS__WEIGHT", "id")])).unwrap();

    assert!(settings.tree_config().is_err());
}

#[test]
fn given_settings_when_rendering_toml_then_round_trips() {
    let settings = Settings::load_with_env(None, env(&[("RSTREE_MAX_DEPTH", "4")])).unwrap();

    let rendered = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&rendered).unwrap();

    assert_eq!(parsed, settings);
}
