//! Tests for config loading and persistence

use parametric::config::{Config, FieldFailurePolicy};
use parametric::SortParam;
use tempfile::tempdir;

#[test]
fn test_load_or_create_writes_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("conf").join("parametric.toml");

    let config = Config::load_or_create(&path).unwrap();

    assert_eq!(config, Config::default());
    assert!(path.exists());
    assert_eq!(Config::load(&path).unwrap(), config);
}

#[test]
fn test_save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("parametric.toml");

    let mut config = Config::default();
    config.parametric.max_values = 0;
    config.parametric.sort = SortParam::NumberDecreasing;
    config.parametric.field_failure = FieldFailurePolicy::Skip;
    config.logging.format = "json".to_string();
    config.save(&path).unwrap();

    let loaded = Config::load_or_create(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.parametric.max_values_limit(), None);
}

#[test]
fn test_load_rejects_invalid_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("parametric.toml");
    std::fs::write(&path, "[parametric]\nmax_concurrent_fields = 0\n").unwrap();

    assert!(Config::load(&path).is_err());
}

#[test]
fn test_load_missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = Config::load(&dir.path().join("missing.toml")).unwrap_err();
    assert_eq!(err.error_type(), "io");
}
