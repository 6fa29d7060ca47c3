mod common;

use common::*;
use fraggroup::core::config::{load_config, save_config, Preference};
use fraggroup::{run_pipeline, Config, FragGroupError};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_save_and_load_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("fraggroup.toml");

    let mut config = Config::default();
    config.clustering.preference = Preference::Fixed(-30.0);
    config.grouping.aggressive = true;
    config.grouping.max_group_length = Some(499);
    config.sites.reverse_complement = false;
    save_config(&path, &config).unwrap();

    let loaded = load_config(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_rejects_bad_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[clustering\ndamping = 0.5").unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, FragGroupError::Configuration(_)));
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load_config(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, FragGroupError::Io(_)));
}

#[test]
fn test_loaded_config_drives_pipeline() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("merge.toml");
    fs::write(
        &path,
        "[clustering]\npreference = -1000.0\n\n[grouping]\naggressive = true\n",
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    let result = run_pipeline(&records(&TWO_FAMILIES), &config).unwrap();

    // One cluster gives six singletons, merged into three pairs
    assert_eq!(result.clusters.len(), 1);
    assert_eq!(result.group_count(), 3);
    assert!(result.records.iter().all(|r| r.names.len() == 2));
}

#[test]
fn test_invalid_values_rejected_at_run() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[clustering]\nmax_iterations = 0\n").unwrap();

    let config = load_config(&path).unwrap();
    let err = run_pipeline(&records(&TWO_FAMILIES), &config).unwrap_err();
    assert!(matches!(err, FragGroupError::Configuration(_)));
}
