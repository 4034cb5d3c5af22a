//! Configuration loading and environment overrides
//!
//! Uses serial_test: every test that touches NEXT_READS_* or CONTENTFUL_*
//! variables is marked #[serial].

use nr_common::config::{TomlConfig, DEFAULT_PORT};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

const ENV_KEYS: [&str; 9] = [
    "NEXT_READS_HOST",
    "NEXT_READS_PORT",
    "NEXT_READS_DATA_FOLDER",
    "NEXT_READS_FIXTURE",
    "NEXT_READS_LOG",
    "CONTENTFUL_SPACE_ID",
    "CONTENTFUL_ENVIRONMENT",
    "CONTENTFUL_ACCESS_TOKEN",
    "CONTENTFUL_MANAGEMENT_ACCESS_TOKEN",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();

    let config = TomlConfig::resolve(Some(&dir.path().join("absent.toml"))).unwrap();

    assert_eq!(config.port, DEFAULT_PORT);
    assert!(config.fixture.is_none());
    assert!(config.content.credentials().is_err());
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "port = \"not a number\"").unwrap();

    assert!(TomlConfig::resolve(Some(&path)).is_err());
}

#[test]
#[serial]
fn test_env_overrides_file_values() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        port = 6001
        fixture = "/srv/fixture.json"

        [content]
        space_id = "from-file"
        delivery_token = "cda-file"
        management_token = "cma-file"
        "#,
    )
    .unwrap();

    env::set_var("NEXT_READS_PORT", "7002");
    env::set_var("CONTENTFUL_SPACE_ID", "from-env");
    env::set_var("CONTENTFUL_MANAGEMENT_ACCESS_TOKEN", "cma-env");

    let config = TomlConfig::resolve(Some(&path)).unwrap();
    clear_env();

    assert_eq!(config.port, 7002);
    assert_eq!(config.fixture, Some(PathBuf::from("/srv/fixture.json")));

    let creds = config.content.credentials().unwrap();
    assert_eq!(creds.space_id, "from-env");
    assert_eq!(creds.delivery_token, "cda-file");
    assert_eq!(creds.management_token, "cma-env");
}

#[test]
#[serial]
fn test_invalid_port_env_is_ignored() {
    clear_env();
    env::set_var("NEXT_READS_PORT", "eighty");

    let mut config = TomlConfig::default();
    config.apply_env();
    clear_env();

    assert_eq!(config.port, DEFAULT_PORT);
}

#[test]
#[serial]
fn test_data_folder_override() {
    clear_env();
    env::set_var("NEXT_READS_DATA_FOLDER", "/var/lib/next-reads");

    let mut config = TomlConfig::default();
    config.apply_env();
    clear_env();

    assert_eq!(config.data_folder(), PathBuf::from("/var/lib/next-reads"));
}
