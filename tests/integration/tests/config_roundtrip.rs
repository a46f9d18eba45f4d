//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be written to disk, loaded
//! back with identical field values, and used to open a store.

use localenv_core::config::{Config, ConfigBuilder, LogLevel};
use localenv_store::{crypto, LocalStore};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("localenv.json5");

    let config = ConfigBuilder::new()
        .store_path(dir.path().join("data"))
        .secret_key("roundtrip-key")
        .priority(7)
        .log_level(LogLevel::Debug)
        .build();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.store.path, config.store.path);
    assert_eq!(loaded.store.secret_key, config.store.secret_key);
    assert_eq!(loaded.store.priority, 7);
    assert_eq!(loaded.logging.level, LogLevel::Debug);
    assert!(loaded.validate().is_ok());
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/localenv.json5"));
    assert!(result.is_err());
}

#[test]
fn test_config_load_or_default_nonexistent() {
    let config = Config::load_or_default(Some(Path::new("/nonexistent/localenv.json5"))).unwrap();
    assert!(config.store.enabled);
    assert!(config.store.secret_key.is_none());
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}

#[test]
fn test_config_parse_json5_comments() {
    let config = Config::parse(
        r#"{
            // where values live
            store: { path: "/tmp/localenv", secret_key: "k", priority: 2 },
        }"#,
    )
    .unwrap();
    assert_eq!(config.store.priority, 2);
    assert_eq!(config.store.secret_key.unwrap().expose(), "k");
}

#[test]
fn test_redacted_config_hides_key() {
    let config = ConfigBuilder::new()
        .store_path("/tmp/localenv")
        .secret_key("do-not-print")
        .build();
    let json = serde_json::to_string(&config.redacted()).unwrap();
    assert!(!json.contains("do-not-print"));
}

#[tokio::test]
async fn test_store_opens_from_saved_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("localenv.json5");

    ConfigBuilder::new()
        .store_path(dir.path().join("data"))
        .secret_key(crypto::generate_secret_key())
        .build()
        .save(&path)
        .unwrap();

    let config = Config::load(&path).unwrap();
    let store = LocalStore::from_config(&config.store).await.unwrap();
    store.set("API_KEY", "s3cr3t", true).await.unwrap();

    let reopened = LocalStore::from_config(&Config::load(&path).unwrap().store)
        .await
        .unwrap();
    assert_eq!(reopened.get("API_KEY").await, ("s3cr3t".to_string(), true));
}
