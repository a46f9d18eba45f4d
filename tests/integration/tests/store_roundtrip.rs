//! Store persistence integration tests.
//!
//! Each test writes through one `LocalStore`, reopens the same directory with
//! a fresh instance, and checks what survived.

use std::collections::BTreeMap;
use std::sync::Arc;

use localenv_store::{
    BroadcastNotifier, EnvBundle, EnvSource, EnvValue, LocalStore, ENV_BUNDLE_ID, REDACTED,
};
use tempfile::TempDir;

const KEY: &str = "3a7c1e9f5b2d4a6c8e0f1b3d5a7c9e2f";

async fn open(dir: &TempDir) -> LocalStore {
    LocalStore::open(dir.path(), KEY, 1).await.unwrap()
}

fn store_file_contents(dir: &TempDir) -> String {
    std::fs::read_to_string(dir.path().join("local").join("config.json")).unwrap()
}

#[tokio::test]
async fn test_plain_value_survives_reopen() {
    let dir = TempDir::new().unwrap();
    open(&dir).await.set("DB_HOST", "localhost", false).await.unwrap();

    let store = open(&dir).await;
    assert_eq!(store.get("DB_HOST").await, ("localhost".to_string(), false));
    assert_eq!(store.list().await.vars, vec!["DB_HOST"]);
}

#[tokio::test]
async fn test_secret_survives_reopen_encrypted() {
    let dir = TempDir::new().unwrap();
    open(&dir).await.set("API_KEY", "s3cr3t", true).await.unwrap();

    let file = store_file_contents(&dir);
    assert!(!file.contains("s3cr3t"));

    let json: serde_json::Value = serde_json::from_str(&file).unwrap();
    assert_eq!(json["env"]["API_KEY"]["secret"], true);
    assert_ne!(json["env"]["API_KEY"]["value"], "s3cr3t");

    let store = open(&dir).await;
    assert_eq!(store.get("API_KEY").await, ("s3cr3t".to_string(), true));
    assert_eq!(store.list().await.secrets, vec!["API_KEY"]);
}

#[tokio::test]
async fn test_wrong_passphrase_drops_secrets_only() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    store.set("DB_HOST", "localhost", false).await.unwrap();
    store.set("API_KEY", "s3cr3t", true).await.unwrap();

    let other = LocalStore::open(dir.path(), "a-different-key", 1).await.unwrap();
    assert_eq!(other.get("DB_HOST").await, ("localhost".to_string(), false));
    assert_eq!(other.get("API_KEY").await, (String::new(), false));
}

#[tokio::test]
async fn test_truncated_token_isolated() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    store.set("GOOD", "fine", true).await.unwrap();
    store.set("BAD", "broken", true).await.unwrap();
    store.set("PLAIN", "visible", false).await.unwrap();
    drop(store);

    let mut json: serde_json::Value = serde_json::from_str(&store_file_contents(&dir)).unwrap();
    let token = json["env"]["BAD"]["value"].as_str().unwrap().to_string();
    json["env"]["BAD"]["value"] = serde_json::Value::String(token[..token.len() / 2].to_string());
    std::fs::write(
        dir.path().join("local").join("config.json"),
        serde_json::to_vec_pretty(&json).unwrap(),
    )
    .unwrap();

    let store = open(&dir).await;
    assert_eq!(store.get("GOOD").await, ("fine".to_string(), true));
    assert_eq!(store.get("PLAIN").await, ("visible".to_string(), false));
    assert_eq!(store.get("BAD").await, (String::new(), false));
}

#[tokio::test]
async fn test_resolve_omits_unknown() {
    let dir = TempDir::new().unwrap();
    let store = LocalStore::open(dir.path(), KEY, 5).await.unwrap();
    store.set("DB_HOST", "localhost", false).await.unwrap();
    store.set("API_KEY", "s3cr3t", true).await.unwrap();

    let names = vec![
        "DB_HOST".to_string(),
        "API_KEY".to_string(),
        "UNKNOWN".to_string(),
    ];
    let source: &dyn EnvSource = &store;
    let resolved = source.resolve(&names).await;

    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved["DB_HOST"].value, "localhost");
    assert_eq!(resolved["API_KEY"].value, "s3cr3t");
    assert!(resolved["API_KEY"].secret);
    assert!(resolved.values().all(|env| env.priority == 5));
    assert!(!resolved.contains_key("UNKNOWN"));
}

#[tokio::test]
async fn test_unset_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    store.set("A", "1", false).await.unwrap();
    store.set("B", "2", true).await.unwrap();
    store.unset("A").await.unwrap();
    store.set("B", "", true).await.unwrap();

    let store = open(&dir).await;
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_notifier_receives_redacted_snapshots() {
    let dir = TempDir::new().unwrap();
    let store = open(&dir).await;
    let notifier = Arc::new(BroadcastNotifier::default());
    let mut rx = notifier.subscribe();
    store.attach_notifier(notifier).await;

    store.set("DB_HOST", "localhost", false).await.unwrap();
    store.set("API_KEY", "s3cr3t", true).await.unwrap();

    let first: EnvBundle = serde_json::from_str(&rx.recv().await.unwrap()).unwrap();
    assert_eq!(first.bundle_id, ENV_BUNDLE_ID);
    assert_eq!(first.env.len(), 1);

    let payload = rx.recv().await.unwrap();
    assert!(!payload.contains("s3cr3t"));
    let second: EnvBundle = serde_json::from_str(&payload).unwrap();

    let mut expected = BTreeMap::new();
    expected.insert(
        "API_KEY".to_string(),
        EnvValue {
            value: REDACTED.to_string(),
            secret: true,
        },
    );
    expected.insert(
        "DB_HOST".to_string(),
        EnvValue {
            value: "localhost".to_string(),
            secret: false,
        },
    );
    assert_eq!(second.env, expected);
    assert_eq!(store.snapshot().await, expected);
}

#[tokio::test]
async fn test_empty_store_file_loads_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("local")).unwrap();
    std::fs::write(dir.path().join("local").join("config.json"), "").unwrap();

    let store = open(&dir).await;
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_unparsable_store_file_is_error() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("local")).unwrap();
    std::fs::write(dir.path().join("local").join("config.json"), "{ not json").unwrap();

    assert!(LocalStore::open(dir.path(), KEY, 1).await.is_err());
}
