//! Integration tests for credential persistence and config file resolution.

use std::collections::HashMap;
use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use tubelink::auth::{CredentialStore, CredentialStoreConfig, FileCredentialStore, StoredCredential};
use tubelink::config::{OAuthConfig, DEFAULT_TOKEN_URL};
use tubelink::error::TubeError;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn temp_store() -> (TempDir, FileCredentialStore) {
    let dir = TempDir::new().expect("tempdir");
    let store = FileCredentialStore::new(CredentialStoreConfig::new(dir.path().to_path_buf()));
    (dir, store)
}

fn no_env(_: &str) -> Option<String> {
    None
}

// ---------------------------------------------------------------------------
// 1. Credential store
// ---------------------------------------------------------------------------

#[test]
fn store_round_trip_preserves_both_tokens() {
    let (_dir, store) = temp_store();
    let original = StoredCredential::new("ya29.access", Some("1//refresh".to_string()));

    store.save(&original).expect("save should succeed");

    let loaded = store
        .load()
        .expect("load should succeed")
        .expect("credential should exist");
    assert_eq!(loaded, original);
    assert_eq!(store.access_token().unwrap().as_deref(), Some("ya29.access"));
    assert_eq!(store.refresh_token().unwrap().as_deref(), Some("1//refresh"));
}

#[test]
fn store_without_refresh_token_is_still_logged_in() {
    let (_dir, store) = temp_store();
    store.save(&StoredCredential::new("ya29.only", None)).unwrap();

    assert!(store.is_logged_in());
    assert_eq!(store.refresh_token().unwrap(), None);
}

#[test]
fn store_is_shared_between_instances() {
    let (dir, store) = temp_store();
    store.save(&StoredCredential::new("ya29.shared", None)).unwrap();

    let other = FileCredentialStore::new(CredentialStoreConfig::new(dir.path().to_path_buf()));
    assert_eq!(other.access_token().unwrap().as_deref(), Some("ya29.shared"));
}

#[test]
fn store_load_missing_returns_none() {
    let (_dir, store) = temp_store();
    assert!(store.load().expect("load should succeed").is_none());
    assert!(!store.is_logged_in());
}

#[test]
fn store_clear_removes_credential() {
    let (_dir, store) = temp_store();
    store.save(&StoredCredential::new("tok", None)).unwrap();
    assert!(store.is_logged_in());

    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
    assert!(!store.path().exists());
}

#[test]
fn store_clear_missing_is_noop() {
    let (_dir, store) = temp_store();
    store.clear().unwrap();
}

#[test]
fn store_scopes_are_isolated() {
    let dir = TempDir::new().unwrap();
    let main = FileCredentialStore::new(CredentialStoreConfig::new(dir.path().to_path_buf()));
    let other = FileCredentialStore::new(
        CredentialStoreConfig::new(dir.path().to_path_buf()).with_scope("Work Account"),
    );

    main.save(&StoredCredential::new("main", None)).unwrap();

    assert!(other.load().unwrap().is_none());
    assert_eq!(
        other.path().file_name().and_then(|n| n.to_str()),
        Some("work-account.toml")
    );
}

#[test]
fn store_creates_missing_directories() {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("a").join("b");
    let store = FileCredentialStore::new(CredentialStoreConfig::new(nested.clone()));

    store.save(&StoredCredential::new("tok", None)).unwrap();

    assert!(nested.join("youtube_auth.toml").exists());
}

#[test]
fn store_rejects_corrupt_file() {
    let (_dir, store) = temp_store();
    fs::write(store.path(), "this is = not [valid").unwrap();

    assert!(store.load().is_err());
    assert!(!store.is_logged_in());
}

// ---------------------------------------------------------------------------
// 2. Config file resolution
// ---------------------------------------------------------------------------

#[test]
fn config_file_supplies_client_registration() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("oauth.toml");
    fs::write(
        &path,
        r#"
[oauth]
client_id = "file-id.apps.googleusercontent.com"
client_secret = "file-secret"
"#,
    )
    .unwrap();

    let config = OAuthConfig::resolve(Some(&path), no_env).unwrap();

    assert_eq!(config.client_id, "file-id.apps.googleusercontent.com");
    assert_eq!(config.client_secret, "file-secret");
    assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
}

#[test]
fn config_env_overrides_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("oauth.toml");
    fs::write(
        &path,
        "[oauth]\nclient_id = \"file-id\"\nclient_secret = \"file-secret\"\n",
    )
    .unwrap();
    let env: HashMap<&str, &str> = HashMap::from([
        ("TUBELINK_CLIENT_ID", "env-id"),
        ("TUBELINK_TOKEN_URL", "http://127.0.0.1:9/token"),
    ]);

    let config =
        OAuthConfig::resolve(Some(&path), |key| env.get(key).map(|v| v.to_string())).unwrap();

    assert_eq!(config.client_id, "env-id");
    assert_eq!(config.client_secret, "file-secret");
    assert_eq!(config.token_url, "http://127.0.0.1:9/token");
}

#[test]
fn config_missing_file_and_env_is_configuration_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = OAuthConfig::resolve(Some(&path), no_env).unwrap_err();

    match err {
        TubeError::Configuration(message) => {
            assert!(message.contains("TUBELINK_CLIENT_ID"), "{message}");
            assert!(message.contains("absent.toml"), "{message}");
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn config_unknown_key_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("oauth.toml");
    fs::write(&path, "[oauth]\nclient_idd = \"typo\"\n").unwrap();

    let err = OAuthConfig::resolve(Some(&path), no_env).unwrap_err();
    assert!(matches!(err, TubeError::Configuration(ref m) if m.contains("Invalid config file")));
}
