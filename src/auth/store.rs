use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AuthError;

/// Scope name used when none is configured.
pub const DEFAULT_SCOPE: &str = "youtube_auth";

/// Persisted OAuth credential pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredential {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl StoredCredential {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }
}

/// Synchronous key-value storage for the signed-in credential.
///
/// Implementations never validate tokens; expiry is discovered by the API
/// layer when a request fails.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<StoredCredential>, AuthError>;
    fn save(&self, credential: &StoredCredential) -> Result<(), AuthError>;
    fn clear(&self) -> Result<(), AuthError>;

    fn access_token(&self) -> Result<Option<String>, AuthError> {
        Ok(self.load()?.map(|c| c.access_token))
    }

    fn refresh_token(&self) -> Result<Option<String>, AuthError> {
        Ok(self.load()?.and_then(|c| c.refresh_token))
    }

    fn is_logged_in(&self) -> bool {
        matches!(self.access_token(), Ok(Some(_)))
    }
}

/// Configuration for file-backed credential storage.
#[derive(Debug, Clone)]
pub struct CredentialStoreConfig {
    pub base_dir: PathBuf,
    pub scope: String,
}

impl CredentialStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            scope: DEFAULT_SCOPE.to_string(),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn default_dir() -> PathBuf {
        crate::config::default_tubelink_dir()
    }
}

/// File-backed credential store writing one TOML file per scope.
///
/// # Example
/// ```no_run
/// use tubelink::auth::{CredentialStore, FileCredentialStore, StoredCredential};
///
/// let store = FileCredentialStore::new_default();
/// store.save(&StoredCredential::new("ya29.access", Some("1//refresh".to_string())))?;
/// assert!(store.is_logged_in());
/// # Ok::<(), tubelink::auth::AuthError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
    scope: String,
}

impl FileCredentialStore {
    pub fn new(config: CredentialStoreConfig) -> Self {
        let scope = normalize_scope(&config.scope);
        Self {
            path: config.base_dir.join(format!("{scope}.toml")),
            scope,
        }
    }

    pub fn new_default() -> Self {
        Self::new(CredentialStoreConfig::new(CredentialStoreConfig::default_dir()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(path: &Path) -> Result<(), AuthError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<StoredCredential>, AuthError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        let file: CredentialFile = toml::from_str(&raw)?;
        Ok(Some(file.credential))
    }

    fn save(&self, credential: &StoredCredential) -> Result<(), AuthError> {
        Self::ensure_parent(&self.path)?;
        let file = CredentialFile {
            version: 1,
            scope: self.scope.clone(),
            credential: credential.clone(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&self.path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600))?;
        }
        tracing::debug!(scope = %self.scope, "credential saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AuthError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialFile {
    version: u32,
    scope: String,
    credential: StoredCredential,
    saved_at: DateTime<Utc>,
}

fn normalize_scope(value: &str) -> String {
    let trimmed = value.trim();
    let out: String = trimmed
        .chars()
        .map(|ch| {
            let lower = ch.to_ascii_lowercase();
            if lower.is_ascii_alphanumeric() || lower == '-' || lower == '_' {
                lower
            } else {
                '-'
            }
        })
        .collect();
    if out.trim_matches(|c| c == '-' || c == '_').is_empty() {
        DEFAULT_SCOPE.to_string()
    } else {
        out
    }
}
