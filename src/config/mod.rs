//! Configuration system (layered: code > env > `oauth.toml`).

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::TubeError;

/// Read-only YouTube scope requested by the device-code flow.
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/youtube.readonly";
pub const DEFAULT_DEVICE_CODE_URL: &str = "https://oauth2.googleapis.com/device/code";
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

const CONFIG_FILE_NAME: &str = "oauth.toml";

/// OAuth client registration and endpoint configuration.
///
/// Resolution order for every field:
/// 1. Values set in code (`with_*` builders after loading)
/// 2. `TUBELINK_*` environment variables (a `.env` file is honored)
/// 3. The `[oauth]` table of `~/.tubelink/oauth.toml`
/// 4. Built-in defaults (endpoints and scope only)
///
/// # Example
/// ```
/// use tubelink::config::OAuthConfig;
///
/// let config = OAuthConfig::new("client-id.apps.googleusercontent.com", "secret")
///     .with_token_url("http://127.0.0.1:8080/token");
/// assert_eq!(config.token_url, "http://127.0.0.1:8080/token");
/// ```
#[derive(Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub scope: String,
    pub device_code_url: String,
    pub token_url: String,
    pub api_base_url: String,
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"..")
            .field("scope", &self.scope)
            .field("device_code_url", &self.device_code_url)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl OAuthConfig {
    /// Create a config with the given client registration and default endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: DEFAULT_SCOPE.to_string(),
            device_code_url: DEFAULT_DEVICE_CODE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.device_code_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Default config file path (`~/.tubelink/oauth.toml`).
    pub fn default_path() -> PathBuf {
        default_tubelink_dir().join(CONFIG_FILE_NAME)
    }

    /// Load from the process environment and the default config file.
    pub fn load() -> Result<Self, TubeError> {
        Self::load_from_path(Self::default_path())
    }

    /// Load from the process environment and a specific config file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, TubeError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::resolve(Some(path.as_ref()), |key| std::env::var(key).ok())
    }

    /// Resolve a config from an optional file and an environment lookup.
    ///
    /// A missing file is treated as empty. Missing client credentials after
    /// all layers are applied is a configuration error naming the file.
    pub fn resolve<F>(path: Option<&Path>, env: F) -> Result<Self, TubeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match path {
            Some(path) => read_config_file(path)?,
            None => OAuthSection::default(),
        };
        let pick = |var: &str, from_file: Option<String>| {
            env(var).filter(|v| !v.trim().is_empty()).or(from_file)
        };
        let display_path = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| CONFIG_FILE_NAME.to_string());

        let client_id = pick("TUBELINK_CLIENT_ID", file.client_id).ok_or_else(|| {
            TubeError::Configuration(format!(
                "OAuth client id not configured; set TUBELINK_CLIENT_ID or create {display_path}"
            ))
        })?;
        let client_secret =
            pick("TUBELINK_CLIENT_SECRET", file.client_secret).ok_or_else(|| {
                TubeError::Configuration(format!(
                    "OAuth client secret not configured; set TUBELINK_CLIENT_SECRET or create {display_path}"
                ))
            })?;

        let mut config = Self::new(client_id, client_secret);
        if let Some(scope) = pick("TUBELINK_SCOPE", file.scope) {
            config.scope = scope;
        }
        if let Some(url) = pick("TUBELINK_DEVICE_CODE_URL", file.device_code_url) {
            config.device_code_url = url;
        }
        if let Some(url) = pick("TUBELINK_TOKEN_URL", file.token_url) {
            config.token_url = url;
        }
        if let Some(url) = pick("TUBELINK_API_BASE_URL", file.api_base_url) {
            config.api_base_url = url;
        }
        tracing::debug!(config = ?config, "OAuth configuration resolved");
        Ok(config)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    oauth: OAuthSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct OAuthSection {
    client_id: Option<String>,
    client_secret: Option<String>,
    scope: Option<String>,
    device_code_url: Option<String>,
    token_url: Option<String>,
    api_base_url: Option<String>,
}

fn read_config_file(path: &Path) -> Result<OAuthSection, TubeError> {
    let raw = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(OAuthSection::default())
        }
        Err(err) => return Err(TubeError::Io(err)),
    };
    let file: ConfigFile = toml::from_str(&raw).map_err(|e| {
        TubeError::Configuration(format!("Invalid config file {}: {e}", path.display()))
    })?;
    Ok(file.oauth)
}

/// Base directory for tubelink state (`~/.tubelink`).
pub fn default_tubelink_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".tubelink"))
        .unwrap_or_else(|| PathBuf::from(".tubelink"))
}
