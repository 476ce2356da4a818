use thiserror::Error;

use crate::error::TubeError;

/// Errors raised by the device-code authorizer and the credential store.
///
/// Expected polling outcomes (`authorization_pending`, `slow_down`,
/// `expired_token`) are not errors; see [`TokenOutcome`](super::TokenOutcome).
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Not logged in")]
    NotLoggedIn,
    #[error("No refresh token stored")]
    NoRefreshToken,
    #[error("Authorization protocol error: {0}")]
    Protocol(String),
    #[error("Authorization rejected: {}", description.as_deref().unwrap_or(error))]
    Rejected {
        error: String,
        description: Option<String>,
    },
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    /// Whether a failed token poll is retried. Any other error ends the flow.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Protocol(_))
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<AuthError> for TubeError {
    fn from(error: AuthError) -> Self {
        TubeError::Auth(error)
    }
}
