//! Error types for tubelink.

use thiserror::Error;

use crate::auth::AuthError;

/// Primary error type for all tubelink operations.
#[derive(Error, Debug)]
pub enum TubeError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Auth(AuthError),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TubeError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Whether the error means the stored credential is missing or unusable.
    pub fn is_unauthenticated(&self) -> bool {
        match self {
            Self::Auth(AuthError::NotLoggedIn | AuthError::NoRefreshToken) => true,
            Self::Auth(AuthError::Rejected { .. }) => true,
            Self::Api { status, .. } => *status == 401,
            _ => false,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TubeError>;
