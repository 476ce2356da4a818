use std::sync::Arc;

use super::authorizer::TokenEndpoint;
use super::controller::PollingController;
use super::error::AuthError;
use super::store::{CredentialStore, StoredCredential};

/// Credential lifecycle facade: status, refresh, sign-out.
///
/// All I/O decisions (printing, prompting, exit codes) belong to the caller.
/// `AuthService` only returns typed results and errors.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use tubelink::auth::{AuthService, DeviceCodeAuthorizer, FileCredentialStore};
/// use tubelink::config::OAuthConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = OAuthConfig::load()?;
/// let service = AuthService::new(
///     Arc::new(DeviceCodeAuthorizer::new(reqwest::Client::new(), &config)),
///     Arc::new(FileCredentialStore::new_default()),
/// );
/// let fresh = service.refresh_access_token().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AuthService {
    endpoint: Arc<dyn TokenEndpoint>,
    store: Arc<dyn CredentialStore>,
    controller: Arc<PollingController>,
}

impl AuthService {
    pub fn new(endpoint: Arc<dyn TokenEndpoint>, store: Arc<dyn CredentialStore>) -> Self {
        let controller = Arc::new(PollingController::new(endpoint.clone(), store.clone()));
        Self {
            endpoint,
            store,
            controller,
        }
    }

    /// The sign-in controller for this service's store.
    ///
    /// Every call (and every clone of the service) returns the same
    /// controller, so at most one device-code session runs per service.
    pub fn controller(&self) -> Arc<PollingController> {
        self.controller.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.is_logged_in()
    }

    /// The stored credential, or `None` when signed out.
    pub fn status(&self) -> Result<Option<StoredCredential>, AuthError> {
        self.store.load()
    }

    /// The stored access token, or [`AuthError::NotLoggedIn`].
    pub fn access_token(&self) -> Result<String, AuthError> {
        self.store.access_token()?.ok_or(AuthError::NotLoggedIn)
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// The refresh token is kept unchanged; only the access token is
    /// replaced in the store.
    pub async fn refresh_access_token(&self) -> Result<String, AuthError> {
        let credential = self.store.load()?.ok_or(AuthError::NotLoggedIn)?;
        let refresh_token = credential
            .refresh_token
            .clone()
            .ok_or(AuthError::NoRefreshToken)?;

        let result = self.endpoint.refresh_token(&refresh_token).await?;
        let Some(access_token) = result.access_token() else {
            return Err(AuthError::Rejected {
                error: result
                    .error
                    .clone()
                    .unwrap_or_else(|| "invalid_response".to_string()),
                description: result.error_description.clone(),
            });
        };

        let updated = StoredCredential::new(access_token, Some(refresh_token));
        self.store.save(&updated)?;
        tracing::info!("access token refreshed");
        Ok(updated.access_token)
    }

    /// Cancel any sign-in in progress and remove the stored credential.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.controller.sign_out()
    }
}
