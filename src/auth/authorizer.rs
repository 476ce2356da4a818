use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::auth::device_code::DeviceCodeGrant;
use crate::auth::error::AuthError;
use crate::auth::token::TokenResult;
use crate::config::OAuthConfig;

const DEVICE_CODE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// The three calls the device-code flow makes against the identity provider.
///
/// Implementations never retry and never cache credentials; retry policy
/// belongs to [`PollingController`](super::PollingController) and persistence
/// to the caller.
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// Request a fresh device code and user code.
    async fn request_device_code(&self) -> Result<DeviceCodeGrant, AuthError>;

    /// Poll the token endpoint once.
    ///
    /// Error bodies are parsed rather than rejected: `authorization_pending`
    /// normally arrives with a non-200 status.
    async fn poll_for_token(
        &self,
        device_code: &str,
        interval: u64,
    ) -> Result<TokenResult, AuthError>;

    /// Exchange a refresh token for a new access token.
    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResult, AuthError>;
}

/// Google OAuth 2.0 device authorization grant client (RFC 8628).
///
/// # Example
/// ```no_run
/// use tubelink::auth::{DeviceCodeAuthorizer, TokenEndpoint};
/// use tubelink::config::OAuthConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = OAuthConfig::new("id.apps.googleusercontent.com", "secret");
/// let authorizer = DeviceCodeAuthorizer::new(reqwest::Client::new(), &config);
/// let grant = authorizer.request_device_code().await?;
/// println!("Visit {} and enter {}", grant.verification_url, grant.user_code);
/// # Ok(())
/// # }
/// ```
pub struct DeviceCodeAuthorizer {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    scope: String,
    device_code_url: String,
    token_url: String,
}

impl DeviceCodeAuthorizer {
    pub fn new(client: reqwest::Client, config: &OAuthConfig) -> Self {
        Self {
            client,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope.clone(),
            device_code_url: config.device_code_url.clone(),
            token_url: config.token_url.clone(),
        }
    }

    pub fn with_device_code_url(mut self, url: impl Into<String>) -> Self {
        self.device_code_url = url.into();
        self
    }

    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
    ) -> Result<(StatusCode, String), AuthError> {
        let resp = self
            .client
            .post(url)
            .header(ACCEPT, "application/json")
            .form(form)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl TokenEndpoint for DeviceCodeAuthorizer {
    async fn request_device_code(&self) -> Result<DeviceCodeGrant, AuthError> {
        tracing::debug!(url = %self.device_code_url, "requesting device code");
        let (status, body) = self
            .post_form(
                &self.device_code_url,
                &[
                    ("client_id", self.client_id.as_str()),
                    ("scope", self.scope.as_str()),
                ],
            )
            .await?;
        if status != StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "device code request rejected");
            return Err(AuthError::Protocol(format!(
                "Failed to get device code: HTTP {} - {body}",
                status.as_u16()
            )));
        }
        let grant: DeviceCodeGrant = parse_body(&body, "device code")?;
        tracing::debug!(
            user_code = %grant.user_code,
            expires_in = grant.expires_in,
            interval = grant.interval,
            "device code received"
        );
        Ok(grant)
    }

    async fn poll_for_token(
        &self,
        device_code: &str,
        interval: u64,
    ) -> Result<TokenResult, AuthError> {
        let (status, body) = self
            .post_form(
                &self.token_url,
                &[
                    ("client_id", self.client_id.as_str()),
                    ("client_secret", self.client_secret.as_str()),
                    ("device_code", device_code),
                    ("grant_type", DEVICE_CODE_GRANT_TYPE),
                ],
            )
            .await?;
        tracing::trace!(status = status.as_u16(), interval, "token poll answered");
        parse_body(&body, "token")
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResult, AuthError> {
        let (status, body) = self
            .post_form(
                &self.token_url,
                &[
                    ("client_id", self.client_id.as_str()),
                    ("client_secret", self.client_secret.as_str()),
                    ("refresh_token", refresh_token),
                    ("grant_type", "refresh_token"),
                ],
            )
            .await?;
        if status != StatusCode::OK {
            tracing::warn!(status = status.as_u16(), "token refresh rejected");
            return Err(AuthError::Protocol(format!(
                "Failed to refresh token: HTTP {} - {body}",
                status.as_u16()
            )));
        }
        parse_body(&body, "refresh token")
    }
}

fn parse_body<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, AuthError> {
    serde_json::from_str(body).map_err(|e| {
        AuthError::Protocol(format!(
            "Failed to parse {what} response: {e} - Response: {body}"
        ))
    })
}
