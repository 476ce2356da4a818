//! HTTP client construction and Google API error helpers.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;

use crate::error::TubeError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Build an HTTP client to be shared by the authorizer and the API client.
///
/// The client is an owned value; callers clone it (cheap, reference counted)
/// into every service that needs it.
pub fn build_client() -> Result<reqwest::Client, TubeError> {
    build_client_with_timeout(DEFAULT_TIMEOUT)
}

pub fn build_client_with_timeout(timeout: Duration) -> Result<reqwest::Client, TubeError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("tubelink/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(4)
        .build()?;
    Ok(client)
}

/// Default headers for a Bearer-token JSON API.
pub fn bearer_headers(access_token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {access_token}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Convert a failed Data API response into a [`TubeError::Api`].
///
/// Uses `error.message` from the Google error envelope when present.
pub fn status_to_error(status: u16, body: &str) -> TubeError {
    let message = serde_json::from_str::<GoogleErrorEnvelope>(body)
        .ok()
        .and_then(|env| env.error.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.to_string());
    TubeError::api(status, message)
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_headers_set_authorization() {
        let headers = bearer_headers("ya29.token");
        assert_eq!(headers[AUTHORIZATION], "Bearer ya29.token");
        assert_eq!(headers[ACCEPT], "application/json");
    }

    #[test]
    fn status_to_error_uses_google_message() {
        let body = r#"{"error":{"code":403,"message":"The request cannot be completed because you have exceeded your quota."}}"#;
        match status_to_error(403, body) {
            TubeError::Api { status, message } => {
                assert_eq!(status, 403);
                assert!(message.starts_with("The request cannot be completed"));
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[test]
    fn status_to_error_falls_back_to_body() {
        match status_to_error(502, "Bad Gateway") {
            TubeError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("expected api error, got {other:?}"),
        }
    }
}
