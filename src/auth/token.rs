use serde::{Deserialize, Serialize};

/// Raw token-endpoint response for a poll or refresh call.
///
/// Only the fields present in the response body are set. A well-formed
/// response carries either an access token or an error code.
///
/// # Example
/// ```
/// use tubelink::auth::{TokenOutcome, TokenResult};
///
/// let result: TokenResult = serde_json::from_str(r#"{"error":"authorization_pending"}"#)?;
/// assert!(matches!(result.outcome(), TokenOutcome::AuthorizationPending));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResult {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub expires_in: Option<u64>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Classification of a [`TokenResult`] for the polling state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenOutcome {
    Authorized {
        access_token: String,
        refresh_token: Option<String>,
    },
    AuthorizationPending,
    SlowDown,
    ExpiredToken,
    Other {
        error: String,
        description: Option<String>,
    },
}

impl TokenResult {
    /// The access token, if one was issued and is non-empty.
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn outcome(&self) -> TokenOutcome {
        if let Some(access_token) = self.access_token() {
            return TokenOutcome::Authorized {
                access_token: access_token.to_string(),
                refresh_token: self.refresh_token.clone(),
            };
        }
        match self.error.as_deref() {
            Some("authorization_pending") => TokenOutcome::AuthorizationPending,
            Some("slow_down") => TokenOutcome::SlowDown,
            Some("expired_token") => TokenOutcome::ExpiredToken,
            Some(other) => TokenOutcome::Other {
                error: other.to_string(),
                description: self.error_description.clone(),
            },
            None => TokenOutcome::Other {
                error: "invalid_response".to_string(),
                description: self
                    .error_description
                    .clone()
                    .or_else(|| Some("Token response missing token and error".to_string())),
            },
        }
    }
}

impl TokenOutcome {
    /// User-facing message for a terminal failure.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            Self::Other { error, description } => {
                Some(description.clone().unwrap_or_else(|| error.clone()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(raw: &str) -> TokenResult {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn access_token_wins_over_error() {
        let result = parse(r#"{"access_token":"ya29.a","refresh_token":"1//r","error":"slow_down"}"#);
        assert_eq!(
            result.outcome(),
            TokenOutcome::Authorized {
                access_token: "ya29.a".to_string(),
                refresh_token: Some("1//r".to_string()),
            }
        );
    }

    #[test]
    fn empty_access_token_is_ignored() {
        let result = parse(r#"{"access_token":"","error":"authorization_pending"}"#);
        assert_eq!(result.outcome(), TokenOutcome::AuthorizationPending);
    }

    #[test]
    fn known_error_codes_classify() {
        assert_eq!(parse(r#"{"error":"slow_down"}"#).outcome(), TokenOutcome::SlowDown);
        assert_eq!(
            parse(r#"{"error":"expired_token"}"#).outcome(),
            TokenOutcome::ExpiredToken
        );
    }

    #[test]
    fn unknown_error_keeps_description() {
        let outcome = parse(r#"{"error":"access_denied","error_description":"Forbidden"}"#).outcome();
        assert_eq!(outcome.failure_message().as_deref(), Some("Forbidden"));

        let bare = parse(r#"{"error":"access_denied"}"#).outcome();
        assert_eq!(bare.failure_message().as_deref(), Some("access_denied"));
    }

    #[test]
    fn empty_body_is_an_invalid_response() {
        let outcome = parse("{}").outcome();
        assert!(matches!(
            outcome,
            TokenOutcome::Other { ref error, .. } if error == "invalid_response"
        ));
    }
}
