//! Access token returned by the password grant

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Raw token endpoint response body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub refresh_expires_in: Option<i64>,
}

/// A bearer token for one invocation
///
/// Never cached, persisted or refreshed. Any refresh token in the response is
/// dropped.
#[derive(Clone, Serialize)]
pub struct AccessToken {
    #[serde(skip)]
    secret: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
    pub obtained_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_type: "Bearer".to_string(),
            expires_in: 0,
            refresh_expires_in: 0,
            obtained_at: Utc::now(),
        }
    }

    /// Build a token from a decoded response, if it carries a non-empty `access_token`
    pub fn from_response(response: TokenResponse) -> Option<Self> {
        let secret = response.access_token.filter(|t| !t.is_empty())?;
        Some(Self {
            secret,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_in: response.expires_in.unwrap_or(0),
            refresh_expires_in: response.refresh_expires_in.unwrap_or(0),
            obtained_at: Utc::now(),
        })
    }

    /// The bearer string to put in the `Authorization` header
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Instant the token expires, or `None` if the lifetime is out of range
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        offset(self.obtained_at, self.expires_in)
    }

    pub fn refresh_expires_at(&self) -> Option<DateTime<Utc>> {
        offset(self.obtained_at, self.refresh_expires_in)
    }
}

fn offset(from: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    from.checked_add_signed(TimeDelta::try_seconds(secs)?)
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_expires_in", &self.refresh_expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_full_response() {
        let json = r#"{
            "access_token": "T",
            "token_type": "Bearer",
            "expires_in": 60,
            "refresh_token": "R",
            "refresh_expires_in": 1800
        }"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        let token = AccessToken::from_response(response).unwrap();

        assert_eq!(token.secret(), "T");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 60);
        assert_eq!(token.refresh_expires_in, 1800);
        assert_eq!(
            token.expires_at().unwrap() - token.obtained_at,
            TimeDelta::seconds(60)
        );
    }

    #[test]
    fn test_null_lifetimes_default_to_zero() {
        let json = r#"{"access_token":"T","expires_in":null,"refresh_expires_in":null}"#;
        let response: TokenResponse = serde_json::from_str(json).unwrap();
        let token = AccessToken::from_response(response).unwrap();

        assert_eq!(token.secret(), "T");
        assert_eq!(token.expires_in, 0);
        assert_eq!(token.refresh_expires_in, 0);
        assert_eq!(token.expires_at(), Some(token.obtained_at));
    }

    #[test]
    fn test_out_of_range_lifetime_has_no_expiry() {
        let mut token = AccessToken::new("T");
        token.expires_in = i64::MAX;
        token.refresh_expires_in = i64::MIN;

        assert_eq!(token.expires_at(), None);
        assert_eq!(token.refresh_expires_at(), None);
    }

    #[test]
    fn test_missing_access_token() {
        let response: TokenResponse = serde_json::from_str(r#"{"token_type":"Bearer"}"#).unwrap();
        assert!(AccessToken::from_response(response).is_none());

        let response: TokenResponse = serde_json::from_str(r#"{"access_token":""}"#).unwrap();
        assert!(AccessToken::from_response(response).is_none());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let token = AccessToken::new("super-secret");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_serialize_omits_secret() {
        let token = AccessToken::new("super-secret");
        let json = serde_json::to_string(&token).unwrap();
        assert!(!json.contains("super-secret"));
        assert!(json.contains("token_type"));
    }
}
