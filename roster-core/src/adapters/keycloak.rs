//! Keycloak admin API client
//!
//! Handles the password-grant token exchange and the admin REST calls used to
//! list users and their group memberships.
//!
//! API Documentation: https://www.keycloak.org/docs-api/latest/rest-api/

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::config::Config;
use crate::domain::result::{Error, Result, USERS_CONTEXT, USER_GROUPS_CONTEXT};
use crate::domain::{AccessToken, Credentials, Group, TokenResponse, User};
use crate::ports::{DirectoryProvider, TokenExchanger};

// =============================================================================
// Keycloak HTTP Client
// =============================================================================

/// Keycloak API client
#[derive(Debug)]
pub struct KeycloakClient {
    client: Client,
    users_url: Url,
    timeout: Duration,
}

impl KeycloakClient {
    /// Create a client for the given admin users endpoint
    ///
    /// `users_url` is the collection URL, e.g.
    /// `http://localhost:8080/admin/realms/master/users`. Group lookups are
    /// issued against `<users_url>/<id>/groups`.
    pub fn new(users_url: &str, timeout: Duration) -> Result<Self> {
        let users_url = parse_http_url(users_url, "usersUrl")?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            users_url,
            timeout,
        })
    }

    /// Create a client from the effective configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.users_url()?, config.request_timeout())
    }

    /// URL of the groups collection for one user
    ///
    /// The id is pushed as a single path segment, so reserved characters are
    /// percent-encoded rather than interpreted as path structure. Empty, `.`
    /// and `..` ids would be collapsed by URL normalization and are rejected.
    pub fn user_groups_url(&self, user_id: &str) -> Result<Url> {
        if matches!(user_id, "" | "." | "..") {
            warn!(user_id, "user id cannot be used as a path segment");
            return Err(Error::InvalidUserId(user_id.to_string()));
        }
        let mut url = self.users_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::config(format!("usersUrl '{}' cannot be a base URL", self.users_url)))?
            .pop_if_empty()
            .push(user_id)
            .push("groups");
        Ok(url)
    }

    /// GET a JSON array from a directory endpoint with the bearer token
    fn get_json_array<T: DeserializeOwned>(
        &self,
        url: &Url,
        token: &AccessToken,
        context: &str,
    ) -> Result<Vec<T>> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(token.secret())
            .send()
            .map_err(|e| self.map_request_error(url.as_str(), e))?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "directory request");

        if status != StatusCode::OK {
            warn!(url = %url, status = status.as_u16(), "{}", context);
            return Err(Error::directory_fetch(context, status.as_u16()));
        }

        self.read_json(url.as_str(), response)
            .map_err(|e| match e {
                BodyError::Transport(e) => e,
                BodyError::Decode(reason) => {
                    warn!(url = %url, %reason, "{}: unexpected response body", context);
                    Error::directory_fetch(context, status.as_u16())
                }
            })
    }

    /// Read and decode a response body, separating transport failures from bad JSON
    fn read_json<T: DeserializeOwned>(
        &self,
        url: &str,
        response: Response,
    ) -> std::result::Result<T, BodyError> {
        let bytes = response
            .bytes()
            .map_err(|e| BodyError::Transport(self.map_request_error(url, e)))?;
        serde_json::from_slice(&bytes).map_err(|e| BodyError::Decode(e.to_string()))
    }

    /// Map request errors to user-friendly transport errors
    fn map_request_error(&self, url: &str, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Transport(format!(
                "Request to {} timed out after {} seconds",
                url,
                self.timeout.as_secs()
            ))
        } else if error.is_connect() {
            Error::Transport(format!("Unable to connect to {}", url))
        } else {
            Error::Transport(format!("Request to {} failed: {}", url, error))
        }
    }
}

/// Failure while reading a successful response body
enum BodyError {
    Transport(Error),
    Decode(String),
}

/// Parse a configured endpoint, accepting only http and https
fn parse_http_url(raw: &str, key: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::config(format!("Invalid {} '{}': {}", key, raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::config(format!(
            "{} must use http or https, got '{}'",
            key, scheme
        ))),
    }
}

impl TokenExchanger for KeycloakClient {
    fn obtain_access_token(&self, credentials: &Credentials) -> Result<AccessToken> {
        let token_url = parse_http_url(&credentials.token_url, "authUrl")?;

        let response = self
            .client
            .post(token_url.clone())
            .form(&credentials.form_fields()[..])
            .send()
            .map_err(|e| self.map_request_error(token_url.as_str(), e))?;

        let status = response.status().as_u16();
        debug!(url = %token_url, status, client_id = %credentials.client_id, "token request");

        if status != 200 {
            warn!(url = %token_url, status, "token endpoint rejected credentials");
            return Err(Error::Authentication { status });
        }

        let body: TokenResponse = match self.read_json(token_url.as_str(), response) {
            Ok(body) => body,
            Err(BodyError::Transport(e)) => return Err(e),
            Err(BodyError::Decode(reason)) => {
                warn!(url = %token_url, %reason, "token response is not valid JSON");
                return Err(Error::Authentication { status });
            }
        };

        AccessToken::from_response(body).ok_or_else(|| {
            warn!(url = %token_url, "token response has no access_token");
            Error::Authentication { status }
        })
    }
}

impl DirectoryProvider for KeycloakClient {
    fn list_users(&self, token: &AccessToken) -> Result<Vec<User>> {
        self.get_json_array(&self.users_url, token, USERS_CONTEXT)
    }

    fn list_user_groups(&self, token: &AccessToken, user_id: &str) -> Result<Vec<Group>> {
        let url = self.user_groups_url(user_id)?;
        self.get_json_array(&url, token, USER_GROUPS_CONTEXT)
    }
}

// =============================================================================
// Tests
// =============================================================================
