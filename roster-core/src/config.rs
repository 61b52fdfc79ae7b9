//! Configuration management
//!
//! Settings live in `settings.json` inside the roster directory:
//! ```json
//! {
//!   "keycloak": {
//!     "authUrl": "http://localhost:8080/realms/master/protocol/openid-connect/token",
//!     "usersUrl": "http://localhost:8080/admin/realms/master/users",
//!     "clientId": "admin-cli",
//!     "username": "admin",
//!     "password": "admin",
//!     "realm": "master"
//!   },
//!   "http": { "requestTimeoutSecs": 30 },
//!   "server": { "bind": "127.0.0.1:8081" }
//! }
//! ```
//!
//! Every value can be overridden through a `ROSTER_*` environment variable.
//! Overrides are never written back by [`Config::save`].

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::result::{Error, Result};
use crate::domain::Credentials;

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default listen address for `roster serve`
pub const DEFAULT_BIND: &str = "127.0.0.1:8081";

/// Settings keys accepted by [`Config::set`]
pub const SETTABLE_KEYS: &[&str] = &[
    "authUrl",
    "usersUrl",
    "clientId",
    "username",
    "password",
    "realm",
    "requestTimeoutSecs",
    "bind",
];

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    keycloak: KeycloakSettings,
    #[serde(default)]
    http: HttpSettings,
    #[serde(default)]
    server: ServerSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeycloakSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    users_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    realm: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HttpSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    bind: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Roster configuration (effective view of settings plus environment)
#[derive(Clone)]
pub struct Config {
    pub auth_url: Option<String>,
    pub users_url: Option<String>,
    pub client_id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub realm: Option<String>,
    pub request_timeout_secs: u64,
    pub bind: String,
    // Raw file contents, without environment overrides, for saving
    raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_settings(SettingsFile::default(), |_| None)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("auth_url", &self.auth_url)
            .field("users_url", &self.users_url)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("realm", &self.realm)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("bind", &self.bind)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load config from the roster directory, then apply `ROSTER_*` overrides
    pub fn load(roster_dir: &Path) -> Result<Self> {
        Self::load_with_env(roster_dir, |key| std::env::var(key).ok())
    }

    /// Load config with a custom environment lookup
    pub fn load_with_env<F>(roster_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = Self::read_settings(&roster_dir.join("settings.json"))?;
        Ok(Self::from_settings(raw, env))
    }

    fn read_settings(settings_path: &Path) -> Result<SettingsFile> {
        if !settings_path.exists() {
            return Ok(SettingsFile::default());
        }
        let content = std::fs::read_to_string(settings_path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::config(format!("Invalid {}: {}", settings_path.display(), e))
        })
    }

    fn from_settings<F>(raw: SettingsFile, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |var: &str, file_value: &Option<String>| {
            non_empty(env(var)).or_else(|| non_empty(file_value.clone()))
        };

        let request_timeout_secs = env("ROSTER_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .or(raw.http.request_timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        Self {
            auth_url: pick("ROSTER_AUTH_URL", &raw.keycloak.auth_url),
            users_url: pick("ROSTER_USERS_URL", &raw.keycloak.users_url),
            client_id: pick("ROSTER_CLIENT_ID", &raw.keycloak.client_id),
            username: pick("ROSTER_USERNAME", &raw.keycloak.username),
            // Passwords may legitimately contain only whitespace
            password: env("ROSTER_PASSWORD").or_else(|| raw.keycloak.password.clone()),
            realm: pick("ROSTER_REALM", &raw.keycloak.realm),
            request_timeout_secs,
            bind: pick("ROSTER_BIND", &raw.server.bind).unwrap_or_else(|| DEFAULT_BIND.to_string()),
            raw_settings: raw,
        }
    }

    /// Save config to the roster directory
    ///
    /// Only values changed through [`Config::set`] are written; settings the
    /// file already holds but Roster does not manage are preserved.
    pub fn save(&self, roster_dir: &Path) -> Result<()> {
        let settings_path = roster_dir.join("settings.json");

        let mut settings = Self::read_settings(&settings_path)?;
        settings.keycloak.auth_url = self.raw_settings.keycloak.auth_url.clone();
        settings.keycloak.users_url = self.raw_settings.keycloak.users_url.clone();
        settings.keycloak.client_id = self.raw_settings.keycloak.client_id.clone();
        settings.keycloak.username = self.raw_settings.keycloak.username.clone();
        settings.keycloak.password = self.raw_settings.keycloak.password.clone();
        settings.keycloak.realm = self.raw_settings.keycloak.realm.clone();
        settings.http.request_timeout_secs = self.raw_settings.http.request_timeout_secs;
        settings.server.bind = self.raw_settings.server.bind.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Set a single setting by its settings.json key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let text = Some(value.to_string());
        match key {
            "authUrl" => {
                self.raw_settings.keycloak.auth_url = text.clone();
                self.auth_url = non_empty(text);
            }
            "usersUrl" => {
                self.raw_settings.keycloak.users_url = text.clone();
                self.users_url = non_empty(text);
            }
            "clientId" => {
                self.raw_settings.keycloak.client_id = text.clone();
                self.client_id = non_empty(text);
            }
            "username" => {
                self.raw_settings.keycloak.username = text.clone();
                self.username = non_empty(text);
            }
            "password" => {
                self.raw_settings.keycloak.password = text.clone();
                self.password = text;
            }
            "realm" => {
                self.raw_settings.keycloak.realm = text.clone();
                self.realm = non_empty(text);
            }
            "requestTimeoutSecs" => {
                let secs = value
                    .trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| {
                        Error::config(format!(
                            "requestTimeoutSecs must be a positive integer, got '{}'",
                            value
                        ))
                    })?;
                self.raw_settings.http.request_timeout_secs = Some(secs);
                self.request_timeout_secs = secs;
            }
            "bind" => {
                let addr = value.trim().parse::<SocketAddr>().map_err(|_| {
                    Error::config(format!(
                        "bind must be an address like {}, got '{}'",
                        DEFAULT_BIND, value
                    ))
                })?;
                self.raw_settings.server.bind = Some(addr.to_string());
                self.bind = addr.to_string();
            }
            _ => {
                return Err(Error::config(format!(
                    "Unknown setting '{}'. Available: {}",
                    key,
                    SETTABLE_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    /// Credentials for the password grant
    ///
    /// Fails when the token URL, client id, username or password is missing.
    pub fn credentials(&self) -> Result<Credentials> {
        let token_url = required(&self.auth_url, "authUrl", "ROSTER_AUTH_URL")?;
        let client_id = required(&self.client_id, "clientId", "ROSTER_CLIENT_ID")?;
        let username = required(&self.username, "username", "ROSTER_USERNAME")?;
        let password = self.password.as_deref().ok_or_else(|| {
            Error::config("password is not set (settings key 'password' or ROSTER_PASSWORD)")
        })?;
        Ok(Credentials::new(token_url, client_id, username, password))
    }

    /// Admin users endpoint
    pub fn users_url(&self) -> Result<&str> {
        required(&self.users_url, "usersUrl", "ROSTER_USERS_URL")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn required<'a>(value: &'a Option<String>, key: &str, env_var: &str) -> Result<&'a str> {
    value.as_deref().ok_or_else(|| {
        Error::config(format!(
            "{} is not set (settings key '{}' or {})",
            key, key, env_var
        ))
    })
}
