//! Roster Core - identity directory reporting
//!
//! This crate implements the core logic following hexagonal architecture:
//!
//! - **domain**: Core entities (User, Group, AccessToken, Credentials)
//! - **ports**: Trait definitions for external dependencies (TokenExchanger, DirectoryProvider)
//! - **services**: Orchestration of the token -> users -> groups flow
//! - **adapters**: Concrete implementations (Keycloak HTTP client)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use adapters::keycloak::KeycloakClient;
use config::Config;
use services::DirectoryService;

// Re-export commonly used types at crate root
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{AccessToken, Credentials, Group, User, UserWithGroups};

/// Main context for Roster operations
///
/// Holds the effective configuration and the directory service wired to the
/// Keycloak client. Building a context performs no network IO; each call
/// re-authenticates.
pub struct RosterContext {
    pub config: Config,
    pub directory_service: DirectoryService,
}

impl RosterContext {
    /// Create a context from an already loaded configuration
    pub fn new(config: Config) -> Result<Self> {
        let credentials = config.credentials()?;
        let client = Arc::new(KeycloakClient::from_config(&config)?);
        let directory_service = DirectoryService::new(credentials, client.clone(), client);

        Ok(Self {
            config,
            directory_service,
        })
    }

    /// Load configuration from the roster directory and create a context
    pub fn load(roster_dir: &Path) -> Result<Self> {
        Self::new(Config::load(roster_dir)?)
    }

    /// Exchange the configured credentials for a token
    pub fn obtain_access_token(&self) -> Result<AccessToken> {
        self.directory_service.obtain_access_token()
    }

    /// Fetch all users with their groups
    pub fn fetch_users_with_groups(&self) -> Result<Vec<UserWithGroups>> {
        self.directory_service.fetch_users_with_groups()
    }

    /// Same as [`fetch_users_with_groups`](Self::fetch_users_with_groups), flattened
    /// into a success flag plus data or error message
    pub fn report(&self) -> OperationResult<Vec<UserWithGroups>> {
        self.fetch_users_with_groups().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_requires_credentials() {
        let err = RosterContext::new(Config::default()).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_context_requires_users_url() {
        let mut config = Config::default();
        config.set("authUrl", "http://keycloak/auth").unwrap();
        config.set("clientId", "admin-cli").unwrap();
        config.set("username", "admin").unwrap();
        config.set("password", "admin").unwrap();

        let err = RosterContext::new(config).err().unwrap();
        assert!(err.to_string().contains("usersUrl"));
    }
}
