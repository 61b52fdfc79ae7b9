//! Identity provider ports
//!
//! Defines the interface for exchanging credentials for a token and for
//! reading users and their group memberships from an admin directory API.

use crate::domain::result::Result;
use crate::domain::{AccessToken, Credentials, Group, User};

/// Credential/token exchange trait
///
/// Implementations perform a single password-grant request. No caching, no
/// refresh, no retry.
pub trait TokenExchanger: Send + Sync {
    /// Exchange credentials for a bearer token
    ///
    /// # Errors
    /// * `Error::Authentication` - the endpoint answered without a usable token
    /// * `Error::Transport` - the endpoint could not be reached
    fn obtain_access_token(&self, credentials: &Credentials) -> Result<AccessToken>;
}

/// Directory read trait
///
/// The DirectoryService uses this trait to list users and their groups
/// without knowing how the directory is reached.
pub trait DirectoryProvider: Send + Sync {
    /// List every user visible to the token, in directory order
    fn list_users(&self, token: &AccessToken) -> Result<Vec<User>>;

    /// List the groups a single user belongs to
    ///
    /// # Arguments
    /// * `user_id` - Directory id of the user (not the username)
    fn list_user_groups(&self, token: &AccessToken, user_id: &str) -> Result<Vec<Group>>;
}
