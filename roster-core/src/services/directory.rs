//! Directory service - token exchange, user listing and group enrichment

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::result::Result;
use crate::domain::{AccessToken, Credentials, UserWithGroups};
use crate::ports::{DirectoryProvider, TokenExchanger};

/// Orchestrates the token -> users -> groups-per-user flow
///
/// Strictly sequential: one token request, one users request, then one group
/// lookup per user in list order. The first failure aborts the whole run and
/// nothing enriched so far is returned.
pub struct DirectoryService {
    credentials: Credentials,
    exchanger: Arc<dyn TokenExchanger>,
    directory: Arc<dyn DirectoryProvider>,
}

impl DirectoryService {
    pub fn new(
        credentials: Credentials,
        exchanger: Arc<dyn TokenExchanger>,
        directory: Arc<dyn DirectoryProvider>,
    ) -> Self {
        Self {
            credentials,
            exchanger,
            directory,
        }
    }

    /// Run only the credential exchange
    pub fn obtain_access_token(&self) -> Result<AccessToken> {
        let token = self.exchanger.obtain_access_token(&self.credentials)?;
        info!("Successfully obtained access token");
        Ok(token)
    }

    /// Fetch every user and attach its group memberships
    pub fn fetch_users_with_groups(&self) -> Result<Vec<UserWithGroups>> {
        let token = self.obtain_access_token()?;

        let users = self.directory.list_users(&token)?;
        info!("Found {} users", users.len());

        let mut enriched = Vec::with_capacity(users.len());
        for user in users {
            let groups = self.directory.list_user_groups(&token, &user.id)?;
            debug!(user_id = %user.id, groups = groups.len(), "fetched user groups");
            enriched.push(user.with_groups(groups));
        }

        Ok(enriched)
    }
}
