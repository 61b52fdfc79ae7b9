//! Integration tests for the directory service
//!
//! Network IO is mocked at the trait level: an in-memory identity provider
//! implements both ports and records every call it receives.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use roster_core::ports::{DirectoryProvider, TokenExchanger};
use roster_core::services::DirectoryService;
use roster_core::{AccessToken, Credentials, Error, Group, OperationResult, Result, User};

// ============================================================================
// Test Helpers
// ============================================================================

/// In-memory identity provider
#[derive(Default)]
struct FakeDirectory {
    token: Option<String>,
    token_status: u16,
    users: Vec<User>,
    users_status: Option<u16>,
    groups: HashMap<String, Vec<Group>>,
    failing_group_user: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeDirectory {
    fn new(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            token_status: 200,
            ..Default::default()
        }
    }

    fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    fn with_groups(mut self, user_id: &str, groups: Vec<Group>) -> Self {
        self.groups.insert(user_id.to_string(), groups);
        self
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn check_token(&self, token: &AccessToken) {
        assert_eq!(Some(token.secret()), self.token.as_deref(), "unexpected bearer token");
    }
}

impl TokenExchanger for FakeDirectory {
    fn obtain_access_token(&self, credentials: &Credentials) -> Result<AccessToken> {
        self.record(format!("token:{}", credentials.username));
        match (&self.token, self.token_status) {
            (Some(token), 200) => Ok(AccessToken::new(token.clone())),
            (_, status) => Err(Error::Authentication { status }),
        }
    }
}

impl DirectoryProvider for FakeDirectory {
    fn list_users(&self, token: &AccessToken) -> Result<Vec<User>> {
        self.check_token(token);
        self.record("users".to_string());
        match self.users_status {
            Some(status) => Err(Error::directory_fetch("Failed to get users", status)),
            None => Ok(self.users.clone()),
        }
    }

    fn list_user_groups(&self, token: &AccessToken, user_id: &str) -> Result<Vec<Group>> {
        self.check_token(token);
        self.record(format!("groups:{}", user_id));
        if self.failing_group_user.as_deref() == Some(user_id) {
            return Err(Error::directory_fetch("Failed to get user groups", 500));
        }
        Ok(self.groups.get(user_id).cloned().unwrap_or_default())
    }
}

fn credentials() -> Credentials {
    Credentials::new("http://keycloak/auth", "admin-cli", "admin", "admin")
}

fn service(fake: Arc<FakeDirectory>) -> DirectoryService {
    DirectoryService::new(credentials(), fake.clone(), fake)
}

fn user(id: &str, username: &str) -> User {
    User::new(id, username)
}

// ============================================================================
// Token Exchange Tests
// ============================================================================

#[test]
fn test_token_is_returned_verbatim() {
    let fake = Arc::new(FakeDirectory::new("T"));
    let token = service(fake.clone()).obtain_access_token().unwrap();

    assert_eq!(token.secret(), "T");
    assert_eq!(fake.calls(), vec!["token:admin"]);
}

#[test]
fn test_authentication_failure_stops_before_directory_calls() {
    let fake = Arc::new(FakeDirectory {
        token_status: 401,
        ..FakeDirectory::new("T").with_user(user("1", "user1"))
    });

    let err = service(fake.clone()).fetch_users_with_groups().unwrap_err();

    assert!(matches!(err, Error::Authentication { status: 401 }));
    assert_eq!(fake.calls(), vec!["token:admin"]);
}

// ============================================================================
// Orchestration Tests
// ============================================================================

#[test]
fn test_end_to_end_single_user() {
    let fake = Arc::new(
        FakeDirectory::new("tok")
            .with_user(user("1", "user1"))
            .with_groups("1", vec![Group::new("g1", "G1", "/g1")]),
    );

    let users = service(fake.clone()).fetch_users_with_groups().unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].user.id, "1");
    assert_eq!(users[0].user.username, "user1");
    assert!(users[0].user.enabled);
    assert_eq!(users[0].groups, vec![Group::new("g1", "G1", "/g1")]);
    assert_eq!(fake.calls(), vec!["token:admin", "users", "groups:1"]);
}

#[test]
fn test_groups_are_attached_per_user_in_order() {
    let fake = Arc::new(
        FakeDirectory::new("tok")
            .with_user(user("b", "bravo"))
            .with_user(user("a", "alpha"))
            .with_user(user("c", "charlie"))
            .with_groups(
                "a",
                vec![
                    Group::new("g2", "Two", "/two"),
                    Group::new("g1", "One", "/one"),
                    Group::new("g2", "Two", "/two"),
                ],
            )
            .with_groups("b", vec![Group::new("g3", "Three", "/parent/three")]),
    );

    let users = service(fake.clone()).fetch_users_with_groups().unwrap();

    let ids: Vec<&str> = users.iter().map(|u| u.user.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);
    assert_eq!(users[0].groups, vec![Group::new("g3", "Three", "/parent/three")]);
    // Duplicates and order are kept exactly as returned
    assert_eq!(users[1].groups.len(), 3);
    assert_eq!(users[1].groups[0].id, "g2");
    assert!(users[2].groups.is_empty());
    assert_eq!(
        fake.calls(),
        vec!["token:admin", "users", "groups:b", "groups:a", "groups:c"]
    );
}

#[test]
fn test_empty_directory() {
    let fake = Arc::new(FakeDirectory::new("tok"));
    let users = service(fake.clone()).fetch_users_with_groups().unwrap();

    assert!(users.is_empty());
    assert_eq!(fake.calls(), vec!["token:admin", "users"]);
}

#[test]
fn test_users_404_never_calls_groups() {
    let fake = Arc::new(FakeDirectory {
        users_status: Some(404),
        ..FakeDirectory::new("tok").with_user(user("1", "user1"))
    });

    let err = service(fake.clone()).fetch_users_with_groups().unwrap_err();

    match err {
        Error::DirectoryFetch { context, status } => {
            assert_eq!(context, "Failed to get users");
            assert_eq!(status, 404);
        }
        other => panic!("expected directory fetch error, got {:?}", other),
    }
    assert!(!fake.calls().iter().any(|c| c.starts_with("groups:")));
}

#[test]
fn test_group_failure_on_second_of_three_aborts() {
    let fake = Arc::new(FakeDirectory {
        failing_group_user: Some("2".to_string()),
        ..FakeDirectory::new("tok")
            .with_user(user("1", "user1"))
            .with_user(user("2", "user2"))
            .with_user(user("3", "user3"))
            .with_groups("1", vec![Group::new("g1", "G1", "/g1")])
    });

    let result = service(fake.clone()).fetch_users_with_groups();

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "Failed to get user groups: HTTP 500");
    assert_eq!(
        fake.calls(),
        vec!["token:admin", "users", "groups:1", "groups:2"]
    );
}

#[test]
fn test_operation_result_shape() {
    let fake = Arc::new(FakeDirectory {
        users_status: Some(403),
        ..FakeDirectory::new("tok")
    });

    let report: OperationResult<_> = service(fake).fetch_users_with_groups().into();

    assert!(!report.success);
    assert!(report.data.is_none());
    assert_eq!(report.error.as_deref(), Some("Failed to get users: HTTP 403"));
}

#[test]
fn test_each_run_reauthenticates() {
    let fake = Arc::new(FakeDirectory::new("tok").with_user(user("1", "user1")));
    let service = service(fake.clone());

    service.fetch_users_with_groups().unwrap();
    service.fetch_users_with_groups().unwrap();

    let token_calls = fake.calls().iter().filter(|c| c.starts_with("token:")).count();
    assert_eq!(token_calls, 2);
}
