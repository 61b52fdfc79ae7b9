//! User domain model

use serde::{Deserialize, Serialize};

use super::Group;

/// A user record as listed by the admin users endpoint
///
/// Name and email attributes are optional in the directory: a missing or null
/// attribute stays `None`, which is distinct from an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub enabled: bool,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            first_name: None,
            last_name: None,
            email: None,
            enabled: true,
        }
    }

    /// Attach the result of one group lookup, producing the enriched record
    pub fn with_groups(self, groups: Vec<Group>) -> UserWithGroups {
        UserWithGroups { user: self, groups }
    }
}

/// A user together with the groups returned by its group lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWithGroups {
    #[serde(flatten)]
    pub user: User,
    pub groups: Vec<Group>,
}

impl UserWithGroups {
    pub fn has_groups(&self) -> bool {
        !self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new("user-123", "jdoe");
        assert_eq!(user.id, "user-123");
        assert_eq!(user.username, "jdoe");
        assert!(user.enabled);
        assert!(user.email.is_none());
    }

    #[test]
    fn test_deserialize_full_user() {
        let json = r#"{
            "id": "1",
            "username": "user1",
            "firstName": "John",
            "lastName": "Doe",
            "email": "john.doe@example.com",
            "enabled": true
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.first_name.as_deref(), Some("John"));
        assert_eq!(user.last_name.as_deref(), Some("Doe"));
        assert_eq!(user.email.as_deref(), Some("john.doe@example.com"));
        assert!(user.enabled);
    }

    #[test]
    fn test_absent_and_empty_names_are_distinct() {
        let absent: User = serde_json::from_str(r#"{"id":"1","username":"a","enabled":true}"#).unwrap();
        let null: User =
            serde_json::from_str(r#"{"id":"2","username":"b","firstName":null,"enabled":true}"#).unwrap();
        let empty: User =
            serde_json::from_str(r#"{"id":"3","username":"c","firstName":"","enabled":true}"#).unwrap();

        assert_eq!(absent.first_name, None);
        assert_eq!(null.first_name, None);
        assert_eq!(empty.first_name, Some(String::new()));
    }

    #[test]
    fn test_ignores_unknown_fields() {
        let json = r#"{"id":"1","username":"a","enabled":false,"emailVerified":true,"createdTimestamp":1700000000000}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.enabled);
    }

    #[test]
    fn test_with_groups_keeps_order() {
        let groups = vec![
            Group::new("g2", "Second", "/second"),
            Group::new("g1", "First", "/first"),
        ];
        let enriched = User::new("1", "user1").with_groups(groups.clone());
        assert_eq!(enriched.user.id, "1");
        assert_eq!(enriched.groups, groups);
        assert!(enriched.has_groups());
    }

    #[test]
    fn test_enriched_serializes_flat() {
        let enriched = User::new("1", "user1").with_groups(vec![Group::new("g1", "G1", "/g1")]);
        let value = serde_json::to_value(&enriched).unwrap();
        assert_eq!(value["id"], "1");
        assert_eq!(value["username"], "user1");
        assert_eq!(value["groups"][0]["path"], "/g1");
    }
}
