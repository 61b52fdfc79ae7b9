//! Group domain model

use serde::{Deserialize, Serialize};

/// A group membership as returned by the groups-for-user endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    /// Hierarchical path, e.g. `/engineering/platform`
    pub path: String,
}

impl Group {
    pub fn new(id: impl Into<String>, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_group() {
        let json = r#"{"id":"group1","name":"Group One","path":"/path/to/group1","subGroups":[]}"#;
        let group: Group = serde_json::from_str(json).unwrap();
        assert_eq!(group, Group::new("group1", "Group One", "/path/to/group1"));
    }
}
