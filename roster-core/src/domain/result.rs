//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Context attached to a failed users listing
pub const USERS_CONTEXT: &str = "Failed to get users";

/// Context attached to a failed group lookup
pub const USER_GROUPS_CONTEXT: &str = "Failed to get user groups";

/// Core library error type
///
/// Every variant is terminal for the current invocation. Nothing in the core
/// retries or translates these; they bubble up to the caller as-is.
#[derive(Error, Debug)]
pub enum Error {
    /// The endpoint could not be reached (timeout, refused connection, DNS)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The token endpoint answered with something other than a usable token
    #[error("Failed to get access token: HTTP {status}")]
    Authentication { status: u16 },

    /// The users or groups endpoint answered with something other than a JSON array
    #[error("{context}: HTTP {status}")]
    DirectoryFetch { context: String, status: u16 },

    /// A user id that cannot be addressed as a single path segment
    #[error("Failed to get user groups: invalid user id '{0}'")]
    InvalidUserId(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a directory fetch error
    pub fn directory_fetch(context: impl Into<String>, status: u16) -> Self {
        Self::DirectoryFetch {
            context: context.into(),
            status,
        }
    }

    /// HTTP status observed by the failing call, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status } | Self::DirectoryFetch { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (flat shape for report callers)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => match e.status() {
                Some(status) => {
                    let mut context = HashMap::new();
                    context.insert("status".to_string(), serde_json::json!(status));
                    Self::fail_with_context(e.to_string(), context)
                }
                None => Self::fail(e.to_string()),
            },
        }
    }
}
