//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Keycloak HTTP client for TokenExchanger and DirectoryProvider

pub mod keycloak;

#[cfg(any(test, feature = "test-support"))]
pub mod keycloak_mock;
