//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The directory
//! service depends only on these traits, not on the HTTP adapter.

mod directory;

pub use directory::{DirectoryProvider, TokenExchanger};
