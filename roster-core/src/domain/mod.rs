//! Core domain entities
//!
//! Plain data structures for the identity directory - no I/O or external
//! dependencies beyond serialization.

mod credentials;
mod group;
pub mod result;
mod token;
mod user;

pub use credentials::Credentials;
pub use group::Group;
pub use token::{AccessToken, TokenResponse};
pub use user::{User, UserWithGroups};
