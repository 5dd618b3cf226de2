//! Domain layer of the Freeclub client: records, identity, session model and
//! the authorization policy.

pub mod authorization;
pub mod config;
pub mod error;
pub mod identity;
pub mod resource;
pub mod session;

// Re-export common error type
pub use error::{ClubError, Result};
