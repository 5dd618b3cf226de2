//! Application layer of the Freeclub client.
//!
//! Coordinates the domain, infrastructure and interaction layers into the
//! operations a front end calls: sign in and out, cached assignment reads and
//! role-scoped record listings.

pub mod assignment_service;
pub mod client;
pub mod session_store;
pub mod visibility_service;

pub use assignment_service::AssignmentService;
pub use client::ClubClient;
pub use session_store::{LoginFailure, SessionStore};
pub use visibility_service::VisibilityService;
