//! Authentication system
//!
//! Shared-secret login and the session tokens it hands out. The storage core
//! never depends on this module; the HTTP layer checks sessions up front.

pub mod sessions;
pub mod validator;

pub use sessions::{SESSION_COOKIE, SessionRegistry, SharedSessions};
pub use validator::validate_password;
