//! Server middleware
//!
//! Provides the session gate, request logging, and login rate limiting.

pub mod logging;
pub mod rate_limit;
pub mod session;

pub use logging::log_request;
pub use rate_limit::RateLimiter;
pub use session::{require_session, session_token};
