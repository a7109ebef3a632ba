//! Error handling
//!
//! Defines error types and their mapping onto the HTTP boundary.

pub mod handlers;
pub mod types;

pub use types::*;
