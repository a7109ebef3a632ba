//! Server core functionality
//!
//! Application state, router assembly and the listener loop.

pub mod core;
pub mod state;

pub use core::{Server, build_router};
pub use state::AppState;
