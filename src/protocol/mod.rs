//! HTTP protocol layer
//!
//! Request shapes, JSON responses and the handlers connecting them to the
//! storage core.

pub mod handlers;
pub mod requests;
pub mod responses;
