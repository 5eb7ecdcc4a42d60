//! HTTP server
//!
//! The dispatch layer: router assembly, request handlers, and response
//! shapes. All real invariants live in the storage core; this module
//! only parses requests and renders outcomes.

pub mod core;
pub mod handlers;
pub mod responses;

pub use core::{Server, build_router};
