//! Access guard
//!
//! Shared-secret validation for the key-gated retrieval path.

pub mod validator;

pub use validator::authorize;
