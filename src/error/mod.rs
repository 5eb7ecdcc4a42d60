//! Error handling
//!
//! Defines error types and handling for the storage server.

pub mod types;

pub use types::*;
