//! Error types
//!
//! Defines domain-specific error types for each module of the storage server.

use std::fmt;
use std::io;

/// Access-guard errors for the key-gated retrieval path
#[derive(Debug)]
pub enum AuthError {
    MissingKey,
    InvalidKey,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingKey => write!(
                f,
                "API key required. Provide via X-API-Key header or api_key query parameter"
            ),
            AuthError::InvalidKey => write!(f, "Invalid API key"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    /// A resolved path would land outside the storage root.
    PathEscape(String),
    BucketNotFound(String),
    FileNotFound(String),
    InvalidName(String),
    /// A bulk delete failed part-way through; `deleted` files were
    /// removed before the failure.
    PartialClear { deleted: usize, source: io::Error },
    Io(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::PathEscape(p) => write!(f, "Path escapes storage root: {}", p),
            StorageError::BucketNotFound(k) => write!(f, "Bucket not found: {}", k),
            StorageError::FileNotFound(p) => write!(f, "File not found: {}", p),
            StorageError::InvalidName(n) => write!(f, "Invalid name: {}", n),
            StorageError::PartialClear { deleted, source } => {
                write!(
                    f,
                    "Clear failed after deleting {} file(s): {}",
                    deleted, source
                )
            }
            StorageError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::PartialClear { source, .. } => Some(source),
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::Io(error)
    }
}
