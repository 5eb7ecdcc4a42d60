//! Date buckets
//!
//! Resolves the date-keyed subdirectory a request operates on.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::storage::validation::resolve_within_root;

/// Bucket directories are named by the local calendar date, `MM-DD-YY`.
pub const BUCKET_KEY_FORMAT: &str = "%m-%d-%y";

/// Today's bucket key from the server's local clock.
///
/// Callers sample this once per request and carry the value through, so a
/// request crossing midnight observes whichever bucket was selected at
/// resolution time.
pub fn current_bucket_key() -> String {
    Local::now().format(BUCKET_KEY_FORMAT).to_string()
}

/// Resolve the bucket directory for `key`, creating it if absent.
///
/// Creation is idempotent; losing a creation race to a concurrent request
/// is not an error.
pub fn ensure_bucket(root: &Path, key: &str) -> Result<PathBuf, StorageError> {
    let path = resolve_within_root(root, &[key])?;
    fs::create_dir_all(&path)?;
    Ok(path)
}

/// Resolve the bucket directory for `key` without creating it.
///
/// Read paths use this so a lookup never materializes storage as a side
/// effect.
pub fn open_bucket(root: &Path, key: &str) -> Result<PathBuf, StorageError> {
    let path = resolve_within_root(root, &[key])?;
    if !path.is_dir() {
        return Err(StorageError::BucketNotFound(key.to_string()));
    }
    Ok(path)
}
