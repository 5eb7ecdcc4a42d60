//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::path::PathBuf;
use std::time::SystemTime;

/// A single physical file inside a bucket.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
    pub modified: SystemTime,
}

/// Addresses a stored file for an explicit follow-up fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub bucket: String,
    pub filename: String,
}

/// One entry of a multi-file listing.
#[derive(Debug, Clone)]
pub struct ListingEntry {
    pub file: StoredFile,
    pub locator: Locator,
}

/// What a bucket read turns into.
#[derive(Debug)]
pub enum RetrievalOutcome {
    /// Exactly one file; the caller streams it directly.
    SingleFile(StoredFile),
    /// Two or more files, most recent first.
    Listing(Vec<ListingEntry>),
    /// The bucket exists but holds no files.
    Empty,
    /// No bucket exists for the requested key.
    NotFound,
}

/// A file found by a whole-root enumeration.
#[derive(Debug, Clone)]
pub struct FileDetail {
    pub name: String,
    /// Name of the containing bucket, empty for files directly under the root.
    pub bucket: String,
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}
