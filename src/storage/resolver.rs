//! Retrieval resolution
//!
//! Collapses a bucket's contents into a single retrieval outcome: a
//! direct stream for the common single-file day, a listing for
//! ambiguous multi-file days, or a structured not-found result.

use std::path::Path;

use crate::error::StorageError;
use crate::storage::bucket;
use crate::storage::operations;
use crate::storage::results::{ListingEntry, Locator, RetrievalOutcome};

/// Decide how a read of `bucket_key` should be answered.
///
/// A pure function of bucket contents at resolution time: missing bucket
/// is `NotFound`, an existing-but-empty bucket is `Empty`, exactly one
/// file collapses to `SingleFile` so the caller can stream it without a
/// follow-up round trip, and two or more files become a `Listing` whose
/// entries carry a locator for an explicit fetch.
pub fn resolve(root: &Path, bucket_key: &str) -> Result<RetrievalOutcome, StorageError> {
    let bucket_path = match bucket::open_bucket(root, bucket_key) {
        Ok(path) => path,
        Err(StorageError::BucketNotFound(_)) => return Ok(RetrievalOutcome::NotFound),
        Err(e) => return Err(e),
    };

    let mut files = operations::list(&bucket_path)?;
    match files.len() {
        0 => Ok(RetrievalOutcome::Empty),
        1 => Ok(RetrievalOutcome::SingleFile(files.remove(0))),
        _ => Ok(RetrievalOutcome::Listing(
            files
                .into_iter()
                .map(|file| ListingEntry {
                    locator: Locator {
                        bucket: bucket_key.to_string(),
                        filename: file.name.clone(),
                    },
                    file,
                })
                .collect(),
        )),
    }
}
