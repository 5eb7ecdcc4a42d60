//! File system storage management
//!
//! The storage core: path sanitization, date-bucket resolution, physical
//! file operations, and retrieval-outcome resolution.

pub mod bucket;
pub mod operations;
pub mod resolver;
pub mod results;
pub mod validation;

pub use results::{FileDetail, ListingEntry, Locator, RetrievalOutcome, StoredFile};
pub use validation::{resolve_within_root, sanitize_segment};
