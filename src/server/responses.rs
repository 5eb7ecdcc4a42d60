//! HTTP response shapes
//!
//! JSON bodies returned by the dispatch layer, plus the mapping from
//! core errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::time::SystemTime;

use crate::error::{AuthError, StorageError};

/// Generic failure body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

/// Successful upload report
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub filename: String,
    pub directory: String,
    pub file_path: String,
    pub folder: String,
    pub size_bytes: u64,
    pub files_deleted: usize,
}

/// One entry of a multi-file download listing
#[derive(Debug, Serialize)]
pub struct FileInfo {
    pub filename: String,
    pub size_bytes: u64,
    pub modified: String,
    pub download_url: String,
}

/// Listing returned when today's bucket holds more than one file
#[derive(Debug, Serialize)]
pub struct DownloadListing {
    pub success: bool,
    pub message: String,
    pub directory: String,
    pub count: usize,
    pub files: Vec<FileInfo>,
}

/// One entry of the whole-root enumeration
#[derive(Debug, Clone, Serialize)]
pub struct FileDetailBody {
    pub filename: String,
    pub directory: String,
    pub path: String,
    pub relative_path: String,
    pub size_bytes: u64,
    pub modified: String,
}

/// Files grouped per category; both categories map to the same root
#[derive(Debug, Serialize)]
pub struct FilesByCategory {
    pub downloads: Vec<FileDetailBody>,
    pub uploads: Vec<FileDetailBody>,
}

#[derive(Debug, Serialize)]
pub struct ListFilesResponse {
    pub success: bool,
    pub files: FilesByCategory,
}

/// Service banner / health body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub service: String,
}

/// Build a JSON failure response.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorBody {
            success: false,
            error: message.into(),
        }),
    )
        .into_response()
}

/// Map a storage failure to its HTTP response.
pub fn storage_error_response(error: StorageError) -> Response {
    match error {
        StorageError::PathEscape(_) => {
            error_response(StatusCode::BAD_REQUEST, "Invalid file path")
        }
        StorageError::BucketNotFound(_) | StorageError::FileNotFound(_) => {
            error_response(StatusCode::NOT_FOUND, "File not found")
        }
        other => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

/// Map an access-guard failure to its HTTP response.
pub fn auth_error_response(error: AuthError) -> Response {
    error_response(StatusCode::UNAUTHORIZED, error.to_string())
}

/// ISO-8601 local timestamp for a file mtime.
pub fn iso_timestamp(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
