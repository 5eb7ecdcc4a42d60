//! Request handlers
//!
//! Dispatches parsed HTTP requests into the storage core. Filesystem
//! work runs on the blocking pool so a slow transfer cannot stall the
//! dispatch path.

use axum::Json;
use axum::body::{Body, Bytes};
use axum::extract::{Multipart, Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Local;
use log::{error, info, warn};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task;
use tokio_util::io::ReaderStream;

use crate::auth;
use crate::config::ServerConfig;
use crate::error::StorageError;
use crate::server::responses::{
    DownloadListing, FileDetailBody, FileInfo, FilesByCategory, HealthResponse, ListFilesResponse,
    UploadResponse, auth_error_response, error_response, iso_timestamp, storage_error_response,
};
use crate::storage::results::{RetrievalOutcome, StoredFile};
use crate::storage::{bucket, operations, validation};

pub type SharedConfig = Arc<ServerConfig>;

const SERVICE_NAME: &str = "Daydrop API";

/// GET / - service banner.
pub async fn home() -> Response {
    Json(HealthResponse {
        status: "success".to_string(),
        timestamp: Local::now().to_rfc3339(),
        service: SERVICE_NAME.to_string(),
    })
    .into_response()
}

/// GET /api/health - health check.
pub async fn health() -> Response {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Local::now().to_rfc3339(),
        service: SERVICE_NAME.to_string(),
    })
    .into_response()
}

/// POST /api/upload - store a multipart file into today's bucket.
pub async fn upload(State(config): State<SharedConfig>, mut multipart: Multipart) -> Response {
    let mut upload: Option<(String, Bytes)> = None;
    let mut folder = "uploads".to_string();
    let mut clear_existing = false;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            // Propagates 413 when the body limit tripped mid-read.
            Err(e) => {
                return error_response(e.status(), format!("Malformed multipart body: {}", e));
            }
        };

        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                if filename.is_empty() {
                    return error_response(StatusCode::BAD_REQUEST, "No file selected");
                }
                let data = match field.bytes().await {
                    Ok(data) => data,
                    Err(e) => {
                        return error_response(
                            e.status(),
                            format!("Failed to read file field: {}", e),
                        );
                    }
                };
                upload = Some((filename, data));
            }
            Some("folder") => {
                if let Ok(value) = field.text().await {
                    folder = value.to_lowercase();
                }
            }
            Some("clear_existing") => {
                if let Ok(value) = field.text().await {
                    clear_existing = value.to_lowercase() == "true";
                }
            }
            _ => {}
        }
    }

    let Some((raw_filename, data)) = upload else {
        return error_response(StatusCode::BAD_REQUEST, "No file provided");
    };

    if data.len() as u64 > config.max_upload_bytes() {
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "File too large. Maximum size is {}MB",
                config.max_file_size_mb
            ),
        );
    }

    // The folder hint is cosmetic: both values resolve to the same
    // physical root. Preserved as documented behavior.
    let root = config.storage_root.clone();
    // Sampled once; a request crossing midnight keeps this bucket.
    let key = bucket::current_bucket_key();

    let stored = {
        let key = key.clone();
        task::spawn_blocking(move || -> Result<(StoredFile, PathBuf, usize), (usize, StorageError)> {
            let bucket_path = bucket::ensure_bucket(&root, &key).map_err(|e| (0, e))?;

            let mut files_deleted = 0;
            if clear_existing {
                files_deleted = operations::clear_all(&bucket_path).map_err(|e| match e {
                    StorageError::PartialClear { deleted, source } => {
                        (deleted, StorageError::Io(source))
                    }
                    other => (0, other),
                })?;
            }

            let filename = validation::sanitize_segment(&raw_filename);
            let stored = operations::store(&bucket_path, &filename, &data)
                .map_err(|e| (files_deleted, e))?;
            let path = bucket_path.join(&stored.name);
            Ok((stored, path, files_deleted))
        })
        .await
    };

    match stored {
        Ok(Ok((file, path, files_deleted))) => {
            info!("Upload complete: {} in bucket {}", file.name, key);
            Json(UploadResponse {
                success: true,
                message: "File uploaded successfully".to_string(),
                filename: file.name,
                directory: key,
                file_path: path.display().to_string(),
                folder,
                size_bytes: file.size,
                files_deleted,
            })
            .into_response()
        }
        Ok(Err((files_deleted, e))) => {
            error!("Upload failed in bucket {}: {}", key, e);
            let message = if files_deleted > 0 {
                format!("{} ({} file(s) deleted before the failure)", e, files_deleted)
            } else {
                e.to_string()
            };
            match e {
                StorageError::PathEscape(_) => error_response(StatusCode::BAD_REQUEST, message),
                _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, message),
            }
        }
        Err(e) => {
            error!("Upload task panicked: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

/// GET|POST /api/download - today's bucket: stream the single file or
/// list the candidates.
pub async fn download_today(State(config): State<SharedConfig>) -> Response {
    let key = bucket::current_bucket_key();
    let root = config.storage_root.clone();

    let outcome = {
        let key = key.clone();
        task::spawn_blocking(move || crate::storage::resolver::resolve(&root, &key)).await
    };

    match outcome {
        Ok(Ok(RetrievalOutcome::SingleFile(file))) => {
            stream_attachment(config.storage_root.clone(), vec![key, file.name]).await
        }
        Ok(Ok(RetrievalOutcome::Listing(entries))) => {
            let files: Vec<FileInfo> = entries
                .into_iter()
                .map(|entry| FileInfo {
                    filename: entry.file.name,
                    size_bytes: entry.file.size,
                    modified: iso_timestamp(entry.file.modified),
                    download_url: format!(
                        "/api/file/{}/{}",
                        entry.locator.bucket, entry.locator.filename
                    ),
                })
                .collect();
            Json(DownloadListing {
                success: true,
                message: format!("Multiple files found in today's directory ({})", key),
                directory: key,
                count: files.len(),
                files,
            })
            .into_response()
        }
        Ok(Ok(RetrievalOutcome::Empty)) => error_response(
            StatusCode::NOT_FOUND,
            format!("No files found in today's directory ({})", key),
        ),
        Ok(Ok(RetrievalOutcome::NotFound)) => error_response(
            StatusCode::NOT_FOUND,
            format!("No downloads directory found for today ({})", key),
        ),
        Ok(Err(e)) => {
            error!("Download resolution failed for bucket {}: {}", key, e);
            storage_error_response(e)
        }
        Err(e) => {
            error!("Download task panicked: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListFilesQuery {
    #[serde(rename = "type")]
    pub category: Option<String>,
}

/// GET /api/list-files - enumerate everything under the storage root.
pub async fn list_files(
    State(config): State<SharedConfig>,
    Query(query): Query<ListFilesQuery>,
) -> Response {
    let category = query.category.unwrap_or_else(|| "both".to_string());
    let root = config.storage_root.clone();

    let details = task::spawn_blocking(move || operations::list_all(&root)).await;

    let details = match details {
        Ok(Ok(details)) => details,
        Ok(Err(e)) => {
            error!("File enumeration failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
        Err(e) => {
            error!("Enumeration task panicked: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error");
        }
    };

    let bodies: Vec<FileDetailBody> = details
        .into_iter()
        .map(|detail| FileDetailBody {
            filename: detail.name,
            directory: detail.bucket,
            path: detail.path.display().to_string(),
            relative_path: detail.relative_path.display().to_string(),
            size_bytes: detail.size,
            modified: iso_timestamp(detail.modified),
        })
        .collect();

    // Both categories map to the same physical root; requesting one
    // simply leaves the other empty.
    let downloads = if matches!(category.as_str(), "both" | "downloads") {
        bodies.clone()
    } else {
        Vec::new()
    };
    let uploads = if matches!(category.as_str(), "both" | "uploads") {
        bodies
    } else {
        Vec::new()
    };

    Json(ListFilesResponse {
        success: true,
        files: FilesByCategory { downloads, uploads },
    })
    .into_response()
}

/// GET /api/file/{path} - explicit fetch, gated by the shared API key.
pub async fn get_file(
    State(config): State<SharedConfig>,
    UrlPath(path): UrlPath<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let presented = headers
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| params.get("api_key").cloned());

    if let Err(e) = auth::authorize(presented.as_deref(), &config.api_key) {
        warn!("Rejected file fetch for {:?}: {}", path, e);
        return auth_error_response(e);
    }

    // Each supplied segment is sanitized on its own; the rejoined path
    // is then re-validated against the root as a whole.
    let segments: Vec<String> = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(validation::sanitize_segment)
        .collect();

    if segments.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Invalid file path");
    }

    stream_attachment(config.storage_root.clone(), segments).await
}

/// Resolve `segments` under `root` and stream the file as an attachment.
async fn stream_attachment(root: PathBuf, segments: Vec<String>) -> Response {
    let filename = segments.last().cloned().unwrap_or_default();

    let opened = task::spawn_blocking(move || {
        let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
        let path = validation::resolve_within_root(&root, &refs)?;
        operations::open_for_read(&path)
    })
    .await;

    match opened {
        Ok(Ok((file, size))) => {
            let stream = ReaderStream::new(tokio::fs::File::from_std(file));
            (
                [
                    (
                        header::CONTENT_TYPE,
                        "application/octet-stream".to_string(),
                    ),
                    (header::CONTENT_LENGTH, size.to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{}\"", filename),
                    ),
                ],
                Body::from_stream(stream),
            )
                .into_response()
        }
        Ok(Err(e)) => storage_error_response(e),
        Err(e) => {
            error!("File open task panicked: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
