//! Storage operations
//!
//! Handles the physical file operations against a bucket directory:
//! staged writes, bulk deletion, listings, and read-opens.

use log::{info, warn};
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::StorageError;
use crate::storage::results::{FileDetail, StoredFile};

/// Writes `contents` to `bucket/name`, overwriting any existing file.
///
/// The bytes land in a hidden temporary file first and are renamed into
/// place, so a concurrent reader either sees the previous file or the
/// complete new one, never a truncated write. A failed write removes the
/// temporary file before returning.
pub fn store(bucket: &Path, name: &str, contents: &[u8]) -> Result<StoredFile, StorageError> {
    if name.is_empty() || name.starts_with('.') {
        return Err(StorageError::InvalidName(name.to_string()));
    }

    let final_path = bucket.join(name);
    // Leading dot keeps the staging file out of listings.
    let temp_path = bucket.join(format!(".{}.tmp", name));

    let staged = File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(contents)?;
            file.sync_all()
        })
        .and_then(|_| fs::rename(&temp_path, &final_path));

    if let Err(e) = staged {
        if let Err(cleanup) = fs::remove_file(&temp_path) {
            if cleanup.kind() != ErrorKind::NotFound {
                warn!(
                    "Failed to remove staging file {}: {}",
                    temp_path.display(),
                    cleanup
                );
            }
        }
        return Err(StorageError::Io(e));
    }

    let metadata = fs::metadata(&final_path)?;
    info!("Stored {} ({} bytes)", final_path.display(), metadata.len());

    Ok(StoredFile {
        name: name.to_string(),
        size: metadata.len(),
        modified: metadata.modified()?,
    })
}

/// Deletes every regular file directly inside `bucket`.
///
/// Subdirectories and their contents are left alone. Returns the number
/// of files removed; a mid-way failure reports how many deletions
/// completed before it so the caller has an accurate record.
pub fn clear_all(bucket: &Path) -> Result<usize, StorageError> {
    if !bucket.is_dir() {
        return Ok(0);
    }

    let mut deleted = 0;
    for entry in fs::read_dir(bucket)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => return Err(StorageError::PartialClear { deleted, source: e }),
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Err(e) = fs::remove_file(&path) {
            return Err(StorageError::PartialClear { deleted, source: e });
        }
        deleted += 1;
    }

    info!("Cleared {} file(s) from {}", deleted, bucket.display());
    Ok(deleted)
}

/// Enumerates the regular, non-hidden files in `bucket`, most recent first.
pub fn list(bucket: &Path) -> Result<Vec<StoredFile>, StorageError> {
    let mut files = Vec::new();

    for entry in fs::read_dir(bucket)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        files.push(StoredFile {
            name,
            size: metadata.len(),
            modified: metadata.modified()?,
        });
    }

    sort_by_recency(&mut files);
    Ok(files)
}

/// Walks the whole storage root and collects every non-hidden regular
/// file with its containing bucket, most recent first.
pub fn list_all(root: &Path) -> Result<Vec<FileDetail>, StorageError> {
    let mut details = Vec::new();
    collect_files(root, root, &mut details)?;
    details.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(details)
}

/// Opens `path` for reading.
///
/// A file that vanished or stopped being a regular file between listing
/// and open is reported as `FileNotFound`, not a fatal error.
pub fn open_for_read(path: &Path) -> Result<(File, u64), StorageError> {
    let not_found = |e: std::io::Error| {
        if e.kind() == ErrorKind::NotFound {
            StorageError::FileNotFound(path.display().to_string())
        } else {
            StorageError::Io(e)
        }
    };

    let metadata = fs::metadata(path).map_err(not_found)?;
    if !metadata.is_file() {
        return Err(StorageError::FileNotFound(path.display().to_string()));
    }

    let file = File::open(path).map_err(not_found)?;
    Ok((file, metadata.len()))
}

fn sort_by_recency(files: &mut [StoredFile]) {
    // Most recent first; name breaks ties stably within one response.
    files.sort_by(|a, b| {
        b.modified
            .cmp(&a.modified)
            .then_with(|| a.name.cmp(&b.name))
    });
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<FileDetail>) -> Result<(), StorageError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        let path = entry.path();
        let metadata = entry.metadata()?;

        if metadata.is_dir() {
            collect_files(root, &path, out)?;
        } else if metadata.is_file() {
            let bucket = path
                .parent()
                .filter(|parent| *parent != root)
                .and_then(|parent| parent.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let relative_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            out.push(FileDetail {
                name,
                bucket,
                path: path.clone(),
                relative_path,
                size: metadata.len(),
                modified: metadata.modified()?,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    fn set_mtime(path: &Path, mtime: SystemTime) {
        let file = fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(mtime).unwrap();
    }

    fn read_back(path: &Path) -> Vec<u8> {
        let mut buf = Vec::new();
        File::open(path).unwrap().read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn store_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let stored = store(dir.path(), "report.csv", b"X").unwrap();
        assert_eq!(stored.name, "report.csv");
        assert_eq!(stored.size, 1);
        assert_eq!(read_back(&dir.path().join("report.csv")), b"X");
    }

    #[test]
    fn store_overwrites_last_writer_wins() {
        let dir = tempdir().unwrap();
        store(dir.path(), "report.csv", b"first").unwrap();
        let second = store(dir.path(), "report.csv", b"second, longer").unwrap();

        let listed = list(dir.path()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "report.csv");
        assert_eq!(listed[0].size, second.size);
        assert_eq!(read_back(&dir.path().join("report.csv")), b"second, longer");
    }

    #[test]
    fn store_leaves_no_staging_file_behind() {
        let dir = tempdir().unwrap();
        store(dir.path(), "data.bin", &[0u8; 4096]).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["data.bin"]);
    }

    #[test]
    fn store_rejects_hidden_and_empty_names() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            store(dir.path(), "", b"x"),
            Err(StorageError::InvalidName(_))
        ));
        assert!(matches!(
            store(dir.path(), ".hidden", b"x"),
            Err(StorageError::InvalidName(_))
        ));
    }

    #[test]
    fn list_orders_by_mtime_descending() {
        let dir = tempdir().unwrap();
        let base = SystemTime::now() - Duration::from_secs(600);
        for (name, offset) in [("t1.csv", 0), ("t2.csv", 60), ("t3.csv", 120)] {
            store(dir.path(), name, b"data").unwrap();
            set_mtime(&dir.path().join(name), base + Duration::from_secs(offset));
        }

        let names: Vec<String> = list(dir.path())
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["t3.csv", "t2.csv", "t1.csv"]);
    }

    #[test]
    fn list_skips_hidden_files_and_directories() {
        let dir = tempdir().unwrap();
        store(dir.path(), "visible.txt", b"v").unwrap();
        fs::write(dir.path().join(".hidden"), b"h").unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();

        let listed = list(dir.path()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "visible.txt");
    }

    #[test]
    fn clear_all_counts_and_empties() {
        let dir = tempdir().unwrap();
        store(dir.path(), "a.txt", b"a").unwrap();
        store(dir.path(), "b.txt", b"b").unwrap();
        fs::create_dir(dir.path().join("keep")).unwrap();
        fs::write(dir.path().join("keep/inner.txt"), b"i").unwrap();

        assert_eq!(clear_all(dir.path()).unwrap(), 2);
        assert!(list(dir.path()).unwrap().is_empty());
        // Non-recursive: the subdirectory survives untouched.
        assert!(dir.path().join("keep/inner.txt").is_file());
    }

    #[test]
    fn clear_all_of_missing_directory_is_zero() {
        let dir = tempdir().unwrap();
        assert_eq!(clear_all(&dir.path().join("absent")).unwrap(), 0);
    }

    #[test]
    fn open_for_read_reports_missing_as_not_found() {
        let dir = tempdir().unwrap();
        let result = open_for_read(&dir.path().join("gone.txt"));
        assert!(matches!(result, Err(StorageError::FileNotFound(_))));

        let result = open_for_read(dir.path());
        assert!(matches!(result, Err(StorageError::FileNotFound(_))));
    }

    #[test]
    fn list_all_walks_buckets_recursively() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("01-02-25")).unwrap();
        store(&dir.path().join("01-02-25"), "inner.csv", b"i").unwrap();
        store(dir.path(), "top.csv", b"t").unwrap();

        let details = list_all(dir.path()).unwrap();
        assert_eq!(details.len(), 2);
        let inner = details.iter().find(|d| d.name == "inner.csv").unwrap();
        assert_eq!(inner.bucket, "01-02-25");
        assert_eq!(inner.relative_path, Path::new("01-02-25/inner.csv"));
        let top = details.iter().find(|d| d.name == "top.csv").unwrap();
        assert_eq!(top.bucket, "");
    }

    #[test]
    fn staged_write_is_invisible_until_renamed() {
        let dir = tempdir().unwrap();
        // Simulate a write in flight: the staging file exists, the final
        // name does not.
        fs::write(dir.path().join(".big.bin.tmp"), b"partial").unwrap();
        assert!(list(dir.path()).unwrap().is_empty());

        fs::rename(
            dir.path().join(".big.bin.tmp"),
            dir.path().join("big.bin"),
        )
        .unwrap();
        let listed = list(dir.path()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].size, 7);
    }
}
