//! Path validation
//!
//! Filename sanitization and the containment check that keeps every
//! resolved path inside the storage root.

use log::warn;
use std::path::{Component, Path, PathBuf};

use crate::error::StorageError;

/// Substituted when sanitization would otherwise yield an empty name.
const PLACEHOLDER_NAME: &str = "unnamed_file";

/// Reduce a raw, client-supplied name to a single safe filesystem segment.
///
/// Path separators, null bytes, and anything outside the safe-filename
/// charset are replaced with underscores; leading dots are stripped so the
/// result can never be a hidden or relative entry. An empty result is
/// replaced with a placeholder name.
pub fn sanitize_segment(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| *c != '\0')
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        PLACEHOLDER_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Join `segments` onto `root` and verify the result stays inside it.
///
/// Each segment must be a single normal path component (no separators,
/// no `.`/`..`, not absolute). The deepest existing ancestor of the
/// joined path is then canonicalized and checked against the canonical
/// root, so a symlink inside the tree cannot redirect a request outside
/// of it. Any violation fails with `PathEscape` before the caller
/// touches the filesystem.
pub fn resolve_within_root(root: &Path, segments: &[&str]) -> Result<PathBuf, StorageError> {
    let canonical_root = root.canonicalize()?;

    let mut resolved = canonical_root.clone();
    for segment in segments {
        if !is_single_normal_component(segment) {
            warn!("Rejected path segment {:?}: not a plain file name", segment);
            return Err(StorageError::PathEscape(segment.to_string()));
        }
        resolved.push(segment);
    }

    let canonical_probe = deepest_existing(&resolved).canonicalize()?;
    if !canonical_probe.starts_with(&canonical_root) {
        warn!(
            "Rejected path {}: resolves outside storage root {}",
            resolved.display(),
            canonical_root.display()
        );
        return Err(StorageError::PathEscape(resolved.display().to_string()));
    }

    Ok(resolved)
}

/// True when `segment` parses as exactly one normal path component.
fn is_single_normal_component(segment: &str) -> bool {
    if segment.is_empty() || segment.contains('\0') {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Walk up from `path` to the closest ancestor that exists on disk.
fn deepest_existing(path: &Path) -> &Path {
    let mut current = path;
    while !current.exists() {
        match current.parent() {
            Some(parent) => current = parent,
            None => break,
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sanitize_keeps_ordinary_filenames() {
        assert_eq!(sanitize_segment("report.csv"), "report.csv");
        assert_eq!(sanitize_segment("trades_2024-01-02.csv"), "trades_2024-01-02.csv");
    }

    #[test]
    fn sanitize_replaces_separators_and_strips_leading_dots() {
        assert_eq!(sanitize_segment("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_segment(".hidden"), "hidden");
        assert_eq!(sanitize_segment("..secret"), "secret");
        assert_eq!(sanitize_segment("sp ace.txt"), "sp_ace.txt");
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_segment(""), "unnamed_file");
        assert_eq!(sanitize_segment("..."), "unnamed_file");
        assert_eq!(sanitize_segment("///"), "unnamed_file");
        assert_eq!(sanitize_segment("\0"), "unnamed_file");
    }

    #[test]
    fn resolve_accepts_plain_segments() {
        let dir = tempdir().unwrap();
        let resolved = resolve_within_root(dir.path(), &["01-02-25", "report.csv"]).unwrap();
        assert!(resolved.starts_with(dir.path().canonicalize().unwrap()));
        assert!(resolved.ends_with("01-02-25/report.csv"));
    }

    #[test]
    fn resolve_rejects_traversal_segments() {
        let dir = tempdir().unwrap();
        for segment in ["..", ".", "a/b", "../etc", "/etc", ""] {
            let result = resolve_within_root(dir.path(), &[segment, "x"]);
            assert!(
                matches!(result, Err(StorageError::PathEscape(_))),
                "segment {:?} was not rejected",
                segment
            );
        }
    }

    #[test]
    fn resolve_rejects_absolute_filename() {
        let dir = tempdir().unwrap();
        let result = resolve_within_root(dir.path(), &["/etc/passwd"]);
        assert!(matches!(result, Err(StorageError::PathEscape(_))));
    }

    #[cfg(unix)]
    #[test]
    fn resolve_rejects_symlink_escape() {
        let outside = tempdir().unwrap();
        let root = tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), root.path().join("link")).unwrap();

        let result = resolve_within_root(root.path(), &["link", "file.txt"]);
        assert!(matches!(result, Err(StorageError::PathEscape(_))));
    }
}
