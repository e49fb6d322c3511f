//! Filesystem predicates used by runtime discovery and launch validation.

use std::{
    fs,
    path::{Path, PathBuf},
};

/// Returns true if anything exists at `path` (following symlinks).
pub fn path_exists(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}

/// Returns true if `path` resolves to a regular file.
pub fn is_regular_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Resolve `path` to its canonical form if it names a directory.
///
/// Symlinks are followed; dangling links and non-directories yield `None`.
pub fn canonical_dir(path: &Path) -> Option<PathBuf> {
    let resolved = fs::canonicalize(path).ok()?;
    if resolved.is_dir() {
        Some(resolved)
    } else {
        None
    }
}
