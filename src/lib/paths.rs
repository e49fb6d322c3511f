//! Shared helpers reused across modules (e.g., path validation, search-path lists).

use std::path::Path;

/// Separator between entries of a class path or module path.
#[cfg(windows)]
pub const SEARCH_PATH_SEPARATOR: char = ';';
#[cfg(not(windows))]
pub const SEARCH_PATH_SEPARATOR: char = ':';

/// Returns true if the path is non-empty and absolute.
pub fn is_nonempty_absolute(path: &Path) -> bool {
    !path.as_os_str().is_empty() && path.is_absolute()
}

/// Split a search-path string into trimmed, non-empty fragments.
pub fn split_search_path(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(SEARCH_PATH_SEPARATOR)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
}

/// Join entries with the platform search-path separator.
pub fn join_search_path<S: AsRef<str>>(entries: &[S]) -> String {
    let mut joined = String::new();
    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            joined.push(SEARCH_PATH_SEPARATOR);
        }
        joined.push_str(entry.as_ref());
    }
    joined
}
