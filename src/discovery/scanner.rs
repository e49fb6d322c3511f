//! Enumerate plausible runtime homes directly under a base directory.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::lib::{errors::DiscoveryError, fs as launcher_fs};

use super::RuntimeHome;

#[cfg(target_os = "macos")]
const NATIVE_LIBRARY: &str = "libjvm.dylib";
#[cfg(not(target_os = "macos"))]
const NATIVE_LIBRARY: &str = "libjvm.so";

/// Architecture directory name used by legacy runtime layouts.
fn legacy_arch_dir() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "i386",
        other => other,
    }
}

/// Relative library locations tried in order; the first match wins.
pub fn library_candidates(home: &Path) -> Vec<PathBuf> {
    let arch = legacy_arch_dir();
    vec![
        home.join("lib").join("server").join(NATIVE_LIBRARY),
        home.join("lib").join(arch).join("server").join(NATIVE_LIBRARY),
        home.join("jre")
            .join("lib")
            .join(arch)
            .join("server")
            .join(NATIVE_LIBRARY),
    ]
}

/// Locate the runtime's native library under `home`.
pub fn find_native_library(home: &Path) -> Option<PathBuf> {
    library_candidates(home)
        .into_iter()
        .find(|candidate| launcher_fs::is_regular_file(candidate))
}

/// Resolve one explicitly named home (e.g. from `JAVA_HOME`).
pub fn resolve_home(path: &Path) -> Option<RuntimeHome> {
    let home = launcher_fs::canonical_dir(path)?;
    let library_path = find_native_library(&home)?;
    Some(RuntimeHome { home, library_path })
}

/// List candidate homes under `base`, deduplicated by canonical path and
/// sorted by home path.
///
/// An unreadable base is fatal; unreadable children are skipped.
pub fn scan_candidates(base: &Path) -> Result<Vec<RuntimeHome>, DiscoveryError> {
    let base = fs::canonicalize(base).map_err(|source| DiscoveryError::NoSuchPath {
        path: base.to_path_buf(),
        source,
    })?;
    let entries = fs::read_dir(&base).map_err(|source| DiscoveryError::NoSuchPath {
        path: base.clone(),
        source,
    })?;

    let mut seen = BTreeMap::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(target: "jlaunch::discovery", reason = %err, "Skipping unreadable entry");
                continue;
            }
        };
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) => {
                debug!(
                    target: "jlaunch::discovery",
                    entry = %entry.path().display(),
                    reason = %err,
                    "Skipping entry with unknown type"
                );
                continue;
            }
        };
        if !file_type.is_dir() && !file_type.is_symlink() {
            continue;
        }

        let path = entry.path();
        let Some(candidate) = resolve_home(&path) else {
            debug!(
                target: "jlaunch::discovery",
                entry = %path.display(),
                "No runtime library found; not a runtime home"
            );
            continue;
        };
        if seen.contains_key(&candidate.home) {
            debug!(
                target: "jlaunch::discovery",
                entry = %path.display(),
                home = %candidate.home.display(),
                "Home already reached through another entry"
            );
            continue;
        }
        seen.insert(candidate.home.clone(), candidate);
    }

    Ok(seen.into_values().collect())
}
