use std::path::PathBuf;

use serde::Serialize;

/// A directory believed to hold one runtime installation.
///
/// `home` is always canonical; it is the identity used for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuntimeHome {
    pub home: PathBuf,
    pub library_path: PathBuf,
}

/// Probed identity of one runtime installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeDescriptor {
    /// Display name reported by the runtime, when it reports one.
    pub name: Option<String>,
    pub home: PathBuf,
    pub library_path: PathBuf,
    pub major_version: u32,
    /// Version component the major version was read from (`8` for `1.8.0_392`).
    pub version: String,
    pub full_version: String,
    /// Native interface version reported by the created instance.
    pub abi_version: i32,
}

impl RuntimeDescriptor {
    /// Identity comparison: same canonical home, same runtime.
    pub fn same_runtime(&self, other: &RuntimeDescriptor) -> bool {
        self.home.as_os_str() == other.home.as_os_str()
    }
}

/// Version component that carries the major version.
///
/// Legacy `1.x` versions report their major version in the second component.
pub fn major_version_token(full_version: &str) -> &str {
    let mut components = full_version.split('.').filter(|part| !part.is_empty());
    match components.next() {
        Some("1") => components.next().unwrap_or("1"),
        Some(first) => first,
        None => "",
    }
}

/// Parse the coarse major version; a non-numeric component parses to 0.
pub fn parse_major_version(full_version: &str) -> u32 {
    let token = major_version_token(full_version);
    let digits: String = token.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}
