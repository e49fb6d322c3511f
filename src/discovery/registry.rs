use std::{
    cmp::Ordering,
    path::{Path, PathBuf},
};

use tracing::{info, warn};

use crate::{lib::errors::DiscoveryError, probe::CandidateProbe};

use super::{scanner, RuntimeDescriptor};

/// Probed runtimes, unique by canonical home and kept in listing order.
#[derive(Debug, Clone, Default)]
pub struct RuntimeRegistry {
    runtimes: Vec<RuntimeDescriptor>,
}

impl RuntimeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a runtime. Returns false, leaving the registry unchanged, when a
    /// runtime with the same home is already present.
    pub fn insert(&mut self, runtime: RuntimeDescriptor) -> bool {
        if self.runtimes.iter().any(|known| known.same_runtime(&runtime)) {
            return false;
        }
        let position = self
            .runtimes
            .partition_point(|known| listing_order(known, &runtime) != Ordering::Greater);
        self.runtimes.insert(position, runtime);
        true
    }

    /// All runtimes ordered by major version, then full version, then home.
    pub fn all(&self) -> &[RuntimeDescriptor] {
        &self.runtimes
    }

    pub fn len(&self) -> usize {
        self.runtimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runtimes.is_empty()
    }
}

fn listing_order(left: &RuntimeDescriptor, right: &RuntimeDescriptor) -> Ordering {
    left.major_version
        .cmp(&right.major_version)
        .then_with(|| left.full_version.cmp(&right.full_version))
        .then_with(|| left.home.cmp(&right.home))
}

/// Scan `base` and probe every candidate home, one at a time.
///
/// Rejected candidates are logged and skipped; only an unreadable base fails.
pub async fn discover<P: CandidateProbe>(
    base: &Path,
    probe: &P,
) -> Result<RuntimeRegistry, DiscoveryError> {
    let candidates = scanner::scan_candidates(base)?;
    info!(
        target: "jlaunch::discovery",
        base = %base.display(),
        candidates = candidates.len(),
        "Probing runtime candidates"
    );

    let mut registry = RuntimeRegistry::new();
    for candidate in &candidates {
        match probe.probe(candidate).await {
            Ok(runtime) => {
                if !registry.insert(runtime) {
                    warn!(
                        target: "jlaunch::discovery",
                        home = %candidate.home.display(),
                        "Duplicate runtime home ignored"
                    );
                }
            }
            Err(err) => {
                warn!(
                    target: "jlaunch::discovery",
                    home = %candidate.home.display(),
                    reason = %err,
                    "Runtime candidate rejected"
                );
            }
        }
    }
    Ok(registry)
}

/// Resolve the preferred runtime from an explicit home hint.
///
/// Only the hinted home is probed; there is no fallback to scanning.
pub async fn find_default<P: CandidateProbe>(
    hint: Option<&Path>,
    probe: &P,
) -> Result<RuntimeDescriptor, DiscoveryError> {
    let Some(hint) = hint.filter(|path| !path.as_os_str().is_empty()) else {
        return Err(DiscoveryError::NoRuntimeFound {
            reason: "no preferred runtime home is configured".into(),
        });
    };

    let candidate =
        scanner::resolve_home(hint).ok_or_else(|| DiscoveryError::NoRuntimeFound {
            reason: format!("{} is not a runtime home", hint.display()),
        })?;

    probe
        .probe(&candidate)
        .await
        .map_err(|err| DiscoveryError::NoRuntimeFound {
            reason: format!("{}: {err}", candidate.home.display()),
        })
}

/// Home hint taken from an environment variable, if set and non-empty.
pub fn home_hint_from_env(variable: &str) -> Option<PathBuf> {
    std::env::var_os(variable)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}
