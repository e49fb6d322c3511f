use std::{path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;

use crate::lib::{errors::ConfigError, paths};

pub const DEFAULT_BASE_PATH: &str = "/usr/lib/jvm";
pub const DEFAULT_HOME_ENV: &str = "JAVA_HOME";
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;
const MAX_PROBE_TIMEOUT_SECS: u64 = 600;

/// Where runtimes are looked for and how long a probe may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySection {
    pub base_path: PathBuf,
    pub home_env: String,
    pub probe_timeout_secs: u64,
}

impl DiscoverySection {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for DiscoverySection {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from(DEFAULT_BASE_PATH),
            home_env: DEFAULT_HOME_ENV.to_string(),
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawDiscoverySection {
    pub base_path: Option<PathBuf>,
    pub home_env: Option<String>,
    pub probe_timeout_secs: Option<u64>,
}

pub fn parse_discovery_section(
    raw: Option<RawDiscoverySection>,
    path: &Path,
) -> Result<DiscoverySection, ConfigError> {
    let raw = raw.unwrap_or_default();
    let defaults = DiscoverySection::default();

    let base_path = raw.base_path.unwrap_or(defaults.base_path);
    if !paths::is_nonempty_absolute(&base_path) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "discovery.base_path",
            message: "Use an absolute directory path".into(),
        });
    }

    let home_env = raw.home_env.unwrap_or(defaults.home_env);
    if home_env.trim().is_empty() || home_env.contains('=') {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "discovery.home_env",
            message: "Use a non-empty environment variable name without `=`".into(),
        });
    }

    let probe_timeout_secs = raw
        .probe_timeout_secs
        .unwrap_or(defaults.probe_timeout_secs);
    if !(1..=MAX_PROBE_TIMEOUT_SECS).contains(&probe_timeout_secs) {
        return Err(ConfigError::InvalidField {
            path: path.to_path_buf(),
            field: "discovery.probe_timeout_secs",
            message: format!("Use a value in the range 1-{MAX_PROBE_TIMEOUT_SECS}"),
        });
    }

    Ok(DiscoverySection {
        base_path,
        home_env: home_env.trim().to_string(),
        probe_timeout_secs,
    })
}
