//! Load and validate launcher configuration.
use std::{
    env,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::error;

use crate::lib::errors::ConfigError;

pub mod discovery;
pub mod launch;
pub mod telemetry;

pub use discovery::{
    parse_discovery_section, DiscoverySection, RawDiscoverySection, DEFAULT_BASE_PATH,
    DEFAULT_HOME_ENV, DEFAULT_PROBE_TIMEOUT_SECS,
};
pub use launch::{parse_launch_section, LaunchSection, RawLaunchSection};

pub const CONFIG_ENV_KEY: &str = "JLAUNCH_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "jlaunch.toml";

/// Top-level configuration container.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LauncherConfig {
    pub discovery: DiscoverySection,
    pub launch: LaunchSection,
    /// File the values came from; `None` when running on built-in defaults.
    pub source_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct RawLauncherConfig {
    discovery: Option<RawDiscoverySection>,
    launch: Option<RawLaunchSection>,
}

/// Pick the configuration file: explicit path, then `JLAUNCH_CONFIG`, then
/// `jlaunch.toml` in the working directory when it exists.
pub fn locate_config(
    cli_override: Option<PathBuf>,
    env_value: Option<String>,
    implicit_default: &Path,
) -> Option<(PathBuf, &'static str)> {
    if let Some(path) = cli_override {
        return Some((path, "--config"));
    }
    if let Some(value) = env_value.filter(|value| !value.trim().is_empty()) {
        return Some((PathBuf::from(value), CONFIG_ENV_KEY));
    }
    implicit_default
        .is_file()
        .then(|| (implicit_default.to_path_buf(), "working directory"))
}

impl LauncherConfig {
    /// Resolve configuration for this process. A named file that cannot be
    /// read is an error; no file at all means defaults.
    pub fn resolve(cli_override: Option<PathBuf>) -> Result<Self, ConfigError> {
        let located = locate_config(
            cli_override,
            env::var(CONFIG_ENV_KEY).ok(),
            Path::new(DEFAULT_CONFIG_PATH),
        );
        telemetry::log_source(
            located.as_ref().map(|(path, _)| path.as_path()),
            located.as_ref().map_or("defaults", |(_, origin)| *origin),
        );
        let config = match located {
            Some((path, _)) => Self::load_from_path(path)?,
            None => Self::default(),
        };
        telemetry::log_loaded(&config);
        Ok(config)
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: PathBuf) -> Result<Self, ConfigError> {
        let source = config::File::from(path.as_path()).format(config::FileFormat::Toml);
        let document = config::Config::builder()
            .add_source(source)
            .build()
            .map_err(|err| {
                let error = ConfigError::from_read_error(path.clone(), err);
                error!(
                    target: "jlaunch::config",
                    path = %path.display(),
                    reason = %error,
                    "Failed to read configuration file"
                );
                error
            })?;

        let raw: RawLauncherConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "jlaunch::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        Self::from_raw(raw, path.clone()).map_err(|err| {
            error!(
                target: "jlaunch::config",
                path = %path.display(),
                reason = %err,
                "Failed to validate configuration file"
            );
            err
        })
    }

    fn from_raw(raw: RawLauncherConfig, path: PathBuf) -> Result<Self, ConfigError> {
        let discovery = parse_discovery_section(raw.discovery, &path)?;
        let launch = parse_launch_section(raw.launch, &path)?;

        Ok(Self {
            discovery,
            launch,
            source_path: Some(path),
        })
    }
}
