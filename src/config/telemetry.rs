use std::path::Path;

use tracing::{debug, info};

use super::{LauncherConfig, CONFIG_ENV_KEY, DEFAULT_CONFIG_PATH};

pub fn log_source(path: Option<&Path>, origin: &'static str) {
    match path {
        Some(path) => info!(
            target: "jlaunch::config",
            path = %path.display(),
            origin,
            "Loading configuration file"
        ),
        None => debug!(
            target: "jlaunch::config",
            env = CONFIG_ENV_KEY,
            default = DEFAULT_CONFIG_PATH,
            "No configuration file found; using built-in defaults"
        ),
    }
}

pub fn log_loaded(config: &LauncherConfig) {
    info!(
        target: "jlaunch::config",
        path = ?config.source_path,
        base_path = %config.discovery.base_path.display(),
        home_env = %config.discovery.home_env,
        probe_timeout_secs = config.discovery.probe_timeout_secs,
        unknown_flags = %config.launch.unknown_flags,
        "Configuration resolved"
    );
}
