//! LaunchProfile and environment/config resolution.
use std::{env, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use crate::{
    config::LauncherConfig,
    discovery::home_hint_from_env,
    launch::{ParserOptions, UnknownFlagPolicy},
    probe::IsolatedProber,
};

/// Overrides `launch.unknown_flags` for a single invocation.
pub const UNKNOWN_FLAGS_ENV: &str = "JLAUNCH_UNKNOWN_FLAGS";

/// Everything a command needs from the environment, resolved once.
#[derive(Debug, Clone)]
pub struct LaunchProfile {
    pub config: LauncherConfig,
    /// Preferred runtime home read from `discovery.home_env`.
    pub home_hint: Option<PathBuf>,
    pub unknown_flags: UnknownFlagPolicy,
    /// Binary re-executed for probe and launch workers.
    pub worker: PathBuf,
}

impl LaunchProfile {
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            unknown_flags: self.unknown_flags,
        }
    }

    pub fn prober(&self) -> IsolatedProber {
        IsolatedProber::new(&self.worker, self.config.discovery.probe_timeout())
    }
}

/// Resolve config file, home hint, flag policy and worker binary.
pub fn resolve_profile(config_override: Option<PathBuf>) -> Result<LaunchProfile> {
    let config = LauncherConfig::resolve(config_override)?;
    let unknown_flags =
        resolve_unknown_flag_policy(config.launch.unknown_flags, env::var(UNKNOWN_FLAGS_ENV).ok())?;
    let home_hint = home_hint_from_env(&config.discovery.home_env);
    let worker = env::current_exe().context("failed to locate the jlaunch executable")?;

    debug!(
        home_env = %config.discovery.home_env,
        home_hint = ?home_hint,
        unknown_flags = %unknown_flags,
        worker = %worker.display(),
        "Resolved launch profile"
    );

    Ok(LaunchProfile {
        config,
        home_hint,
        unknown_flags,
        worker,
    })
}

/// Environment value wins over the configured policy; blank means unset.
pub fn resolve_unknown_flag_policy(
    configured: UnknownFlagPolicy,
    env_value: Option<String>,
) -> Result<UnknownFlagPolicy> {
    match env_value.filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|message: String| anyhow!("{UNKNOWN_FLAGS_ENV}: {message}")),
        None => Ok(configured),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_overrides_configured_policy() {
        assert_eq!(
            resolve_unknown_flag_policy(UnknownFlagPolicy::Permissive, Some("strict".into()))
                .unwrap(),
            UnknownFlagPolicy::Strict
        );
        assert_eq!(
            resolve_unknown_flag_policy(UnknownFlagPolicy::Strict, Some(" ".into())).unwrap(),
            UnknownFlagPolicy::Strict
        );
        assert_eq!(
            resolve_unknown_flag_policy(UnknownFlagPolicy::Strict, None).unwrap(),
            UnknownFlagPolicy::Strict
        );
    }

    #[test]
    fn invalid_environment_policy_is_an_error() {
        let error = resolve_unknown_flag_policy(UnknownFlagPolicy::Permissive, Some("loose".into()))
            .expect_err("unknown policy name");
        assert!(error.to_string().starts_with(UNKNOWN_FLAGS_ENV), "{error}");
    }
}
