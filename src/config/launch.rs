use std::path::Path;

use serde::Deserialize;

use crate::{launch::UnknownFlagPolicy, lib::errors::ConfigError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchSection {
    pub unknown_flags: UnknownFlagPolicy,
}

#[derive(Debug, Deserialize, Default)]
pub struct RawLaunchSection {
    pub unknown_flags: Option<String>,
}

pub fn parse_launch_section(
    raw: Option<RawLaunchSection>,
    path: &Path,
) -> Result<LaunchSection, ConfigError> {
    let unknown_flags = match raw.and_then(|raw| raw.unknown_flags) {
        Some(value) => value
            .parse::<UnknownFlagPolicy>()
            .map_err(|message| ConfigError::InvalidField {
                path: path.to_path_buf(),
                field: "launch.unknown_flags",
                message,
            })?,
        None => UnknownFlagPolicy::default(),
    };
    Ok(LaunchSection { unknown_flags })
}
