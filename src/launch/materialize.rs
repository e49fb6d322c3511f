use std::path::Path;

use crate::{
    discovery::RuntimeDescriptor,
    lib::{errors::MaterializeError, fs as launcher_fs, paths},
    native::DEFAULT_ABI_VERSION,
};

use super::config::LaunchConfig;

const CLASS_PATH_PROPERTY: &str = "-Djava.class.path=";

/// Native options ready for instance creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedOptions {
    pub options: Vec<String>,
    pub abi_version: i32,
}

/// Turn a parsed launch configuration into ordered native options.
///
/// Order: class path, system properties, native options, then module
/// properties. Every jar or class path entry must exist; on failure no
/// options are returned.
pub fn materialize(
    config: &LaunchConfig,
    runtime: Option<&RuntimeDescriptor>,
) -> Result<MaterializedOptions, MaterializeError> {
    let mut options = Vec::with_capacity(
        1 + config.system_properties.len() + config.native_options.len() + 4,
    );

    if let Some(jar) = config.jar.as_deref().filter(|jar| !jar.is_empty()) {
        require_exists(jar)?;
        options.push(format!("{CLASS_PATH_PROPERTY}{jar}"));
    } else if !config.classpath.is_empty() {
        for entry in &config.classpath {
            require_exists(entry)?;
        }
        options.push(format!(
            "{CLASS_PATH_PROPERTY}{}",
            paths::join_search_path(&config.classpath)
        ));
    }

    options.extend(config.system_properties.iter().cloned());
    options.extend(config.native_options.iter().cloned());

    if config.validate_modules {
        options.push("-Djdk.module.validation=true".to_string());
    }
    if config.show_module_resolution {
        options.push("-Djdk.module.showModuleResolution=true".to_string());
    }
    if let Some(module) = &config.module {
        options.push(format!("-Djdk.module.main={}", module.name));
        if let Some(main_class) = &module.main_class {
            options.push(format!("-Djdk.module.main.class={main_class}"));
        }
    }

    let abi_version = runtime
        .map(|runtime| runtime.abi_version)
        .filter(|version| *version > 0)
        .unwrap_or(DEFAULT_ABI_VERSION);

    Ok(MaterializedOptions {
        options,
        abi_version,
    })
}

fn require_exists(entry: &str) -> Result<(), MaterializeError> {
    let path = Path::new(entry);
    if launcher_fs::path_exists(path) {
        Ok(())
    } else {
        Err(MaterializeError::MissingPath {
            path: path.to_path_buf(),
        })
    }
}
