use serde::{Deserialize, Serialize};

use crate::{lib::paths, native::LaunchMode};

/// Stream a help or version banner is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpRequest {
    pub stream: OutputStream,
    /// Extended (`-X` style) help rather than the standard usage.
    pub extra: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRequest {
    pub stream: OutputStream,
    /// Keep launching after the banner is printed.
    pub continue_after: bool,
}

/// `-m module[/mainclass]` target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleTarget {
    pub name: String,
    pub main_class: Option<String>,
}

impl ModuleTarget {
    pub fn parse(value: &str) -> Self {
        match value.split_once('/') {
            Some((name, main_class)) => Self {
                name: name.to_string(),
                main_class: Some(main_class.to_string()).filter(|class| !class.is_empty()),
            },
            None => Self {
                name: value.to_string(),
                main_class: None,
            },
        }
    }

    /// The `module[/mainclass]` form handed to the launcher helper.
    pub fn launcher_name(&self) -> String {
        match &self.main_class {
            Some(main_class) => format!("{}/{main_class}", self.name),
            None => self.name.clone(),
        }
    }
}

/// Parsed intent of one launcher invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Class path entries in first-seen order, without duplicates.
    pub classpath: Vec<String>,
    pub native_options: Vec<String>,
    pub jar: Option<String>,
    pub main_class: Option<String>,
    pub module: Option<ModuleTarget>,
    pub system_properties: Vec<String>,
    pub passthrough: Vec<String>,
    pub help: Option<HelpRequest>,
    pub version: Option<VersionRequest>,
    pub dry_run: bool,
    pub list_modules: bool,
    pub validate_modules: bool,
    pub show_module_resolution: bool,
    pub describe_module: Option<String>,
}

impl LaunchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a search-path value and append unseen entries.
    ///
    /// Returns the number of fragments the value contained, duplicates included.
    pub fn add_classpath(&mut self, raw: &str) -> usize {
        let mut fragments = 0;
        for entry in paths::split_search_path(raw) {
            fragments += 1;
            if !self.classpath.iter().any(|known| known == entry) {
                self.classpath.push(entry.to_string());
            }
        }
        fragments
    }

    /// What the launcher would load, in priority order jar, module, class.
    pub fn target(&self) -> Option<(LaunchMode, String)> {
        if let Some(jar) = &self.jar {
            return Some((LaunchMode::Jar, jar.clone()));
        }
        if let Some(module) = &self.module {
            return Some((LaunchMode::Module, module.launcher_name()));
        }
        self.main_class
            .as_ref()
            .map(|main_class| (LaunchMode::Class, main_class.clone()))
    }
}
