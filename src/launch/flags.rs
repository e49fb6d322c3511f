//! Declarative table of launcher flags.
//!
//! Matching order: exact names (and `--long=value`) across the whole table
//! first, then prefix flags. `-X` alone is extended help while `-Xmx1g` is a
//! native option, so exact matching must win.

use super::config::OutputStream;

pub const FLAG_PREFIX: &str = "-";
pub const LONG_FLAG_PREFIX: &str = "--";

/// Effect of a recognized flag on the launch configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagAction {
    Classpath,
    Jar,
    Module,
    DescribeModule,
    Help { stream: OutputStream, extra: bool },
    Version { stream: OutputStream, continue_after: bool },
    DryRun,
    ListModules,
    ValidateModules,
    ShowModuleResolution,
    SystemProperty,
    NativeOption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// No value.
    Switch,
    /// One value, from the next token or after `=` on a long name.
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    /// The token must equal a name.
    Exact,
    /// The token starts with a name; the token itself is the value and
    /// something must follow the name.
    Prefix,
}

#[derive(Debug)]
pub struct FlagSpec {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub arity: Arity,
    pub attachment: Attachment,
    pub action: FlagAction,
}

impl FlagSpec {
    fn names(&self) -> impl Iterator<Item = &'static str> {
        std::iter::once(self.name).chain(self.aliases.iter().copied())
    }
}

const fn exact(
    name: &'static str,
    aliases: &'static [&'static str],
    arity: Arity,
    action: FlagAction,
) -> FlagSpec {
    FlagSpec {
        name,
        aliases,
        arity,
        attachment: Attachment::Exact,
        action,
    }
}

const fn prefix(name: &'static str, action: FlagAction) -> FlagSpec {
    FlagSpec {
        name,
        aliases: &[],
        arity: Arity::Switch,
        attachment: Attachment::Prefix,
        action,
    }
}

pub const FLAGS: &[FlagSpec] = &[
    exact("-jar", &[], Arity::Value, FlagAction::Jar),
    exact("--module", &["-m"], Arity::Value, FlagAction::Module),
    exact(
        "--class-path",
        &["-cp", "-classpath", "--classpath"],
        Arity::Value,
        FlagAction::Classpath,
    ),
    exact(
        "--describe-module",
        &["-d"],
        Arity::Value,
        FlagAction::DescribeModule,
    ),
    exact(
        "-help",
        &["-h", "-?"],
        Arity::Switch,
        FlagAction::Help {
            stream: OutputStream::Stderr,
            extra: false,
        },
    ),
    exact(
        "--help",
        &[],
        Arity::Switch,
        FlagAction::Help {
            stream: OutputStream::Stdout,
            extra: false,
        },
    ),
    exact(
        "-X",
        &[],
        Arity::Switch,
        FlagAction::Help {
            stream: OutputStream::Stderr,
            extra: true,
        },
    ),
    exact(
        "--help-extra",
        &[],
        Arity::Switch,
        FlagAction::Help {
            stream: OutputStream::Stdout,
            extra: true,
        },
    ),
    exact(
        "-version",
        &[],
        Arity::Switch,
        FlagAction::Version {
            stream: OutputStream::Stderr,
            continue_after: false,
        },
    ),
    exact(
        "--version",
        &[],
        Arity::Switch,
        FlagAction::Version {
            stream: OutputStream::Stdout,
            continue_after: false,
        },
    ),
    exact(
        "-showversion",
        &[],
        Arity::Switch,
        FlagAction::Version {
            stream: OutputStream::Stderr,
            continue_after: true,
        },
    ),
    exact(
        "--show-version",
        &[],
        Arity::Switch,
        FlagAction::Version {
            stream: OutputStream::Stdout,
            continue_after: true,
        },
    ),
    exact("--dry-run", &[], Arity::Switch, FlagAction::DryRun),
    exact("--list-modules", &[], Arity::Switch, FlagAction::ListModules),
    exact(
        "--validate-modules",
        &[],
        Arity::Switch,
        FlagAction::ValidateModules,
    ),
    exact(
        "--show-module-resolution",
        &[],
        Arity::Switch,
        FlagAction::ShowModuleResolution,
    ),
    exact("-verbose", &[], Arity::Switch, FlagAction::NativeOption),
    exact(
        "-enableassertions",
        &["-ea", "-disableassertions", "-da", "-esa", "-dsa"],
        Arity::Switch,
        FlagAction::NativeOption,
    ),
    prefix("-D", FlagAction::SystemProperty),
    prefix("-X", FlagAction::NativeOption),
    prefix("-verbose:", FlagAction::NativeOption),
    prefix("-javaagent:", FlagAction::NativeOption),
    prefix("-agentlib:", FlagAction::NativeOption),
    prefix("-agentpath:", FlagAction::NativeOption),
    prefix("-ea:", FlagAction::NativeOption),
    prefix("-da:", FlagAction::NativeOption),
    prefix("-enableassertions:", FlagAction::NativeOption),
    prefix("-disableassertions:", FlagAction::NativeOption),
];

/// A token matched against [`FLAGS`].
#[derive(Debug, Clone, Copy)]
pub struct FlagMatch<'a> {
    pub spec: &'static FlagSpec,
    /// The name the token matched.
    pub name: &'static str,
    /// Value carried inside the token: after `=` for long names, or the whole
    /// token for prefix flags.
    pub inline_value: Option<&'a str>,
}

pub fn is_flag_shaped(token: &str) -> bool {
    token.starts_with(FLAG_PREFIX)
}

fn is_long(name: &str) -> bool {
    name.len() > LONG_FLAG_PREFIX.len() && name.starts_with(LONG_FLAG_PREFIX)
}

/// Look a token up in the flag table.
pub fn lookup(token: &str) -> Option<FlagMatch<'_>> {
    let exact_specs = FLAGS
        .iter()
        .filter(|spec| spec.attachment == Attachment::Exact);
    for spec in exact_specs {
        for name in spec.names() {
            if token == name {
                return Some(FlagMatch {
                    spec,
                    name,
                    inline_value: None,
                });
            }
            if is_long(name) {
                if let Some(value) = token
                    .strip_prefix(name)
                    .and_then(|rest| rest.strip_prefix('='))
                {
                    return Some(FlagMatch {
                        spec,
                        name,
                        inline_value: Some(value),
                    });
                }
            }
        }
    }

    FLAGS
        .iter()
        .filter(|spec| spec.attachment == Attachment::Prefix)
        .find_map(|spec| {
            spec.names()
                .find(|name| token.starts_with(name))
                .map(|name| FlagMatch {
                    spec,
                    name,
                    inline_value: Some(token),
                })
        })
}
