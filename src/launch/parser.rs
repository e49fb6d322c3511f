//! Launcher argument parser.
//!
//! Three states: `Options` consumes flags until a non-flag token (the main
//! class) or a target flag (`-jar`, `-m`); `MainOrTarget` takes the main class;
//! `Passthrough` hands every remaining token to the application unchanged.

use std::{fmt, str::FromStr};

use tracing::debug;

use crate::lib::errors::ArgumentError;

use super::{
    config::{HelpRequest, LaunchConfig, ModuleTarget, VersionRequest},
    flags::{self, Arity, Attachment, FlagAction, FlagMatch},
};

/// What to do with flag-shaped tokens the table does not know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownFlagPolicy {
    /// Ignore them.
    #[default]
    Permissive,
    /// Fail the parse with [`ArgumentError::UnknownFlag`].
    Strict,
}

impl UnknownFlagPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            UnknownFlagPolicy::Permissive => "permissive",
            UnknownFlagPolicy::Strict => "strict",
        }
    }
}

impl fmt::Display for UnknownFlagPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnknownFlagPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(UnknownFlagPolicy::Permissive),
            "strict" => Ok(UnknownFlagPolicy::Strict),
            other => Err(format!(
                "expected `permissive` or `strict`, got `{other}`"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserOptions {
    pub unknown_flags: UnknownFlagPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Options,
    MainOrTarget,
    Passthrough,
}

struct Cursor<'a, S> {
    tokens: &'a [S],
    position: usize,
}

impl<'a, S: AsRef<str>> Cursor<'a, S> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.position).map(AsRef::as_ref)
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn next(&mut self) -> Option<&'a str> {
        let token = self.peek();
        if token.is_some() {
            self.advance();
        }
        token
    }
}

/// Parse a launcher argument vector (without the program name).
pub fn parse_launch_args<S: AsRef<str>>(
    args: &[S],
    options: ParserOptions,
) -> Result<LaunchConfig, ArgumentError> {
    let mut config = LaunchConfig::new();
    let mut cursor = Cursor {
        tokens: args,
        position: 0,
    };
    let mut state = ParseState::Options;

    while let Some(token) = cursor.peek() {
        if token.is_empty() {
            cursor.advance();
            continue;
        }
        state = match state {
            ParseState::Options if !flags::is_flag_shaped(token) => ParseState::MainOrTarget,
            ParseState::Options => {
                cursor.advance();
                apply_option(token, &mut cursor, &mut config, options)?
            }
            ParseState::MainOrTarget => {
                cursor.advance();
                config.main_class = Some(token.to_string());
                ParseState::Passthrough
            }
            ParseState::Passthrough => {
                cursor.advance();
                config.passthrough.push(token.to_string());
                ParseState::Passthrough
            }
        };
    }

    Ok(config)
}

fn apply_option<'a, S: AsRef<str>>(
    token: &'a str,
    cursor: &mut Cursor<'a, S>,
    config: &mut LaunchConfig,
    options: ParserOptions,
) -> Result<ParseState, ArgumentError> {
    let Some(matched) = flags::lookup(token) else {
        return match options.unknown_flags {
            UnknownFlagPolicy::Permissive => {
                debug!(target: "jlaunch::launch", token, "Ignoring unrecognized option");
                Ok(ParseState::Options)
            }
            UnknownFlagPolicy::Strict => Err(ArgumentError::UnknownFlag {
                token: token.to_string(),
            }),
        };
    };
    let value = flag_value(&matched, token, cursor)?;

    match matched.spec.action {
        FlagAction::Classpath => {
            let value = value.unwrap_or_default();
            if config.add_classpath(value) == 0 {
                return Err(ArgumentError::EmptyClasspath {
                    flag: matched.name.to_string(),
                });
            }
        }
        FlagAction::Jar => {
            config.jar = Some(required(&matched, value)?.to_string());
            return Ok(ParseState::Passthrough);
        }
        FlagAction::Module => {
            config.module = Some(ModuleTarget::parse(required(&matched, value)?));
            return Ok(ParseState::Passthrough);
        }
        FlagAction::DescribeModule => {
            config.describe_module = Some(required(&matched, value)?.to_string());
        }
        FlagAction::Help { stream, extra } => {
            config.help = Some(HelpRequest { stream, extra });
        }
        FlagAction::Version {
            stream,
            continue_after,
        } => {
            config.version = Some(VersionRequest {
                stream,
                continue_after,
            });
        }
        FlagAction::DryRun => config.dry_run = true,
        FlagAction::ListModules => config.list_modules = true,
        FlagAction::ValidateModules => config.validate_modules = true,
        FlagAction::ShowModuleResolution => config.show_module_resolution = true,
        FlagAction::SystemProperty => config.system_properties.push(token.to_string()),
        FlagAction::NativeOption => config.native_options.push(token.to_string()),
    }
    Ok(ParseState::Options)
}

/// Resolve the value a matched flag carries, consuming the next token when
/// the value is separate.
fn flag_value<'a, S: AsRef<str>>(
    matched: &FlagMatch<'a>,
    token: &'a str,
    cursor: &mut Cursor<'a, S>,
) -> Result<Option<&'a str>, ArgumentError> {
    match (matched.spec.attachment, matched.spec.arity) {
        (Attachment::Prefix, _) => {
            if token.len() == matched.name.len() {
                return Err(missing_value(matched));
            }
            Ok(Some(token))
        }
        (Attachment::Exact, Arity::Switch) => Ok(None),
        (Attachment::Exact, Arity::Value) => match matched.inline_value {
            Some(value) => Ok(Some(value)),
            None => cursor.next().map(Some).ok_or_else(|| missing_value(matched)),
        },
    }
}

fn required<'a>(matched: &FlagMatch<'_>, value: Option<&'a str>) -> Result<&'a str, ArgumentError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| missing_value(matched))
}

fn missing_value(matched: &FlagMatch<'_>) -> ArgumentError {
    ArgumentError::MissingValue {
        flag: matched.name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use crate::launch::config::OutputStream;

    use super::*;

    fn parse(args: &[&str]) -> LaunchConfig {
        parse_launch_args(args, ParserOptions::default()).expect("arguments parse")
    }

    #[test]
    fn long_classpath_splits_into_entries() {
        assert_eq!(parse(&["--classpath", "a:b:c"]).classpath, vec!["a", "b", "c"]);
    }

    #[test]
    fn classpath_accumulates_across_flags() {
        assert_eq!(
            parse(&["--classpath", "a:b", "-cp", "c"]).classpath,
            vec!["a", "b", "c"]
        );
        assert_eq!(
            parse(&["--classpath", "a:b", "-cp", "a:c:b"]).classpath,
            vec!["a", "b", "c"]
        );
    }

    #[test]
    fn equals_form_matches_separate_form() {
        assert_eq!(parse(&["--classpath=a:b:c"]), parse(&["--classpath", "a:b:c"]));
        assert_eq!(parse(&["--class-path=x"]).classpath, vec!["x"]);
    }

    #[test]
    fn jar_ends_option_parsing() {
        let config = parse(&["-jar", "app.jar"]);
        assert_eq!(config.jar.as_deref(), Some("app.jar"));
        assert!(config.passthrough.is_empty());

        let config = parse(&["-jar", "app.jar", "x", "y"]);
        assert_eq!(config.jar.as_deref(), Some("app.jar"));
        assert_eq!(config.passthrough, vec!["x", "y"]);
    }

    #[test]
    fn main_class_ends_option_parsing() {
        let config = parse(&["-cp", "app.jar", "hello.Main", "arg1"]);
        assert_eq!(config.classpath, vec!["app.jar"]);
        assert_eq!(config.main_class.as_deref(), Some("hello.Main"));
        assert_eq!(config.passthrough, vec!["arg1"]);
    }

    #[test]
    fn flags_after_the_target_belong_to_the_application() {
        let config = parse(&["-jar", "app.jar", "-cp", "ignored", "--help", "-Dx=y"]);
        assert!(config.classpath.is_empty());
        assert_eq!(config.help, None);
        assert!(config.system_properties.is_empty());
        assert_eq!(config.passthrough, vec!["-cp", "ignored", "--help", "-Dx=y"]);
    }

    #[test]
    fn help_flags_carry_their_stream() {
        for flag in ["-h", "-?", "-help"] {
            assert_eq!(
                parse(&[flag]).help,
                Some(HelpRequest {
                    stream: OutputStream::Stderr,
                    extra: false
                }),
                "{flag}"
            );
        }
        assert_eq!(
            parse(&["--help"]).help,
            Some(HelpRequest {
                stream: OutputStream::Stdout,
                extra: false
            })
        );
        assert_ne!(parse(&["-h"]).help, parse(&["--help"]).help);
        assert_eq!(
            parse(&["-X"]).help,
            Some(HelpRequest {
                stream: OutputStream::Stderr,
                extra: true
            })
        );
        assert_eq!(
            parse(&["--help-extra"]).help,
            Some(HelpRequest {
                stream: OutputStream::Stdout,
                extra: true
            })
        );
    }

    #[test]
    fn version_flags_carry_stream_and_continuation() {
        let cases = [
            ("-version", OutputStream::Stderr, false),
            ("--version", OutputStream::Stdout, false),
            ("-showversion", OutputStream::Stderr, true),
            ("--show-version", OutputStream::Stdout, true),
        ];
        for (flag, stream, continue_after) in cases {
            assert_eq!(
                parse(&[flag]).version,
                Some(VersionRequest {
                    stream,
                    continue_after
                }),
                "{flag}"
            );
        }
    }

    #[test]
    fn properties_and_native_options_keep_encounter_order() {
        let config = parse(&[
            "-Db=2",
            "-Xmx1g",
            "-Da=1",
            "-verbose:gc",
            "-javaagent:agent.jar=opts",
            "-ea",
            "-enableassertions:com.example...",
            "-disableassertions:com.example.Noisy",
            "Main",
        ]);
        assert_eq!(config.system_properties, vec!["-Db=2", "-Da=1"]);
        assert_eq!(
            config.native_options,
            vec![
                "-Xmx1g",
                "-verbose:gc",
                "-javaagent:agent.jar=opts",
                "-ea",
                "-enableassertions:com.example...",
                "-disableassertions:com.example.Noisy",
            ]
        );
    }

    #[test]
    fn long_assertion_forms_are_known_under_strict_policy() {
        let config = parse_launch_args(
            &["-enableassertions:com.example...", "-disableassertions", "Main"],
            ParserOptions {
                unknown_flags: UnknownFlagPolicy::Strict,
            },
        )
        .expect("assertion flags are recognized");
        assert_eq!(
            config.native_options,
            vec!["-enableassertions:com.example...", "-disableassertions"]
        );
        assert_eq!(config.main_class.as_deref(), Some("Main"));
    }

    #[test]
    fn module_target_is_split() {
        let config = parse(&["-m", "app/app.Main", "one"]);
        let module = config.module.expect("module target");
        assert_eq!(module.name, "app");
        assert_eq!(module.main_class.as_deref(), Some("app.Main"));
        assert_eq!(config.passthrough, vec!["one"]);

        let config = parse(&["--module=tool"]);
        assert_eq!(config.module.map(|module| module.name).as_deref(), Some("tool"));
    }

    #[test]
    fn module_introspection_flags_are_recorded() {
        let config = parse(&[
            "--dry-run",
            "--list-modules",
            "--validate-modules",
            "--show-module-resolution",
            "-d",
            "java.base",
        ]);
        assert!(config.dry_run);
        assert!(config.list_modules);
        assert!(config.validate_modules);
        assert!(config.show_module_resolution);
        assert_eq!(config.describe_module.as_deref(), Some("java.base"));
        assert!(config.passthrough.is_empty());
    }

    #[test]
    fn empty_tokens_are_skipped() {
        let config = parse(&["", "-cp", "a", "", "Main", "", "x"]);
        assert_eq!(config.main_class.as_deref(), Some("Main"));
        assert_eq!(config.passthrough, vec!["x"]);
    }

    #[test]
    fn missing_values_are_errors() {
        for (args, flag) in [
            (vec!["-cp"], "-cp"),
            (vec!["-jar"], "-jar"),
            (vec!["--module"], "--module"),
            (vec!["-jar", ""], "-jar"),
            (vec!["-D"], "-D"),
            (vec!["-javaagent:"], "-javaagent:"),
        ] {
            let error = parse_launch_args(args.as_slice(), ParserOptions::default()).unwrap_err();
            assert_eq!(
                error,
                ArgumentError::MissingValue {
                    flag: flag.to_string()
                },
                "{args:?}"
            );
        }
    }

    #[test]
    fn separator_only_classpath_is_rejected() {
        let error = parse_launch_args(&["-cp", ":"], ParserOptions::default()).unwrap_err();
        assert_eq!(
            error,
            ArgumentError::EmptyClasspath {
                flag: "-cp".to_string()
            }
        );
    }

    #[test]
    fn unknown_flags_follow_policy() {
        let config = parse(&["--enable-preview", "Main"]);
        assert_eq!(config.main_class.as_deref(), Some("Main"));
        assert!(config.native_options.is_empty());

        let strict = ParserOptions {
            unknown_flags: UnknownFlagPolicy::Strict,
        };
        let error = parse_launch_args(&["--enable-preview", "Main"], strict).unwrap_err();
        assert_eq!(
            error,
            ArgumentError::UnknownFlag {
                token: "--enable-preview".to_string()
            }
        );
    }

    #[test]
    fn policy_parses_case_insensitively() {
        assert_eq!(
            "Strict".parse::<UnknownFlagPolicy>(),
            Ok(UnknownFlagPolicy::Strict)
        );
        assert_eq!(
            " permissive ".parse::<UnknownFlagPolicy>(),
            Ok(UnknownFlagPolicy::Permissive)
        );
        assert!("lenient".parse::<UnknownFlagPolicy>().is_err());
    }
}
