//! CLI argument definitions.
use std::{ffi::OsString, path::PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::{launch::LAUNCH_WORKER_COMMAND, probe::PROBE_WORKER_COMMAND};

const CONFIG_FLAG: &str = "--config";
const RUN_COMMAND: &str = "run";

/// Output format of `discover`.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ListingFormat {
    Table,
    Json,
}

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "jlaunch",
    author,
    about = "Discover installed Java runtimes and launch applications with them",
    long_about = None,
    after_help = "Any arguments starting with `-` are treated as `jlaunch run <args>`, e.g. `jlaunch -cp app.jar hello.Main`."
)]
pub struct LauncherArgs {
    /// Path to jlaunch.toml (overrides JLAUNCH_CONFIG).
    #[arg(long = "config")]
    pub config_override: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Launch an application with the default runtime (java-compatible arguments).
    Run(RunArgs),
    /// List runtimes installed under a base directory.
    #[command(alias = "discovery")]
    Discover(DiscoverArgs),
    /// Show the runtime selected by the home environment variable.
    Show,
    #[command(name = PROBE_WORKER_COMMAND, hide = true)]
    ProbeWorker(ProbeWorkerArgs),
    #[command(name = LAUNCH_WORKER_COMMAND, hide = true)]
    LaunchWorker(LaunchWorkerArgs),
}

/// Arguments for `run`; parsed by the launcher grammar, not by clap.
#[derive(Debug, Clone, Args)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct DiscoverArgs {
    /// Directory whose children are scanned (defaults to discovery.base_path).
    pub base_path: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = ListingFormat::Table)]
    pub format: ListingFormat,
}

#[derive(Debug, Clone, Args)]
pub struct ProbeWorkerArgs {
    #[arg(long)]
    pub home: PathBuf,
    #[arg(long)]
    pub library: PathBuf,
    #[arg(long)]
    pub slot: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct LaunchWorkerArgs {
    #[arg(long)]
    pub plan: PathBuf,
}

/// Insert `run` when launcher arguments are given without a subcommand.
///
/// `jlaunch -cp app.jar Main` becomes `jlaunch run -cp app.jar Main`; a
/// leading `--config <path>` stays in front.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut args: Vec<OsString> = args.into_iter().collect();
    let mut position = 1;
    while let Some(token) = args.get(position).and_then(|token| token.to_str()) {
        if token == CONFIG_FLAG {
            position += 2;
        } else if token.starts_with(CONFIG_FLAG) && token[CONFIG_FLAG.len()..].starts_with('=') {
            position += 1;
        } else {
            break;
        }
    }

    let starts_with_flag = args
        .get(position)
        .and_then(|token| token.to_str())
        .is_some_and(|token| token.starts_with('-'));
    if starts_with_flag {
        args.insert(position, OsString::from(RUN_COMMAND));
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(args: &[&str]) -> Vec<String> {
        normalize_args(args.iter().map(OsString::from))
            .into_iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn flags_without_subcommand_become_run() {
        assert_eq!(
            normalized(&["jlaunch", "-cp", "app.jar", "Main"]),
            vec!["jlaunch", "run", "-cp", "app.jar", "Main"]
        );
        assert_eq!(
            normalized(&["jlaunch", "--config", "x.toml", "-version"]),
            vec!["jlaunch", "--config", "x.toml", "run", "-version"]
        );
        assert_eq!(
            normalized(&["jlaunch", "--config=x.toml", "--help"]),
            vec!["jlaunch", "--config=x.toml", "run", "--help"]
        );
    }

    #[test]
    fn subcommands_and_empty_argv_are_untouched() {
        assert_eq!(normalized(&["jlaunch"]), vec!["jlaunch"]);
        assert_eq!(
            normalized(&["jlaunch", "discover", "/opt/java"]),
            vec!["jlaunch", "discover", "/opt/java"]
        );
        assert_eq!(
            normalized(&["jlaunch", "--config", "x.toml"]),
            vec!["jlaunch", "--config", "x.toml"]
        );
    }

    #[test]
    fn run_keeps_launcher_flags_verbatim() {
        let args = LauncherArgs::try_parse_from(normalize_args(
            ["jlaunch", "-cp", "a:b", "-h", "--help", "Main", "-x"]
                .into_iter()
                .map(OsString::from),
        ))
        .expect("run arguments parse");

        match args.command {
            Some(Command::Run(run)) => {
                assert_eq!(run.args, vec!["-cp", "a:b", "-h", "--help", "Main", "-x"])
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn worker_subcommands_match_spawned_names() {
        let args = LauncherArgs::try_parse_from([
            "jlaunch",
            PROBE_WORKER_COMMAND,
            "--home",
            "/usr/lib/jvm/jdk-17",
            "--library",
            "/usr/lib/jvm/jdk-17/lib/server/libjvm.so",
            "--slot",
            "/tmp/slot",
        ])
        .expect("probe worker arguments parse");
        assert!(matches!(args.command, Some(Command::ProbeWorker(_))));

        let args = LauncherArgs::try_parse_from(["jlaunch", LAUNCH_WORKER_COMMAND, "--plan", "/tmp/plan.json"])
            .expect("launch worker arguments parse");
        assert!(matches!(args.command, Some(Command::LaunchWorker(_))));
    }

    #[test]
    fn discover_defaults_to_table() {
        let args = LauncherArgs::try_parse_from(["jlaunch", "discover"]).unwrap();
        match args.command {
            Some(Command::Discover(discover)) => {
                assert_eq!(discover.format, ListingFormat::Table);
                assert_eq!(discover.base_path, None);
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn discovery_is_accepted_as_discover() {
        let args =
            LauncherArgs::try_parse_from(["jlaunch", "discovery", "/usr/lib/jvm"]).unwrap();
        match args.command {
            Some(Command::Discover(discover)) => {
                assert_eq!(discover.base_path, Some(PathBuf::from("/usr/lib/jvm")));
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }
}
