//! CLI entrypoint module structure.
use std::{fmt::Write as _, path::Path};

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::{
    discovery::{discover, find_default, RuntimeDescriptor},
    launch::{
        flags::{Attachment, FlagAction, FLAGS},
        launch_async, materialize, parse_launch_args, HelpRequest, LaunchConfig, LaunchPlan,
        OutputStream,
    },
    lib::{errors::DiscoveryError, table::render_runtime_listing},
};

pub mod args;
pub mod exit;
pub mod profile;

pub use args::{
    normalize_args, Command, DiscoverArgs, LauncherArgs, LaunchWorkerArgs, ListingFormat,
    ProbeWorkerArgs, RunArgs,
};
pub use exit::CommandExit;
pub use profile::{resolve_profile, resolve_unknown_flag_policy, LaunchProfile, UNKNOWN_FLAGS_ENV};

/// Standard usage printed for `-h`, `-?`, `-help` and `--help`.
pub const RUN_USAGE: &str = "\
Usage: jlaunch [options] <mainclass> [args...]
           (to execute a class)
   or  jlaunch [options] -jar <jarfile> [args...]
           (to execute a jar file)
   or  jlaunch [options] -m <module>[/<mainclass>] [args...]
       jlaunch [options] --module <module>[/<mainclass>] [args...]
           (to execute the main class in a module)

 Arguments following the main class, -jar <jarfile> or -m <module>
 are passed as the arguments to the main class.

 where options include:

    -cp <search path of directories and zip/jar files>
    -classpath <search path of directories and zip/jar files>
    --class-path <search path of directories and zip/jar files>
                  A separated list of directories, JAR archives and ZIP
                  archives to search for class files.
    --list-modules
                  list observable modules and exit
    -d <module name>
    --describe-module <module name>
                  describe a module and exit
    --dry-run     create the runtime and load the main class but do not
                  execute the main method
    --validate-modules
                  validate all modules and exit
    --show-module-resolution
                  show module resolution output during startup
    -D<name>=<value>
                  set a system property
    -verbose:[class|module|gc|jni]
                  enable verbose output
    -version      print product version to the error stream and exit
    --version     print product version to the output stream and exit
    -showversion  print product version to the error stream and continue
    --show-version
                  print product version to the output stream and continue
    -? -h -help
                  print this help message to the error stream
    --help        print this help message to the output stream
    -X            print help on extra options to the error stream
    --help-extra  print help on extra options to the output stream
    -ea[:<packagename>...|:<classname>]
    -enableassertions[:<packagename>...|:<classname>]
                  enable assertions
    -da[:<packagename>...|:<classname>]
    -disableassertions[:<packagename>...|:<classname>]
                  disable assertions
    -agentlib:<libname>[=<options>]
    -agentpath:<pathname>[=<options>]
    -javaagent:<jarpath>[=<options>]
                  load a native or Java agent
";

/// Execute a user-facing command against the resolved profile.
pub async fn execute_command(command: Command, profile: &LaunchProfile) -> Result<()> {
    match command {
        Command::Run(run) => run_application(&run.args, profile).await,
        Command::Discover(args) => discover_runtimes(args, profile).await,
        Command::Show => show_default_runtime(profile).await,
        Command::ProbeWorker(_) | Command::LaunchWorker(_) => {
            bail!("worker commands are not dispatched through a profile")
        }
    }
}

async fn run_application(args: &[String], profile: &LaunchProfile) -> Result<()> {
    let config = parse_launch_args(args, profile.parser_options())
        .context("invalid launcher arguments")?;

    if let Some(help) = config.help {
        print_help(help);
        return Ok(());
    }
    if !has_launch_work(&config) {
        eprint!("{RUN_USAGE}");
        bail!("no main class, jar or module to launch");
    }

    let prober = profile.prober();
    let runtime = find_default(profile.home_hint.as_deref(), &prober)
        .await
        .with_context(|| {
            format!(
                "failed to resolve the runtime named by {}",
                profile.config.discovery.home_env
            )
        })?;
    let materialized =
        materialize(&config, Some(&runtime)).context("failed to build runtime options")?;
    let plan = LaunchPlan::new(&config, &runtime, materialized);

    let handle = launch_async(&profile.worker, &plan)?;
    info!(
        target: "jlaunch::launch",
        home = %runtime.home.display(),
        pid = handle.id(),
        "Launched application"
    );
    let status = handle.wait().await?;
    if !status.success() {
        bail!("application exited with {status}");
    }
    Ok(())
}

fn has_launch_work(config: &LaunchConfig) -> bool {
    config.target().is_some()
        || config.version.is_some()
        || config.list_modules
        || config.describe_module.is_some()
}

fn print_help(help: HelpRequest) {
    let text = if help.extra {
        extra_help()
    } else {
        RUN_USAGE.to_string()
    };
    match help.stream {
        OutputStream::Stdout => print!("{text}"),
        OutputStream::Stderr => eprint!("{text}"),
    }
}

/// Extended help: the native option prefixes handed to the runtime as-is.
pub fn extra_help() -> String {
    let mut text = String::from("The following options are passed to the runtime unchanged:\n\n");
    for spec in FLAGS {
        if spec.action != FlagAction::NativeOption {
            continue;
        }
        let suffix = match spec.attachment {
            Attachment::Prefix => "<value>",
            Attachment::Exact => "",
        };
        let _ = writeln!(text, "    {}{suffix}", spec.name);
        for alias in spec.aliases {
            let _ = writeln!(text, "    {alias}{suffix}");
        }
    }
    text.push_str("\nRun the selected runtime's own `-X` help for the options it accepts.\n");
    text
}

async fn discover_runtimes(args: DiscoverArgs, profile: &LaunchProfile) -> Result<()> {
    let base = args
        .base_path
        .unwrap_or_else(|| profile.config.discovery.base_path.clone());
    let prober = profile.prober();
    let registry = discover(&base, &prober).await?;
    if registry.is_empty() {
        return Err(no_runtime_under(&base).into());
    }

    match args.format {
        ListingFormat::Table => print!("{}", render_runtime_listing(registry.all())),
        ListingFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(registry.all())
                .context("failed to encode runtime listing")?
        ),
    }
    Ok(())
}

fn no_runtime_under(base: &Path) -> DiscoveryError {
    DiscoveryError::NoRuntimeFound {
        reason: format!("no runtime under {}", base.display()),
    }
}

async fn show_default_runtime(profile: &LaunchProfile) -> Result<()> {
    let prober = profile.prober();
    let runtime = find_default(profile.home_hint.as_deref(), &prober)
        .await
        .with_context(|| {
            format!(
                "failed to resolve the runtime named by {}",
                profile.config.discovery.home_env
            )
        })?;
    print!("{}", describe_runtime(&runtime));
    Ok(())
}

/// `key: value` summary printed by `jlaunch show`.
pub fn describe_runtime(runtime: &RuntimeDescriptor) -> String {
    format!(
        "name: {}\nversion: {}\nfull_version: {}\nabi_version: {:#x}\nhome: {}\nlibrary: {}\n",
        runtime.name.as_deref().unwrap_or("-"),
        runtime.version,
        runtime.full_version,
        runtime.abi_version,
        runtime.home.display(),
        runtime.library_path.display(),
    )
}
