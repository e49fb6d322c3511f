//! Entry point for jlaunch.
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use jlaunch::{
    cli::{
        execute_command, normalize_args, resolve_profile, Command, CommandExit, LaunchWorkerArgs,
        LauncherArgs, ProbeWorkerArgs,
    },
    launch::run_launch_worker,
    lib::telemetry,
    probe::run_probe_worker,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match bootstrap().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(exit) => exit.report(),
    }
}

async fn bootstrap() -> Result<(), CommandExit> {
    telemetry::init_tracing().map_err(CommandExit::from_error)?;
    let args = match LauncherArgs::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(args) => args,
        Err(err) if !err.use_stderr() => {
            print!("{}", err.render());
            return Ok(());
        }
        Err(err) => return Err(CommandExit::from_usage(err)),
    };

    let Some(command) = args.command else {
        let mut usage = LauncherArgs::command();
        print!("{}", usage.render_long_help());
        return Ok(());
    };

    match command {
        Command::ProbeWorker(ProbeWorkerArgs {
            home,
            library,
            slot,
        }) => run_probe_worker(&home, &library, &slot).map_err(CommandExit::from_error),
        Command::LaunchWorker(LaunchWorkerArgs { plan }) => {
            run_launch_worker(&plan).map_err(CommandExit::from_error)
        }
        command => {
            let profile = resolve_profile(args.config_override).map_err(CommandExit::from_error)?;
            execute_command(command, &profile)
                .await
                .map_err(CommandExit::from_error)
        }
    }
}
