//! Launcher command line: parsing, option materialization, and the hand-off
//! to the launch worker.

pub mod config;
pub mod flags;
mod invoke;
mod materialize;
mod parser;

pub use config::{HelpRequest, LaunchConfig, ModuleTarget, OutputStream, VersionRequest};
pub use invoke::{
    launch_async, run_launch_worker, LaunchHandle, LaunchPlan, LaunchTarget,
    LAUNCH_WORKER_COMMAND,
};
pub use materialize::{materialize, MaterializedOptions};
pub use parser::{parse_launch_args, ParserOptions, UnknownFlagPolicy};
