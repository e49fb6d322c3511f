//! Hand-off to the launch worker, which owns the runtime instance.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
};

use serde::{Deserialize, Serialize};
use tempfile::{Builder, NamedTempFile};
use tokio::process::{Child, Command};
use tracing::{debug, info};

use crate::{
    discovery::RuntimeDescriptor,
    lib::{
        errors::{LaunchError, NativeError, WorkerError},
        telemetry,
    },
    native::{JniLibrary, LaunchMode, NativeLibrary},
};

use super::{
    config::{LaunchConfig, OutputStream, VersionRequest},
    materialize::MaterializedOptions,
};

/// Hidden subcommand the launcher re-executes the binary with.
pub const LAUNCH_WORKER_COMMAND: &str = "__launch-worker";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchTarget {
    pub mode: LaunchMode,
    pub name: String,
}

/// Everything the launch worker needs, written to a private file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchPlan {
    pub library_path: PathBuf,
    pub major_version: u32,
    pub abi_version: i32,
    pub options: Vec<String>,
    pub version: Option<VersionRequest>,
    pub dry_run: bool,
    pub list_modules: bool,
    pub describe_module: Option<String>,
    pub target: Option<LaunchTarget>,
    pub args: Vec<String>,
}

impl LaunchPlan {
    pub fn new(
        config: &LaunchConfig,
        runtime: &RuntimeDescriptor,
        materialized: MaterializedOptions,
    ) -> Self {
        Self {
            library_path: runtime.library_path.clone(),
            major_version: runtime.major_version,
            abi_version: materialized.abi_version,
            options: materialized.options,
            version: config.version,
            dry_run: config.dry_run,
            list_modules: config.list_modules,
            describe_module: config.describe_module.clone(),
            target: config
                .target()
                .map(|(mode, name)| LaunchTarget { mode, name }),
            args: config.passthrough.clone(),
        }
    }

    fn write_to_temp(&self) -> Result<NamedTempFile, LaunchError> {
        let encoded =
            serde_json::to_vec(self).map_err(|source| LaunchError::PlanEncode { source })?;
        let mut file = Builder::new()
            .prefix("jlaunch-plan-")
            .suffix(".json")
            .tempfile()
            .map_err(|source| LaunchError::PlanWrite { source })?;
        file.write_all(&encoded)
            .and_then(|_| file.flush())
            .map_err(|source| LaunchError::PlanWrite { source })?;
        Ok(file)
    }

    pub fn read_from(path: &Path) -> Result<Self, WorkerError> {
        let bytes = fs::read(path).map_err(|source| WorkerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| WorkerError::Plan {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A running launch worker. The plan file lives until the worker is reaped.
pub struct LaunchHandle {
    child: Child,
    _plan: NamedTempFile,
}

impl LaunchHandle {
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    pub async fn wait(mut self) -> Result<ExitStatus, LaunchError> {
        let status = self
            .child
            .wait()
            .await
            .map_err(|source| LaunchError::Wait { source })?;
        debug!(target: "jlaunch::launch", status = %status, "Launch worker exited");
        Ok(status)
    }
}

/// Start the launch worker and return without waiting for it.
pub fn launch_async(worker: &Path, plan: &LaunchPlan) -> Result<LaunchHandle, LaunchError> {
    let plan_file = plan.write_to_temp()?;
    telemetry::emit_launch_options(&plan.library_path, plan.abi_version, &plan.options);

    let child = Command::new(worker)
        .arg(LAUNCH_WORKER_COMMAND)
        .arg("--plan")
        .arg(plan_file.path())
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            worker: worker.to_path_buf(),
            source,
        })?;
    info!(
        target: "jlaunch::launch",
        pid = child.id(),
        plan = %plan_file.path().display(),
        "Launch worker started"
    );

    Ok(LaunchHandle {
        child,
        _plan: plan_file,
    })
}

/// Child side of a launch: create the instance and run the plan.
pub fn run_launch_worker(plan_path: &Path) -> Result<(), WorkerError> {
    let plan = LaunchPlan::read_from(plan_path)?;
    let native = JniLibrary::open(&plan.library_path)?;
    if !native.supports_abi(plan.abi_version)? {
        return Err(NativeError::UnsupportedAbi {
            version: plan.abi_version,
        }
        .into());
    }
    let instance = native.create_jni_instance(&plan.options, plan.abi_version, false)?;

    if let Some(version) = plan.version {
        instance.print_version(plan.major_version, version.stream == OutputStream::Stderr)?;
        if !version.continue_after {
            return Ok(());
        }
    }
    if plan.list_modules {
        instance.list_modules()?;
        return Ok(());
    }
    if let Some(module) = &plan.describe_module {
        instance.describe_module(module)?;
        return Ok(());
    }

    let target = plan.target.as_ref().ok_or(WorkerError::NoTarget)?;
    if plan.dry_run {
        instance.check_main(target.mode, &target.name)?;
        return Ok(());
    }
    instance.run_main(target.mode, &target.name, &plan.args)?;
    Ok(())
}
