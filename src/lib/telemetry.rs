//! Telemetry initialization and probe span helpers.

use std::{path::Path, time::Instant};

use anyhow::Result;
use tracing::{info, info_span, Span};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Initialize `tracing` and format developer logs.
///
/// Logs go to stderr so listing output on stdout stays machine-readable.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_file(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Span helper to record start and finish of one isolated probe.
pub struct ProbeSpan {
    span: Span,
    started_at: Instant,
    probe_id: Uuid,
}

impl ProbeSpan {
    /// Start a probe span for the given runtime home.
    pub fn start(home: &Path) -> Self {
        let probe_id = Uuid::new_v4();
        let span = info_span!(
            target: "jlaunch::probe",
            "runtime_probe",
            %probe_id,
            home = %home.display()
        );
        Self {
            span,
            started_at: Instant::now(),
            probe_id,
        }
    }

    /// Close the span while recording status and completion info.
    pub fn finish(self, status: &'static str, exit_code: Option<i32>) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        info!(
            target: "jlaunch::probe",
            probe_id = %self.probe_id,
            status = status,
            exit_code = exit_code,
            elapsed_ms = elapsed_ms,
            "Completed runtime probe"
        );
    }
}

/// Emit the native options handed to the launch worker.
pub fn emit_launch_options(library: &Path, abi_version: i32, options: &[String]) {
    info!(
        target: "jlaunch::launch",
        library = %library.display(),
        abi_version = abi_version,
        option_count = options.len(),
        options = ?options,
        "Prepared runtime launch"
    );
}
