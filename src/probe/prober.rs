use std::{
    fs,
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};

use tempfile::{Builder, NamedTempFile};
use tokio::{process::Command, time};
use tracing::debug;

use crate::{
    discovery::{RuntimeDescriptor, RuntimeHome},
    lib::{errors::ProbeError, telemetry::ProbeSpan},
};

use super::{
    record::{decode_record, RECORD_SIZE},
    CandidateProbe, PROBE_WORKER_COMMAND,
};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

const STDERR_EXCERPT_LIMIT: usize = 2_000;

/// Result channel for one probe: a private file sized for one record.
///
/// The file is removed when the slot drops, whatever the probe outcome.
pub struct ResultSlot {
    file: NamedTempFile,
}

impl ResultSlot {
    pub fn create(dir: Option<&Path>) -> Result<Self, ProbeError> {
        let mut builder = Builder::new();
        builder.prefix("jlaunch-probe-");
        let file = match dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|source| ProbeError::Slot { source })?;
        file.as_file()
            .set_len(RECORD_SIZE as u64)
            .map_err(|source| ProbeError::Slot { source })?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Copy the record out of the slot. Call only after the writer exited.
    pub fn read(&self) -> Result<Vec<u8>, ProbeError> {
        fs::read(self.file.path()).map_err(|source| ProbeError::Slot { source })
    }
}

/// Probes candidates by re-executing a worker binary, one process per probe.
#[derive(Debug, Clone)]
pub struct IsolatedProber {
    worker: PathBuf,
    timeout: Duration,
    slot_dir: Option<PathBuf>,
}

impl IsolatedProber {
    pub fn new(worker: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            worker: worker.into(),
            timeout,
            slot_dir: None,
        }
    }

    /// Place result slots in `dir` instead of the system temp directory.
    pub fn with_slot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.slot_dir = Some(dir.into());
        self
    }

    async fn run_worker(&self, candidate: &RuntimeHome) -> Result<RuntimeDescriptor, ProbeError> {
        let slot = ResultSlot::create(self.slot_dir.as_deref())?;

        let mut command = Command::new(&self.worker);
        command
            .arg(PROBE_WORKER_COMMAND)
            .arg("--home")
            .arg(&candidate.home)
            .arg("--library")
            .arg(&candidate.library_path)
            .arg("--slot")
            .arg(slot.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(
            target: "jlaunch::probe",
            worker = %self.worker.display(),
            slot = %slot.path().display(),
            "Spawning probe worker"
        );
        let child = command.spawn().map_err(|source| ProbeError::Spawn {
            worker: self.worker.clone(),
            source,
        })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ProbeError::Timeout {
                home: candidate.home.clone(),
                duration_secs: self.timeout.as_secs(),
            })?
            .map_err(|err| ProbeError::WorkerFailed {
                home: candidate.home.clone(),
                exit_code: None,
                message: err.to_string(),
            })?;

        if !output.status.success() {
            return Err(ProbeError::WorkerFailed {
                home: candidate.home.clone(),
                exit_code: output.status.code(),
                message: stderr_excerpt(&output.stderr),
            });
        }

        let bytes = slot.read()?;
        let descriptor = decode_record(&bytes).map_err(|source| ProbeError::MalformedRecord {
            home: candidate.home.clone(),
            source,
        })?;
        if descriptor.home != candidate.home {
            return Err(ProbeError::HomeMismatch {
                home: candidate.home.clone(),
                reported: descriptor.home,
            });
        }
        Ok(descriptor)
    }
}

impl CandidateProbe for IsolatedProber {
    async fn probe(&self, candidate: &RuntimeHome) -> Result<RuntimeDescriptor, ProbeError> {
        let span = ProbeSpan::start(&candidate.home);
        let result = self.run_worker(candidate).await;
        match &result {
            Ok(_) => span.finish("accepted", Some(0)),
            Err(ProbeError::Timeout { .. }) => span.finish("timed_out", None),
            Err(ProbeError::WorkerFailed { exit_code, .. }) => span.finish("rejected", *exit_code),
            Err(_) => span.finish("rejected", None),
        }
        result
    }
}

/// Tail of the worker's stderr, trimmed to a readable size.
fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.is_empty() {
        return "worker produced no diagnostics".into();
    }
    let count = text.chars().count();
    if count <= STDERR_EXCERPT_LIMIT {
        return text.to_string();
    }
    text.chars().skip(count - STDERR_EXCERPT_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use tempfile::tempdir;

    use super::*;
    use crate::{
        discovery::{resolve_home, scanner::tests::make_home},
        probe::record::encode_record,
    };

    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-worker.sh");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("can write script");
        let mut permissions = fs::metadata(&path).unwrap().permissions();
        permissions.set_mode(0o755);
        fs::set_permissions(&path, permissions).unwrap();
        path
    }

    fn candidate(base: &Path) -> RuntimeHome {
        let home = make_home(base, "jdk-17");
        resolve_home(&home).expect("fake home resolves")
    }

    fn descriptor_for(home: &Path, library_path: &Path) -> RuntimeDescriptor {
        RuntimeDescriptor {
            name: Some("OpenJDK Runtime Environment".into()),
            home: home.to_path_buf(),
            library_path: library_path.to_path_buf(),
            major_version: 17,
            version: "17".into(),
            full_version: "17.0.9".into(),
            abi_version: 0x0015_0000,
        }
    }

    /// Worker script that copies `record` into the slot named after `--slot`.
    fn record_writer(dir: &Path, record: &RuntimeDescriptor) -> PathBuf {
        let record_path = dir.join("record.bin");
        fs::write(&record_path, encode_record(record).unwrap()).unwrap();
        // argv: __probe-worker --home H --library L --slot S
        write_script(dir, &format!("cat '{}' > \"$7\"", record_path.display()))
    }

    #[test]
    fn slot_is_sized_and_removed_on_drop() {
        let temp = tempdir().unwrap();
        let slot = ResultSlot::create(Some(temp.path())).unwrap();
        let path = slot.path().to_path_buf();
        assert_eq!(fs::metadata(&path).unwrap().len(), RECORD_SIZE as u64);

        drop(slot);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn failing_worker_rejects_candidate_and_releases_slot() {
        let temp = tempdir().unwrap();
        let slots = tempdir().unwrap();
        let script = write_script(temp.path(), "echo 'cannot bind JNI_CreateJavaVM' >&2\nexit 3");
        let prober = IsolatedProber::new(script, Duration::from_secs(10)).with_slot_dir(slots.path());

        let error = prober.probe(&candidate(temp.path())).await.unwrap_err();

        match error {
            ProbeError::WorkerFailed {
                exit_code, message, ..
            } => {
                assert_eq!(exit_code, Some(3));
                assert!(message.contains("JNI_CreateJavaVM"), "message: {message}");
            }
            other => panic!("Unexpected error: {other:?}"),
        }
        assert_eq!(fs::read_dir(slots.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn worker_record_is_accepted_and_slot_released() {
        let temp = tempdir().unwrap();
        let slots = tempdir().unwrap();
        let candidate = candidate(temp.path());
        let expected = descriptor_for(&candidate.home, &candidate.library_path);
        let script = record_writer(temp.path(), &expected);
        let prober = IsolatedProber::new(script, Duration::from_secs(10)).with_slot_dir(slots.path());

        let runtime = prober.probe(&candidate).await.expect("record accepted");

        assert_eq!(runtime, expected);
        assert_eq!(fs::read_dir(slots.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn record_for_another_home_is_rejected() {
        let temp = tempdir().unwrap();
        let slots = tempdir().unwrap();
        let candidate = candidate(temp.path());
        let elsewhere = temp.path().join("jdk-21");
        let script = record_writer(
            temp.path(),
            &descriptor_for(&elsewhere, &candidate.library_path),
        );
        let prober = IsolatedProber::new(script, Duration::from_secs(10)).with_slot_dir(slots.path());

        let error = prober.probe(&candidate).await.unwrap_err();

        match error {
            ProbeError::HomeMismatch { home, reported } => {
                assert_eq!(home, candidate.home);
                assert_eq!(reported, elsewhere);
            }
            other => panic!("Unexpected error: {other:?}"),
        }
        assert_eq!(fs::read_dir(slots.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn untouched_slot_is_a_malformed_record() {
        let temp = tempdir().unwrap();
        let script = write_script(temp.path(), "exit 0");
        let prober = IsolatedProber::new(script, Duration::from_secs(10));

        let error = prober.probe(&candidate(temp.path())).await.unwrap_err();
        assert!(matches!(error, ProbeError::MalformedRecord { .. }), "{error:?}");
    }

    #[tokio::test]
    async fn hung_worker_times_out() {
        let temp = tempdir().unwrap();
        let slots = tempdir().unwrap();
        let script = write_script(temp.path(), "exec sleep 30");
        let prober =
            IsolatedProber::new(script, Duration::from_millis(200)).with_slot_dir(slots.path());

        let error = prober.probe(&candidate(temp.path())).await.unwrap_err();

        assert!(matches!(error, ProbeError::Timeout { .. }), "{error:?}");
        assert_eq!(fs::read_dir(slots.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn missing_worker_is_a_spawn_error() {
        let temp = tempdir().unwrap();
        let prober = IsolatedProber::new(temp.path().join("absent"), Duration::from_secs(1));
        let error = prober.probe(&candidate(temp.path())).await.unwrap_err();
        assert!(matches!(error, ProbeError::Spawn { .. }), "{error:?}");
    }

    #[test]
    fn long_stderr_keeps_the_tail() {
        let noise = "x".repeat(STDERR_EXCERPT_LIMIT + 10) + "tail";
        let excerpt = stderr_excerpt(noise.as_bytes());
        assert_eq!(excerpt.chars().count(), STDERR_EXCERPT_LIMIT);
        assert!(excerpt.ends_with("tail"));
    }
}
