use std::{
    fs,
    path::{Path, PathBuf},
    process::{Output, Stdio},
};

use anyhow::{Context, Result};
use jlaunch::discovery::scanner::library_candidates;
use tokio::process::Command;

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_jlaunch");

/// Variables the binary reads; cleared so the host environment cannot leak in.
const ISOLATED_ENV: [&str; 4] = [
    "JLAUNCH_CONFIG",
    "JLAUNCH_UNKNOWN_FLAGS",
    "JAVA_HOME",
    "RUST_LOG",
];

/// `jlaunch` command running in `cwd` with a scrubbed environment.
pub fn jlaunch(cwd: &Path) -> Command {
    let mut command = Command::new(BINARY_PATH);
    command
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    for key in ISOLATED_ENV {
        command.env_remove(key);
    }
    command
}

pub async fn run(command: &mut Command) -> Result<Output> {
    command
        .output()
        .await
        .context("failed to run jlaunch binary")
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Directory that looks like a runtime home but whose library cannot load.
pub fn fake_home(base: &Path, name: &str) -> Result<PathBuf> {
    let home = base.join(name);
    let library = library_candidates(&home)
        .into_iter()
        .next()
        .context("no library layout for this platform")?;
    let parent = library.parent().context("library path has no parent")?;
    fs::create_dir_all(parent)
        .with_context(|| format!("failed to create {}", parent.display()))?;
    fs::write(&library, b"not a shared object")
        .with_context(|| format!("failed to write {}", library.display()))?;
    Ok(home)
}
