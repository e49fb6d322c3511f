use std::process::ExitCode;

use anyhow::Error;

/// Bundles a user-facing failure message with the process exit code.
#[derive(Debug)]
pub struct CommandExit {
    message: String,
    exit_code: ExitCode,
}

impl CommandExit {
    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: format!("error: {err:#}"),
            exit_code: ExitCode::FAILURE,
        }
    }

    /// Command-line rejected by clap; its rendering already carries the
    /// `error:` prefix and usage hint.
    pub fn from_usage(err: clap::Error) -> Self {
        Self {
            message: err.render().to_string().trim_end().to_string(),
            exit_code: ExitCode::FAILURE,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn report(self) -> ExitCode {
        eprintln!("{}", self.message);
        self.exit_code
    }
}
