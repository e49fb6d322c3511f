use std::{io, path::PathBuf};

use config::ConfigError as ConfigLoaderError;
use thiserror::Error;

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the configuration file.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Field failed validation.
    #[error("Configuration file {path} has invalid `{field}`: {message}")]
    InvalidField {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// Failures that make a discovery or default-resolution request impossible.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Discovery path {path} cannot be read: {source}")]
    NoSuchPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("No Java runtime found: {reason}")]
    NoRuntimeFound { reason: String },
}

/// Reasons a single scan candidate is rejected. Never fatal to a scan.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to allocate probe result slot: {source}")]
    Slot {
        #[source]
        source: io::Error,
    },
    #[error("Failed to start probe worker {worker}: {source}")]
    Spawn {
        worker: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Probe of {home} did not finish within {duration_secs} seconds")]
    Timeout { home: PathBuf, duration_secs: u64 },
    #[error("Probe worker for {home} exited abnormally (exit={exit_code:?}): {message}")]
    WorkerFailed {
        home: PathBuf,
        exit_code: Option<i32>,
        message: String,
    },
    #[error("Probe worker for {home} produced a malformed record: {source}")]
    MalformedRecord {
        home: PathBuf,
        #[source]
        source: RecordError,
    },
    #[error("Probe worker reported home {reported} while probing {home}")]
    HomeMismatch { home: PathBuf, reported: PathBuf },
}

/// Fixed-layout probe record encoding and decoding failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("record is {actual} bytes, expected {expected}")]
    Size { expected: usize, actual: usize },
    #[error("record magic does not match")]
    BadMagic,
    #[error("unsupported record layout version {version}")]
    LayoutVersion { version: u16 },
    #[error("field `{field}` is {len} bytes, capacity is {capacity}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        capacity: usize,
    },
    #[error("field `{field}` is absent but required")]
    FieldAbsent { field: &'static str },
    #[error("field `{field}` is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },
}

/// Malformed launcher command lines.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("option `{flag}` requires a value")]
    MissingValue { flag: String },
    #[error("option `{flag}` was given an empty class path")]
    EmptyClasspath { flag: String },
    #[error("unrecognized option `{token}`")]
    UnknownFlag { token: String },
}

/// Failures while turning a parsed command line into native options.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MaterializeError {
    #[error("path not found: {path}")]
    MissingPath { path: PathBuf },
}

/// Failures handing a launch plan to the launch worker.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to write launch plan: {source}")]
    PlanWrite {
        #[source]
        source: io::Error,
    },
    #[error("Failed to encode launch plan: {source}")]
    PlanEncode {
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to start launch worker {worker}: {source}")]
    Spawn {
        worker: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to wait for launch worker: {source}")]
    Wait {
        #[source]
        source: io::Error,
    },
}

/// Failures raised while binding or driving a runtime's native library.
#[derive(Debug, Error)]
pub enum NativeError {
    #[error("cannot load native library {path}: {message}")]
    Open { path: PathBuf, message: String },
    #[error("native library {path} does not export `{symbol}`")]
    MissingSymbol { path: PathBuf, symbol: &'static str },
    #[error("runtime does not support ABI version {version:#x}")]
    UnsupportedAbi { version: i32 },
    #[error("a runtime instance already exists in this process ({count})")]
    InstanceExists { count: i32 },
    #[error("runtime instance creation failed with status {status}")]
    CreateFailed { status: i32 },
    #[error("runtime interface function `{name}` is unavailable")]
    MissingFunction { name: &'static str },
    #[error("runtime call failed: {message}")]
    Call { message: String },
    #[error("invalid native string argument: {message}")]
    InvalidString { message: String },
}

/// Failures inside a probe or launch worker process.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error(transparent)]
    Native(#[from] NativeError),
    #[error("runtime did not report the `{key}` property")]
    MissingProperty { key: &'static str },
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("launch plan {path} is invalid: {source}")]
    Plan {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no main class, jar or module to launch")]
    NoTarget,
}
