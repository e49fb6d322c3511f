//! Capability interface over a runtime's native invocation library.
//!
//! A runtime is usable when its library exports three entry points by name:
//! instance creation, default init-args query, and created-instance
//! enumeration. Binding happens at run time; a missing symbol is a typed
//! error. Instance creation is one-shot per address space, so callers only
//! create instances inside disposable worker processes.

mod jni;
mod launcher;

use crate::lib::errors::NativeError;

pub use jni::{JniInstance, JniLibrary, REQUIRED_SYMBOLS};
pub use launcher::LaunchMode;

/// ABI version requested when the runtime's own version is unknown (JNI 1.2).
pub const DEFAULT_ABI_VERSION: i32 = 0x0001_0002;

/// Property holding the runtime's full version string.
pub const VERSION_PROPERTY: &str = "java.version";
/// Property holding the runtime's display name.
pub const NAME_PROPERTY: &str = "java.runtime.name";

/// A loaded native library exposing the three required entry points.
pub trait NativeLibrary {
    /// Number of live instances already created in this process.
    fn created_instances(&self) -> Result<i32, NativeError>;

    /// Whether the library accepts init args for the given ABI version.
    fn supports_abi(&self, version: i32) -> Result<bool, NativeError>;

    /// Create the process-wide instance. Dropping it tears the instance down.
    fn create_instance(
        &self,
        options: &[String],
        abi_version: i32,
        ignore_unrecognized: bool,
    ) -> Result<Box<dyn RuntimeInstance + '_>, NativeError>;
}

/// A live runtime instance that can be introspected.
pub trait RuntimeInstance {
    /// Native interface version implemented by the instance.
    fn abi_version(&self) -> Result<i32, NativeError>;

    /// Read a system property by name.
    fn get_property(&self, key: &str) -> Result<Option<String>, NativeError>;
}
