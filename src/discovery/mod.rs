//! Runtime discovery: filesystem scanning, probed descriptors, and the registry.

mod descriptor;
mod registry;
pub mod scanner;

pub use descriptor::{major_version_token, parse_major_version, RuntimeDescriptor, RuntimeHome};
pub use registry::{discover, find_default, home_hint_from_env, RuntimeRegistry};
pub use scanner::{find_native_library, resolve_home, scan_candidates};
