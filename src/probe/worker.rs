use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::{
    discovery::{major_version_token, parse_major_version, RuntimeDescriptor},
    lib::errors::{NativeError, WorkerError},
    native::{
        JniLibrary, NativeLibrary, RuntimeInstance, DEFAULT_ABI_VERSION, NAME_PROPERTY,
        VERSION_PROPERTY,
    },
};

use super::record::encode_record;

/// Child side of a probe: initialize, query, write the slot, tear down.
///
/// Nothing is written to the slot unless the whole query succeeded.
pub fn run_probe_worker(home: &Path, library: &Path, slot: &Path) -> Result<(), WorkerError> {
    let native = JniLibrary::open(library)?;
    let record = probe_library(&native, home, library)?;
    drop(native);

    let mut file = OpenOptions::new()
        .write(true)
        .open(slot)
        .map_err(|source| WorkerError::Io {
            path: slot.to_path_buf(),
            source,
        })?;
    file.write_all(&record)
        .and_then(|_| file.sync_all())
        .map_err(|source| WorkerError::Io {
            path: slot.to_path_buf(),
            source,
        })?;
    debug!(target: "jlaunch::probe", slot = %slot.display(), "Probe record written");
    Ok(())
}

fn probe_library(
    native: &dyn NativeLibrary,
    home: &Path,
    library: &Path,
) -> Result<Vec<u8>, WorkerError> {
    let existing = native.created_instances()?;
    if existing != 0 {
        return Err(NativeError::InstanceExists { count: existing }.into());
    }

    let instance = native.create_instance(&[], DEFAULT_ABI_VERSION, true)?;
    let descriptor = describe_instance(instance.as_ref(), home, library)?;
    drop(instance);

    Ok(encode_record(&descriptor)?)
}

/// Read the identity of a live instance.
pub fn describe_instance(
    instance: &dyn RuntimeInstance,
    home: &Path,
    library: &Path,
) -> Result<RuntimeDescriptor, WorkerError> {
    let abi_version = instance.abi_version()?;
    let full_version = instance
        .get_property(VERSION_PROPERTY)?
        .ok_or(WorkerError::MissingProperty {
            key: VERSION_PROPERTY,
        })?;
    let name = instance.get_property(NAME_PROPERTY)?;

    Ok(RuntimeDescriptor {
        name,
        home: PathBuf::from(home),
        library_path: PathBuf::from(library),
        major_version: parse_major_version(&full_version),
        version: major_version_token(&full_version).to_string(),
        full_version,
        abi_version,
    })
}
