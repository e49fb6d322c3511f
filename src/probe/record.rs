//! Fixed-layout probe record exchanged between a probe worker and its parent.
//!
//! Layout (little-endian):
//!
//! | offset | size | field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 4    | magic `JLPR`                           |
//! | 4      | 2    | layout version                         |
//! | 6      | 2    | reserved                               |
//! | 8      | 4    | major version (`u32`)                  |
//! | 12     | 4    | ABI version (`i32`)                    |
//! | 16     | ...  | length-prefixed fixed-capacity fields  |
//!
//! Each variable field is a `u16` length followed by its full capacity.
//! [`ABSENT`] as the length marks an optional field as unset.

use std::{ffi::OsStr, os::unix::ffi::OsStrExt, path::PathBuf};

use crate::{discovery::RuntimeDescriptor, lib::errors::RecordError};

pub const MAGIC: [u8; 4] = *b"JLPR";
pub const LAYOUT_VERSION: u16 = 2;
pub const ABSENT: u16 = u16::MAX;

const HEADER_SIZE: usize = 16;
const NAME_CAPACITY: usize = 128;
const PATH_CAPACITY: usize = 4096;
const FULL_VERSION_CAPACITY: usize = 128;
const VERSION_CAPACITY: usize = FULL_VERSION_CAPACITY;

const FIELDS: [(&str, usize); 5] = [
    ("name", NAME_CAPACITY),
    ("home", PATH_CAPACITY),
    ("library_path", PATH_CAPACITY),
    ("full_version", FULL_VERSION_CAPACITY),
    ("version", VERSION_CAPACITY),
];

const fn fields_size() -> usize {
    let mut total = 0;
    let mut index = 0;
    while index < FIELDS.len() {
        total += 2 + FIELDS[index].1;
        index += 1;
    }
    total
}

/// Exact size of every encoded record.
pub const RECORD_SIZE: usize = HEADER_SIZE + fields_size();

/// Encode a descriptor into exactly [`RECORD_SIZE`] bytes.
pub fn encode_record(descriptor: &RuntimeDescriptor) -> Result<Vec<u8>, RecordError> {
    let mut buffer = Vec::with_capacity(RECORD_SIZE);
    buffer.extend_from_slice(&MAGIC);
    buffer.extend_from_slice(&LAYOUT_VERSION.to_le_bytes());
    buffer.extend_from_slice(&0u16.to_le_bytes());
    buffer.extend_from_slice(&descriptor.major_version.to_le_bytes());
    buffer.extend_from_slice(&descriptor.abi_version.to_le_bytes());

    let values: [Option<&[u8]>; 5] = [
        descriptor.name.as_deref().map(str::as_bytes),
        Some(descriptor.home.as_os_str().as_bytes()),
        Some(descriptor.library_path.as_os_str().as_bytes()),
        Some(descriptor.full_version.as_bytes()),
        Some(descriptor.version.as_bytes()),
    ];
    for ((field, capacity), value) in FIELDS.into_iter().zip(values) {
        write_field(&mut buffer, field, capacity, value)?;
    }

    debug_assert_eq!(buffer.len(), RECORD_SIZE);
    Ok(buffer)
}

fn write_field(
    buffer: &mut Vec<u8>,
    field: &'static str,
    capacity: usize,
    value: Option<&[u8]>,
) -> Result<(), RecordError> {
    let start = buffer.len();
    match value {
        None => buffer.extend_from_slice(&ABSENT.to_le_bytes()),
        Some(bytes) => {
            // ABSENT is reserved, so a value must stay strictly below it.
            let len = u16::try_from(bytes.len())
                .ok()
                .filter(|len| (*len as usize) <= capacity && *len != ABSENT)
                .ok_or(RecordError::FieldTooLong {
                    field,
                    len: bytes.len(),
                    capacity,
                })?;
            buffer.extend_from_slice(&len.to_le_bytes());
            buffer.extend_from_slice(bytes);
        }
    }
    buffer.resize(start + 2 + capacity, 0);
    Ok(())
}

/// Decode and validate a record produced by [`encode_record`].
pub fn decode_record(bytes: &[u8]) -> Result<RuntimeDescriptor, RecordError> {
    if bytes.len() != RECORD_SIZE {
        return Err(RecordError::Size {
            expected: RECORD_SIZE,
            actual: bytes.len(),
        });
    }
    if bytes[0..4] != MAGIC {
        return Err(RecordError::BadMagic);
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != LAYOUT_VERSION {
        return Err(RecordError::LayoutVersion { version });
    }
    let major_version = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
    let abi_version = i32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut fields = Vec::with_capacity(FIELDS.len());
    let mut offset = HEADER_SIZE;
    for (field, capacity) in FIELDS {
        fields.push(read_field(&bytes[offset..offset + 2 + capacity], field, capacity)?);
        offset += 2 + capacity;
    }
    let [name, home, library_path, full_version, short_version] =
        <[Option<&[u8]>; 5]>::try_from(fields).map_err(|_| RecordError::Size {
            expected: RECORD_SIZE,
            actual: bytes.len(),
        })?;

    Ok(RuntimeDescriptor {
        name: name.map(|raw| utf8("name", raw)).transpose()?,
        home: required_path("home", home)?,
        library_path: required_path("library_path", library_path)?,
        major_version,
        version: utf8("version", required("version", short_version)?)?,
        full_version: utf8("full_version", required("full_version", full_version)?)?,
        abi_version,
    })
}

fn read_field<'a>(
    slot: &'a [u8],
    field: &'static str,
    capacity: usize,
) -> Result<Option<&'a [u8]>, RecordError> {
    let len = u16::from_le_bytes([slot[0], slot[1]]);
    if len == ABSENT {
        return Ok(None);
    }
    let len = len as usize;
    if len > capacity {
        return Err(RecordError::FieldTooLong {
            field,
            len,
            capacity,
        });
    }
    Ok(Some(&slot[2..2 + len]))
}

fn required<'a>(field: &'static str, value: Option<&'a [u8]>) -> Result<&'a [u8], RecordError> {
    value.ok_or(RecordError::FieldAbsent { field })
}

fn required_path(field: &'static str, value: Option<&[u8]>) -> Result<PathBuf, RecordError> {
    let raw = required(field, value)?;
    if raw.is_empty() {
        return Err(RecordError::FieldAbsent { field });
    }
    Ok(PathBuf::from(OsStr::from_bytes(raw)))
}

fn utf8(field: &'static str, raw: &[u8]) -> Result<String, RecordError> {
    String::from_utf8(raw.to_vec()).map_err(|_| RecordError::InvalidUtf8 { field })
}
