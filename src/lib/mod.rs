//! Shared library modules providing error types, file utilities, listing output, and telemetry initialization.

pub mod errors;
pub mod fs;
pub mod paths;
pub mod table;
pub mod telemetry;
