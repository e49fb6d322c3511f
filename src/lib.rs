//! Library crate root re-exporting discovery, probing and launch modules.

#[path = "lib/mod.rs"]
pub mod lib_mod;
pub use lib_mod as lib;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod launch;
pub mod native;
pub mod probe;
