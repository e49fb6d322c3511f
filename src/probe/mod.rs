//! Isolated probing of runtime candidates.
//!
//! Each probe runs in a disposable worker process. The worker writes one
//! fixed-layout record into a slot owned by the parent and exits; the parent
//! reads the slot only after the worker has exited.

mod prober;
pub mod record;
mod worker;

use std::future::Future;

use crate::{
    discovery::{RuntimeDescriptor, RuntimeHome},
    lib::errors::ProbeError,
};

pub use prober::{IsolatedProber, ResultSlot, DEFAULT_PROBE_TIMEOUT};
pub use worker::{describe_instance, run_probe_worker};

/// Hidden subcommand the prober re-executes the binary with.
pub const PROBE_WORKER_COMMAND: &str = "__probe-worker";

/// Determines the identity of one candidate home.
///
/// An error rejects the candidate; it is never fatal to a scan.
pub trait CandidateProbe {
    fn probe(
        &self,
        candidate: &RuntimeHome,
    ) -> impl Future<Output = Result<RuntimeDescriptor, ProbeError>>;
}
