//! Top-level provisioning run
//!
//! - `context`: the immutable [`ProvisioningContext`] resolved at startup.
//! - `run_loop`: the state machine from preflight to generated sessions.

pub mod context;
pub mod run_loop;

pub use context::ProvisioningContext;
pub use run_loop::{Provisioner, RunOutcome, RunStep};
