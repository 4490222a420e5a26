//! First-run setup
//!
//! Collects and validates the controller account, writes the credential
//! store, and has SecureCRT encrypt the password into a bootstrap session
//! from which the reusable node template is derived.

pub mod state;
pub mod workflow;

pub use state::{EnrollmentOutcome, EnrollmentStep};
pub use workflow::EnrollmentFlow;
