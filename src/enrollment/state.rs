use crate::configuration::Credentials;
use crate::error_handling::types::AuthError;

/// Steps of first-run setup.
///
/// ```text
/// CollectCredentials -> Validate -> PersistConfig -> CaptureEncryptedCredential
///        ^                 |            -> BuildNodeTemplate -> Cleanup -> Done
///        +---- Retry <-----+
///                |
///                +-> Cancelled
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentStep {
    CollectCredentials,
    Validate(Credentials),
    Retry(AuthError),
    PersistConfig(Credentials),
    CaptureEncryptedCredential(Credentials),
    BuildNodeTemplate(Credentials),
    Cleanup(Credentials),
    Done(Credentials),
    Cancelled,
}

impl EnrollmentStep {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EnrollmentStep::Done(_) | EnrollmentStep::Cancelled)
    }

    pub fn name(&self) -> &'static str {
        match self {
            EnrollmentStep::CollectCredentials => "collect-credentials",
            EnrollmentStep::Validate(_) => "validate",
            EnrollmentStep::Retry(_) => "retry",
            EnrollmentStep::PersistConfig(_) => "persist-config",
            EnrollmentStep::CaptureEncryptedCredential(_) => "capture-encrypted-credential",
            EnrollmentStep::BuildNodeTemplate(_) => "build-node-template",
            EnrollmentStep::Cleanup(_) => "cleanup",
            EnrollmentStep::Done(_) => "done",
            EnrollmentStep::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrollmentOutcome {
    Enrolled(Credentials),
    Cancelled,
}
