//! Outcome classification.
//!
//! The single result reported for each submit or register call.

use crate::storage::Identity;

/// Why a call did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service answered but refused (non-2xx, or `success: false`).
    ServerRejected,
    /// No response at all.
    NetworkError,
    /// A response arrived but could not be understood.
    MalformedResponse,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::ServerRejected => "server_rejected",
            FailureKind::NetworkError => "network_error",
            FailureKind::MalformedResponse => "malformed_response",
        }
    }
}

/// Result of one report submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Success { report_id: String },
    ServerRejected,
    NetworkError,
    MalformedResponse,
}

impl SubmissionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionOutcome::Success { .. } => "success",
            SubmissionOutcome::ServerRejected => FailureKind::ServerRejected.as_str(),
            SubmissionOutcome::NetworkError => FailureKind::NetworkError.as_str(),
            SubmissionOutcome::MalformedResponse => FailureKind::MalformedResponse.as_str(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success { .. })
    }
}

impl From<Result<String, FailureKind>> for SubmissionOutcome {
    fn from(result: Result<String, FailureKind>) -> Self {
        match result {
            Ok(report_id) => SubmissionOutcome::Success { report_id },
            Err(FailureKind::ServerRejected) => SubmissionOutcome::ServerRejected,
            Err(FailureKind::NetworkError) => SubmissionOutcome::NetworkError,
            Err(FailureKind::MalformedResponse) => SubmissionOutcome::MalformedResponse,
        }
    }
}

/// Result of one registration call.
///
/// `PersistenceError` means the service accepted the account but the local
/// record could not be written; the previous record is untouched.
/// `LicenseNotAccepted` means nothing was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Success(Identity),
    ServerRejected,
    NetworkError,
    MalformedResponse,
    PersistenceError,
    LicenseNotAccepted,
}

impl RegistrationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationOutcome::Success(_) => "success",
            RegistrationOutcome::ServerRejected => FailureKind::ServerRejected.as_str(),
            RegistrationOutcome::NetworkError => FailureKind::NetworkError.as_str(),
            RegistrationOutcome::MalformedResponse => FailureKind::MalformedResponse.as_str(),
            RegistrationOutcome::PersistenceError => "persistence_error",
            RegistrationOutcome::LicenseNotAccepted => "license_not_accepted",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RegistrationOutcome::Success(_))
    }
}

impl From<FailureKind> for RegistrationOutcome {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::ServerRejected => RegistrationOutcome::ServerRejected,
            FailureKind::NetworkError => RegistrationOutcome::NetworkError,
            FailureKind::MalformedResponse => RegistrationOutcome::MalformedResponse,
        }
    }
}
