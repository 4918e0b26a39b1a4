//! Error types for plan generation.

use std::fmt;

/// Errors from the plan inference backend.
///
/// Note that a malformed plan body is not an error: response parsing
/// degrades to an empty plan. These variants cover the transport and
/// service envelope, which are fatal to a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The inference service could not be reached.
    BackendUnreachable { reason: String },
    /// The inference service answered with an error envelope.
    ServiceError { message: String },
    /// The service answered outside its envelope contract.
    MalformedEnvelope { reason: String },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackendUnreachable { reason } => {
                write!(f, "failed to contact plan inference service: {reason}")
            }
            Self::ServiceError { message } => {
                write!(f, "plan inference service error: {message}")
            }
            Self::MalformedEnvelope { reason } => {
                write!(f, "malformed plan service response: {reason}")
            }
        }
    }
}

impl std::error::Error for PlanError {}
