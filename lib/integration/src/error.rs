//! Error types for integrations.

use std::fmt;

/// Errors from external side-effect services.
///
/// Step execution treats all of these as recoverable: the failure is
/// logged on the execution record and the run continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrationError {
    /// The service could not be reached.
    Unreachable { service: String, reason: String },
    /// The service rejected the request.
    Rejected { service: String, status: u16 },
    /// The service's response could not be decoded.
    InvalidResponse { service: String, reason: String },
}

impl fmt::Display for IntegrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable { service, reason } => {
                write!(f, "{service} unreachable: {reason}")
            }
            Self::Rejected { service, status } => {
                write!(f, "{service} rejected the request with status {status}")
            }
            Self::InvalidResponse { service, reason } => {
                write!(f, "invalid response from {service}: {reason}")
            }
        }
    }
}

impl std::error::Error for IntegrationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_service() {
        let err = IntegrationError::Rejected {
            service: "sheets".to_string(),
            status: 403,
        };
        assert!(err.to_string().contains("sheets"));
        assert!(err.to_string().contains("403"));
    }
}
