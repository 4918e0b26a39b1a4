//! API error responses.
//!
//! Every handler error renders as a JSON `{"error": "..."}` body with the
//! matching status code, which is the shape clients already consume.

use amber_relay_engine::{OrchestratorError, RegistryError, StoreError};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::fmt;

/// Errors surfaced by the HTTP layer.
#[derive(Debug)]
pub enum ApiError {
    /// The requested resource does not exist for the caller.
    NotFound(String),
    /// The request was malformed.
    BadRequest(String),
    /// Anything else.
    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(message)
            | Self::BadRequest(message)
            | Self::Internal(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            Self::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound { .. } => Self::NotFound("Execution not found".to_string()),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(e: OrchestratorError) -> Self {
        match e {
            OrchestratorError::AgentNotFound { .. } => {
                Self::NotFound("Agent not found".to_string())
            }
            other => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amber_relay_core::AgentId;

    #[test]
    fn orchestrator_not_found_maps_to_404_shape() {
        let err: ApiError = OrchestratorError::AgentNotFound {
            agent_id: AgentId::new(),
        }
        .into();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.to_string(), "Agent not found");
    }

    #[test]
    fn store_backend_failure_is_internal() {
        let err: ApiError = StoreError::Backend {
            message: "connection reset".to_string(),
        }
        .into();
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
