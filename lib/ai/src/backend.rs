//! Plan inference backend abstraction.
//!
//! The orchestrator talks to the external AI plan service through the
//! [`PlanBackend`] trait: one prompt string in, one raw response string
//! out. The HTTP implementation speaks the service's JSON envelope
//! (`{status, response}` on success, `{error}` on failure).

use crate::error::PlanError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Trait for plan inference services.
#[async_trait]
pub trait PlanBackend: Send + Sync {
    /// Sends a prompt and returns the raw response text.
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or answers with an
    /// error envelope. Transport failures here are fatal to a run.
    async fn generate(&self, prompt: &str) -> Result<String, PlanError>;
}

#[derive(Serialize)]
struct PlanRequestBody<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct PlanResponseBody {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// HTTP implementation of [`PlanBackend`].
#[derive(Debug, Clone)]
pub struct HttpPlanBackend {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPlanBackend {
    /// Creates a backend pointing at the inference service endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Creates a backend with a shared client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl PlanBackend for HttpPlanBackend {
    async fn generate(&self, prompt: &str) -> Result<String, PlanError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&PlanRequestBody { prompt })
            .send()
            .await
            .map_err(|e| PlanError::BackendUnreachable {
                reason: e.to_string(),
            })?;

        let body: PlanResponseBody =
            response
                .json()
                .await
                .map_err(|e| PlanError::MalformedEnvelope {
                    reason: e.to_string(),
                })?;

        if let Some(message) = body.error {
            return Err(PlanError::ServiceError { message });
        }

        body.response.ok_or_else(|| PlanError::MalformedEnvelope {
            reason: "missing response field".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canned backend used to exercise the trait without a network.
    struct StaticBackend(Result<String, PlanError>);

    #[async_trait]
    impl PlanBackend for StaticBackend {
        async fn generate(&self, _prompt: &str) -> Result<String, PlanError> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn trait_objects_dispatch() {
        let backend: Box<dyn PlanBackend> = Box::new(StaticBackend(Ok("{}".to_string())));
        let raw = backend.generate("plan this").await.expect("canned ok");
        assert_eq!(raw, "{}");
    }

    #[test]
    fn envelope_deserializes_both_shapes() {
        let ok: PlanResponseBody =
            serde_json::from_str(r#"{"status": "success", "response": "plan text"}"#)
                .expect("success envelope");
        assert_eq!(ok.response.as_deref(), Some("plan text"));
        assert!(ok.error.is_none());

        let err: PlanResponseBody =
            serde_json::from_str(r#"{"error": "model overloaded"}"#).expect("error envelope");
        assert_eq!(err.error.as_deref(), Some("model overloaded"));
    }
}
