//! Notification email sending.

use crate::error::IntegrationError;
use async_trait::async_trait;
use serde::Serialize;

/// Trait for the notification-send capability.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends an email.
    ///
    /// # Errors
    ///
    /// Returns an error if the message could not be handed off; callers
    /// log the failure and continue.
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), IntegrationError>;
}

#[derive(Serialize)]
struct OutgoingMessage<'a> {
    to: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Mailer that posts messages to an HTTP mail relay.
#[derive(Debug, Clone)]
pub struct WebhookMailer {
    client: reqwest::Client,
    endpoint: String,
}

impl WebhookMailer {
    /// Creates a mailer pointing at the relay endpoint.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), IntegrationError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&OutgoingMessage { to, subject, body })
            .send()
            .await
            .map_err(|e| IntegrationError::Unreachable {
                service: "mail relay".to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(IntegrationError::Rejected {
                service: "mail relay".to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(())
    }
}
