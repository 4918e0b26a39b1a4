//! Read-only tabular data access.

use crate::error::IntegrationError;
use async_trait::async_trait;
use serde::Deserialize;

/// Trait for the tabular-data-read capability.
#[async_trait]
pub trait SheetReader: Send + Sync {
    /// Reads the rows of a sheet range.
    ///
    /// # Errors
    ///
    /// Returns an error if the source could not be read; callers log the
    /// failure and continue.
    async fn read(
        &self,
        sheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, IntegrationError>;
}

#[derive(Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Reader for the Google Sheets values API.
#[derive(Debug, Clone)]
pub struct GoogleSheetsReader {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoogleSheetsReader {
    const DEFAULT_BASE_URL: &'static str = "https://sheets.googleapis.com/v4/spreadsheets";

    /// Creates a reader against the public Sheets API.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Overrides the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl SheetReader for GoogleSheetsReader {
    async fn read(
        &self,
        sheet_id: &str,
        range: &str,
    ) -> Result<Vec<Vec<String>>, IntegrationError> {
        let url = format!("{}/{}/values/{}", self.base_url, sheet_id, range);
        let response = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| IntegrationError::Unreachable {
                service: "sheets".to_string(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(IntegrationError::Rejected {
                service: "sheets".to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: ValuesResponse =
            response
                .json()
                .await
                .map_err(|e| IntegrationError::InvalidResponse {
                    service: "sheets".to_string(),
                    reason: e.to_string(),
                })?;

        Ok(body.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_response_defaults_to_empty() {
        let body: ValuesResponse = serde_json::from_str("{}").expect("deserialize");
        assert!(body.values.is_empty());

        let body: ValuesResponse =
            serde_json::from_str(r#"{"range": "Sheet1!A1:C100", "values": [["a", "b"]]}"#)
                .expect("deserialize");
        assert_eq!(body.values, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    /// Reader returning canned rows; proves object safety for the engine.
    struct FixedReader(Vec<Vec<String>>);

    #[async_trait]
    impl SheetReader for FixedReader {
        async fn read(&self, _: &str, _: &str) -> Result<Vec<Vec<String>>, IntegrationError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn trait_objects_dispatch() {
        let reader: Box<dyn SheetReader> = Box::new(FixedReader(vec![vec!["x".to_string()]]));
        let rows = reader.read("sheet", "A1:B2").await.expect("canned rows");
        assert_eq!(rows.len(), 1);
    }
}
