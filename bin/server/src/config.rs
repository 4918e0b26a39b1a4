//! Centralized server configuration.
//!
//! Strongly-typed configuration loaded via the `config` crate from
//! environment variables (nested sections use `__`, e.g.
//! `PLANNER__ENDPOINT`, `SHEETS__SHEET_ID`).

use serde::Deserialize;

/// Server configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// PostgreSQL database connection URL.
    pub database_url: String,

    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Owner subject all records are scoped to.
    ///
    /// Threaded through every registry and store call; replaces any
    /// notion of a hardcoded owner in the handlers.
    #[serde(default = "default_owner_subject")]
    pub owner_subject: String,

    /// Plan inference service configuration.
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Notification email configuration.
    pub email: EmailConfig,

    /// Spreadsheet read configuration.
    pub sheets: SheetsConfig,
}

/// Plan inference service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// Endpoint of the plan inference service.
    #[serde(default = "default_planner_endpoint")]
    pub endpoint: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_planner_endpoint(),
        }
    }
}

/// Notification email settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// HTTP relay endpoint messages are posted to.
    pub relay_url: String,
    /// Recipient of automation report emails.
    pub recipient: String,
}

/// Spreadsheet read settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SheetsConfig {
    /// API key for the sheets service.
    pub api_key: String,
    /// Spreadsheet read by data-fetch steps.
    pub sheet_id: String,
    /// Range read by data-fetch steps.
    #[serde(default = "default_sheet_range")]
    pub range: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_owner_subject() -> String {
    "local-dev".to_string()
}

fn default_planner_endpoint() -> String {
    "http://localhost:5001/api/agno/agent".to_string()
}

fn default_sheet_range() -> String {
    "Sheet1!A1:C100".to_string()
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn planner_config_defaults_to_local_service() {
        let config = PlannerConfig::default();
        assert_eq!(config.endpoint, "http://localhost:5001/api/agno/agent");
    }

    #[test]
    fn defaults_cover_optional_fields() {
        assert_eq!(default_bind_addr(), "127.0.0.1:8000");
        assert_eq!(default_sheet_range(), "Sheet1!A1:C100");
        assert_eq!(default_owner_subject(), "local-dev");
    }
}
