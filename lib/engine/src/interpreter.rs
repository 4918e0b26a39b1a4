//! Typed step execution.
//!
//! The interpreter drives one plan against the external side-effect
//! services, one step at a time and strictly in plan order. Dispatch over
//! [`StepKind`] is total: data fetches and emails do real work, every
//! other kind is logged as skipped. Each step is individually isolated:
//! a failing step produces exactly one error log entry and the run moves
//! on to the next step.

use crate::execution::{LogEntry, LogLevel, ResultEntry};
use crate::store::ExecutionStore;
use amber_relay_ai::{Plan, PlanStep, StepKind};
use amber_relay_core::ExecutionId;
use amber_relay_integration::{Mailer, SheetReader};
use std::sync::Arc;

/// Fixed identifiers and payloads for the built-in actions.
#[derive(Debug, Clone)]
pub struct ActionSettings {
    /// Spreadsheet to read on data-fetch steps.
    pub sheet_id: String,
    /// Range to read.
    pub sheet_range: String,
    /// Recipient for email steps.
    pub email_recipient: String,
    /// Subject line for email steps.
    pub email_subject: String,
    /// Body for email steps.
    pub email_body: String,
}

impl ActionSettings {
    /// Creates settings with the default range, subject, and body.
    #[must_use]
    pub fn new(sheet_id: impl Into<String>, email_recipient: impl Into<String>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            sheet_range: "Sheet1!A1:C100".to_string(),
            email_recipient: email_recipient.into(),
            email_subject: "Automation Report".to_string(),
            email_body: "This email is sent automatically by the automation agent".to_string(),
        }
    }

    /// Overrides the sheet range.
    #[must_use]
    pub fn with_sheet_range(mut self, range: impl Into<String>) -> Self {
        self.sheet_range = range.into();
        self
    }
}

/// Executes plan steps against the side-effect services.
pub struct StepInterpreter {
    store: Arc<dyn ExecutionStore>,
    mailer: Arc<dyn Mailer>,
    sheets: Arc<dyn SheetReader>,
    settings: ActionSettings,
}

impl StepInterpreter {
    /// Creates an interpreter.
    #[must_use]
    pub fn new(
        store: Arc<dyn ExecutionStore>,
        mailer: Arc<dyn Mailer>,
        sheets: Arc<dyn SheetReader>,
        settings: ActionSettings,
    ) -> Self {
        Self {
            store,
            mailer,
            sheets,
            settings,
        }
    }

    /// Appends a log entry, surfacing store failures only as diagnostics.
    /// A logging failure must never abort a run already in progress.
    pub(crate) async fn log(&self, id: ExecutionId, level: LogLevel, message: impl Into<String>) {
        let entry = LogEntry::new(level, message);
        if let Err(e) = self.store.append_log(id, entry).await {
            tracing::warn!(execution_id = %id, error = %e, "failed to append execution log");
        }
    }

    /// Appends a result entry with the same swallow-and-diagnose policy.
    pub(crate) async fn record_result(&self, id: ExecutionId, entry: ResultEntry) {
        if let Err(e) = self.store.append_result(id, entry).await {
            tracing::warn!(execution_id = %id, error = %e, "failed to append execution result");
        }
    }

    /// Runs a whole plan sequentially.
    ///
    /// Ordering is part of the observable contract: later steps may
    /// assume earlier side effects happened, so steps never run
    /// concurrently.
    pub async fn run_plan(&self, id: ExecutionId, plan: &Plan) {
        if plan.is_empty() {
            self.log(id, LogLevel::Warning, "No steps to execute").await;
            return;
        }

        for step in &plan.steps {
            self.execute(id, step).await;
        }
    }

    /// Executes a single step. Never fails the run.
    pub async fn execute(&self, id: ExecutionId, step: &PlanStep) {
        match &step.kind {
            StepKind::DataFetch => self.fetch_sheet(id).await,
            StepKind::Email => self.send_email(id).await,
            other => {
                // unrecognized and not-yet-implemented kinds are a
                // deliberate no-op so new planner vocabulary cannot fail
                // old runs
                self.log(
                    id,
                    LogLevel::Info,
                    format!("Skipping action: {}", other.as_str()),
                )
                .await;
            }
        }
    }

    async fn fetch_sheet(&self, id: ExecutionId) {
        self.log(id, LogLevel::Info, "Fetching spreadsheet data").await;
        match self
            .sheets
            .read(&self.settings.sheet_id, &self.settings.sheet_range)
            .await
        {
            Ok(rows) => {
                self.log(id, LogLevel::Info, "Spreadsheet data fetched").await;
                let payload = serde_json::to_value(&rows).unwrap_or_default();
                self.record_result(
                    id,
                    ResultEntry::new("google-sheets", "data", "Google Sheets", payload),
                )
                .await;
            }
            Err(e) => {
                self.log(id, LogLevel::Error, format!("Sheet fetch failed: {e}"))
                    .await;
            }
        }
    }

    async fn send_email(&self, id: ExecutionId) {
        self.log(id, LogLevel::Info, "Sending email").await;
        match self
            .mailer
            .send(
                &self.settings.email_recipient,
                &self.settings.email_subject,
                &self.settings.email_body,
            )
            .await
        {
            Ok(()) => {
                self.log(id, LogLevel::Info, "Email sent successfully").await;
            }
            Err(e) => {
                self.log(id, LogLevel::Error, format!("Email failed: {e}"))
                    .await;
            }
        }
    }
}
