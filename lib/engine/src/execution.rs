//! Execution record types.
//!
//! An execution is the durable record of one agent run: a three-state
//! status machine plus append-only logs and results. Records serialize in
//! camelCase because the document shape is consumed directly by clients
//! polling for progress.

use amber_relay_core::{AgentId, ExecutionId, OwnerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// The status of an execution.
///
/// Created in `Running`; transitions exactly once to `Completed` or
/// `Failed`, then the record is immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Run in progress.
    Running,
    /// Run finished; all steps were attempted.
    Completed,
    /// Run aborted by an orchestration-level failure.
    Failed,
}

impl ExecutionStatus {
    /// Returns true if this is a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

/// One append-only log line on an execution record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
    /// Severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
}

impl LogEntry {
    /// Creates an entry stamped now.
    #[must_use]
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
        }
    }
}

/// One durable artifact produced by a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEntry {
    /// The node (or synthetic source) that produced this result.
    pub node_id: String,
    /// The kind of producer.
    pub node_type: String,
    /// Display label of the producer.
    pub node_label: String,
    /// Arbitrary structured payload.
    pub result: JsonValue,
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
}

impl ResultEntry {
    /// Creates a result entry stamped now.
    #[must_use]
    pub fn new(
        node_id: impl Into<String>,
        node_type: impl Into<String>,
        node_label: impl Into<String>,
        result: JsonValue,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            node_type: node_type.into(),
            node_label: node_label.into(),
            result,
            timestamp: Utc::now(),
        }
    }
}

/// The record of a single agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Execution {
    /// Unique identifier.
    pub id: ExecutionId,
    /// The agent this run belongs to.
    pub agent_id: AgentId,
    /// Owner subject, mirrored from the agent at creation.
    #[serde(rename = "userId")]
    pub owner: OwnerId,
    /// Current status.
    pub status: ExecutionStatus,
    /// When the run started.
    pub start_time: DateTime<Utc>,
    /// When the run reached a terminal state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Wall-clock duration in milliseconds, set at finalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    /// Append-only ordered log lines.
    #[serde(default)]
    pub logs: Vec<LogEntry>,
    /// Append-only ordered result artifacts.
    #[serde(default)]
    pub results: Vec<ResultEntry>,
    /// The triggering failure message; present only when failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Execution {
    /// Creates a new running execution.
    #[must_use]
    pub fn new(agent_id: AgentId, owner: OwnerId) -> Self {
        Self {
            id: ExecutionId::new(),
            agent_id,
            owner,
            status: ExecutionStatus::Running,
            start_time: Utc::now(),
            end_time: None,
            duration: None,
            logs: Vec::new(),
            results: Vec::new(),
            error: None,
        }
    }

    /// Marks the run completed and computes the duration.
    pub fn complete(&mut self) {
        let now = Utc::now();
        self.status = ExecutionStatus::Completed;
        self.end_time = Some(now);
        self.duration = Some((now - self.start_time).num_milliseconds());
    }

    /// Marks the run failed with the triggering error message.
    pub fn fail(&mut self, error: impl Into<String>) {
        let now = Utc::now();
        self.status = ExecutionStatus::Failed;
        self.end_time = Some(now);
        self.duration = Some((now - self.start_time).num_milliseconds());
        self.error = Some(error.into());
    }

    /// Returns true if the run has reached a terminal state.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_terminality() {
        assert!(!ExecutionStatus::Running.is_terminal());
        assert!(ExecutionStatus::Completed.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
    }

    #[test]
    fn new_execution_is_running_without_end_time() {
        let execution = Execution::new(AgentId::new(), OwnerId::new("tenant-1"));
        assert_eq!(execution.status, ExecutionStatus::Running);
        assert!(execution.end_time.is_none());
        assert!(execution.duration.is_none());
        assert!(execution.error.is_none());
    }

    #[test]
    fn complete_sets_terminal_fields_together() {
        let mut execution = Execution::new(AgentId::new(), OwnerId::new("tenant-1"));
        execution.complete();
        assert_eq!(execution.status, ExecutionStatus::Completed);
        assert!(execution.end_time.is_some());
        assert!(execution.duration.is_some());
        assert!(execution.error.is_none());
    }

    #[test]
    fn fail_records_the_error() {
        let mut execution = Execution::new(AgentId::new(), OwnerId::new("tenant-1"));
        execution.fail("planner exploded");
        assert_eq!(execution.status, ExecutionStatus::Failed);
        assert_eq!(execution.error.as_deref(), Some("planner exploded"));
        assert!(execution.end_time.is_some());
    }

    #[test]
    fn serde_uses_document_field_names() {
        let execution = Execution::new(AgentId::new(), OwnerId::new("tenant-1"));
        let json = serde_json::to_value(&execution).expect("serialize");
        assert!(json.get("agentId").is_some());
        assert!(json.get("userId").is_some());
        assert!(json.get("startTime").is_some());
        assert!(json.get("endTime").is_none());
        assert_eq!(json["status"], "running");
    }

    #[test]
    fn result_entry_serde_shape() {
        let entry = ResultEntry::new(
            "google-sheets",
            "data",
            "Google Sheets",
            serde_json::json!([["a", "b"]]),
        );
        let json = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(json["nodeId"], "google-sheets");
        assert_eq!(json["nodeLabel"], "Google Sheets");
    }
}
