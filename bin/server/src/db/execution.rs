//! Postgres repository for execution records.
//!
//! Logs and results live in JSONB arrays on the row, and appends are
//! single `logs = logs || $n` updates: concurrent steps of one run can
//! interleave but never lose an entry, and the whole document is never
//! read back to write one line. Finalization is guarded on
//! `status = 'running'`, making the terminal state write-once at the
//! database level.

use amber_relay_core::{AgentId, ExecutionId, OwnerId};
use amber_relay_engine::{
    Execution, ExecutionOutcome, ExecutionStatus, ExecutionStore, LogEntry, ResultEntry,
    StoreError,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::str::FromStr;

fn status_as_str(status: ExecutionStatus) -> &'static str {
    match status {
        ExecutionStatus::Running => "running",
        ExecutionStatus::Completed => "completed",
        ExecutionStatus::Failed => "failed",
    }
}

fn status_from_str(s: &str) -> ExecutionStatus {
    match s {
        "completed" => ExecutionStatus::Completed,
        "failed" => ExecutionStatus::Failed,
        _ => ExecutionStatus::Running,
    }
}

fn backend_error(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend {
        message: e.to_string(),
    }
}

/// Row type for execution queries.
#[derive(FromRow)]
struct ExecutionRow {
    id: String,
    agent_id: String,
    owner: String,
    status: String,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    duration_ms: Option<i64>,
    logs: serde_json::Value,
    results: serde_json::Value,
    error: Option<String>,
}

impl ExecutionRow {
    fn try_into_record(self) -> Result<Execution, StoreError> {
        let id = ExecutionId::from_str(&self.id).map_err(backend_error)?;
        let agent_id = AgentId::from_str(&self.agent_id).map_err(backend_error)?;
        let logs: Vec<LogEntry> = serde_json::from_value(self.logs).map_err(backend_error)?;
        let results: Vec<ResultEntry> =
            serde_json::from_value(self.results).map_err(backend_error)?;

        Ok(Execution {
            id,
            agent_id,
            owner: OwnerId::new(self.owner),
            status: status_from_str(&self.status),
            start_time: self.start_time,
            end_time: self.end_time,
            duration: self.duration_ms,
            logs,
            results,
            error: self.error,
        })
    }
}

const EXECUTION_COLUMNS: &str =
    "id, agent_id, owner, status, start_time, end_time, duration_ms, logs, results, error";

/// Repository for execution record storage.
pub struct ExecutionRepository {
    pool: PgPool,
}

impl ExecutionRepository {
    /// Creates a new repository.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch(&self, id: ExecutionId) -> Result<Option<Execution>, StoreError> {
        let row: Option<ExecutionRow> = sqlx::query_as(&format!(
            "SELECT {EXECUTION_COLUMNS} FROM executions WHERE id = $1"
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_error)?;

        row.map(ExecutionRow::try_into_record).transpose()
    }
}

#[async_trait]
impl ExecutionStore for ExecutionRepository {
    async fn create(&self, agent_id: AgentId, owner: &OwnerId) -> Result<Execution, StoreError> {
        let execution = Execution::new(agent_id, owner.clone());
        sqlx::query(
            r#"
            INSERT INTO executions
                (id, agent_id, owner, status, start_time, logs, results)
            VALUES ($1, $2, $3, $4, $5, '[]'::jsonb, '[]'::jsonb)
            "#,
        )
        .bind(execution.id.to_string())
        .bind(execution.agent_id.to_string())
        .bind(execution.owner.as_str())
        .bind(status_as_str(execution.status))
        .bind(execution.start_time)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        Ok(execution)
    }

    async fn append_log(&self, id: ExecutionId, entry: LogEntry) -> Result<(), StoreError> {
        let payload = serde_json::to_value(&entry).map_err(backend_error)?;
        let result = sqlx::query("UPDATE executions SET logs = logs || $2 WHERE id = $1")
            .bind(id.to_string())
            .bind(payload)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { execution_id: id });
        }
        Ok(())
    }

    async fn append_result(&self, id: ExecutionId, entry: ResultEntry) -> Result<(), StoreError> {
        let payload = serde_json::to_value(&entry).map_err(backend_error)?;
        let result = sqlx::query("UPDATE executions SET results = results || $2 WHERE id = $1")
            .bind(id.to_string())
            .bind(payload)
            .execute(&self.pool)
            .await
            .map_err(backend_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { execution_id: id });
        }
        Ok(())
    }

    async fn finalize(
        &self,
        id: ExecutionId,
        outcome: ExecutionOutcome,
    ) -> Result<Execution, StoreError> {
        let (status, error) = match &outcome {
            ExecutionOutcome::Completed => (ExecutionStatus::Completed, None),
            ExecutionOutcome::Failed { error } => (ExecutionStatus::Failed, Some(error.clone())),
        };
        let now = Utc::now();

        // the status guard makes the terminal transition write-once
        let result = sqlx::query(
            r#"
            UPDATE executions
            SET status = $2, end_time = $3, error = $4,
                duration_ms = (EXTRACT(EPOCH FROM ($3::timestamptz - start_time)) * 1000)::bigint
            WHERE id = $1 AND status = 'running'
            "#,
        )
        .bind(id.to_string())
        .bind(status_as_str(status))
        .bind(now)
        .bind(error)
        .execute(&self.pool)
        .await
        .map_err(backend_error)?;

        if result.rows_affected() == 0 {
            return match self.fetch(id).await? {
                Some(_) => Err(StoreError::AlreadyFinalized { execution_id: id }),
                None => Err(StoreError::NotFound { execution_id: id }),
            };
        }

        self.fetch(id)
            .await?
            .ok_or(StoreError::NotFound { execution_id: id })
    }

    async fn find(
        &self,
        id: ExecutionId,
        owner: &OwnerId,
    ) -> Result<Option<Execution>, StoreError> {
        let row: Option<ExecutionRow> = sqlx::query_as(&format!(
            "SELECT {EXECUTION_COLUMNS} FROM executions WHERE id = $1 AND owner = $2"
        ))
        .bind(id.to_string())
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_error)?;

        row.map(ExecutionRow::try_into_record).transpose()
    }

    async fn list_for_agent(
        &self,
        agent_id: AgentId,
        owner: &OwnerId,
        limit: usize,
    ) -> Result<Vec<Execution>, StoreError> {
        let rows: Vec<ExecutionRow> = sqlx::query_as(&format!(
            "SELECT {EXECUTION_COLUMNS} FROM executions \
             WHERE agent_id = $1 AND owner = $2 \
             ORDER BY start_time DESC LIMIT $3"
        ))
        .bind(agent_id.to_string())
        .bind(owner.as_str())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(backend_error)?;

        rows.into_iter().map(ExecutionRow::try_into_record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amber_relay_engine::LogLevel;

    #[test]
    fn status_roundtrip() {
        for status in [
            ExecutionStatus::Running,
            ExecutionStatus::Completed,
            ExecutionStatus::Failed,
        ] {
            assert_eq!(status_from_str(status_as_str(status)), status);
        }
    }

    #[test]
    fn row_conversion_parses_log_arrays() {
        let execution_id = ExecutionId::new();
        let agent_id = AgentId::new();
        let entry = LogEntry::new(LogLevel::Info, "Starting agent execution");

        let row = ExecutionRow {
            id: execution_id.to_string(),
            agent_id: agent_id.to_string(),
            owner: "tenant-1".to_string(),
            status: "completed".to_string(),
            start_time: Utc::now(),
            end_time: Some(Utc::now()),
            duration_ms: Some(1200),
            logs: serde_json::json!([entry]),
            results: serde_json::json!([]),
            error: None,
        };

        let execution = row.try_into_record().expect("valid row");
        assert_eq!(execution.id, execution_id);
        assert_eq!(execution.status, ExecutionStatus::Completed);
        assert_eq!(execution.logs.len(), 1);
        assert_eq!(execution.logs[0].message, "Starting agent execution");
    }

    #[test]
    fn row_conversion_rejects_bad_agent_id() {
        let row = ExecutionRow {
            id: ExecutionId::new().to_string(),
            agent_id: "garbage".to_string(),
            owner: "tenant-1".to_string(),
            status: "running".to_string(),
            start_time: Utc::now(),
            end_time: None,
            duration_ms: None,
            logs: serde_json::json!([]),
            results: serde_json::json!([]),
            error: None,
        };
        assert!(row.try_into_record().is_err());
    }
}
