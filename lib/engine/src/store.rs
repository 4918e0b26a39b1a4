//! Execution record persistence.
//!
//! The store is an append-only log and result sink keyed by execution id.
//! Append operations must be atomic per record (never a read-modify-write
//! of the whole document) and must be safe to call concurrently for the
//! same execution. Finalization is write-once: a second call is rejected
//! to protect the terminal-state invariant.

use crate::execution::{Execution, LogEntry, ResultEntry};
use amber_relay_core::{AgentId, ExecutionId, OwnerId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Terminal outcome passed to [`ExecutionStore::finalize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// All steps were attempted.
    Completed,
    /// An orchestration-level failure aborted the run.
    Failed {
        /// The triggering failure's message.
        error: String,
    },
}

/// Errors from store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No record with the given id (for the given owner, where scoped).
    NotFound { execution_id: ExecutionId },
    /// The record is already in a terminal state.
    AlreadyFinalized { execution_id: ExecutionId },
    /// The backing store failed.
    Backend { message: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { execution_id } => {
                write!(f, "execution not found: {execution_id}")
            }
            Self::AlreadyFinalized { execution_id } => {
                write!(f, "execution already finalized: {execution_id}")
            }
            Self::Backend { message } => write!(f, "execution store error: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Trait for execution record stores.
///
/// Implementations back every other engine component. The engine swallows
/// `append_log`/`append_result` errors into diagnostics (a logging failure
/// must never abort a run in progress); `finalize` errors are fatal and
/// propagate, because finalization is the last chance to record an
/// outcome.
#[async_trait]
pub trait ExecutionStore: Send + Sync {
    /// Creates a new running record and returns it.
    async fn create(&self, agent_id: AgentId, owner: &OwnerId) -> Result<Execution, StoreError>;

    /// Atomically appends a log entry to a record.
    async fn append_log(&self, id: ExecutionId, entry: LogEntry) -> Result<(), StoreError>;

    /// Atomically appends a result entry to a record.
    async fn append_result(&self, id: ExecutionId, entry: ResultEntry) -> Result<(), StoreError>;

    /// Moves a record into its terminal state exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AlreadyFinalized`] if the record is already
    /// terminal.
    async fn finalize(
        &self,
        id: ExecutionId,
        outcome: ExecutionOutcome,
    ) -> Result<Execution, StoreError>;

    /// Fetches a record scoped to an owner.
    async fn find(
        &self,
        id: ExecutionId,
        owner: &OwnerId,
    ) -> Result<Option<Execution>, StoreError>;

    /// Lists recent records for an agent, newest first.
    async fn list_for_agent(
        &self,
        agent_id: AgentId,
        owner: &OwnerId,
        limit: usize,
    ) -> Result<Vec<Execution>, StoreError>;
}

/// In-memory store: a mutexed map of records.
///
/// Appends hold the map lock for the duration of the push, which makes
/// them atomic and ordered per record. Used by tests and single-process
/// deployments without a database.
#[derive(Debug, Default)]
pub struct MemoryExecutionStore {
    records: Mutex<HashMap<ExecutionId, Execution>>,
}

impl MemoryExecutionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_record<T>(
        &self,
        id: ExecutionId,
        f: impl FnOnce(&mut Execution) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut records = self.records.lock().map_err(|_| StoreError::Backend {
            message: "store mutex poisoned".to_string(),
        })?;
        let record = records
            .get_mut(&id)
            .ok_or(StoreError::NotFound { execution_id: id })?;
        f(record)
    }
}

#[async_trait]
impl ExecutionStore for MemoryExecutionStore {
    async fn create(&self, agent_id: AgentId, owner: &OwnerId) -> Result<Execution, StoreError> {
        let execution = Execution::new(agent_id, owner.clone());
        let mut records = self.records.lock().map_err(|_| StoreError::Backend {
            message: "store mutex poisoned".to_string(),
        })?;
        records.insert(execution.id, execution.clone());
        Ok(execution)
    }

    async fn append_log(&self, id: ExecutionId, entry: LogEntry) -> Result<(), StoreError> {
        self.with_record(id, |record| {
            record.logs.push(entry);
            Ok(())
        })
    }

    async fn append_result(&self, id: ExecutionId, entry: ResultEntry) -> Result<(), StoreError> {
        self.with_record(id, |record| {
            record.results.push(entry);
            Ok(())
        })
    }

    async fn finalize(
        &self,
        id: ExecutionId,
        outcome: ExecutionOutcome,
    ) -> Result<Execution, StoreError> {
        self.with_record(id, |record| {
            if record.is_terminal() {
                return Err(StoreError::AlreadyFinalized { execution_id: id });
            }
            match outcome {
                ExecutionOutcome::Completed => record.complete(),
                ExecutionOutcome::Failed { error } => record.fail(error),
            }
            Ok(record.clone())
        })
    }

    async fn find(
        &self,
        id: ExecutionId,
        owner: &OwnerId,
    ) -> Result<Option<Execution>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Backend {
            message: "store mutex poisoned".to_string(),
        })?;
        Ok(records
            .get(&id)
            .filter(|record| record.owner == *owner)
            .cloned())
    }

    async fn list_for_agent(
        &self,
        agent_id: AgentId,
        owner: &OwnerId,
        limit: usize,
    ) -> Result<Vec<Execution>, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Backend {
            message: "store mutex poisoned".to_string(),
        })?;
        let mut matches: Vec<Execution> = records
            .values()
            .filter(|record| record.agent_id == agent_id && record.owner == *owner)
            .cloned()
            .collect();
        matches.sort_by_key(|record| std::cmp::Reverse(record.start_time));
        matches.truncate(limit);
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::LogLevel;

    fn owner() -> OwnerId {
        OwnerId::new("tenant-1")
    }

    #[tokio::test]
    async fn create_initializes_running_record() {
        let store = MemoryExecutionStore::new();
        let execution = store.create(AgentId::new(), &owner()).await.expect("create");
        assert_eq!(execution.status, crate::ExecutionStatus::Running);

        let found = store
            .find(execution.id, &owner())
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found.id, execution.id);
    }

    #[tokio::test]
    async fn logs_preserve_append_order() {
        let store = MemoryExecutionStore::new();
        let execution = store.create(AgentId::new(), &owner()).await.expect("create");

        for message in ["first", "second", "third"] {
            store
                .append_log(execution.id, LogEntry::new(LogLevel::Info, message))
                .await
                .expect("append");
        }

        let found = store
            .find(execution.id, &owner())
            .await
            .expect("find")
            .expect("present");
        let messages: Vec<&str> = found.logs.iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn finalize_is_write_once() {
        let store = MemoryExecutionStore::new();
        let execution = store.create(AgentId::new(), &owner()).await.expect("create");

        let finalized = store
            .finalize(execution.id, ExecutionOutcome::Completed)
            .await
            .expect("first finalize");
        assert!(finalized.is_terminal());
        assert!(finalized.end_time.is_some());

        let second = store
            .finalize(
                execution.id,
                ExecutionOutcome::Failed {
                    error: "late".to_string(),
                },
            )
            .await;
        assert_eq!(
            second.unwrap_err(),
            StoreError::AlreadyFinalized {
                execution_id: execution.id
            }
        );

        // the record still reflects the first outcome
        let found = store
            .find(execution.id, &owner())
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found.status, crate::ExecutionStatus::Completed);
        assert!(found.error.is_none());
    }

    #[tokio::test]
    async fn append_to_missing_record_is_not_found() {
        let store = MemoryExecutionStore::new();
        let missing = ExecutionId::new();
        let err = store
            .append_log(missing, LogEntry::new(LogLevel::Info, "orphan"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound { execution_id: missing });
    }

    #[tokio::test]
    async fn list_is_newest_first_and_limited() {
        let store = MemoryExecutionStore::new();
        let agent_id = AgentId::new();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let execution = store.create(agent_id, &owner()).await.expect("create");
            ids.push(execution.id);
            tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        }

        let listed = store
            .list_for_agent(agent_id, &owner(), 2)
            .await
            .expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, ids[2]);
        assert_eq!(listed[1].id, ids[1]);
    }

    #[tokio::test]
    async fn find_is_owner_scoped() {
        let store = MemoryExecutionStore::new();
        let execution = store.create(AgentId::new(), &owner()).await.expect("create");

        let other = store
            .find(execution.id, &OwnerId::new("tenant-2"))
            .await
            .expect("find");
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn concurrent_appends_lose_nothing() {
        use std::sync::Arc;

        let store = Arc::new(MemoryExecutionStore::new());
        let execution = store.create(AgentId::new(), &owner()).await.expect("create");

        let mut handles = Vec::new();
        for task in 0..8 {
            let store = Arc::clone(&store);
            let id = execution.id;
            handles.push(tokio::spawn(async move {
                for line in 0..25 {
                    store
                        .append_log(id, LogEntry::new(LogLevel::Info, format!("{task}:{line}")))
                        .await
                        .expect("append");
                }
            }));
        }
        for handle in handles {
            handle.await.expect("join");
        }

        let found = store
            .find(execution.id, &owner())
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found.logs.len(), 8 * 25);
    }

    #[tokio::test]
    async fn results_append_like_logs() {
        let store = MemoryExecutionStore::new();
        let execution = store.create(AgentId::new(), &owner()).await.expect("create");
        store
            .append_result(
                execution.id,
                ResultEntry::new("planner", "plan", "AI Planner", serde_json::json!({})),
            )
            .await
            .expect("append");

        let found = store
            .find(execution.id, &owner())
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found.results.len(), 1);
        assert_eq!(found.results[0].node_id, "planner");
    }
}
