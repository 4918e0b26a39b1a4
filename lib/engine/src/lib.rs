//! Workflow execution engine for the amber-relay platform.
//!
//! This crate owns the run lifecycle:
//!
//! - **Execution Record**: per-run status, logs, and results
//! - **Execution Store**: append-only persistence seam with atomic
//!   per-record appends and write-once finalization
//! - **Agent Registry**: lookup seam for agent definitions
//! - **Planner**: graph-driven plan derivation (cycle-safe walk)
//! - **Step Interpreter**: typed step execution with per-step failure
//!   isolation
//! - **Orchestrator**: dispatch between the graph and intent paths and
//!   fire-and-forget run coordination

pub mod execution;
pub mod interpreter;
pub mod orchestrator;
pub mod planner;
pub mod registry;
pub mod store;

pub use execution::{Execution, ExecutionStatus, LogEntry, LogLevel, ResultEntry};
pub use interpreter::{ActionSettings, StepInterpreter};
pub use orchestrator::{
    ExecutionMode, INTENT_THRESHOLD_CHARS, Orchestrator, OrchestratorError, RunHandle,
    dispatch_mode,
};
pub use planner::plan_from_graph;
pub use registry::{AgentRegistry, MemoryAgentRegistry, RegistryError};
pub use store::{ExecutionOutcome, ExecutionStore, MemoryExecutionStore, StoreError};
