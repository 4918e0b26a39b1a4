//! Run orchestration.
//!
//! The orchestrator owns the run lifecycle: load the agent snapshot,
//! create the execution record, derive a plan (from the AI service or the
//! persisted graph, chosen by the description-length dispatch rule), run
//! the interpreter over it, and finalize the record exactly once. Runs
//! are fire-and-forget: `start` returns a handle immediately and the run
//! proceeds on its own task, with every failure path written to the
//! execution record whether or not anyone joins the handle.

use crate::execution::{LogLevel, ResultEntry};
use crate::interpreter::StepInterpreter;
use crate::planner::plan_from_graph;
use crate::registry::{AgentRegistry, RegistryError};
use crate::store::{ExecutionOutcome, ExecutionStore, StoreError};
use amber_relay_agent::{AgentDefinition, GraphError};
use amber_relay_ai::{PlanBackend, PlanError, parse_plan, plan_prompt};
use amber_relay_core::{AgentId, ExecutionId, OwnerId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Description length (in characters) above which an agent is
/// intent-driven rather than graph-driven.
pub const INTENT_THRESHOLD_CHARS: usize = 20;

/// How a run derives its plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExecutionMode {
    /// Intent-driven: the whole run is planned by the AI service.
    SmartAi,
    /// Graph-driven: the persisted node graph is walked directly.
    Workflow,
}

impl ExecutionMode {
    /// Returns the wire tag for this mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SmartAi => "smart-ai",
            Self::Workflow => "workflow",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chooses the execution mode for an agent description.
///
/// Strictly more than [`INTENT_THRESHOLD_CHARS`] characters takes the
/// intent path; exactly the threshold stays on the graph path. Length is
/// counted in Unicode scalar values.
#[must_use]
pub fn dispatch_mode(description: &str) -> ExecutionMode {
    if description.chars().count() > INTENT_THRESHOLD_CHARS {
        ExecutionMode::SmartAi
    } else {
        ExecutionMode::Workflow
    }
}

/// Errors from orchestration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    /// The agent id did not resolve for the owner.
    AgentNotFound { agent_id: AgentId },
    /// Registry failure while loading the snapshot.
    Registry(RegistryError),
    /// Store failure on create or finalize.
    Store(StoreError),
    /// The plan inference service failed.
    PlanBackend(PlanError),
    /// The persisted graph could not be planned.
    Graph(GraphError),
    /// The spawned run task died before reporting an outcome.
    TaskFailed { message: String },
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AgentNotFound { agent_id } => write!(f, "agent not found: {agent_id}"),
            Self::Registry(e) => write!(f, "{e}"),
            Self::Store(e) => write!(f, "{e}"),
            Self::PlanBackend(e) => write!(f, "{e}"),
            Self::Graph(e) => write!(f, "plan generation failed: {e}"),
            Self::TaskFailed { message } => write!(f, "run task failed: {message}"),
        }
    }
}

impl std::error::Error for OrchestratorError {}

impl From<RegistryError> for OrchestratorError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

impl From<StoreError> for OrchestratorError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

impl From<PlanError> for OrchestratorError {
    fn from(e: PlanError) -> Self {
        Self::PlanBackend(e)
    }
}

impl From<GraphError> for OrchestratorError {
    fn from(e: GraphError) -> Self {
        Self::Graph(e)
    }
}

/// Handle to a fire-and-forget run.
///
/// Dropping the handle detaches the run; it keeps going and its outcome
/// is recorded on the execution record either way.
pub struct RunHandle {
    /// The agent being run.
    pub agent_id: AgentId,
    /// Snapshot of the agent's name at start.
    pub agent_name: String,
    /// The chosen execution mode.
    pub mode: ExecutionMode,
    task: JoinHandle<Result<ExecutionId, OrchestratorError>>,
}

impl RunHandle {
    /// Waits for the run to finish and returns its execution id.
    ///
    /// # Errors
    ///
    /// Returns the run's failure, or `TaskFailed` if the task panicked.
    pub async fn join(self) -> Result<ExecutionId, OrchestratorError> {
        self.task
            .await
            .map_err(|e| OrchestratorError::TaskFailed {
                message: e.to_string(),
            })?
    }
}

/// Coordinates agent runs.
pub struct Orchestrator {
    registry: Arc<dyn AgentRegistry>,
    store: Arc<dyn ExecutionStore>,
    backend: Arc<dyn PlanBackend>,
    interpreter: Arc<StepInterpreter>,
}

impl Orchestrator {
    /// Creates an orchestrator.
    #[must_use]
    pub fn new(
        registry: Arc<dyn AgentRegistry>,
        store: Arc<dyn ExecutionStore>,
        backend: Arc<dyn PlanBackend>,
        interpreter: StepInterpreter,
    ) -> Self {
        Self {
            registry,
            store,
            backend,
            interpreter: Arc::new(interpreter),
        }
    }

    /// Starts a run for an agent.
    ///
    /// The agent snapshot is loaded before anything is written: a missing
    /// agent fails here and no execution record is created. On success
    /// the run continues on its own task and the caller gets an immediate
    /// handle.
    ///
    /// # Errors
    ///
    /// Returns `AgentNotFound` if the id does not resolve for the owner.
    pub async fn start(
        self: &Arc<Self>,
        agent_id: AgentId,
        owner: OwnerId,
    ) -> Result<RunHandle, OrchestratorError> {
        let agent = self
            .registry
            .find_one(agent_id, &owner)
            .await?
            .ok_or(OrchestratorError::AgentNotFound { agent_id })?;

        let mode = dispatch_mode(&agent.description);
        let agent_name = agent.name.clone();
        tracing::info!(agent_id = %agent_id, mode = %mode, "starting agent execution");

        let orchestrator = Arc::clone(self);
        let task = tokio::spawn(async move { orchestrator.run(agent, owner, mode).await });

        Ok(RunHandle {
            agent_id,
            agent_name,
            mode,
            task,
        })
    }

    /// Runs a prompt through the plan service without touching any agent
    /// or execution record.
    ///
    /// # Errors
    ///
    /// Returns an error if the inference service call fails.
    pub async fn run_adhoc(&self, prompt: &str) -> Result<String, OrchestratorError> {
        Ok(self.backend.generate(prompt).await?)
    }

    /// The body of one run. Creates the record, drives the plan, and
    /// finalizes exactly once; every failure lands on the record.
    async fn run(
        &self,
        agent: AgentDefinition,
        owner: OwnerId,
        mode: ExecutionMode,
    ) -> Result<ExecutionId, OrchestratorError> {
        let execution = self.store.create(agent.id, &owner).await?;
        let id = execution.id;

        match self.drive(&agent, id, mode).await {
            Ok(()) => {
                self.store.finalize(id, ExecutionOutcome::Completed).await?;
                tracing::info!(execution_id = %id, agent_id = %agent.id, "agent execution completed");
                Ok(id)
            }
            Err(e) => {
                self.interpreter
                    .log(id, LogLevel::Error, format!("Execution failed: {e}"))
                    .await;
                self.store
                    .finalize(
                        id,
                        ExecutionOutcome::Failed {
                            error: e.to_string(),
                        },
                    )
                    .await?;
                tracing::error!(execution_id = %id, error = %e, "agent execution failed");
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        agent: &AgentDefinition,
        id: ExecutionId,
        mode: ExecutionMode,
    ) -> Result<(), OrchestratorError> {
        self.interpreter
            .log(id, LogLevel::Info, "Starting agent execution")
            .await;
        self.interpreter
            .log(id, LogLevel::Info, format!("Task: {}", agent.description))
            .await;

        let plan = match mode {
            ExecutionMode::SmartAi => {
                self.interpreter
                    .log(id, LogLevel::Info, "Delegating planning to the AI inference service")
                    .await;
                let raw = self.backend.generate(&plan_prompt(&agent.description)).await?;
                self.interpreter
                    .log(id, LogLevel::Info, "AI execution plan generated")
                    .await;
                parse_plan(&raw)
            }
            ExecutionMode::Workflow => {
                let plan = plan_from_graph(&agent.nodes, &agent.edges)?;
                self.interpreter
                    .log(
                        id,
                        LogLevel::Info,
                        format!("Derived {} steps from the workflow graph", plan.steps.len()),
                    )
                    .await;
                plan
            }
        };

        for step in &plan.steps {
            self.interpreter
                .log(id, LogLevel::Info, format!("{}: {}", step.action, step.details))
                .await;
        }

        self.interpreter.run_plan(id, &plan).await;

        if mode == ExecutionMode::SmartAi {
            // one aggregate artifact carrying the whole plan, under a
            // synthetic node id
            let payload = serde_json::to_value(&plan).unwrap_or_default();
            self.interpreter
                .record_result(
                    id,
                    ResultEntry::new("planner", "smart-execution", "AI Planner", payload),
                )
                .await;
        }

        Ok(())
    }
}
