//! Agent registry seam.
//!
//! The orchestrator reads agent snapshots through this trait; the HTTP
//! layer uses it for CRUD. Every operation is scoped to an owner subject.

use amber_relay_agent::AgentDefinition;
use amber_relay_core::{AgentId, OwnerId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The backing store failed.
    Backend { message: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend { message } => write!(f, "agent registry error: {message}"),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Trait for agent definition stores.
#[async_trait]
pub trait AgentRegistry: Send + Sync {
    /// Persists a new agent.
    async fn insert(&self, agent: AgentDefinition) -> Result<AgentDefinition, RegistryError>;

    /// Lists an owner's agents, most recently updated first.
    async fn find(&self, owner: &OwnerId) -> Result<Vec<AgentDefinition>, RegistryError>;

    /// Fetches one agent scoped to an owner.
    async fn find_one(
        &self,
        id: AgentId,
        owner: &OwnerId,
    ) -> Result<Option<AgentDefinition>, RegistryError>;

    /// Replaces an agent's definition; returns the stored agent, or
    /// `None` if it does not exist for the owner.
    async fn update(
        &self,
        agent: AgentDefinition,
    ) -> Result<Option<AgentDefinition>, RegistryError>;

    /// Deletes an agent; returns true if a record was removed.
    async fn delete(&self, id: AgentId, owner: &OwnerId) -> Result<bool, RegistryError>;
}

/// In-memory registry backed by a mutexed map.
#[derive(Debug, Default)]
pub struct MemoryAgentRegistry {
    agents: Mutex<HashMap<AgentId, AgentDefinition>>,
}

impl MemoryAgentRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<AgentId, AgentDefinition>>, RegistryError> {
        self.agents.lock().map_err(|_| RegistryError::Backend {
            message: "registry mutex poisoned".to_string(),
        })
    }
}

#[async_trait]
impl AgentRegistry for MemoryAgentRegistry {
    async fn insert(&self, agent: AgentDefinition) -> Result<AgentDefinition, RegistryError> {
        let mut agents = self.lock()?;
        agents.insert(agent.id, agent.clone());
        Ok(agent)
    }

    async fn find(&self, owner: &OwnerId) -> Result<Vec<AgentDefinition>, RegistryError> {
        let agents = self.lock()?;
        let mut matches: Vec<AgentDefinition> = agents
            .values()
            .filter(|agent| agent.owner == *owner)
            .cloned()
            .collect();
        matches.sort_by_key(|agent| std::cmp::Reverse(agent.updated_at));
        Ok(matches)
    }

    async fn find_one(
        &self,
        id: AgentId,
        owner: &OwnerId,
    ) -> Result<Option<AgentDefinition>, RegistryError> {
        let agents = self.lock()?;
        Ok(agents
            .get(&id)
            .filter(|agent| agent.owner == *owner)
            .cloned())
    }

    async fn update(
        &self,
        agent: AgentDefinition,
    ) -> Result<Option<AgentDefinition>, RegistryError> {
        let mut agents = self.lock()?;
        match agents.get(&agent.id) {
            Some(existing) if existing.owner == agent.owner => {
                agents.insert(agent.id, agent.clone());
                Ok(Some(agent))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, id: AgentId, owner: &OwnerId) -> Result<bool, RegistryError> {
        let mut agents = self.lock()?;
        match agents.get(&id) {
            Some(existing) if existing.owner == *owner => {
                agents.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
