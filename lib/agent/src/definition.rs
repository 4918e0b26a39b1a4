//! Agent definition types.
//!
//! An agent is a stored automation: metadata, a node/edge graph, and
//! display summaries produced by graph synthesis. Documents serialize in
//! camelCase to preserve the shape existing clients consume.

use crate::edge::AgentEdge;
use crate::node::AgentNode;
use amber_relay_core::{AgentId, OwnerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Being edited; not yet runnable from triggers.
    Draft,
    /// Live.
    Active,
    /// Temporarily disabled.
    Paused,
}

/// A stored automation definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDefinition {
    /// Unique identifier.
    pub id: AgentId,
    /// Owner subject this agent belongs to.
    #[serde(rename = "userId")]
    pub owner: OwnerId,
    /// Human-readable name.
    pub name: String,
    /// Free-text task description. Its length decides the execution path.
    pub description: String,
    /// Graph nodes.
    #[serde(default)]
    pub nodes: Vec<AgentNode>,
    /// Graph edges.
    #[serde(default)]
    pub edges: Vec<AgentEdge>,
    /// Lifecycle status.
    pub status: AgentStatus,
    /// Display labels for detected triggers.
    #[serde(default)]
    pub triggers: Vec<String>,
    /// Display labels for detected actions.
    #[serde(default)]
    pub actions: Vec<String>,
    /// Human-readable schedule label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    /// When this agent was created.
    pub created_at: DateTime<Utc>,
    /// When this agent was last updated.
    pub updated_at: DateTime<Utc>,
}

impl AgentDefinition {
    /// Creates a draft agent with an empty graph.
    #[must_use]
    pub fn new(owner: OwnerId, name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: AgentId::new(),
            owner,
            name: name.into(),
            description: description.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            status: AgentStatus::Draft,
            triggers: Vec::new(),
            actions: Vec::new(),
            schedule: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the graph.
    #[must_use]
    pub fn with_graph(mut self, nodes: Vec<AgentNode>, edges: Vec<AgentEdge>) -> Self {
        self.nodes = nodes;
        self.edges = edges;
        self
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = status;
        self
    }

    /// Marks the agent as updated.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Activates the agent.
    pub fn activate(&mut self) {
        self.status = AgentStatus::Active;
        self.touch();
    }

    /// Pauses the agent.
    pub fn pause(&mut self) {
        self.status = AgentStatus::Paused;
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_agent_is_draft() {
        let agent = AgentDefinition::new(OwnerId::new("tenant-1"), "Reporter", "send a report");
        assert_eq!(agent.status, AgentStatus::Draft);
        assert!(agent.nodes.is_empty());
        assert!(agent.edges.is_empty());
    }

    #[test]
    fn activate_bumps_updated_at() {
        let mut agent = AgentDefinition::new(OwnerId::new("tenant-1"), "Reporter", "");
        let created = agent.updated_at;
        agent.activate();
        assert_eq!(agent.status, AgentStatus::Active);
        assert!(agent.updated_at >= created);
    }

    #[test]
    fn serde_uses_document_field_names() {
        let agent = AgentDefinition::new(OwnerId::new("tenant-1"), "Reporter", "daily email");
        let json = serde_json::to_value(&agent).expect("serialize");
        assert!(json.get("userId").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["status"], "draft");

        let parsed: AgentDefinition = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, agent);
    }
}
