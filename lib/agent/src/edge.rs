//! Agent graph edges.
//!
//! Edges connect node ids directionally. Endpoint existence is not
//! enforced here; it is validated when an [`AgentGraph`](crate::AgentGraph)
//! is built from the persisted lists.

use serde::{Deserialize, Serialize};

/// A directed edge between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentEdge {
    /// Edge id, unique within the agent.
    pub id: String,
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Optional renderer hint.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl AgentEdge {
    /// Creates an edge with an id derived from its endpoints.
    #[must_use]
    pub fn connect(source: impl Into<String>, target: impl Into<String>) -> Self {
        let source = source.into();
        let target = target.into();
        Self {
            id: format!("e-{source}-{target}"),
            source,
            target,
            kind: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_derives_id() {
        let edge = AgentEdge::connect("trigger-1", "action-email");
        assert_eq!(edge.id, "e-trigger-1-action-email");
        assert_eq!(edge.source, "trigger-1");
        assert_eq!(edge.target, "action-email");
    }

    #[test]
    fn kind_is_omitted_when_absent() {
        let edge = AgentEdge::connect("a", "b");
        let json = serde_json::to_value(&edge).expect("serialize");
        assert!(json.get("type").is_none());
    }
}
