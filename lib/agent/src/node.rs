//! Agent graph node types.
//!
//! Nodes carry a subtype tag, a 2-D canvas position (display only), and a
//! data block with a label, a coarse category, and an arbitrary config map.
//! Subtype tags arrive from persisted documents and user input, so the
//! closed set is extended with an `Other` variant carrying the raw tag.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// The subtype of a graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
    /// Cron-style scheduled trigger.
    ScheduleTrigger,
    /// HTTP webhook trigger.
    WebhookTrigger,
    /// Send an email notification.
    SendEmail,
    /// Run an AI inference over upstream data.
    AiProcess,
    /// Call an external HTTP API.
    ApiCall,
    /// Conditional branch.
    IfElse,
    /// Any tag outside the known set, preserved verbatim.
    Other(String),
}

impl NodeKind {
    /// Returns the wire tag for this kind.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::ScheduleTrigger => "scheduleTrigger",
            Self::WebhookTrigger => "webhookTrigger",
            Self::SendEmail => "sendEmail",
            Self::AiProcess => "aiProcess",
            Self::ApiCall => "apiCall",
            Self::IfElse => "ifElse",
            Self::Other(tag) => tag,
        }
    }
}

impl From<String> for NodeKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "scheduleTrigger" => Self::ScheduleTrigger,
            "webhookTrigger" => Self::WebhookTrigger,
            "sendEmail" => Self::SendEmail,
            "aiProcess" => Self::AiProcess,
            "apiCall" => Self::ApiCall,
            "ifElse" => Self::IfElse,
            _ => Self::Other(tag),
        }
    }
}

impl From<NodeKind> for String {
    fn from(kind: NodeKind) -> Self {
        kind.as_str().to_string()
    }
}

/// The coarse category of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    /// Entry points that initiate execution.
    Trigger,
    /// Side-effecting operations.
    Action,
    /// Conditional branching.
    Condition,
    /// External data reads.
    Data,
}

/// Canvas position of a node. Display only; never affects execution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Creates a position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The data block attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    /// Human-readable label shown on the canvas.
    pub label: String,
    /// Coarse category.
    #[serde(rename = "type")]
    pub category: NodeCategory,
    /// Arbitrary node configuration (schedule, recipients, prompts, ...).
    #[serde(flatten)]
    pub config: Map<String, JsonValue>,
}

impl NodeData {
    /// Creates a data block with an empty config map.
    #[must_use]
    pub fn new(label: impl Into<String>, category: NodeCategory) -> Self {
        Self {
            label: label.into(),
            category,
            config: Map::new(),
        }
    }

    /// Adds a config entry.
    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: JsonValue) -> Self {
        self.config.insert(key.into(), value);
        self
    }
}

/// A node in an agent graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentNode {
    /// Node id, unique within the agent.
    pub id: String,
    /// Node subtype.
    #[serde(rename = "type")]
    pub kind: NodeKind,
    /// Canvas position.
    pub position: Position,
    /// Label, category, and configuration.
    pub data: NodeData,
}

impl AgentNode {
    /// Creates a node.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        kind: NodeKind,
        position: Position,
        data: NodeData,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            data,
        }
    }

    /// Returns the node category.
    #[must_use]
    pub fn category(&self) -> NodeCategory {
        self.data.category
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_kind_roundtrip() {
        let kind = NodeKind::from("sendEmail".to_string());
        assert_eq!(kind, NodeKind::SendEmail);
        assert_eq!(kind.as_str(), "sendEmail");
    }

    #[test]
    fn unknown_kind_preserved() {
        let kind = NodeKind::from("slackMessage".to_string());
        assert_eq!(kind, NodeKind::Other("slackMessage".to_string()));
        assert_eq!(String::from(kind), "slackMessage");
    }

    #[test]
    fn node_serde_matches_document_shape() {
        let node = AgentNode::new(
            "action-email",
            NodeKind::SendEmail,
            Position::new(100.0, 150.0),
            NodeData::new("Send Email", NodeCategory::Action)
                .with_config("to", serde_json::json!("user@example.com")),
        );

        let json = serde_json::to_value(&node).expect("serialize");
        assert_eq!(json["type"], "sendEmail");
        assert_eq!(json["data"]["type"], "action");
        assert_eq!(json["data"]["to"], "user@example.com");

        let parsed: AgentNode = serde_json::from_value(json).expect("deserialize");
        assert_eq!(parsed, node);
    }

    #[test]
    fn unknown_kind_survives_serde() {
        let json = serde_json::json!({
            "id": "n1",
            "type": "customThing",
            "position": {"x": 0.0, "y": 0.0},
            "data": {"label": "Custom", "type": "action"}
        });
        let node: AgentNode = serde_json::from_value(json).expect("deserialize");
        assert_eq!(node.kind, NodeKind::Other("customThing".to_string()));
    }
}
