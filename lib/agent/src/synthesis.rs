//! Natural-language graph synthesis.
//!
//! Compiles a free-text automation description into a persistable node
//! graph using ordered keyword tables. This is a deliberate heuristic,
//! not a parser: rules are evaluated independently, every matching action
//! category emits a node, and within a single table the first matching
//! rule wins. It only shapes what gets persisted; execution never depends
//! on it.

use crate::definition::{AgentDefinition, AgentStatus};
use crate::edge::AgentEdge;
use crate::node::{AgentNode, NodeCategory, NodeData, NodeKind, Position};
use amber_relay_core::OwnerId;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// A synthesized node/edge pair ready to persist on an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesizedGraph {
    pub nodes: Vec<AgentNode>,
    pub edges: Vec<AgentEdge>,
}

/// One first-match-wins label rule.
struct LabelRule {
    keywords: &'static [&'static str],
    label: &'static str,
}

const SCHEDULE_RULES: &[LabelRule] = &[
    LabelRule { keywords: &["daily", "every day"], label: "Daily" },
    LabelRule { keywords: &["sunday", "monday"], label: "Weekly" },
    LabelRule { keywords: &["morning"], label: "9:00 AM" },
    LabelRule { keywords: &["8pm", "evening"], label: "8:00 PM" },
];

const TRIGGER_LABEL_RULES: &[LabelRule] = &[
    LabelRule { keywords: &["email", "gmail"], label: "Email Trigger" },
    LabelRule { keywords: &["every", "daily"], label: "Schedule Trigger" },
    LabelRule { keywords: &["when", "if"], label: "Event Trigger" },
];

const ACTION_LABEL_RULES: &[LabelRule] = &[
    LabelRule { keywords: &["email", "send"], label: "Send Email" },
    LabelRule { keywords: &["slack", "alert"], label: "Slack Message" },
    LabelRule { keywords: &["whatsapp"], label: "WhatsApp" },
    LabelRule { keywords: &["summarize", "analyze"], label: "AI Analysis" },
    LabelRule { keywords: &["track", "check"], label: "Web Scraper" },
];

const SCHEDULE_TRIGGER_KEYWORDS: &[&str] = &["every", "daily"];
const EMAIL_KEYWORDS: &[&str] = &["email", "send"];
const AI_KEYWORDS: &[&str] = &["summarize", "analyze"];
const API_KEYWORDS: &[&str] = &["api", "fetch", "get data"];
const CONDITION_KEYWORDS: &[&str] = &["if", "when", "alert if"];

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}

/// Derives a human-readable schedule label from a description.
#[must_use]
pub fn detect_schedule(description: &str) -> &'static str {
    let text = description.to_lowercase();
    SCHEDULE_RULES
        .iter()
        .find(|rule| contains_any(&text, rule.keywords))
        .map_or("Real-time", |rule| rule.label)
}

/// Derives the trigger display label from a description.
#[must_use]
pub fn detect_trigger_labels(description: &str) -> Vec<String> {
    let text = description.to_lowercase();
    let label = TRIGGER_LABEL_RULES
        .iter()
        .find(|rule| contains_any(&text, rule.keywords))
        .map_or("Webhook Trigger", |rule| rule.label);
    vec![label.to_string()]
}

/// Derives action display labels from a description. All matching rules
/// contribute a label.
#[must_use]
pub fn detect_action_labels(description: &str) -> Vec<String> {
    let text = description.to_lowercase();
    let labels: Vec<String> = ACTION_LABEL_RULES
        .iter()
        .filter(|rule| contains_any(&text, rule.keywords))
        .map(|rule| rule.label.to_string())
        .collect();
    if labels.is_empty() {
        vec!["Execute Action".to_string()]
    } else {
        labels
    }
}

/// Synthesizes a linear node graph from a description.
///
/// The graph always starts with a trigger node; every matching action
/// category appends a node chained to the previous one, and a condition
/// node is appended last when conditional language is present.
#[must_use]
pub fn synthesize_graph(description: &str) -> SynthesizedGraph {
    let text = description.to_lowercase();
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut y = 50.0;

    let (trigger_kind, trigger_label) = if contains_any(&text, SCHEDULE_TRIGGER_KEYWORDS) {
        (NodeKind::ScheduleTrigger, "Schedule Trigger")
    } else {
        (NodeKind::WebhookTrigger, "Webhook Trigger")
    };
    nodes.push(AgentNode::new(
        "trigger-1",
        trigger_kind,
        Position::new(100.0, y),
        NodeData::new(trigger_label, NodeCategory::Trigger)
            .with_config("schedule", json!(detect_schedule(description))),
    ));
    let mut last_node_id = "trigger-1".to_string();
    y += 100.0;

    let chain = |nodes: &mut Vec<AgentNode>,
                 edges: &mut Vec<AgentEdge>,
                 last_node_id: &mut String,
                 y: &mut f64,
                 node: AgentNode| {
        edges.push(AgentEdge::connect(last_node_id.clone(), node.id.clone()));
        *last_node_id = node.id.clone();
        *y += 100.0;
        nodes.push(node);
    };

    if contains_any(&text, EMAIL_KEYWORDS) {
        let node = AgentNode::new(
            "action-email",
            NodeKind::SendEmail,
            Position::new(100.0, y),
            NodeData::new("Send Email", NodeCategory::Action)
                .with_config("to", json!("user@example.com"))
                .with_config("subject", json!("Automated Email")),
        );
        chain(&mut nodes, &mut edges, &mut last_node_id, &mut y, node);
    }

    if contains_any(&text, AI_KEYWORDS) {
        let node = AgentNode::new(
            "action-ai",
            NodeKind::AiProcess,
            Position::new(100.0, y),
            NodeData::new("AI Process", NodeCategory::Action)
                .with_config("prompt", json!(format!("Analyze and summarize: {description}"))),
        );
        chain(&mut nodes, &mut edges, &mut last_node_id, &mut y, node);
    }

    if contains_any(&text, API_KEYWORDS) {
        let node = AgentNode::new(
            "action-api",
            NodeKind::ApiCall,
            Position::new(100.0, y),
            NodeData::new("API Call", NodeCategory::Action).with_config("method", json!("GET")),
        );
        chain(&mut nodes, &mut edges, &mut last_node_id, &mut y, node);
    }

    if contains_any(&text, CONDITION_KEYWORDS) {
        let node = AgentNode::new(
            "condition-1",
            NodeKind::IfElse,
            Position::new(100.0, y),
            NodeData::new("If/Else", NodeCategory::Condition)
                .with_config("condition", json!("value > 0")),
        );
        edges.push(AgentEdge::connect(last_node_id.clone(), node.id.clone()));
        nodes.push(node);
    }

    SynthesizedGraph { nodes, edges }
}

/// Builds a complete draft agent from a description: synthesized graph
/// plus the detected display labels.
#[must_use]
pub fn synthesize_agent(
    owner: OwnerId,
    name: impl Into<String>,
    description: impl Into<String>,
) -> AgentDefinition {
    let description = description.into();
    let graph = synthesize_graph(&description);
    let mut agent = AgentDefinition::new(owner, name, description.clone())
        .with_graph(graph.nodes, graph.edges)
        .with_status(AgentStatus::Draft);
    agent.triggers = detect_trigger_labels(&description);
    agent.actions = detect_action_labels(&description);
    agent.schedule = Some(detect_schedule(&description).to_string());
    agent
}
