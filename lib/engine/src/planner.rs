//! Graph-driven plan derivation.
//!
//! The graph path is mechanical: walk the persisted node graph from its
//! trigger entry points in edge order and emit one typed step per
//! action/condition/data node. Trigger nodes initiate the walk but emit
//! no step. Cycles are rejected outright; a cyclic graph has no step
//! order and must fail plan generation instead of looping.

use amber_relay_agent::{AgentEdge, AgentGraph, AgentNode, GraphError, NodeCategory, NodeKind};
use amber_relay_ai::{Plan, PlanStep, StepKind};
use serde_json::Value as JsonValue;

/// Maps a graph node to the step kind the interpreter dispatches on.
fn step_kind_for(node: &AgentNode) -> StepKind {
    match node.category() {
        NodeCategory::Data => StepKind::DataFetch,
        NodeCategory::Condition => StepKind::Automation,
        NodeCategory::Trigger | NodeCategory::Action => match node.kind {
            NodeKind::SendEmail => StepKind::Email,
            NodeKind::AiProcess => StepKind::Analysis,
            NodeKind::ApiCall => StepKind::ApiCall,
            _ => StepKind::Automation,
        },
    }
}

/// Builds a short step elaboration from a node's config map.
fn step_details(node: &AgentNode) -> String {
    let interesting = ["to", "subject", "prompt", "method", "condition", "schedule"];
    let mut parts = Vec::new();
    for key in interesting {
        if let Some(value) = node.data.config.get(key) {
            let rendered = match value {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            };
            parts.push(format!("{key}={rendered}"));
        }
    }
    parts.join(", ")
}

/// Derives an execution plan from an agent's persisted graph.
///
/// # Errors
///
/// Returns an error if the graph is invalid (duplicate node ids, edges
/// pointing at missing nodes) or contains a cycle.
pub fn plan_from_graph(nodes: &[AgentNode], edges: &[AgentEdge]) -> Result<Plan, GraphError> {
    let graph = AgentGraph::build(nodes, edges)?;
    let order = graph.walk()?;

    let steps: Vec<PlanStep> = order
        .into_iter()
        .filter(|node| node.category() != NodeCategory::Trigger)
        .map(|node| {
            PlanStep::new(node.data.label.clone(), step_kind_for(node), step_details(node))
        })
        .collect();

    let summary = format!("Workflow plan with {} steps", steps.len());
    Ok(Plan::new(steps, summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use amber_relay_agent::synthesize_graph;
    use amber_relay_agent::{NodeData, Position};

    #[test]
    fn synthesized_chain_plans_in_edge_order() {
        let graph = synthesize_graph("every morning fetch api data and send an email summary");
        let plan = plan_from_graph(&graph.nodes, &graph.edges).expect("acyclic");

        // trigger emits no step; email precedes api because the email
        // node is synthesized first
        let kinds: Vec<&StepKind> = plan.steps.iter().map(|s| &s.kind).collect();
        assert_eq!(kinds, vec![&StepKind::Email, &StepKind::ApiCall]);
        assert_eq!(plan.summary, "Workflow plan with 2 steps");
    }

    #[test]
    fn condition_and_data_nodes_map_to_kinds() {
        let nodes = vec![
            AgentNode::new(
                "trigger-1",
                NodeKind::WebhookTrigger,
                Position::new(100.0, 50.0),
                NodeData::new("Webhook Trigger", NodeCategory::Trigger),
            ),
            AgentNode::new(
                "data-1",
                NodeKind::Other("sheetRead".to_string()),
                Position::new(100.0, 150.0),
                NodeData::new("Read Sheet", NodeCategory::Data),
            ),
            AgentNode::new(
                "condition-1",
                NodeKind::IfElse,
                Position::new(100.0, 250.0),
                NodeData::new("If/Else", NodeCategory::Condition)
                    .with_config("condition", serde_json::json!("value > 0")),
            ),
        ];
        let edges = vec![
            AgentEdge::connect("trigger-1", "data-1"),
            AgentEdge::connect("data-1", "condition-1"),
        ];

        let plan = plan_from_graph(&nodes, &edges).expect("acyclic");
        assert_eq!(plan.steps.len(), 2);
        assert_eq!(plan.steps[0].kind, StepKind::DataFetch);
        assert_eq!(plan.steps[1].kind, StepKind::Automation);
        assert_eq!(plan.steps[1].details, "condition=value > 0");
    }

    #[test]
    fn cycle_fails_plan_generation() {
        let graph = synthesize_graph("send an email and analyze it");
        let mut edges = graph.edges.clone();
        edges.push(AgentEdge::connect("action-ai", "action-email"));

        let err = plan_from_graph(&graph.nodes, &edges).unwrap_err();
        assert_eq!(err, GraphError::CycleDetected);
    }

    #[test]
    fn empty_graph_yields_empty_plan() {
        let plan = plan_from_graph(&[], &[]).expect("empty is fine");
        assert!(plan.is_empty());
    }

    #[test]
    fn unknown_action_kind_maps_to_automation() {
        let nodes = vec![AgentNode::new(
            "action-x",
            NodeKind::Other("teleport".to_string()),
            Position::new(100.0, 50.0),
            NodeData::new("Teleport", NodeCategory::Action),
        )];
        let plan = plan_from_graph(&nodes, &[]).expect("acyclic");
        assert_eq!(plan.steps[0].kind, StepKind::Automation);
    }
}
