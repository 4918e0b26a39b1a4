//! Agent definitions for the amber-relay automation platform.
//!
//! An agent is a reusable automation: a name, a free-text description, and
//! a directed graph of typed nodes. This crate provides:
//!
//! - **Definition Model**: agents, nodes, edges, and lifecycle status
//! - **Graph**: petgraph-backed validation and deterministic walking
//! - **Synthesis**: keyword-table compilation of natural language into a
//!   persistable node graph

pub mod definition;
pub mod edge;
pub mod error;
pub mod graph;
pub mod node;
pub mod synthesis;

pub use definition::{AgentDefinition, AgentStatus};
pub use edge::AgentEdge;
pub use error::GraphError;
pub use graph::AgentGraph;
pub use node::{AgentNode, NodeCategory, NodeData, NodeKind, Position};
pub use synthesis::{SynthesizedGraph, synthesize_agent, synthesize_graph};
