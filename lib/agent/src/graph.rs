//! Agent graph construction and walking, backed by petgraph.
//!
//! Agents persist their graph as flat node/edge lists. This module builds
//! a directed graph over those lists, validating that edge endpoints exist
//! and that node ids are unique, and provides a deterministic walk used by
//! plan derivation: breadth-first from the entry nodes, successors visited
//! in edge insertion order.

use crate::edge::AgentEdge;
use crate::error::GraphError;
use crate::node::AgentNode;
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet, VecDeque};

/// A validated directed graph over an agent's node and edge lists.
///
/// Node and edge weights are indices into the borrowed slices, which keeps
/// the graph cheap to build per run while the definition stays immutable.
#[derive(Debug)]
pub struct AgentGraph<'a> {
    graph: DiGraph<usize, usize>,
    nodes: &'a [AgentNode],
    index_by_id: HashMap<&'a str, NodeIndex>,
}

impl<'a> AgentGraph<'a> {
    /// Builds a graph from persisted node and edge lists.
    ///
    /// # Errors
    ///
    /// Returns an error if a node id is duplicated or an edge references
    /// a node id that does not exist.
    pub fn build(nodes: &'a [AgentNode], edges: &'a [AgentEdge]) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut index_by_id = HashMap::new();

        for (position, node) in nodes.iter().enumerate() {
            let index = graph.add_node(position);
            if index_by_id.insert(node.id.as_str(), index).is_some() {
                return Err(GraphError::DuplicateNode {
                    node_id: node.id.clone(),
                });
            }
        }

        for (position, edge) in edges.iter().enumerate() {
            let source = *index_by_id.get(edge.source.as_str()).ok_or_else(|| {
                GraphError::UnknownEdgeEndpoint {
                    edge_id: edge.id.clone(),
                    node_id: edge.source.clone(),
                }
            })?;
            let target = *index_by_id.get(edge.target.as_str()).ok_or_else(|| {
                GraphError::UnknownEdgeEndpoint {
                    edge_id: edge.id.clone(),
                    node_id: edge.target.clone(),
                }
            })?;
            graph.add_edge(source, target, position);
        }

        Ok(Self {
            graph,
            nodes,
            index_by_id,
        })
    }

    /// Returns the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns a node by id, if present.
    #[must_use]
    pub fn get(&self, node_id: &str) -> Option<&'a AgentNode> {
        let index = self.index_by_id.get(node_id)?;
        Some(&self.nodes[*self.graph.node_weight(*index)?])
    }

    /// Returns nodes with no incoming edges, in definition order.
    #[must_use]
    pub fn entry_nodes(&self) -> Vec<&'a AgentNode> {
        self.graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .edges_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .filter_map(|idx| self.graph.node_weight(idx))
            .map(|&position| &self.nodes[position])
            .collect()
    }

    /// Returns true if the graph contains a cycle.
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    /// Walks the graph breadth-first from the entry nodes.
    ///
    /// Successors are visited in edge insertion order, so a linear chain
    /// yields exactly the order the edges were authored in.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::CycleDetected`] if the graph is cyclic; a
    /// cyclic graph has no meaningful step order.
    pub fn walk(&self) -> Result<Vec<&'a AgentNode>, GraphError> {
        if self.is_cyclic() {
            return Err(GraphError::CycleDetected);
        }

        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut order = Vec::with_capacity(self.graph.node_count());
        let mut queue: VecDeque<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&idx| {
                self.graph
                    .edges_directed(idx, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .collect();

        while let Some(index) = queue.pop_front() {
            if !visited.insert(index) {
                continue;
            }
            if let Some(&position) = self.graph.node_weight(index) {
                order.push(&self.nodes[position]);
            }

            let mut successors: Vec<(usize, NodeIndex)> = self
                .graph
                .edges_directed(index, Direction::Outgoing)
                .map(|edge| (*edge.weight(), edge.target()))
                .collect();
            successors.sort_by_key(|(edge_position, _)| *edge_position);
            for (_, target) in successors {
                if !visited.contains(&target) {
                    queue.push_back(target);
                }
            }
        }

        Ok(order)
    }
}
