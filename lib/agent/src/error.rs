//! Error types for agent graph operations.

use std::fmt;

/// Errors from building or walking an agent graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Two nodes share the same id.
    DuplicateNode { node_id: String },
    /// An edge references a node id that does not exist.
    UnknownEdgeEndpoint { edge_id: String, node_id: String },
    /// The graph contains a cycle; plans cannot be derived from it.
    CycleDetected,
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNode { node_id } => {
                write!(f, "duplicate node id '{node_id}'")
            }
            Self::UnknownEdgeEndpoint { edge_id, node_id } => {
                write!(f, "edge '{edge_id}' references unknown node '{node_id}'")
            }
            Self::CycleDetected => write!(f, "graph contains a cycle"),
        }
    }
}

impl std::error::Error for GraphError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_ids() {
        let err = GraphError::UnknownEdgeEndpoint {
            edge_id: "e-1".to_string(),
            node_id: "ghost".to_string(),
        };
        assert!(err.to_string().contains("e-1"));
        assert!(err.to_string().contains("ghost"));
    }
}
