use flowprobe_core::{GraphError, IncompatibleOperator};

use crate::http::HttpError;
use crate::nodes::NodeError;

#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error("no nodes to execute")]
    NoNodes,
    #[error("cycle detected or unreachable nodes: {stranded} nodes not executed")]
    CycleOrUnreachable { stranded: usize },
    #[error("node '{node_id}': source node '{source_node}' not executed yet (input '{reference}')")]
    UnresolvedDependency {
        node_id: String,
        source_node: String,
        reference: String,
    },
    #[error("node '{node_id}': output '{key}' not found in source node '{source_node}'")]
    MissingOutput {
        node_id: String,
        source_node: String,
        key: String,
    },
    #[error("node '{node_id}' failed: {source}")]
    NodeExecution { node_id: String, source: NodeError },
    #[error("node '{node_id}', assertion {index}: {source}")]
    IncompatibleOperator {
        node_id: String,
        index: usize,
        source: IncompatibleOperator,
    },
    #[error(transparent)]
    HttpClient(HttpError),
}

impl EngineError {
    /// Stable machine-readable code used in serialized results.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Graph(_) => "GRAPH_CONSTRUCTION",
            EngineError::NoNodes => "NO_NODES",
            EngineError::CycleOrUnreachable { .. } => "CYCLE_OR_UNREACHABLE",
            EngineError::UnresolvedDependency { .. } => "UNRESOLVED_DEPENDENCY",
            EngineError::MissingOutput { .. } => "MISSING_OUTPUT",
            EngineError::NodeExecution { .. } => "NODE_EXECUTION",
            EngineError::IncompatibleOperator { .. } => "INCOMPATIBLE_OPERATOR",
            EngineError::HttpClient(_) => "HTTP_CLIENT",
        }
    }

    /// The node-level error behind a `NodeExecution` failure.
    pub fn node_error(&self) -> Option<&NodeError> {
        match self {
            EngineError::NodeExecution { source, .. } => Some(source),
            _ => None,
        }
    }
}
