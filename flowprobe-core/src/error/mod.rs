use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowprobeError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to parse as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to parse as YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unable to auto-detect flow format (neither valid JSON nor valid YAML)")]
    UnknownFormat,
    #[error("invalid node at index {index}: {message}")]
    InvalidNode { index: usize, message: String },
}

#[derive(Debug, Error)]
#[error("flow failed validation ({violations_len} violations)")]
pub struct ValidationError {
    pub violations: Vec<Violation>,
    violations_len: usize,
}

impl ValidationError {
    pub fn new(violations: Vec<Violation>) -> Self {
        let violations_len = violations.len();
        Self {
            violations,
            violations_len,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Which end of an edge a dangling reference was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeSide {
    Source,
    Target,
}

impl fmt::Display for EdgeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeSide::Source => f.write_str("source"),
            EdgeSide::Target => f.write_str("target"),
        }
    }
}

/// Errors raised while turning a flow's nodes and edges into an execution graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("duplicate node id '{0}'")]
    DuplicateNodeId(String),
    #[error("{side} node '{node_id}' not found in edge '{edge_id}'")]
    DanglingEdge {
        edge_id: String,
        side: EdgeSide,
        node_id: String,
    },
}
