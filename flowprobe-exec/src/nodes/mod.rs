use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use flowprobe_core::{ExtractError, Node, OperatorError, OperatorType};
use serde_json::{Map, Value as JsonValue};

use crate::config::EngineConfig;
use crate::http::{HttpClient, HttpError};
use crate::result::ExecutionResult;

mod debug;
mod delay;
mod request;

/// What a node sees when it runs.
pub struct ExecutionContext<'a> {
    /// Declared inputs, keyed by their reference string.
    pub inputs: &'a Map<String, JsonValue>,
    /// Outputs of every node executed so far, plus initial inputs under `""`.
    pub all_outputs: &'a HashMap<String, Map<String, JsonValue>>,
}

/// Shared collaborators handed to every node.
#[derive(Clone)]
pub struct NodeDeps {
    pub http: Arc<dyn HttpClient>,
    pub config: EngineConfig,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum NodeError {
    #[error("missing required input: {0}")]
    MissingInput(String),
    #[error("failed to resolve {field}: {message}")]
    Template { field: String, message: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("request failed: {0}")]
    Http(#[from] HttpError),
    #[error("request timed out after {0} ms")]
    Timeout(u64),
    #[error("assertion {index} ({extractor}): failed to extract value: {source}")]
    AssertionExtraction {
        index: usize,
        extractor: String,
        source: ExtractError,
    },
    #[error("assertion {index} ({operator}): {source}")]
    AssertionError {
        index: usize,
        operator: OperatorType,
        source: OperatorError,
    },
    #[error("assertion {index} failed: {extractor} value {actual} does not satisfy {operator}")]
    AssertionFailed {
        index: usize,
        extractor: String,
        operator: OperatorType,
        actual: JsonValue,
    },
    #[error("failed to extract output '{name}': {source}")]
    Extraction { name: String, source: ExtractError },
    #[error("failed to extract expected output: {0}")]
    MissingDeclaredOutput(String),
}

impl NodeError {
    pub fn code(&self) -> &'static str {
        match self {
            NodeError::MissingInput(_) => "MISSING_INPUT",
            NodeError::Template { .. } => "TEMPLATE_ERROR",
            NodeError::InvalidRequest(_) => "INVALID_REQUEST",
            NodeError::Http(_) => "HTTP_ERROR",
            NodeError::Timeout(_) => "TIMEOUT",
            NodeError::AssertionExtraction { .. } => "ASSERTION_EXTRACTION_FAILED",
            NodeError::AssertionError { .. } => "ASSERTION_ERROR",
            NodeError::AssertionFailed { .. } => "ASSERTION_FAILED",
            NodeError::Extraction { .. } => "EXTRACTION_FAILED",
            NodeError::MissingDeclaredOutput(_) => "MISSING_OUTPUT",
        }
    }
}

/// A failed node run. The result is filled in as far as execution got.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct NodeFailure {
    pub result: Box<ExecutionResult>,
    pub error: NodeError,
}

impl NodeFailure {
    pub fn new(mut result: ExecutionResult, error: NodeError) -> Self {
        result.base_mut().record_error(&error);
        Self {
            result: Box::new(result),
            error,
        }
    }
}

#[async_trait]
pub trait ExecuteNode: Send + Sync {
    async fn execute(
        &self,
        ctx: &ExecutionContext<'_>,
        deps: &NodeDeps,
    ) -> Result<ExecutionResult, NodeFailure>;
}

#[async_trait]
impl ExecuteNode for Node {
    async fn execute(
        &self,
        ctx: &ExecutionContext<'_>,
        deps: &NodeDeps,
    ) -> Result<ExecutionResult, NodeFailure> {
        match self {
            Node::Request(n) => n.execute(ctx, deps).await,
            Node::Delay(n) => n.execute(ctx, deps).await,
            Node::Debug(n) => n.execute(ctx, deps).await,
        }
    }
}

/// First declared input absent from the context, if any.
fn first_missing_input(schema: &[String], inputs: &Map<String, JsonValue>) -> Option<String> {
    schema.iter().find(|name| !inputs.contains_key(name.as_str())).cloned()
}
