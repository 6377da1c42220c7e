use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use flowprobe_core::NodeType;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::engine::EngineError;
use crate::nodes::NodeError;

/// Fields shared by every node result.
#[derive(Debug, Clone, Serialize)]
pub struct ResultBase {
    pub node_id: String,
    pub node_type: NodeType,
    pub inputs: Map<String, JsonValue>,
    pub outputs: Map<String, JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub executed_at: DateTime<Utc>,
}

impl ResultBase {
    pub fn new(node_id: impl Into<String>, node_type: NodeType, inputs: Map<String, JsonValue>) -> Self {
        Self {
            node_id: node_id.into(),
            node_type,
            inputs,
            outputs: Map::new(),
            error_code: None,
            error_message: None,
            executed_at: Utc::now(),
        }
    }

    pub fn record_error(&mut self, error: &NodeError) {
        self.error_code = Some(error.code().to_string());
        self.error_message = Some(error.to_string());
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestExecutionResult {
    #[serde(flatten)]
    pub base: ResultBase,
    pub request_method: String,
    pub request_url: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub request_headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub response_headers: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body_parsed: Option<JsonValue>,
    pub duration_ms: u64,
}

impl RequestExecutionResult {
    pub fn new(base: ResultBase, method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            base,
            request_method: method.into(),
            request_url: url.into(),
            request_headers: BTreeMap::new(),
            request_body: None,
            status_code: None,
            response_headers: BTreeMap::new(),
            response_body: None,
            response_body_parsed: None,
            duration_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DelayExecutionResult {
    #[serde(flatten)]
    pub base: ResultBase,
    pub delay_ms: u64,
    pub delay_until: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugExecutionResult {
    #[serde(flatten)]
    pub base: ResultBase,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    pub items: Vec<DebugItem>,
}

/// One resolved debug expression: either its rendered value or why it could
/// not be rendered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugItem {
    pub expression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The outcome of running one node, typed by node kind.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ExecutionResult {
    Request(RequestExecutionResult),
    Delay(DelayExecutionResult),
    Debug(DebugExecutionResult),
}

impl ExecutionResult {
    pub fn base(&self) -> &ResultBase {
        match self {
            ExecutionResult::Request(r) => &r.base,
            ExecutionResult::Delay(r) => &r.base,
            ExecutionResult::Debug(r) => &r.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut ResultBase {
        match self {
            ExecutionResult::Request(r) => &mut r.base,
            ExecutionResult::Delay(r) => &mut r.base,
            ExecutionResult::Debug(r) => &mut r.base,
        }
    }

    pub fn node_id(&self) -> &str {
        &self.base().node_id
    }

    pub fn node_type(&self) -> NodeType {
        self.base().node_type
    }

    pub fn inputs(&self) -> &Map<String, JsonValue> {
        &self.base().inputs
    }

    pub fn outputs(&self) -> &Map<String, JsonValue> {
        &self.base().outputs
    }

    pub fn error_message(&self) -> Option<&str> {
        self.base().error_message.as_deref()
    }

    pub fn error_code(&self) -> Option<&str> {
        self.base().error_code.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.base().error_code.is_none()
    }

    pub fn as_request(&self) -> Option<&RequestExecutionResult> {
        match self {
            ExecutionResult::Request(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_delay(&self) -> Option<&DelayExecutionResult> {
        match self {
            ExecutionResult::Delay(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_debug(&self) -> Option<&DebugExecutionResult> {
        match self {
            ExecutionResult::Debug(r) => Some(r),
            _ => None,
        }
    }

    /// # Panics
    ///
    /// Panics if the result did not come from a request node.
    pub fn expect_request(&self) -> &RequestExecutionResult {
        match self.as_request() {
            Some(r) => r,
            None => panic!("node '{}' produced a {} result, not a request result", self.node_id(), self.node_type()),
        }
    }

    /// # Panics
    ///
    /// Panics if the result did not come from a delay node.
    pub fn expect_delay(&self) -> &DelayExecutionResult {
        match self.as_delay() {
            Some(r) => r,
            None => panic!("node '{}' produced a {} result, not a delay result", self.node_id(), self.node_type()),
        }
    }

    /// # Panics
    ///
    /// Panics if the result did not come from a debug node.
    pub fn expect_debug(&self) -> &DebugExecutionResult {
        match self.as_debug() {
            Some(r) => r,
            None => panic!("node '{}' produced a {} result, not a debug result", self.node_id(), self.node_type()),
        }
    }
}

/// Aggregate outcome of one `FlowEngine::execute` call. Returned on failure
/// too, with whatever per-node results were recorded before the run stopped.
#[derive(Debug, Clone, Serialize)]
pub struct FlowExecutionResult {
    pub flow: String,
    pub success: bool,
    pub execution_order: Vec<String>,
    pub execution_results: BTreeMap<String, ExecutionResult>,
    /// Every produced output, keyed `nodeId.key`.
    pub final_outputs: Map<String, JsonValue>,
    #[serde(skip)]
    pub error: Option<EngineError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub duration_ms: u64,
}

impl FlowExecutionResult {
    pub fn new(flow: impl Into<String>) -> Self {
        Self {
            flow: flow.into(),
            success: false,
            execution_order: Vec::new(),
            execution_results: BTreeMap::new(),
            final_outputs: Map::new(),
            error: None,
            error_code: None,
            error_message: None,
            duration_ms: 0,
        }
    }

    pub(crate) fn record(&mut self, result: ExecutionResult) {
        let id = result.node_id().to_string();
        self.execution_order.push(id.clone());
        self.execution_results.insert(id, result);
    }

    pub(crate) fn fail(&mut self, error: EngineError) {
        self.success = false;
        self.error_code = Some(error.code().to_string());
        self.error_message = Some(error.to_string());
        self.error = Some(error);
    }

    pub fn result(&self, node_id: &str) -> Option<&ExecutionResult> {
        self.execution_results.get(node_id)
    }

    pub fn output(&self, reference: &str) -> Option<&JsonValue> {
        self.final_outputs.get(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delay_result() -> ExecutionResult {
        ExecutionResult::Delay(DelayExecutionResult {
            base: ResultBase::new("wait", NodeType::Delay, Map::new()),
            delay_ms: 5,
            delay_until: Utc::now(),
        })
    }

    #[test]
    fn typed_access_matches_variant() {
        let r = delay_result();
        assert!(r.as_delay().is_some());
        assert!(r.as_request().is_none());
        assert_eq!(r.expect_delay().delay_ms, 5);
        assert_eq!(r.node_type(), NodeType::Delay);
        assert!(r.is_success());
    }

    #[test]
    #[should_panic(expected = "not a request result")]
    fn expect_wrong_variant_panics() {
        delay_result().expect_request();
    }

    #[test]
    fn serializes_base_fields_flat() {
        let v = serde_json::to_value(delay_result()).unwrap();
        assert_eq!(v["node_id"], "wait");
        assert_eq!(v["node_type"], "delay");
        assert_eq!(v["delay_ms"], 5);
        assert!(v.get("error_code").is_none());
    }
}
