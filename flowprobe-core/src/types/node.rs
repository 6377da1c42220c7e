use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::{CompositeAssertion, DebugNode, DelayNode, Output, RequestNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Request,
    Delay,
    Debug,
}

impl NodeType {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Request => "request",
            NodeType::Delay => "delay",
            NodeType::Debug => "debug",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A unit of work in a flow, tagged by `type` on the wire.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Request(RequestNode),
    Delay(DelayNode),
    Debug(DebugNode),
}

impl Node {
    pub fn id(&self) -> &str {
        match self {
            Node::Request(n) => &n.id,
            Node::Delay(n) => &n.id,
            Node::Debug(n) => &n.id,
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Request(_) => NodeType::Request,
            Node::Delay(_) => NodeType::Delay,
            Node::Debug(_) => NodeType::Debug,
        }
    }

    /// Input references this node needs before it can run, sorted and deduplicated.
    pub fn input_schema(&self) -> Vec<String> {
        match self {
            Node::Request(n) => n.input_schema(),
            Node::Delay(n) => n.input_schema(),
            Node::Debug(n) => n.input_schema(),
        }
    }

    /// Output names this node promises to produce.
    pub fn output_schema(&self) -> Vec<String> {
        match self {
            Node::Request(n) => n.output_schema(),
            Node::Delay(n) => n.output_schema(),
            Node::Debug(_) => Vec::new(),
        }
    }

    pub fn assertions(&self) -> &[CompositeAssertion] {
        match self {
            Node::Request(n) => &n.assertions,
            Node::Delay(_) | Node::Debug(_) => &[],
        }
    }

    pub fn outputs(&self) -> &[Output] {
        match self {
            Node::Request(n) => &n.outputs,
            Node::Delay(_) | Node::Debug(_) => &[],
        }
    }

    pub fn as_request(&self) -> Option<&RequestNode> {
        match self {
            Node::Request(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_delay(&self) -> Option<&DelayNode> {
        match self {
            Node::Delay(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_debug(&self) -> Option<&DebugNode> {
        match self {
            Node::Debug(n) => Some(n),
            _ => None,
        }
    }

    /// # Panics
    ///
    /// Panics if the node is not a request node.
    pub fn expect_request(&self) -> &RequestNode {
        match self {
            Node::Request(n) => n,
            other => panic!("expected request node, got {} node '{}'", other.node_type(), other.id()),
        }
    }

    /// # Panics
    ///
    /// Panics if the node is not a delay node.
    pub fn expect_delay(&self) -> &DelayNode {
        match self {
            Node::Delay(n) => n,
            other => panic!("expected delay node, got {} node '{}'", other.node_type(), other.id()),
        }
    }

    /// # Panics
    ///
    /// Panics if the node is not a debug node.
    pub fn expect_debug(&self) -> &DebugNode {
        match self {
            Node::Debug(n) => n,
            other => panic!("expected debug node, got {} node '{}'", other.node_type(), other.id()),
        }
    }
}

impl From<RequestNode> for Node {
    fn from(n: RequestNode) -> Self {
        Node::Request(n)
    }
}

impl From<DelayNode> for Node {
    fn from(n: DelayNode) -> Self {
        Node::Delay(n)
    }
}

impl From<DebugNode> for Node {
    fn from(n: DebugNode) -> Self {
        Node::Debug(n)
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedNode {
    Request(RequestNode),
    Delay(DelayNode),
    Debug(DebugNode),
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = Value::deserialize(deserializer)?;
        hoist_from_data(&mut raw);
        let tagged = TaggedNode::deserialize(raw).map_err(D::Error::custom)?;
        Ok(match tagged {
            TaggedNode::Request(n) => Node::Request(n),
            TaggedNode::Delay(n) => Node::Delay(n),
            TaggedNode::Debug(n) => Node::Debug(n),
        })
    }
}

/// Moves `assertions`/`outputs` nested under `data` up to the node root when the
/// root does not already carry them.
pub(crate) fn hoist_from_data(raw: &mut Value) {
    let Some(obj) = raw.as_object_mut() else {
        return;
    };
    for key in ["assertions", "outputs"] {
        if obj.contains_key(key) {
            continue;
        }
        let nested = obj
            .get_mut("data")
            .and_then(Value::as_object_mut)
            .and_then(|data| data.remove(key));
        if let Some(nested) = nested {
            obj.insert(key.to_string(), nested);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn hoists_nested_outputs_when_root_is_empty() {
        let mut raw = json!({
            "id": "a",
            "type": "request",
            "data": {"url": "http://x", "outputs": [{"name": "id", "extractor": {"type": "body"}}]}
        });
        hoist_from_data(&mut raw);
        assert!(raw["outputs"].is_array());
        assert!(raw["data"].get("outputs").is_none());
    }

    #[test]
    fn root_fields_win_over_nested() {
        let mut raw = json!({
            "id": "a",
            "type": "request",
            "assertions": [],
            "data": {"assertions": [{"extractorType": "body"}]}
        });
        hoist_from_data(&mut raw);
        assert_eq!(raw["assertions"], json!([]));
    }

    #[test]
    fn unknown_node_type_is_rejected() {
        let err = serde_json::from_value::<Node>(json!({"id": "x", "type": "sleep", "data": {}}));
        assert!(err.is_err());
    }
}
