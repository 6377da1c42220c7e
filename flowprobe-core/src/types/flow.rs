use serde_json::{Map, Value};

use crate::types::{Edge, Node};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct Flow {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(default)]
    pub version: String,

    #[serde(default, rename = "initialInputs")]
    pub initial_inputs: Map<String, Value>,

    #[serde(default)]
    pub edges: Vec<Edge>,

    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Flow {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_node(mut self, node: impl Into<Node>) -> Self {
        self.nodes.push(node.into());
        self
    }

    pub fn with_edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn with_initial_input(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.initial_inputs.insert(name.into(), value.into());
        self
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id() == id)
    }
}
