use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Label carried by an edge. Unlisted labels are kept verbatim; an empty or
/// missing label is `Normal`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EdgeType {
    #[default]
    Normal,
    Success,
    Failure,
    Other(String),
}

impl EdgeType {
    pub fn as_str(&self) -> &str {
        match self {
            EdgeType::Normal => "normal",
            EdgeType::Success => "success",
            EdgeType::Failure => "failure",
            EdgeType::Other(s) => s,
        }
    }
}

impl From<&str> for EdgeType {
    fn from(label: &str) -> Self {
        match label {
            "" | "normal" | "default" => EdgeType::Normal,
            "success" => EdgeType::Success,
            "failure" => EdgeType::Failure,
            other => EdgeType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EdgeType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EdgeType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = Option::<String>::deserialize(deserializer)?;
        Ok(label.as_deref().map(EdgeType::from).unwrap_or_default())
    }
}

/// A dependency link between two nodes. The edge type is recorded but does not
/// change scheduling.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, rename = "type")]
    pub edge_type: EdgeType,
}

impl Edge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            edge_type: EdgeType::Normal,
        }
    }

    pub fn with_type(mut self, edge_type: EdgeType) -> Self {
        self.edge_type = edge_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_and_unlisted_labels_still_parse() {
        let edge: Edge =
            serde_json::from_value(json!({"id": "e", "source": "a", "target": "b", "type": ""}))
                .unwrap();
        assert_eq!(edge.edge_type, EdgeType::Normal);

        let edge: Edge = serde_json::from_value(
            json!({"id": "e", "source": "a", "target": "b", "type": "conditional"}),
        )
        .unwrap();
        assert_eq!(edge.edge_type, EdgeType::Other("conditional".into()));
        assert_eq!(serde_json::to_value(&edge).unwrap()["type"], "conditional");

        let edge: Edge =
            serde_json::from_value(json!({"id": "e", "source": "a", "target": "b", "type": null}))
                .unwrap();
        assert_eq!(edge.edge_type, EdgeType::Normal);
    }

    #[test]
    fn default_alias_maps_to_normal() {
        assert_eq!(EdgeType::from("default"), EdgeType::Normal);
        assert_eq!(EdgeType::from("failure").to_string(), "failure");
    }
}
