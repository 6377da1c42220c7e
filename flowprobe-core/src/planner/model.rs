use crate::planner::Levels;
use crate::types::NodeType;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Plan {
    pub flow: String,
    #[serde(flatten)]
    pub levels: Levels,
    pub nodes: Vec<PlanNode>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct PlanNode {
    pub id: String,
    pub node_type: NodeType,
    /// Sources of incoming edges.
    pub depends_on: Vec<String>,
    /// Input references resolved at run time.
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}
