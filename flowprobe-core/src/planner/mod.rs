mod graph;
mod model;

pub use graph::{ExecutionGraph, Levels};
pub use model::{Plan, PlanNode};

use crate::error::GraphError;
use crate::types::Flow;

/// Static execution plan for a flow, without running anything.
pub fn plan_flow(flow: &Flow) -> Result<Plan, GraphError> {
    let graph = ExecutionGraph::build(flow)?;
    let nodes = flow
        .nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| PlanNode {
            id: node.id().to_string(),
            node_type: node.node_type(),
            depends_on: graph
                .predecessors(idx)
                .iter()
                .map(|&p| graph.id(p).to_string())
                .collect(),
            inputs: node.input_schema(),
            outputs: node.output_schema(),
        })
        .collect();

    Ok(Plan {
        flow: flow.name.clone(),
        levels: graph.levels(),
        nodes,
    })
}
