use std::collections::HashSet;

use crate::types::Flow;
use crate::validate::validator::Validator;

pub(crate) fn validate_edges(v: &mut Validator, flow: &Flow) {
    let node_ids: HashSet<&str> = flow.nodes.iter().map(|n| n.id()).collect();
    let mut edge_ids = HashSet::new();

    for (i, e) in flow.edges.iter().enumerate() {
        let path = format!("edges[{i}]");
        if e.id.is_empty() {
            v.push(format!("{path}.id"), "must not be empty");
        } else if !edge_ids.insert(e.id.as_str()) {
            v.push(format!("{path}.id"), format!("duplicate edge id '{}'", e.id));
        }
        if !node_ids.contains(e.source.as_str()) {
            v.push(format!("{path}.source"), format!("source node '{}' not found", e.source));
        }
        if !node_ids.contains(e.target.as_str()) {
            v.push(format!("{path}.target"), format!("target node '{}' not found", e.target));
        }
        if e.source == e.target {
            v.push(path, "edge must not connect a node to itself");
        }
    }
}
