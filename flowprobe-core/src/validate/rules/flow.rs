use std::collections::{BTreeSet, HashMap};

use crate::planner::ExecutionGraph;
use crate::types::{Flow, InputRef, Node};
use crate::validate::rules::{edges, node};
use crate::validate::validator::{Validator, NODE_ID_RE};

pub(crate) fn validate_flow(v: &mut Validator, flow: &Flow) {
    if flow.nodes.is_empty() {
        v.push("nodes", "must contain at least one node");
        return;
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (i, n) in flow.nodes.iter().enumerate() {
        let path = format!("nodes[{i}].id");
        let id = n.id();
        if id.is_empty() {
            v.push(path, "must not be empty");
            continue;
        }
        if !NODE_ID_RE.is_match(id) {
            v.push(&path, "must match ^[A-Za-z0-9_\\-]+$ (a '.' would break input references)");
        }
        if let Some(first) = seen.insert(id, i) {
            v.push(path, format!("duplicate node id '{id}' (first used by nodes[{first}])"));
        }
    }

    for (i, n) in flow.nodes.iter().enumerate() {
        node::validate_node(v, n, &format!("nodes[{i}]"));
    }

    edges::validate_edges(v, flow);

    // Cycle and reference checks only make sense on a well-formed graph.
    let Ok(graph) = ExecutionGraph::build(flow) else {
        return;
    };
    let stranded: BTreeSet<String> = graph.levels().stranded.into_iter().collect();
    for (i, n) in flow.nodes.iter().enumerate() {
        if stranded.contains(n.id()) {
            v.push(format!("nodes[{i}]"), "is part of a dependency cycle or depends on one");
        }
        validate_references(v, flow, &graph, i, n);
    }
}

fn validate_references(v: &mut Validator, flow: &Flow, graph: &ExecutionGraph, idx: usize, n: &Node) {
    let upstream = ancestors(graph, idx);
    for reference in n.input_schema() {
        let r = InputRef::parse(&reference);
        if r.is_initial_input() {
            continue;
        }
        let path = format!("nodes[{idx}].inputs.{reference}");
        let Some(src_idx) = graph.index_of(r.source) else {
            v.push(path, format!("references unknown node '{}'", r.source));
            continue;
        };
        if !upstream.contains(&src_idx) {
            v.push(
                &path,
                format!("node '{}' is not upstream of '{}' (add an edge)", r.source, n.id()),
            );
        }
        let declared = flow.nodes[src_idx].output_schema();
        if !declared.iter().any(|o| o == r.key) {
            v.push(path, format!("node '{}' does not declare output '{}'", r.source, r.key));
        }
    }
}

fn ancestors(graph: &ExecutionGraph, idx: usize) -> BTreeSet<usize> {
    let mut out = BTreeSet::new();
    let mut stack: Vec<usize> = graph.predecessors(idx).to_vec();
    while let Some(p) = stack.pop() {
        if out.insert(p) {
            stack.extend_from_slice(graph.predecessors(p));
        }
    }
    out
}
