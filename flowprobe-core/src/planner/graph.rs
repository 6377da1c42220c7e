use std::collections::{HashMap, VecDeque};

use crate::error::{EdgeSide, GraphError};
use crate::types::Flow;

/// Static shape of a flow: node indices in declaration order, direct successors
/// and incoming-edge counts.
#[derive(Debug, Clone)]
pub struct ExecutionGraph {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    successors: Vec<Vec<usize>>,
    predecessors: Vec<Vec<usize>>,
    in_degree: Vec<usize>,
}

/// Nodes grouped by dependency depth. Nodes within one level do not depend on
/// each other; `stranded` lists nodes caught in or behind a cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Levels {
    pub levels: Vec<Vec<String>>,
    pub stranded: Vec<String>,
}

impl ExecutionGraph {
    pub fn build(flow: &Flow) -> Result<Self, GraphError> {
        let mut ids = Vec::with_capacity(flow.nodes.len());
        let mut index = HashMap::with_capacity(flow.nodes.len());
        for node in &flow.nodes {
            let id = node.id().to_string();
            if index.insert(id.clone(), ids.len()).is_some() {
                return Err(GraphError::DuplicateNodeId(id));
            }
            ids.push(id);
        }

        let mut successors = vec![Vec::new(); ids.len()];
        let mut predecessors = vec![Vec::new(); ids.len()];
        let mut in_degree = vec![0usize; ids.len()];
        for edge in &flow.edges {
            let lookup = |node_id: &str, side: EdgeSide| {
                index.get(node_id).copied().ok_or_else(|| GraphError::DanglingEdge {
                    edge_id: edge.id.clone(),
                    side,
                    node_id: node_id.to_string(),
                })
            };
            let source = lookup(&edge.source, EdgeSide::Source)?;
            let target = lookup(&edge.target, EdgeSide::Target)?;
            successors[source].push(target);
            predecessors[target].push(source);
            in_degree[target] += 1;
        }

        Ok(Self {
            ids,
            index,
            successors,
            predecessors,
            in_degree,
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn node_ids(&self) -> &[String] {
        &self.ids
    }

    pub fn id(&self, idx: usize) -> &str {
        &self.ids[idx]
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn successors(&self, idx: usize) -> &[usize] {
        &self.successors[idx]
    }

    pub fn predecessors(&self, idx: usize) -> &[usize] {
        &self.predecessors[idx]
    }

    /// Incoming edge count per node, indexed like [`node_ids`](Self::node_ids).
    pub fn in_degrees(&self) -> &[usize] {
        &self.in_degree
    }

    pub fn levels(&self) -> Levels {
        let mut indeg = self.in_degree.clone();
        let mut level = vec![0usize; self.len()];
        let mut done = vec![false; self.len()];
        let mut q: VecDeque<usize> = (0..self.len()).filter(|&i| indeg[i] == 0).collect();

        let mut order = Vec::with_capacity(self.len());
        while let Some(n) = q.pop_front() {
            order.push(n);
            done[n] = true;
            for &m in &self.successors[n] {
                level[m] = level[m].max(level[n] + 1);
                indeg[m] -= 1;
                if indeg[m] == 0 {
                    q.push_back(m);
                }
            }
        }

        let depth = order.iter().map(|&n| level[n] + 1).max().unwrap_or(0);
        let mut levels = vec![Vec::<String>::new(); depth];
        let mut sorted = order;
        sorted.sort_unstable();
        for n in sorted {
            levels[level[n]].push(self.ids[n].clone());
        }

        let stranded = (0..self.len())
            .filter(|&i| !done[i])
            .map(|i| self.ids[i].clone())
            .collect();

        Levels { levels, stranded }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DebugNode, Edge};

    fn flow(nodes: &[&str], edges: &[(&str, &str)]) -> Flow {
        let mut f = Flow::new("t");
        for id in nodes {
            f = f.with_node(DebugNode::new(*id));
        }
        for (i, (s, t)) in edges.iter().enumerate() {
            f = f.with_edge(Edge::new(format!("e{i}"), *s, *t));
        }
        f
    }

    #[test]
    fn counts_incoming_edges() {
        let g = ExecutionGraph::build(&flow(&["a", "b", "c"], &[("a", "c"), ("b", "c")])).unwrap();
        assert_eq!(g.in_degrees(), &[0, 0, 2]);
        assert_eq!(g.successors(0), &[2]);
        assert_eq!(g.predecessors(2), &[0, 1]);
    }

    #[test]
    fn reports_dangling_side() {
        let err = ExecutionGraph::build(&flow(&["a"], &[("a", "ghost")])).unwrap_err();
        assert_eq!(
            err,
            GraphError::DanglingEdge {
                edge_id: "e0".to_string(),
                side: EdgeSide::Target,
                node_id: "ghost".to_string(),
            }
        );
        let err = ExecutionGraph::build(&flow(&["a"], &[("nobody", "a")])).unwrap_err();
        assert!(matches!(err, GraphError::DanglingEdge { side: EdgeSide::Source, .. }));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = ExecutionGraph::build(&flow(&["a", "a"], &[])).unwrap_err();
        assert_eq!(err, GraphError::DuplicateNodeId("a".to_string()));
    }

    #[test]
    fn levels_follow_longest_path() {
        let g = ExecutionGraph::build(&flow(
            &["login", "profile", "orders", "report"],
            &[("login", "profile"), ("login", "orders"), ("profile", "report"), ("orders", "report")],
        ))
        .unwrap();
        let l = g.levels();
        assert_eq!(
            l.levels,
            vec![
                vec!["login".to_string()],
                vec!["profile".to_string(), "orders".to_string()],
                vec!["report".to_string()],
            ]
        );
        assert!(l.stranded.is_empty());
    }

    #[test]
    fn cycles_are_stranded() {
        let g = ExecutionGraph::build(&flow(&["a", "b", "c"], &[("b", "c"), ("c", "b")])).unwrap();
        let l = g.levels();
        assert_eq!(l.levels, vec![vec!["a".to_string()]]);
        assert_eq!(l.stranded, vec!["b".to_string(), "c".to_string()]);
    }
}
