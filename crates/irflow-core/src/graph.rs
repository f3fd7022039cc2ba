//! Invariant checks over node/edge lists: unique ids, edge references, acyclicity.

use crate::model::{Edge, Node};
use crate::{Endpoint, Error, Result};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

pub fn validate(nodes: &[Node], edges: &[Edge]) -> Result<()> {
    topological_order(nodes, edges).map(|_| ())
}

fn check_references(nodes: &[Node], edges: &[Edge]) -> Result<()> {
    let mut node_ids: FxHashSet<&str> = FxHashSet::default();
    for n in nodes {
        if !node_ids.insert(n.id.as_str()) {
            return Err(Error::DuplicateNodeId { id: n.id.clone() });
        }
    }

    let mut edge_ids: FxHashSet<&str> = FxHashSet::default();
    for e in edges {
        if !edge_ids.insert(e.id.as_str()) {
            return Err(Error::DuplicateEdgeId { id: e.id.clone() });
        }
        for (endpoint, node) in [(Endpoint::Source, &e.source), (Endpoint::Target, &e.target)] {
            if !node_ids.contains(node.as_str()) {
                return Err(Error::DanglingEdge {
                    edge: e.id.clone(),
                    endpoint,
                    node: node.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Kahn's algorithm. Among ready nodes the one declared first wins, so the seed order is
/// preserved wherever the edges allow it.
pub fn topological_order(nodes: &[Node], edges: &[Edge]) -> Result<Vec<String>> {
    check_references(nodes, edges)?;

    let index: IndexMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut in_degree = vec![0usize; nodes.len()];
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for e in edges {
        let (Some(&v), Some(&w)) = (index.get(e.source.as_str()), index.get(e.target.as_str()))
        else {
            continue;
        };
        successors[v].push(w);
        in_degree[w] += 1;
    }

    let mut ready: BTreeSet<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());
    while let Some(v) = ready.pop_first() {
        order.push(nodes[v].id.clone());
        for &w in &successors[v] {
            in_degree[w] -= 1;
            if in_degree[w] == 0 {
                ready.insert(w);
            }
        }
    }

    if order.len() == nodes.len() {
        return Ok(order);
    }

    let cycle = find_cycles(nodes, edges)
        .into_iter()
        .next()
        .unwrap_or_default();
    Err(Error::Cycle { nodes: cycle })
}

/// Strongly connected components (Tarjan) with more than one member, plus self-loops.
///
/// Edges that reference unknown nodes are ignored.
pub fn find_cycles(nodes: &[Node], edges: &[Edge]) -> Vec<Vec<String>> {
    let index: FxHashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    let mut successors: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for e in edges {
        let (Some(&v), Some(&w)) = (index.get(e.source.as_str()), index.get(e.target.as_str()))
        else {
            continue;
        };
        successors[v].push(w);
    }

    let mut t = Tarjan {
        successors: &successors,
        next_index: 0,
        indices: vec![None; nodes.len()],
        lowlink: vec![0; nodes.len()],
        on_stack: vec![false; nodes.len()],
        stack: Vec::new(),
        sccs: Vec::new(),
    };
    for root in 0..nodes.len() {
        if t.indices[root].is_none() {
            t.strongconnect(root);
        }
    }
    t.sccs
        .into_iter()
        .map(|scc| scc.into_iter().map(|i| nodes[i].id.clone()).collect())
        .collect()
}

struct Tarjan<'a> {
    successors: &'a [Vec<usize>],
    next_index: usize,
    indices: Vec<Option<usize>>,
    lowlink: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    sccs: Vec<Vec<usize>>,
}

impl Tarjan<'_> {
    fn visit(&mut self, v: usize) {
        self.indices[v] = Some(self.next_index);
        self.lowlink[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack[v] = true;
    }

    /// Depth-first walk from `root`. Call frames live on the heap as
    /// `(node, next successor position)` so long chains cannot exhaust the thread stack.
    fn strongconnect(&mut self, root: usize) {
        let successors = self.successors;
        self.visit(root);
        let mut frames: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = frames.last_mut() {
            let (v, next) = *frame;
            if let Some(&w) = successors[v].get(next) {
                frame.1 += 1;
                match self.indices[w] {
                    None => {
                        self.visit(w);
                        frames.push((w, 0));
                    }
                    Some(wi) if self.on_stack[w] => {
                        self.lowlink[v] = self.lowlink[v].min(wi);
                    }
                    Some(_) => {}
                }
                continue;
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                self.lowlink[parent] = self.lowlink[parent].min(self.lowlink[v]);
            }
            if self.indices[v] != Some(self.lowlink[v]) {
                continue;
            }
            let mut scc = Vec::new();
            while let Some(w) = self.stack.pop() {
                self.on_stack[w] = false;
                scc.push(w);
                if w == v {
                    break;
                }
            }
            if scc.len() > 1 || successors[v].contains(&v) {
                scc.reverse();
                self.sccs.push(scc);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NodeContent, NodeKind, Position};

    fn node(id: &str) -> Node {
        Node::new(
            id,
            Position::default(),
            NodeKind::Step,
            NodeContent {
                title: id.to_string(),
                bullets: Vec::new(),
            },
        )
    }

    #[test]
    fn topological_order_keeps_declaration_order_for_ties() {
        let nodes = vec![node("a"), node("c"), node("b"), node("d")];
        let edges = vec![
            Edge::new("e1", "a", "b"),
            Edge::new("e2", "a", "c"),
            Edge::new("e3", "b", "d"),
            Edge::new("e4", "c", "d"),
        ];
        let order = topological_order(&nodes, &edges).unwrap();
        assert_eq!(order, vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn duplicate_node_id_is_rejected() {
        let nodes = vec![node("a"), node("a")];
        assert_eq!(
            validate(&nodes, &[]),
            Err(Error::DuplicateNodeId { id: "a".into() })
        );
    }

    #[test]
    fn duplicate_edge_id_is_rejected() {
        let nodes = vec![node("a"), node("b")];
        let edges = vec![Edge::new("e1", "a", "b"), Edge::new("e1", "a", "b")];
        assert_eq!(
            validate(&nodes, &edges),
            Err(Error::DuplicateEdgeId { id: "e1".into() })
        );
    }

    #[test]
    fn dangling_target_is_reported_with_endpoint() {
        let nodes = vec![node("a")];
        let edges = vec![Edge::new("e1", "a", "zz")];
        let err = validate(&nodes, &edges).unwrap_err();
        assert_eq!(
            err,
            Error::DanglingEdge {
                edge: "e1".into(),
                endpoint: Endpoint::Target,
                node: "zz".into(),
            }
        );
        assert_eq!(err.to_string(), "edge e1 references unknown target node `zz`");
    }

    #[test]
    fn back_edge_is_reported_as_cycle() {
        let nodes = vec![node("a"), node("b"), node("c")];
        let edges = vec![
            Edge::new("e1", "a", "b"),
            Edge::new("e2", "b", "c"),
            Edge::new("e3", "c", "b"),
        ];
        let Err(Error::Cycle { nodes: cycle }) = validate(&nodes, &edges) else {
            panic!("expected a cycle error");
        };
        assert_eq!(cycle, vec!["b", "c"]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let nodes = vec![node("a")];
        let edges = vec![Edge::new("e1", "a", "a")];
        assert_eq!(find_cycles(&nodes, &edges), vec![vec!["a".to_string()]]);
        assert!(validate(&nodes, &edges).is_err());
    }

    #[test]
    fn long_ring_is_reported_without_deep_recursion() {
        let n = 100_000;
        let nodes: Vec<Node> = (0..n).map(|i| node(&format!("n{i}"))).collect();
        let edges: Vec<Edge> = (0..n)
            .map(|i| Edge::new(format!("e{i}"), format!("n{i}"), format!("n{}", (i + 1) % n)))
            .collect();
        let Err(Error::Cycle { nodes: cycle }) = validate(&nodes, &edges) else {
            panic!("expected a cycle error");
        };
        assert_eq!(cycle.len(), n);
        assert_eq!(cycle[0], "n0");
        assert_eq!(cycle[n - 1], format!("n{}", n - 1));
    }
}
