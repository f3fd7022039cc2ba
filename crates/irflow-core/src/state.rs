//! Mutable view state for one mounted diagram.
//!
//! The seed [`Workflow`] is immutable; a renderer instance owns a [`FlowState`] built from it and
//! mutates that copy only through [`FlowState::apply_node_changes`] and
//! [`FlowState::apply_edge_changes`].

use crate::model::{Edge, Node, Position, Workflow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeChange {
    Position { id: String, position: Position },
    Select { id: String, selected: bool },
    Remove { id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdgeChange {
    Select { id: String, selected: bool },
    Remove { id: String },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowState {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl FlowState {
    pub fn new(seed: &Workflow) -> Self {
        Self {
            nodes: seed.nodes().to_vec(),
            edges: seed.edges().to_vec(),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Applies node changes in order. Changes naming an unknown node are skipped.
    ///
    /// Removing a node also drops every edge attached to it, so edges never dangle.
    pub fn apply_node_changes(&mut self, changes: &[NodeChange]) {
        for change in changes {
            match change {
                NodeChange::Position { id, position } => {
                    if let Some(n) = self.nodes.iter_mut().find(|n| &n.id == id) {
                        n.position = *position;
                    }
                }
                NodeChange::Select { id, selected } => {
                    if let Some(n) = self.nodes.iter_mut().find(|n| &n.id == id) {
                        n.selected = *selected;
                    }
                }
                NodeChange::Remove { id } => {
                    let before = self.nodes.len();
                    self.nodes.retain(|n| &n.id != id);
                    if self.nodes.len() == before {
                        continue;
                    }
                    let edges_before = self.edges.len();
                    self.edges.retain(|e| !e.touches(id));
                    tracing::debug!(
                        node = %id,
                        dropped_edges = edges_before - self.edges.len(),
                        "removed node"
                    );
                }
            }
        }
    }

    pub fn apply_edge_changes(&mut self, changes: &[EdgeChange]) {
        for change in changes {
            match change {
                EdgeChange::Select { id, selected } => {
                    if let Some(e) = self.edges.iter_mut().find(|e| &e.id == id) {
                        e.selected = *selected;
                    }
                }
                EdgeChange::Remove { id } => {
                    self.edges.retain(|e| &e.id != id);
                }
            }
        }
    }

    /// Snapshot of the current state as a plain workflow (e.g. for JSON output).
    pub fn to_workflow(&self) -> Workflow {
        Workflow::new(self.nodes.clone(), self.edges.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::ir_workflow;

    #[test]
    fn position_change_moves_only_the_named_node() {
        let seed = ir_workflow();
        let mut state = FlowState::new(&seed);
        state.apply_node_changes(&[NodeChange::Position {
            id: "s3".into(),
            position: Position::new(10.0, 20.0),
        }]);
        assert_eq!(state.node("s3").unwrap().position, Position::new(10.0, 20.0));
        assert_eq!(state.node("s2").unwrap().position, Position::new(160.0, 280.0));
        // The seed itself is untouched.
        assert_eq!(seed.node("s3").unwrap().position, Position::new(160.0, 420.0));
    }

    #[test]
    fn removing_a_node_drops_its_edges() {
        let mut state = FlowState::new(&ir_workflow());
        state.apply_node_changes(&[NodeChange::Remove { id: "s6".into() }]);
        assert!(state.node("s6").is_none());
        let ids: Vec<&str> = state.edges().iter().map(|e| e.id.as_str()).collect();
        assert!(!ids.contains(&"e8"));
        assert!(!ids.contains(&"e9"));
        assert!(!ids.contains(&"e10"));
        assert_eq!(state.edges().len(), 9);
        state.to_workflow().validate().unwrap();
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let seed = ir_workflow();
        let mut state = FlowState::new(&seed);
        state.apply_node_changes(&[
            NodeChange::Remove { id: "nope".into() },
            NodeChange::Select {
                id: "nope".into(),
                selected: true,
            },
        ]);
        state.apply_edge_changes(&[EdgeChange::Remove { id: "nope".into() }]);
        assert_eq!(state.to_workflow(), seed);
    }

    #[test]
    fn edge_changes_select_and_remove() {
        let mut state = FlowState::new(&ir_workflow());
        state.apply_edge_changes(&[
            EdgeChange::Select {
                id: "e1".into(),
                selected: true,
            },
            EdgeChange::Remove { id: "e12".into() },
        ]);
        assert!(state.edges()[0].selected);
        assert_eq!(state.edges().len(), 11);
    }

    #[test]
    fn changes_deserialize_from_tagged_json() {
        let change: NodeChange = serde_json::from_str(
            r#"{"type":"position","id":"s1","position":{"x":1.0,"y":2.0}}"#,
        )
        .unwrap();
        assert_eq!(
            change,
            NodeChange::Position {
                id: "s1".into(),
                position: Position::new(1.0, 2.0),
            }
        );
    }
}
