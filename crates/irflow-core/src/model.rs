use crate::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Presentation tag only. Steps and decisions behave the same; decisions are drawn wider and
/// in amber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    #[default]
    Step,
    Decision,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeContent {
    pub title: String,
    #[serde(default)]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub position: Position,
    #[serde(default)]
    pub kind: NodeKind,
    pub content: NodeContent,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl Node {
    pub fn new(
        id: impl Into<String>,
        position: Position,
        kind: NodeKind,
        content: NodeContent,
    ) -> Self {
        Self {
            id: id.into(),
            position,
            kind,
            content,
            selected: false,
        }
    }

    pub fn is_decision(&self) -> bool {
        self.kind == NodeKind::Decision
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerKind {
    #[serde(rename = "arrow")]
    Arrow,
    #[default]
    #[serde(rename = "arrowclosed")]
    ArrowClosed,
}

impl MarkerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerKind::Arrow => "arrow",
            MarkerKind::ArrowClosed => "arrowclosed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub marker_end: MarkerKind,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub selected: bool,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            marker_end: MarkerKind::ArrowClosed,
            selected: false,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// An ordered node list plus an ordered edge list.
///
/// Construction does not validate; call [`Workflow::validate`] (or
/// [`Workflow::validated`]) before handing untrusted data to a renderer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Workflow {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Workflow {
    pub fn new(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        Self { nodes, edges }
    }

    /// Builds a workflow and checks ids, edge references and acyclicity.
    pub fn validated(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self> {
        let wf = Self::new(nodes, edges);
        wf.validate()?;
        Ok(wf)
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

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }

    pub fn validate(&self) -> Result<()> {
        crate::graph::validate(&self.nodes, &self.edges)
    }

    /// Node ids in dependency order. Ties keep declaration order.
    pub fn topological_order(&self) -> Result<Vec<String>> {
        crate::graph::topological_order(&self.nodes, &self.edges)
    }
}
