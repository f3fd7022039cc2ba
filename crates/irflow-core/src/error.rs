use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

/// Which end of an edge a reference error points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => f.write_str("source"),
            Endpoint::Target => f.write_str("target"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("duplicate node id: {id}")]
    DuplicateNodeId { id: String },

    #[error("duplicate edge id: {id}")]
    DuplicateEdgeId { id: String },

    #[error("edge {edge} references unknown {endpoint} node `{node}`")]
    DanglingEdge {
        edge: String,
        endpoint: Endpoint,
        node: String,
    },

    #[error("workflow contains a cycle through: {}", nodes.join(" -> "))]
    Cycle { nodes: Vec<String> },
}
