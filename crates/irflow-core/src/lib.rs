#![forbid(unsafe_code)]

//! Workflow graph model for the IR imaging & spectroscopy flowchart.
//!
//! The crate owns three things:
//! - the node/edge data model ([`model`]),
//! - the fixed laboratory procedure that seeds the diagram ([`seed`]),
//! - the mutable view state fed by explicit change handlers ([`state`]).
//!
//! Rendering lives in `irflow-render`; image export in `irflow`.

pub mod error;
pub mod graph;
pub mod model;
pub mod seed;
pub mod state;

pub use error::{Endpoint, Error, Result};
pub use model::{Edge, MarkerKind, Node, NodeContent, NodeKind, Position, Workflow};
pub use seed::ir_workflow;
pub use state::{EdgeChange, FlowState, NodeChange};
