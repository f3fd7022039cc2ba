#![forbid(unsafe_code)]

//! Headless renderer for the workflow flowchart.
//!
//! [`render_view`] turns a [`irflow_core::FlowState`] into a [`Region`]: a fixed-size SVG area
//! with the dot-grid background, the nodes and edges fit into the viewport, and the minimap
//! and controls overlays. Export snapshots that region as-is.

pub mod layout;
pub mod model;
pub mod overlay;
pub mod region;
pub mod svg;
pub mod text;
pub mod view;

pub use layout::{fit_view, layout_flow};
pub use model::{Bounds, DiagramLayout, Viewport};
pub use region::{Region, sanitize_svg_id};
pub use text::{DeterministicTextMeasurer, TextMeasurer};
pub use view::{ViewOptions, render_layout, render_view};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("edge {edge} references unknown node `{node}`")]
    UnknownNode { edge: String, node: String },
    #[error("invalid viewport size: {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
    #[error("invalid zoom range: [{min}, {max}]")]
    InvalidZoomRange { min: f64, max: f64 },
    #[error("invalid fixed viewport: translate({x}, {y}) scale({zoom})")]
    InvalidFixedViewport { x: f64, y: f64, zoom: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
