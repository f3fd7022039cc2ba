use irflow_core::{MarkerKind, NodeKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// Baseline position relative to the node's top-left corner.
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub bold: bool,
    /// True for the first wrapped line of a bullet (the one carrying the disc marker).
    #[serde(default)]
    pub bullet: bool,
}

/// A node box in flow coordinates; `x`/`y` is the top-left corner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    pub kind: NodeKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub selected: bool,
    pub lines: Vec<TextLine>,
}

impl LayoutNode {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_rect(self.x, self.y, self.width, self.height)
    }

    /// Target handle: top center.
    pub fn top_handle(&self) -> LayoutPoint {
        LayoutPoint {
            x: self.x + self.width / 2.0,
            y: self.y,
        }
    }

    /// Source handle: bottom center.
    pub fn bottom_handle(&self) -> LayoutPoint {
        LayoutPoint {
            x: self.x + self.width / 2.0,
            y: self.y + self.height,
        }
    }
}

/// Cubic bezier from `start` to `end` via two control points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BezierPath {
    pub start: LayoutPoint,
    pub control1: LayoutPoint,
    pub control2: LayoutPoint,
    pub end: LayoutPoint,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub path: BezierPath,
    pub marker_end: MarkerKind,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramLayout {
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    /// Union of all node boxes; `None` for an empty diagram.
    pub bounds: Option<Bounds>,
}

/// Pan/zoom state: flow point `p` lands on screen at `p * zoom + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// The part of the flow plane visible through a `width` × `height` screen.
    pub fn visible_bounds(&self, width: f64, height: f64) -> Bounds {
        Bounds::from_rect(
            -self.x / self.zoom,
            -self.y / self.zoom,
            width / self.zoom,
            height / self.zoom,
        )
    }
}
