//! Node box sizing, edge routing and viewport fitting.

use crate::model::{
    BezierPath, Bounds, DiagramLayout, LayoutEdge, LayoutNode, LayoutPoint, TextLine, Viewport,
};
use crate::text::{TextMeasurer, TextStyle, wrap_text};
use crate::{Error, Result};
use irflow_core::{FlowState, Node, NodeKind};

pub const STEP_WIDTH: f64 = 360.0;
pub const DECISION_WIDTH: f64 = 380.0;
pub const NODE_PADDING: f64 = 12.0;
pub const NODE_BORDER: f64 = 1.0;
pub const NODE_RADIUS: f64 = 16.0;

const TITLE_FONT_SIZE: f64 = 12.0;
const TITLE_LINE_HEIGHT: f64 = 1.2;
const TITLE_MARGIN_BOTTOM: f64 = 4.0;
const BULLET_FONT_SIZE: f64 = 12.0;
const BULLET_LINE_HEIGHT: f64 = 1.3;
const BULLET_INDENT: f64 = 18.0;

/// Bezier curvature used when the target sits above the source.
const EDGE_CURVATURE: f64 = 0.25;

pub fn node_width(kind: NodeKind) -> f64 {
    match kind {
        NodeKind::Step => STEP_WIDTH,
        NodeKind::Decision => DECISION_WIDTH,
    }
}

/// Baseline offset inside a line box of height `line_height`.
fn baseline(top: f64, line_height: f64, font_size: f64) -> f64 {
    top + (line_height - font_size) / 2.0 + font_size * 0.8
}

pub fn layout_node(node: &Node, measurer: &dyn TextMeasurer) -> LayoutNode {
    let width = node_width(node.kind);
    let inset = NODE_PADDING + NODE_BORDER;
    let inner_width = width - inset * 2.0;

    let mut lines = Vec::new();
    let mut cursor = inset;

    let title_style = TextStyle::sized(TITLE_FONT_SIZE).bold();
    let title_lh = TITLE_FONT_SIZE * TITLE_LINE_HEIGHT;
    for text in wrap_text(&node.content.title, inner_width, &title_style, measurer) {
        lines.push(TextLine {
            text,
            x: width / 2.0,
            y: baseline(cursor, title_lh, TITLE_FONT_SIZE),
            font_size: TITLE_FONT_SIZE,
            bold: true,
            bullet: false,
        });
        cursor += title_lh;
    }
    cursor += TITLE_MARGIN_BOTTOM;

    let bullet_style = TextStyle::sized(BULLET_FONT_SIZE);
    let bullet_lh = BULLET_FONT_SIZE * BULLET_LINE_HEIGHT;
    for item in &node.content.bullets {
        let wrapped = wrap_text(item, inner_width - BULLET_INDENT, &bullet_style, measurer);
        for (i, text) in wrapped.into_iter().enumerate() {
            lines.push(TextLine {
                text,
                x: inset + BULLET_INDENT,
                y: baseline(cursor, bullet_lh, BULLET_FONT_SIZE),
                font_size: BULLET_FONT_SIZE,
                bold: false,
                bullet: i == 0,
            });
            cursor += bullet_lh;
        }
    }

    LayoutNode {
        id: node.id.clone(),
        kind: node.kind,
        x: node.position.x,
        y: node.position.y,
        width,
        height: cursor + inset,
        selected: node.selected,
        lines,
    }
}

fn control_offset(distance: f64) -> f64 {
    if distance >= 0.0 {
        0.5 * distance
    } else {
        EDGE_CURVATURE * 25.0 * (-distance).sqrt()
    }
}

/// Bottom-to-top bezier between two handles.
pub fn bezier_between(start: LayoutPoint, end: LayoutPoint) -> BezierPath {
    let offset = control_offset(end.y - start.y);
    BezierPath {
        control1: LayoutPoint {
            x: start.x,
            y: start.y + offset,
        },
        control2: LayoutPoint {
            x: end.x,
            y: end.y - offset,
        },
        start,
        end,
    }
}

pub fn layout_flow(state: &FlowState, measurer: &dyn TextMeasurer) -> Result<DiagramLayout> {
    let nodes: Vec<LayoutNode> = state
        .nodes()
        .iter()
        .map(|n| layout_node(n, measurer))
        .collect();

    let find = |edge: &str, id: &str| {
        nodes
            .iter()
            .find(|n| n.id == id)
            .ok_or_else(|| Error::UnknownNode {
                edge: edge.to_string(),
                node: id.to_string(),
            })
    };

    let mut edges = Vec::with_capacity(state.edges().len());
    for e in state.edges() {
        let source = find(&e.id, &e.source)?;
        let target = find(&e.id, &e.target)?;
        edges.push(LayoutEdge {
            id: e.id.clone(),
            source: e.source.clone(),
            target: e.target.clone(),
            path: bezier_between(source.bottom_handle(), target.top_handle()),
            marker_end: e.marker_end,
            selected: e.selected,
        });
    }

    let bounds = nodes
        .iter()
        .map(LayoutNode::bounds)
        .reduce(|a, b| a.union(&b));

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        "laid out workflow"
    );
    Ok(DiagramLayout {
        nodes,
        edges,
        bounds,
    })
}

/// Centers `bounds` in a `width` × `height` screen, leaving `padding` (a fraction of the
/// bounds) around it, with the zoom clamped to `[min_zoom, max_zoom]`.
///
/// The zoom range must be finite, positive and ordered.
pub fn fit_view(
    bounds: &Bounds,
    width: f64,
    height: f64,
    padding: f64,
    min_zoom: f64,
    max_zoom: f64,
) -> Result<Viewport> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !(positive(min_zoom) && positive(max_zoom) && min_zoom <= max_zoom) {
        return Err(Error::InvalidZoomRange {
            min: min_zoom,
            max: max_zoom,
        });
    }

    let bw = bounds.width().max(1.0);
    let bh = bounds.height().max(1.0);
    let x_zoom = width / (bw * (1.0 + padding));
    let y_zoom = height / (bh * (1.0 + padding));
    let zoom = x_zoom.min(y_zoom).clamp(min_zoom, max_zoom);

    let center_x = bounds.min_x + bw / 2.0;
    let center_y = bounds.min_y + bh / 2.0;
    Ok(Viewport {
        x: width / 2.0 - center_x * zoom,
        y: height / 2.0 - center_y * zoom,
        zoom,
    })
}
