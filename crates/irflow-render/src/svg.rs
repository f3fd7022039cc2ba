//! SVG fragment writers for nodes and edges.

use crate::layout::{NODE_BORDER, NODE_RADIUS};
use crate::model::{BezierPath, LayoutEdge, LayoutNode};
use irflow_core::{MarkerKind, NodeKind};
use std::fmt::Write as _;

pub const EDGE_STROKE: &str = "#b1b1b7";
pub const EDGE_STROKE_SELECTED: &str = "#555";
const NODE_TEXT: &str = "#222";
const NODE_SELECTED_OUTLINE: &str = "#1a192b";
const HANDLE_FILL: &str = "#1a192b";

struct NodePalette {
    fill: &'static str,
    stroke: &'static str,
}

fn palette(kind: NodeKind) -> NodePalette {
    match kind {
        NodeKind::Step => NodePalette {
            fill: "#ffffff",
            stroke: "#e5e7eb",
        },
        // Amber for decisions.
        NodeKind::Decision => NodePalette {
            fill: "#fff7ed",
            stroke: "#fed7aa",
        },
    }
}

pub fn marker_id(prefix: &str, kind: MarkerKind, selected: bool) -> String {
    let state = if selected { "selected" } else { "default" };
    format!("{prefix}-marker-{}-{state}", kind.as_str())
}

pub fn write_marker_defs(out: &mut String, prefix: &str) {
    for kind in [MarkerKind::Arrow, MarkerKind::ArrowClosed] {
        for selected in [false, true] {
            let color = if selected {
                EDGE_STROKE_SELECTED
            } else {
                EDGE_STROKE
            };
            let (points, fill) = match kind {
                MarkerKind::Arrow => ("-5,-4 0,0 -5,4", "none"),
                MarkerKind::ArrowClosed => ("-5,-4 0,0 -5,4 -5,-4", color),
            };
            let _ = write!(
                out,
                r#"<marker id="{}" class="edge-marker" viewBox="-10 -10 20 20" markerWidth="12.5" markerHeight="12.5" orient="auto" refX="0" refY="0"><polyline stroke="{color}" stroke-linecap="round" stroke-linejoin="round" stroke-width="1" fill="{fill}" points="{points}"/></marker>"#,
                marker_id(prefix, kind, selected)
            );
        }
    }
}

pub fn path_data(p: &BezierPath) -> String {
    format!(
        "M{},{} C{},{} {},{} {},{}",
        fmt(p.start.x),
        fmt(p.start.y),
        fmt(p.control1.x),
        fmt(p.control1.y),
        fmt(p.control2.x),
        fmt(p.control2.y),
        fmt(p.end.x),
        fmt(p.end.y)
    )
}

pub fn render_edge(out: &mut String, e: &LayoutEdge, prefix: &str) {
    let stroke = if e.selected {
        EDGE_STROKE_SELECTED
    } else {
        EDGE_STROKE
    };
    let _ = write!(
        out,
        r#"<path class="edge" data-id="{}" data-source="{}" data-target="{}" d="{}" fill="none" stroke="{stroke}" stroke-width="1" marker-end="url(#{})"/>"#,
        escape_xml(&e.id),
        escape_xml(&e.source),
        escape_xml(&e.target),
        path_data(&e.path),
        marker_id(prefix, e.marker_end, e.selected)
    );
}

pub fn render_node(out: &mut String, n: &LayoutNode) {
    let p = palette(n.kind);
    let kind = match n.kind {
        NodeKind::Step => "step",
        NodeKind::Decision => "decision",
    };
    let _ = write!(
        out,
        r#"<g class="node node-{kind}" data-id="{}" transform="translate({}, {})">"#,
        escape_xml(&n.id),
        fmt(n.x),
        fmt(n.y)
    );

    // Soft drop shadow: the same box shifted down one pixel.
    let _ = write!(
        out,
        r##"<rect x="0" y="1" width="{w}" height="{h}" rx="{r}" ry="{r}" fill="#000" fill-opacity="0.06"/>"##,
        w = fmt(n.width),
        h = fmt(n.height),
        r = fmt(NODE_RADIUS)
    );
    let stroke = if n.selected {
        NODE_SELECTED_OUTLINE
    } else {
        p.stroke
    };
    let _ = write!(
        out,
        r#"<rect class="node-box" x="0" y="0" width="{w}" height="{h}" rx="{r}" ry="{r}" fill="{}" stroke="{stroke}" stroke-width="{}"/>"#,
        p.fill,
        fmt(NODE_BORDER),
        w = fmt(n.width),
        h = fmt(n.height),
        r = fmt(NODE_RADIUS)
    );

    for line in &n.lines {
        if line.bullet {
            let _ = write!(
                out,
                r#"<circle cx="{}" cy="{}" r="2" fill="{NODE_TEXT}"/>"#,
                fmt(line.x - 9.0),
                fmt(line.y - line.font_size * 0.3)
            );
        }
        let anchor = if line.bold { "middle" } else { "start" };
        let weight = if line.bold { "700" } else { "400" };
        let _ = write!(
            out,
            r#"<text x="{}" y="{}" fill="{NODE_TEXT}" style="font-family: sans-serif; font-size: {}px; font-weight: {weight}; text-anchor: {anchor};">{}</text>"#,
            fmt(line.x),
            fmt(line.y),
            fmt(line.font_size),
            escape_xml(&line.text)
        );
    }

    // Connection handles: target on top, source at the bottom.
    for cy in [0.0, n.height] {
        let _ = write!(
            out,
            r##"<circle class="handle" cx="{}" cy="{}" r="3" fill="{HANDLE_FILL}" stroke="#fff" stroke-width="1"/>"##,
            fmt(n.width / 2.0),
            fmt(cy)
        );
    }
    out.push_str("</g>");
}

pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn fmt(v: f64) -> String {
    // Round-trippable decimal form without `-0` or tiny float noise.
    if !v.is_finite() {
        return "0".to_string();
    }

    let mut v = if v.abs() < 1e-9 { 0.0 } else { v };
    let nearest = v.round();
    if (v - nearest).abs() < 1e-6 {
        v = nearest;
    } else {
        v = (v * 1000.0).round() / 1000.0;
    }
    let s = v.to_string();
    if s == "-0" { "0".to_string() } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_drops_noise_and_negative_zero() {
        assert_eq!(fmt(-0.0), "0");
        assert_eq!(fmt(12.0000000001), "12");
        assert_eq!(fmt(0.123456), "0.123");
        assert_eq!(fmt(f64::NAN), "0");
    }

    #[test]
    fn escape_xml_covers_attribute_quotes() {
        assert_eq!(escape_xml(r#"a&b<"c">'"#), "a&amp;b&lt;&quot;c&quot;&gt;&#39;");
    }

    #[test]
    fn marker_ids_are_scoped_by_prefix_and_state() {
        assert_eq!(
            marker_id("view", MarkerKind::ArrowClosed, false),
            "view-marker-arrowclosed-default"
        );
        let mut defs = String::new();
        write_marker_defs(&mut defs, "view");
        assert_eq!(defs.matches("<marker ").count(), 4);
    }
}
