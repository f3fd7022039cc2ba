//! Screen-space decorations drawn around the flow: dot grid, minimap and zoom controls.

use crate::model::{Bounds, LayoutNode, Viewport};
use crate::svg::fmt;
use std::fmt::Write as _;

pub const BACKGROUND_GAP: f64 = 20.0;
pub const BACKGROUND_DOT_SIZE: f64 = 1.0;
pub const BACKGROUND_DOT_COLOR: &str = "#91919a";

pub const MINIMAP_WIDTH: f64 = 200.0;
pub const MINIMAP_HEIGHT: f64 = 150.0;
const MINIMAP_OFFSET_SCALE: f64 = 5.0;
const MINIMAP_NODE_FILL: &str = "#e2e2e2";
const MINIMAP_MASK_FILL: &str = "rgb(240, 240, 240)";
const MINIMAP_MASK_OPACITY: f64 = 0.6;

/// Distance between overlay panels and the region's edge.
pub const PANEL_MARGIN: f64 = 15.0;
const CONTROL_BUTTON_SIZE: f64 = 26.0;

/// Dot grid that pans and scales with the viewport.
pub fn write_background(out: &mut String, prefix: &str, vp: &Viewport, width: f64, height: f64) {
    let gap = (BACKGROUND_GAP * vp.zoom).max(1.0);
    let radius = (BACKGROUND_DOT_SIZE * vp.zoom / 2.0).max(0.5);
    let _ = write!(
        out,
        r#"<defs><pattern id="{prefix}-bg" x="{}" y="{}" width="{g}" height="{g}" patternUnits="userSpaceOnUse"><circle cx="{r}" cy="{r}" r="{r}" fill="{BACKGROUND_DOT_COLOR}"/></pattern></defs>"#,
        fmt(vp.x.rem_euclid(gap)),
        fmt(vp.y.rem_euclid(gap)),
        g = fmt(gap),
        r = fmt(radius)
    );
    let _ = write!(
        out,
        r#"<rect class="background" x="0" y="0" width="{}" height="{}" fill="url(#{prefix}-bg)"/>"#,
        fmt(width),
        fmt(height)
    );
}

/// Flow-space rectangle the minimap shows: the panel aspect ratio plus a small margin.
pub fn minimap_view_box(nodes: Option<&Bounds>, visible: &Bounds) -> Bounds {
    let b = nodes.map_or(*visible, |n| n.union(visible));
    let scaled_w = b.width() / MINIMAP_WIDTH;
    let scaled_h = b.height() / MINIMAP_HEIGHT;
    let view_scale = scaled_w.max(scaled_h);
    let view_w = view_scale * MINIMAP_WIDTH;
    let view_h = view_scale * MINIMAP_HEIGHT;
    let offset = MINIMAP_OFFSET_SCALE * view_scale;
    let x = b.min_x - (view_w - b.width()) / 2.0 - offset;
    let y = b.min_y - (view_h - b.height()) / 2.0 - offset;
    Bounds::from_rect(x, y, view_w + offset * 2.0, view_h + offset * 2.0)
}

/// Bottom-right overview of every node plus the currently visible area.
pub fn write_minimap(
    out: &mut String,
    nodes: &[LayoutNode],
    node_bounds: Option<&Bounds>,
    vp: &Viewport,
    width: f64,
    height: f64,
) {
    let visible = vp.visible_bounds(width, height);
    let vb = minimap_view_box(node_bounds, &visible);
    let left = width - PANEL_MARGIN - MINIMAP_WIDTH;
    let top = height - PANEL_MARGIN - MINIMAP_HEIGHT;

    let _ = write!(
        out,
        r##"<g class="minimap"><rect x="{}" y="{}" width="{}" height="{}" fill="#fff" stroke="#e2e2e2" stroke-width="1"/>"##,
        fmt(left),
        fmt(top),
        fmt(MINIMAP_WIDTH),
        fmt(MINIMAP_HEIGHT)
    );
    let _ = write!(
        out,
        r#"<svg x="{}" y="{}" width="{}" height="{}" viewBox="{} {} {} {}">"#,
        fmt(left),
        fmt(top),
        fmt(MINIMAP_WIDTH),
        fmt(MINIMAP_HEIGHT),
        fmt(vb.min_x),
        fmt(vb.min_y),
        fmt(vb.width()),
        fmt(vb.height())
    );
    for n in nodes {
        let _ = write!(
            out,
            r#"<rect class="minimap-node" data-id="{}" x="{}" y="{}" width="{}" height="{}" rx="5" ry="5" fill="{MINIMAP_NODE_FILL}"/>"#,
            crate::svg::escape_xml(&n.id),
            fmt(n.x),
            fmt(n.y),
            fmt(n.width),
            fmt(n.height)
        );
    }

    // Everything outside the visible area is washed out.
    let pad = MINIMAP_OFFSET_SCALE * (vb.width() / MINIMAP_WIDTH);
    let _ = write!(
        out,
        r#"<path class="minimap-mask" d="M{},{}h{}v{}h{}z M{},{}h{}v{}h{}z" fill="{MINIMAP_MASK_FILL}" fill-opacity="{}" fill-rule="evenodd"/>"#,
        fmt(vb.min_x - pad),
        fmt(vb.min_y - pad),
        fmt(vb.width() + pad * 2.0),
        fmt(vb.height() + pad * 2.0),
        fmt(-vb.width() - pad * 2.0),
        fmt(visible.min_x),
        fmt(visible.min_y),
        fmt(visible.width()),
        fmt(visible.height()),
        fmt(-visible.width()),
        fmt(MINIMAP_MASK_OPACITY)
    );
    out.push_str("</svg></g>");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlIcon {
    ZoomIn,
    ZoomOut,
    FitView,
    Lock,
}

fn icon_path(icon: ControlIcon) -> &'static str {
    // Drawn in a 12×12 box centered on the button.
    match icon {
        ControlIcon::ZoomIn => "M6,1v10M1,6h10",
        ControlIcon::ZoomOut => "M1,6h10",
        ControlIcon::FitView => "M1,4V1h3M8,1h3v3M11,8v3H8M4,11H1V8",
        ControlIcon::Lock => "M2,6h8v5H2zM4,6V4a2,2 0 0 1 4,0v2",
    }
}

/// Bottom-left stack of zoom in / zoom out / fit view / lock buttons.
pub fn write_controls(out: &mut String, height: f64) {
    let icons = [
        ControlIcon::ZoomIn,
        ControlIcon::ZoomOut,
        ControlIcon::FitView,
        ControlIcon::Lock,
    ];
    let total = CONTROL_BUTTON_SIZE * icons.len() as f64;
    let left = PANEL_MARGIN;
    let top = height - PANEL_MARGIN - total;

    let _ = write!(
        out,
        r##"<g class="controls"><rect x="{}" y="{}" width="{}" height="{}" fill="#000" fill-opacity="0.08" rx="2" ry="2"/>"##,
        fmt(left),
        fmt(top + 1.0),
        fmt(CONTROL_BUTTON_SIZE),
        fmt(total)
    );
    for (i, icon) in icons.into_iter().enumerate() {
        let y = top + CONTROL_BUTTON_SIZE * i as f64;
        let _ = write!(
            out,
            r##"<rect class="control-button" x="{}" y="{}" width="{s}" height="{s}" fill="#fefefe" stroke="#eee" stroke-width="1"/><path d="{}" transform="translate({}, {})" fill="none" stroke="#000" stroke-width="1.5" stroke-linecap="round"/>"##,
            fmt(left),
            fmt(y),
            icon_path(icon),
            fmt(left + (CONTROL_BUTTON_SIZE - 12.0) / 2.0),
            fmt(y + (CONTROL_BUTTON_SIZE - 12.0) / 2.0),
            s = fmt(CONTROL_BUTTON_SIZE)
        );
    }
    out.push_str("</g>");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimap_view_box_is_centered_and_covers_both_areas() {
        let nodes = Bounds::from_rect(0.0, 0.0, 400.0, 100.0);
        let visible = Bounds::from_rect(-50.0, -50.0, 100.0, 100.0);
        let vb = minimap_view_box(Some(&nodes), &visible);
        assert_eq!(vb.min_x + vb.width() / 2.0, 175.0);
        assert_eq!(vb.min_y + vb.height() / 2.0, 25.0);
        assert!(vb.min_x <= -50.0 && vb.max_x >= 400.0);
        assert!(vb.min_y <= -50.0 && vb.max_y >= 100.0);
    }

    #[test]
    fn controls_draw_four_buttons() {
        let mut out = String::new();
        write_controls(&mut out, 600.0);
        assert_eq!(out.matches(r#"class="control-button""#).count(), 4);
    }
}
