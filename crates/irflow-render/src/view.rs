use crate::layout::{fit_view, layout_flow};
use crate::model::{DiagramLayout, Viewport};
use crate::overlay::{write_background, write_controls, write_minimap};
use crate::region::{Region, sanitize_svg_id};
use crate::svg::{fmt, render_edge, render_node, write_marker_defs};
use crate::text::TextMeasurer;
use crate::{Error, Result};
use irflow_core::FlowState;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

pub const DEFAULT_TITLE: &str = "IR Imaging & Spectroscopy — Visual Workflow";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewOptions {
    /// Root id of the region; also prefixes marker and pattern ids.
    pub region_id: String,
    pub width: f64,
    pub height: f64,
    /// Extra room around the diagram when fitting, as a fraction of its size.
    pub fit_padding: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Fixed pan/zoom. When unset the diagram is fit into the viewport.
    pub viewport: Option<Viewport>,
    pub show_background: bool,
    pub show_minimap: bool,
    pub show_controls: bool,
    pub background: Option<String>,
    pub title: Option<String>,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            region_id: "ir-workflow".to_string(),
            width: 1280.0,
            height: 960.0,
            fit_padding: 0.2,
            min_zoom: 0.1,
            max_zoom: 2.0,
            viewport: None,
            show_background: true,
            show_minimap: true,
            show_controls: true,
            background: Some("#ffffff".to_string()),
            title: Some(DEFAULT_TITLE.to_string()),
        }
    }
}

impl ViewOptions {
    fn check(&self) -> Result<()> {
        let size_ok = |v: f64| v.is_finite() && v > 0.0;
        if !size_ok(self.width) || !size_ok(self.height) {
            return Err(Error::InvalidViewport {
                width: self.width,
                height: self.height,
            });
        }
        if !(size_ok(self.min_zoom) && size_ok(self.max_zoom) && self.min_zoom <= self.max_zoom) {
            return Err(Error::InvalidZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if let Some(vp) = self.viewport {
            if !(vp.x.is_finite() && vp.y.is_finite() && size_ok(vp.zoom)) {
                return Err(Error::InvalidFixedViewport {
                    x: vp.x,
                    y: vp.y,
                    zoom: vp.zoom,
                });
            }
        }
        Ok(())
    }

    /// The viewport used for `layout`: the fixed one if set, otherwise a fit.
    pub fn resolve_viewport(&self, layout: &DiagramLayout) -> Result<Viewport> {
        self.check()?;
        if let Some(vp) = self.viewport {
            return Ok(vp);
        }
        match &layout.bounds {
            Some(b) => fit_view(
                b,
                self.width,
                self.height,
                self.fit_padding,
                self.min_zoom,
                self.max_zoom,
            ),
            None => Ok(Viewport::default()),
        }
    }
}

/// Lays out `state` and renders it into a mounted region.
pub fn render_view(
    state: &FlowState,
    options: &ViewOptions,
    measurer: &dyn TextMeasurer,
) -> Result<Region> {
    options.check()?;
    let layout = layout_flow(state, measurer)?;
    render_layout(&layout, options)
}

pub fn render_layout(layout: &DiagramLayout, options: &ViewOptions) -> Result<Region> {
    let vp = options.resolve_viewport(layout)?;
    let prefix = sanitize_svg_id(&options.region_id);
    let (w, h) = (options.width, options.height);

    let mut body = String::new();
    body.push_str("<defs>");
    write_marker_defs(&mut body, &prefix);
    body.push_str("</defs>");

    if options.show_background {
        write_background(&mut body, &prefix, &vp, w, h);
    }

    let _ = write!(
        &mut body,
        r#"<g class="viewport" transform="translate({}, {}) scale({})">"#,
        fmt(vp.x),
        fmt(vp.y),
        fmt(vp.zoom)
    );
    body.push_str(r#"<g class="edges">"#);
    for e in &layout.edges {
        render_edge(&mut body, e, &prefix);
    }
    body.push_str("</g>");
    body.push_str(r#"<g class="nodes">"#);
    for n in &layout.nodes {
        render_node(&mut body, n);
    }
    body.push_str("</g></g>");

    if options.show_minimap {
        write_minimap(&mut body, &layout.nodes, layout.bounds.as_ref(), &vp, w, h);
    }
    if options.show_controls {
        write_controls(&mut body, h);
    }

    tracing::debug!(
        region = %prefix,
        zoom = vp.zoom,
        bytes = body.len(),
        "rendered view"
    );

    let mut region = Region::new(&prefix, w, h, body);
    if let Some(bg) = &options.background {
        region = region.with_background(bg.clone());
    }
    if let Some(title) = &options.title {
        region = region.with_title(title.clone());
    }
    Ok(region)
}
