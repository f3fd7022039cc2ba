//! Region snapshots to self-describing image data URLs.

use crate::data_url::DataUrl;
use irflow_render::Region;
use std::sync::{Arc, Mutex};
use usvg::fontdb;

pub const PNG_MIME: &str = "image/png";
pub const SVG_MIME: &str = "image/svg+xml";

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("cannot encode an empty region ({width}x{height})")]
    EmptyRegion { width: f64, height: f64 },
    #[error("invalid pixel ratio: {0}")]
    InvalidPixelRatio(f32),
    #[error("failed to parse SVG: {0}")]
    SvgParse(String),
    #[error("failed to allocate {width}x{height} pixmap for raster rendering")]
    PixmapAlloc { width: u32, height: u32 },
    #[error("failed to encode PNG: {0}")]
    PngEncode(String),
    #[error("{0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, EncodeError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub pixel_ratio: f32,
    /// Fill painted under the region; overrides the region's own background.
    pub background: Option<String>,
    /// Reload cached resources (fonts) instead of reusing them.
    pub cache_bust: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            background: None,
            cache_bust: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct VectorOptions {
    /// Stamp external resource references so consumers refetch them.
    pub cache_bust: bool,
}

/// Turns a mounted region into an image.
///
/// Both operations return a `data:` URL whose MIME type names the encoding.
pub trait ImageEncoder {
    fn to_png(&self, region: &Region, options: &RasterOptions) -> Result<String>;
    fn to_svg(&self, region: &Region, options: &VectorOptions) -> Result<String>;
}

/// Pure-Rust encoder: SVG serialization for vectors, `usvg` + `resvg` + `tiny-skia` for PNG.
pub struct ResvgEncoder {
    font_family: String,
    fonts: Mutex<Option<Arc<fontdb::Database>>>,
}

impl Default for ResvgEncoder {
    fn default() -> Self {
        Self {
            // System selection varies; this is best-effort.
            font_family: "Arial".to_string(),
            fonts: Mutex::new(None),
        }
    }
}

impl ResvgEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// System fonts, loaded once and shared until a cache-busting call reloads them.
    fn font_database(&self, reload: bool) -> Arc<fontdb::Database> {
        let mut slot = match self.fonts.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let (false, Some(db)) = (reload, slot.as_ref()) {
            return Arc::clone(db);
        }
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), reload, "loaded font database");
        let db = Arc::new(db);
        *slot = Some(Arc::clone(&db));
        db
    }

    pub fn svg_to_pixmap(
        &self,
        svg: &str,
        options: &RasterOptions,
    ) -> Result<tiny_skia::Pixmap> {
        let scale = options.pixel_ratio;
        if !(scale.is_finite() && scale > 0.0) {
            return Err(EncodeError::InvalidPixelRatio(scale));
        }

        let mut opt = usvg::Options::default();
        opt.fontdb = self.font_database(options.cache_bust);
        opt.font_family = self.font_family.clone();

        let tree =
            usvg::Tree::from_str(svg, &opt).map_err(|e| EncodeError::SvgParse(e.to_string()))?;

        let size = tree.size();
        let width = (size.width() * scale).ceil().max(1.0) as u32;
        let height = (size.height() * scale).ceil().max(1.0) as u32;
        let mut pixmap =
            tiny_skia::Pixmap::new(width, height).ok_or(EncodeError::PixmapAlloc { width, height })?;

        if let Some(bg) = options.background.as_deref() {
            if let Some(color) = parse_tiny_skia_color(bg) {
                pixmap.fill(color);
            }
        }

        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );
        Ok(pixmap)
    }

    pub fn svg_to_png(&self, svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
        let pixmap = self.svg_to_pixmap(svg, options)?;
        pixmap
            .encode_png()
            .map_err(|e| EncodeError::PngEncode(e.to_string()))
    }
}

fn check_region(region: &Region) -> Result<()> {
    if region.is_empty() {
        return Err(EncodeError::EmptyRegion {
            width: region.width,
            height: region.height,
        });
    }
    Ok(())
}

impl ImageEncoder for ResvgEncoder {
    fn to_png(&self, region: &Region, options: &RasterOptions) -> Result<String> {
        check_region(region)?;
        let svg = region.to_svg_document();
        let bytes = self.svg_to_png(&svg, options)?;
        tracing::debug!(
            region = %region.id,
            pixel_ratio = options.pixel_ratio,
            bytes = bytes.len(),
            "encoded PNG"
        );
        Ok(DataUrl::new(PNG_MIME, bytes).to_string())
    }

    fn to_svg(&self, region: &Region, options: &VectorOptions) -> Result<String> {
        check_region(region)?;
        let mut svg = region.to_svg_document();
        if options.cache_bust {
            svg = cache_bust_hrefs(&svg, chrono::Utc::now().timestamp_millis());
        }
        tracing::debug!(region = %region.id, bytes = svg.len(), "encoded SVG");
        Ok(DataUrl::new(SVG_MIME, svg.into_bytes()).to_string())
    }
}

/// Appends `t=<token>` to every external `href` (fragment and `data:` references are left
/// alone).
pub fn cache_bust_hrefs(svg: &str, token: i64) -> String {
    let mut out = String::with_capacity(svg.len());
    let mut rest = svg;
    while let Some(i) = rest.find("href=\"") {
        let value_start = i + "href=\"".len();
        out.push_str(&rest[..value_start]);
        rest = &rest[value_start..];
        let Some(end) = rest.find('"') else {
            break;
        };
        let value = &rest[..end];
        out.push_str(value);
        let external = !(value.is_empty() || value.starts_with('#') || value.starts_with("data:"));
        if external {
            let sep = if value.contains('?') { "&amp;" } else { "?" };
            out.push_str(sep);
            out.push_str(&format!("t={token}"));
        }
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    let hex = s.strip_prefix('#')?;
    fn hex2(b: &[u8]) -> Option<u8> {
        let hi = (*b.first()? as char).to_digit(16)? as u8;
        let lo = (*b.get(1)? as char).to_digit(16)? as u8;
        Some((hi << 4) | lo)
    }
    fn hex1(c: u8) -> Option<u8> {
        let v = (c as char).to_digit(16)? as u8;
        Some((v << 4) | v)
    }

    let bytes = hex.as_bytes();
    let [r, g, b, a] = match bytes.len() {
        3 => [hex1(bytes[0])?, hex1(bytes[1])?, hex1(bytes[2])?, 255],
        4 => [
            hex1(bytes[0])?,
            hex1(bytes[1])?,
            hex1(bytes[2])?,
            hex1(bytes[3])?,
        ],
        6 => [
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            255,
        ],
        8 => [
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            hex2(&bytes[6..8])?,
        ],
        _ => return None,
    };
    Some(tiny_skia::Color::from_rgba8(r, g, b, a))
}
