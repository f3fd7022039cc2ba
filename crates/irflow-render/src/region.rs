use crate::svg::{escape_xml, fmt};
use std::fmt::Write as _;

/// A mounted, fixed-size visual area: the handle that image export snapshots.
///
/// The body is an SVG fragment in the region's own pixel coordinates (origin top-left).
/// Internal ids in the body are prefixed with [`Region::id`] so several regions can be inlined
/// into one document without collisions.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub background: Option<String>,
    pub title: Option<String>,
    body: String,
}

impl Region {
    pub fn new(id: &str, width: f64, height: f64, body: String) -> Self {
        Self {
            id: sanitize_svg_id(id),
            width,
            height,
            background: None,
            title: None,
            body,
        }
    }

    /// A throwaway element: `text` in a 16px sans-serif line at the top-left, like a bare block
    /// element with a text node.
    pub fn labeled(id: &str, text: &str, width: f64, height: f64) -> Self {
        let body = format!(
            r##"<text x="0" y="15" fill="#000" style="font-family: sans-serif; font-size: 16px;">{}</text>"##,
            escape_xml(text)
        );
        Self::new(id, width, height, body)
    }

    pub fn with_background(mut self, color: impl Into<String>) -> Self {
        self.background = Some(color.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Serializes the region as a standalone SVG document.
    pub fn to_svg_document(&self) -> String {
        let w = fmt(self.width.max(1.0));
        let h = fmt(self.height.max(1.0));
        let mut out = String::with_capacity(self.body.len() + 256);
        let _ = write!(
            &mut out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" id="{}" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            escape_xml(&self.id)
        );
        if let Some(title) = &self.title {
            let _ = write!(&mut out, "<title>{}</title>", escape_xml(title));
        }
        if let Some(bg) = &self.background {
            let _ = write!(
                &mut out,
                r#"<rect width="{w}" height="{h}" fill="{}"/>"#,
                escape_xml(bg)
            );
        }
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }
}

/// Converts an arbitrary string into a conservative SVG `id` token.
///
/// - trims whitespace
/// - replaces unsupported characters with `-`
/// - ensures the id starts with an ASCII letter by prefixing `r-` when needed
pub fn sanitize_svg_id(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "r-untitled".to_string();
    }

    let mut out = String::with_capacity(raw.len() + 4);
    for ch in raw.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_';
        out.push(if ok { ch } else { '-' });
    }

    if !out.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        out.insert_str(0, "r-");
    }
    while out.contains("--") {
        out = out.replace("--", "-");
    }
    let out = out.trim_matches('-');
    if out.is_empty() || out == "r" {
        return "r-untitled".to_string();
    }
    out.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_svg_id_handles_common_inputs() {
        assert_eq!(sanitize_svg_id("ir workflow"), "ir-workflow");
        assert_eq!(sanitize_svg_id("  "), "r-untitled");
        assert_eq!(sanitize_svg_id("123"), "r-123");
        assert_eq!(sanitize_svg_id("a//b"), "a-b");
    }

    #[test]
    fn labeled_region_document_is_sized_and_escaped() {
        let r = Region::labeled("png test", "a<b", 120.0, 60.0).with_background("#eee");
        let doc = r.to_svg_document();
        assert!(doc.contains(r#"width="120" height="60" viewBox="0 0 120 60""#));
        assert!(doc.contains(r##"fill="#eee""##));
        assert!(doc.contains("a&lt;b"));
        assert!(doc.contains(r#"id="png-test""#));
    }
}
