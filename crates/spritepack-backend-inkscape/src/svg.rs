//! Layer discovery in Inkscape SVG documents.
//!
//! Only the direct children of the root element are considered. A child is a
//! layer when it is a `<g>` carrying `inkscape:groupmode="layer"`. Nested
//! layers (sublayers) are exported as part of their parent.

use std::sync::OnceLock;

use regex::Regex;

/// One exportable layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VectorLayer {
    /// Element id passed to `--export-id`.
    pub id: String,
    /// Human-readable label; falls back to the id.
    pub label: String,
}

fn comment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<!--.*?-->|<!\[CDATA\[.*?\]\]>").expect("valid regex"))
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"<(/?)([A-Za-z_][\w:.-]*)((?:[^>"']|"[^"]*"|'[^']*')*?)(/?)>"#)
            .expect("valid regex")
    })
}

fn attribute_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"([A-Za-z_][\w:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
    })
}

/// Lists the top-level layers of an SVG document in document order.
///
/// Layers without an `id` cannot be exported and are ignored.
pub fn scan_layers(svg: &str) -> Vec<VectorLayer> {
    let text = comment_pattern().replace_all(svg, "");
    let mut layers = Vec::new();
    let mut depth = 0usize;

    for tag in tag_pattern().captures_iter(&text) {
        let closing = !tag[1].is_empty();
        let self_closing = !tag[4].is_empty();

        if closing {
            depth = depth.saturating_sub(1);
            continue;
        }

        if depth == 1 && local_name(&tag[2]) == "g" {
            if let Some(layer) = layer_from_attributes(&tag[3]) {
                layers.push(layer);
            }
        }

        if !self_closing {
            depth += 1;
        }
    }

    layers
}

fn layer_from_attributes(attributes: &str) -> Option<VectorLayer> {
    let mut id = None;
    let mut label = None;
    let mut is_layer = false;

    for attr in attribute_pattern().captures_iter(attributes) {
        let value = attr
            .get(2)
            .or_else(|| attr.get(3))
            .map_or("", |m| m.as_str());
        match &attr[1] {
            "id" => id = Some(unescape(value)),
            name if name.ends_with(":groupmode") => is_layer = value == "layer",
            name if name.ends_with(":label") => label = Some(unescape(value)),
            _ => {}
        }
    }

    if !is_layer {
        return None;
    }
    let id = id?;
    Some(VectorLayer {
        label: label.unwrap_or_else(|| id.clone()),
        id,
    })
}

fn local_name(name: &str) -> &str {
    name.rsplit(':').next().unwrap_or(name)
}

fn unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
