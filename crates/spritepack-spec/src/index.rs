//! Generic JSON atlas index.
//!
//! One index document is written per packed sheet, in the widely supported
//! "JSON (array)" texture-atlas layout:
//!
//! ```json
//! {
//!     "frames": [
//!         {
//!             "filename": "hero__0x0",
//!             "frame": { "h": 2, "w": 4, "x": 1, "y": 1 },
//!             "rotated": false,
//!             "sourceSize": { "h": 2, "w": 4 },
//!             "spriteSourceSize": { "h": 2, "w": 4, "x": 0, "y": 0 },
//!             "trimmed": false
//!         }
//!     ],
//!     "meta": { "app": "SpritePack", "format": "RGBA8888", ... }
//! }
//! ```
//!
//! Struct fields are declared in key order, so the serialized document has
//! sorted keys.

use serde::{Deserialize, Serialize};

/// Pixel format reported in the index metadata.
pub const INDEX_PIXEL_FORMAT: &str = "RGBA8888";

/// A pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRect {
    pub h: u32,
    pub w: u32,
    pub x: u32,
    pub y: u32,
}

impl IndexRect {
    /// Creates a rectangle.
    pub fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { h, w, x, y }
    }

    /// Returns true if the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &IndexRect) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}

/// A pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSize {
    pub h: u32,
    pub w: u32,
}

/// One sprite's entry in the index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexFrame {
    /// Sprite name.
    pub filename: String,
    /// Region of the sheet holding the sprite's pixels.
    pub frame: IndexRect,
    /// Always false: sprites are never rotated.
    pub rotated: bool,
    /// Original sprite size.
    pub source_size: IndexSize,
    /// Region of the original sprite that was kept (the whole sprite).
    pub sprite_source_size: IndexRect,
    /// Always false: sprites are never trimmed.
    pub trimmed: bool,
}

/// Sheet-level metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    /// Generator name.
    pub app: String,
    /// Pixel format of the sheet image.
    pub format: String,
    /// File name of the sheet image.
    pub image: String,
    /// Sheet scale (always 1).
    pub scale: u32,
    /// Sheet size in pixels.
    pub size: IndexSize,
    /// Generator version.
    pub version: String,
}

/// The index document of one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtlasIndex {
    /// Frames in placement order.
    pub frames: Vec<IndexFrame>,
    /// Sheet metadata.
    pub meta: IndexMeta,
}

impl AtlasIndex {
    /// Creates an empty index for a square sheet.
    pub fn new(
        app: impl Into<String>,
        version: impl Into<String>,
        image: impl Into<String>,
        side: u32,
    ) -> Self {
        Self {
            frames: Vec::new(),
            meta: IndexMeta {
                app: app.into(),
                format: INDEX_PIXEL_FORMAT.to_string(),
                image: image.into(),
                scale: 1,
                size: IndexSize { h: side, w: side },
                version: version.into(),
            },
        }
    }

    /// Adds an untrimmed, unrotated frame at `(x, y)`.
    pub fn push_frame(&mut self, name: impl Into<String>, x: u32, y: u32, w: u32, h: u32) {
        self.frames.push(IndexFrame {
            filename: name.into(),
            frame: IndexRect::new(x, y, w, h),
            rotated: false,
            source_size: IndexSize { h, w },
            sprite_source_size: IndexRect::new(0, 0, w, h),
            trimmed: false,
        });
    }

    /// Serializes the index with 4-space indentation.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Parses an index document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_index_layout() {
        let mut index = AtlasIndex::new("SpritePack", "0.1.0", "atlas.png", 32);
        index.push_frame("hero__0x0", 1, 1, 4, 2);

        let json: serde_json::Value = serde_json::from_str(&index.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "frames": [{
                    "filename": "hero__0x0",
                    "frame": { "x": 1, "y": 1, "w": 4, "h": 2 },
                    "rotated": false,
                    "trimmed": false,
                    "spriteSourceSize": { "x": 0, "y": 0, "w": 4, "h": 2 },
                    "sourceSize": { "w": 4, "h": 2 }
                }],
                "meta": {
                    "app": "SpritePack",
                    "version": "0.1.0",
                    "image": "atlas.png",
                    "format": "RGBA8888",
                    "size": { "w": 32, "h": 32 },
                    "scale": 1
                }
            })
        );
    }

    #[test]
    fn test_keys_are_sorted_and_indented() {
        let mut index = AtlasIndex::new("SpritePack", "0.1.0", "atlas.png", 32);
        index.push_frame("icon", 1, 1, 8, 8);
        let text = index.to_json().unwrap();

        assert!(text.starts_with("{\n    \"frames\": ["));
        let source = text.find("\"sourceSize\"").unwrap();
        let sprite_source = text.find("\"spriteSourceSize\"").unwrap();
        let trimmed = text.find("\"trimmed\"").unwrap();
        assert!(source < sprite_source && sprite_source < trimmed);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut index = AtlasIndex::new("SpritePack", "0.1.0", "atlas_1.png", 64);
        index.push_frame("a", 1, 1, 10, 10);
        index.push_frame("b", 13, 1, 10, 10);
        let parsed = AtlasIndex::from_json(&index.to_json().unwrap()).unwrap();
        assert_eq!(parsed, index);
    }

    #[test]
    fn test_rect_overlap() {
        let a = IndexRect::new(0, 0, 4, 4);
        assert!(a.overlaps(&IndexRect::new(3, 3, 2, 2)));
        assert!(!a.overlaps(&IndexRect::new(4, 0, 2, 2)));
        assert!(!a.overlaps(&IndexRect::new(0, 4, 2, 2)));
    }
}
