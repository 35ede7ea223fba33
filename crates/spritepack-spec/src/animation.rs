//! Animation clips and frame sets.
//!
//! Clips reference sprites by their unique logical name. The sprite's raster
//! is owned once, by the sprite itself; a clip only records which sprites to
//! play and in what order.

use serde::Serialize;

/// Name of the clip synthesized from an inline `fps` suffix.
pub const DEFAULT_CLIP_NAME: &str = "default";

/// An ordered, named sequence of sprite frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnimationClip {
    /// Clip name.
    pub name: String,
    /// Sprite names in playback order.
    pub frames: Vec<String>,
    /// Playback rate in frames per second.
    pub fps: u32,
    /// Whether playback wraps around after the last frame.
    pub looping: bool,
}

impl AnimationClip {
    /// Creates an empty clip.
    pub fn new(name: impl Into<String>, fps: u32, looping: bool) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
            fps,
            looping,
        }
    }

    /// Appends a frame.
    pub fn with_frame(mut self, sprite: impl Into<String>) -> Self {
        self.frames.push(sprite.into());
        self
    }
}

/// All clips originating from one tileset asset.
///
/// The set's name is the tileset's base name and becomes the engine
/// resource name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpriteFrameSet {
    /// Tileset base name.
    pub name: String,
    /// Clips in declaration order.
    pub clips: Vec<AnimationClip>,
}

impl SpriteFrameSet {
    /// Creates an empty frame set.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clips: Vec::new(),
        }
    }

    /// Iterates over every frame reference, clip by clip.
    ///
    /// A sprite shared by several clips is yielded once per reference.
    pub fn frame_refs(&self) -> impl Iterator<Item = &str> {
        self.clips
            .iter()
            .flat_map(|clip| clip.frames.iter().map(String::as_str))
    }

    /// Total number of frame references across all clips.
    pub fn frame_count(&self) -> usize {
        self.clips.iter().map(|clip| clip.frames.len()).sum()
    }
}
