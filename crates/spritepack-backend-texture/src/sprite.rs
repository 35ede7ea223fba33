//! Sprites: the unit of packing.

use image::RgbaImage;

/// A named raster ready to be packed.
///
/// The raster is owned here and nowhere else; animation clips refer to the
/// sprite by name.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    /// Unique logical name.
    pub name: String,
    /// RGBA pixels.
    pub image: RgbaImage,
    /// Whether the sprite is referenced by at least one animation clip.
    pub animated: bool,
}

impl Sprite {
    /// Creates a non-animated sprite.
    pub fn new(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: name.into(),
            image,
            animated: false,
        }
    }

    /// Marks the sprite as an animation frame.
    pub fn animated(mut self) -> Self {
        self.animated = true;
        self
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
