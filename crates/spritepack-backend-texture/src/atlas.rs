//! Sheet composition.

use image::{imageops, Rgba, RgbaImage};

use crate::packing::PackedSheet;
use crate::png::{write_rgba_to_vec_with_hash, PngConfig, PngError};
use crate::sprite::Sprite;

/// An encoded sheet image.
#[derive(Debug, Clone)]
pub struct SheetImage {
    /// Sheet index.
    pub index: usize,
    /// Side length in pixels.
    pub side: u32,
    /// PNG-encoded sheet.
    pub png_data: Vec<u8>,
    /// BLAKE3 hash of the PNG data.
    pub hash: String,
}

/// Draws every placed sprite onto a transparent canvas.
///
/// Pixels are copied as-is, without alpha blending. Margins stay transparent.
pub fn compose_sheet(sheet: &PackedSheet, sprites: &[Sprite]) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(sheet.side, sheet.side, Rgba([0, 0, 0, 0]));
    for placement in &sheet.placements {
        let (x, y) = placement.origin();
        imageops::replace(
            &mut canvas,
            &sprites[placement.sprite].image,
            i64::from(x),
            i64::from(y),
        );
    }
    canvas
}

/// Composes and encodes one sheet.
pub fn render_sheet(
    sheet: &PackedSheet,
    sprites: &[Sprite],
    config: &PngConfig,
) -> Result<SheetImage, PngError> {
    let canvas = compose_sheet(sheet, sprites);
    let (png_data, hash) = write_rgba_to_vec_with_hash(&canvas, config)?;
    Ok(SheetImage {
        index: sheet.index,
        side: sheet.side,
        png_data,
        hash,
    })
}
