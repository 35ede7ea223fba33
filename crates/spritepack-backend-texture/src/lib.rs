//! SpritePack Raster Backend
//!
//! Everything that touches pixels: decoding source rasters, cutting tile
//! grids, binding tiles to animation clips, packing sprites onto square
//! sheets and encoding those sheets as PNG.
//!
//! # Example
//!
//! ```
//! use image::RgbaImage;
//! use spritepack_backend_texture::binder::{bind_tileset, Binding};
//! use spritepack_backend_texture::packing::PackingOrchestrator;
//! use spritepack_backend_texture::tileset::slice_tileset;
//! use spritepack_spec::GridSpec;
//!
//! let sheet = RgbaImage::new(8, 8);
//! let grid = slice_tileset("hero", &sheet, GridSpec::new(4, 2));
//! let bound = bind_tileset(grid, Binding::Unbound).unwrap();
//! assert_eq!(bound.sprites.len(), 8);
//!
//! let layout = PackingOrchestrator::new(4096).pack(&bound.sprites).unwrap();
//! assert_eq!(layout.sheets.len(), 1);
//! ```
//!
//! # Determinism
//!
//! - Tiles, clips and packing follow fixed, documented orders
//! - PNG encoding uses fixed compression and filter settings
//! - Sheet hashes are BLAKE3 over the encoded bytes

pub mod atlas;
pub mod binder;
pub mod packing;
pub mod png;
pub mod raster;
pub mod sprite;
pub mod tileset;

pub use atlas::{compose_sheet, render_sheet, SheetImage};
pub use binder::{bind_tileset, Binding, BoundTileset};
pub use packing::{
    PackLayout, PackedSheet, PackingError, PackingOrchestrator, RectPacker, ShelfPacker,
    SpritePlacement, DEFAULT_MAX_SHEET_SIDE, SPRITE_MARGIN,
};
pub use png::{PngConfig, PngError};
pub use raster::{load_rgba, RasterError};
pub use sprite::Sprite;
pub use tileset::{slice_tileset, TileGrid};
