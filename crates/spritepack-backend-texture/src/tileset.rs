//! Tile grid slicing.
//!
//! A grid asset is cut into equally sized tiles. Tile `(col, row)` starts at
//! `(col * (tile_width + padding), row * (tile_height + padding))`; partial
//! tiles at the right and bottom edges are discarded.
//!
//! Tiles are stored column-major: all rows of column 0 first, then column 1.
//! Frame ranges from companion tables are enumerated in the same order.

use image::{imageops, RgbaImage};
use spritepack_spec::naming::{index_width, tile_name};
use spritepack_spec::GridSpec;

use crate::sprite::Sprite;

/// The tiles cut from one grid asset.
#[derive(Debug, Clone)]
pub struct TileGrid {
    /// Base name shared by every tile.
    pub base: String,
    /// Geometry the grid was cut with.
    pub grid: GridSpec,
    columns: u32,
    rows: u32,
    tiles: Vec<Sprite>,
}

impl TileGrid {
    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of tiles in the grid.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Position of tile `(col, row)` in column-major order, if it exists.
    pub fn index_of(&self, col: u32, row: u32) -> Option<usize> {
        if col < self.columns && row < self.rows {
            Some(col as usize * self.rows as usize + row as usize)
        } else {
            None
        }
    }

    /// Tile at `(col, row)`.
    pub fn tile(&self, col: u32, row: u32) -> Option<&Sprite> {
        self.index_of(col, row).map(|index| &self.tiles[index])
    }

    /// All tiles in column-major order.
    pub fn tiles(&self) -> &[Sprite] {
        &self.tiles
    }

    pub fn into_tiles(self) -> Vec<Sprite> {
        self.tiles
    }
}

/// Cuts `image` into tiles named `<base>__<row>x<col>`.
pub fn slice_tileset(base: &str, image: &RgbaImage, grid: GridSpec) -> TileGrid {
    let (columns, rows) = grid.grid_dimensions(image.width(), image.height());
    let row_width = index_width(rows);
    let col_width = index_width(columns);

    let mut tiles = Vec::with_capacity(columns as usize * rows as usize);
    for col in 0..columns {
        for row in 0..rows {
            let x = col * grid.stride_x();
            let y = row * grid.stride_y();
            let pixels = imageops::crop_imm(image, x, y, grid.tile_width, grid.tile_height).to_image();
            tiles.push(Sprite::new(
                tile_name(base, row, col, row_width, col_width),
                pixels,
            ));
        }
    }

    TileGrid {
        base: base.to_string(),
        grid,
        columns,
        rows,
        tiles,
    }
}
