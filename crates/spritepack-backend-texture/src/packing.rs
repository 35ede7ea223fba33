//! Adaptive multi-sheet atlas packing.
//!
//! The orchestrator searches for the smallest square sheet (and then the
//! smallest number of sheets) into which a [`RectPacker`] can place every
//! sprite. Each sprite is packed with a 1 pixel transparent border on every
//! side so neighbours never bleed into each other when sampled.
//!
//! Search order for a sheet side `s` and sheet count `n`:
//!
//! 1. Start with `s = min(32, max_side)` and `n = 1`.
//! 2. While packing fails: double `s` if `2s <= max_side`, else raise `s`
//!    to `max_side`, else add a sheet.
//!
//! Sprites never rotate.

use spritepack_spec::{BackendError, ErrorKind};
use thiserror::Error;

use crate::sprite::Sprite;

/// Total border added to each sprite dimension.
pub const SPRITE_MARGIN: u32 = 2;

/// Offset from a margined box to the sprite's pixels.
pub const MARGIN_INSET: u32 = SPRITE_MARGIN / 2;

/// First sheet side tried by the search.
pub const MIN_SHEET_SIDE: u32 = 32;

/// Default upper bound on the sheet side.
pub const DEFAULT_MAX_SHEET_SIDE: u32 = 4096;

/// Errors that can occur while planning sheets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackingError {
    /// A single sprite cannot fit an empty sheet of the maximum side.
    #[error(
        "Sprite '{name}' ({width}x{height}) plus its {margin}px margin does not fit in a {max_side}x{max_side} sheet"
    )]
    PackingInfeasible {
        name: String,
        width: u32,
        height: u32,
        margin: u32,
        max_side: u32,
    },

    /// Nothing to pack.
    #[error("No sprites to pack")]
    NoSprites,

    /// The packer failed even with one sheet per sprite.
    #[error("Packer could not place {count} sprites on {count} sheets of {side}x{side}")]
    PackerExhausted { count: usize, side: u32 },
}

impl BackendError for PackingError {
    fn code(&self) -> &'static str {
        match self {
            PackingError::PackingInfeasible { .. } => "PACK_001",
            PackingError::NoSprites => "PACK_002",
            PackingError::PackerExhausted { .. } => "PACK_003",
        }
    }

    fn category(&self) -> &'static str {
        "packing"
    }

    fn kind(&self) -> ErrorKind {
        match self {
            PackingError::NoSprites => ErrorKind::EmptyInput,
            PackingError::PackingInfeasible { .. } | PackingError::PackerExhausted { .. } => {
                ErrorKind::PackingInfeasible
            }
        }
    }
}

/// Size of a margined rectangle to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackRect {
    pub width: u32,
    pub height: u32,
}

/// Where a packer put one rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectPlacement {
    /// Index into the packer's input slice.
    pub index: usize,
    /// Sheet the rectangle landed on.
    pub sheet: usize,
    pub x: u32,
    pub y: u32,
}

/// A rectangle bin packer.
///
/// Implementations must be deterministic and must never rotate.
pub trait RectPacker {
    /// Places every rectangle on at most `sheets` square sheets of `side`,
    /// or returns `None` if that is impossible for this packer.
    fn pack(&self, rects: &[PackRect], side: u32, sheets: usize) -> Option<Vec<RectPlacement>>;
}

/// Shelf for the shelf packer.
#[derive(Debug)]
struct Shelf {
    /// Y position of this shelf.
    y: u32,
    /// Height of this shelf (tallest rectangle).
    height: u32,
    /// Current X position (next free spot).
    current_x: u32,
}

/// Deterministic first-fit shelf packer.
///
/// Rectangles are visited by height (descending), then width (descending),
/// then input index. Each goes onto the first shelf of the first sheet with
/// room, opening a new shelf below the last one when needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShelfPacker;

impl RectPacker for ShelfPacker {
    fn pack(&self, rects: &[PackRect], side: u32, sheets: usize) -> Option<Vec<RectPlacement>> {
        let mut order: Vec<usize> = (0..rects.len()).collect();
        order.sort_by(|&a, &b| {
            rects[b]
                .height
                .cmp(&rects[a].height)
                .then(rects[b].width.cmp(&rects[a].width))
                .then(a.cmp(&b))
        });

        let mut shelves: Vec<Vec<Shelf>> = (0..sheets).map(|_| Vec::new()).collect();
        let mut placements = Vec::with_capacity(rects.len());

        for index in order {
            let rect = rects[index];
            if rect.width > side || rect.height > side {
                return None;
            }

            let placed = shelves
                .iter_mut()
                .enumerate()
                .find_map(|(sheet, sheet_shelves)| {
                    place_on_sheet(sheet_shelves, rect, side).map(|(x, y)| RectPlacement {
                        index,
                        sheet,
                        x,
                        y,
                    })
                })?;
            placements.push(placed);
        }

        Some(placements)
    }
}

fn place_on_sheet(shelves: &mut Vec<Shelf>, rect: PackRect, side: u32) -> Option<(u32, u32)> {
    for shelf in shelves.iter_mut() {
        if shelf.current_x + rect.width <= side && rect.height <= shelf.height {
            let x = shelf.current_x;
            shelf.current_x += rect.width;
            return Some((x, shelf.y));
        }
    }

    let shelf_y = shelves.last().map_or(0, |s| s.y + s.height);
    if shelf_y + rect.height > side {
        return None;
    }
    shelves.push(Shelf {
        y: shelf_y,
        height: rect.height,
        current_x: rect.width,
    });
    Some((0, shelf_y))
}

/// One sprite placed on a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpritePlacement {
    /// Index into the sprite slice given to [`PackingOrchestrator::pack`].
    pub sprite: usize,
    /// Left edge of the margined box.
    pub x: u32,
    /// Top edge of the margined box.
    pub y: u32,
    /// Sprite width without margin.
    pub width: u32,
    /// Sprite height without margin.
    pub height: u32,
}

impl SpritePlacement {
    /// Top-left corner of the sprite's pixels.
    pub fn origin(&self) -> (u32, u32) {
        (self.x + MARGIN_INSET, self.y + MARGIN_INSET)
    }

    /// Margined box as `(x, y, w, h)`.
    pub fn margined_box(&self) -> (u32, u32, u32, u32) {
        (
            self.x,
            self.y,
            self.width + SPRITE_MARGIN,
            self.height + SPRITE_MARGIN,
        )
    }
}

/// One square output sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedSheet {
    /// Position among the non-empty sheets.
    pub index: usize,
    pub side: u32,
    /// Placements in packing order.
    pub placements: Vec<SpritePlacement>,
}

/// Result of a packing search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackLayout {
    /// Side shared by every sheet.
    pub side: u32,
    /// Non-empty sheets.
    pub sheets: Vec<PackedSheet>,
}

impl PackLayout {
    /// Total number of placed sprites.
    pub fn sprite_count(&self) -> usize {
        self.sheets.iter().map(|sheet| sheet.placements.len()).sum()
    }
}

/// Searches for the smallest sheet layout holding every sprite.
#[derive(Debug, Clone)]
pub struct PackingOrchestrator<P = ShelfPacker> {
    packer: P,
    max_side: u32,
}

impl PackingOrchestrator<ShelfPacker> {
    /// Creates an orchestrator using the shelf packer.
    pub fn new(max_side: u32) -> Self {
        Self::with_packer(ShelfPacker, max_side)
    }
}

impl Default for PackingOrchestrator<ShelfPacker> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SHEET_SIDE)
    }
}

impl<P: RectPacker> PackingOrchestrator<P> {
    /// Creates an orchestrator with a custom packer.
    pub fn with_packer(packer: P, max_side: u32) -> Self {
        Self { packer, max_side }
    }

    pub fn max_side(&self) -> u32 {
        self.max_side
    }

    /// Packs `sprites` into as few and as small sheets as the search finds.
    pub fn pack(&self, sprites: &[Sprite]) -> Result<PackLayout, PackingError> {
        if sprites.is_empty() {
            return Err(PackingError::NoSprites);
        }

        // Every sprite must fit an empty sheet before the search starts
        for sprite in sprites {
            if sprite.width() + SPRITE_MARGIN > self.max_side
                || sprite.height() + SPRITE_MARGIN > self.max_side
            {
                return Err(PackingError::PackingInfeasible {
                    name: sprite.name.clone(),
                    width: sprite.width(),
                    height: sprite.height(),
                    margin: SPRITE_MARGIN,
                    max_side: self.max_side,
                });
            }
        }

        let rects: Vec<PackRect> = sprites
            .iter()
            .map(|sprite| PackRect {
                width: sprite.width() + SPRITE_MARGIN,
                height: sprite.height() + SPRITE_MARGIN,
            })
            .collect();

        let mut side = MIN_SHEET_SIDE.min(self.max_side);
        let mut count = 1;
        let placements = loop {
            if let Some(placements) = self.packer.pack(&rects, side, count) {
                break placements;
            }
            if side.saturating_mul(2) <= self.max_side {
                side *= 2;
            } else if side < self.max_side {
                side = self.max_side;
            } else if count < rects.len() {
                count += 1;
            } else {
                return Err(PackingError::PackerExhausted {
                    count: rects.len(),
                    side,
                });
            }
        };

        Ok(PackLayout {
            side,
            sheets: collect_sheets(sprites, &placements, side, count),
        })
    }
}

fn collect_sheets(
    sprites: &[Sprite],
    placements: &[RectPlacement],
    side: u32,
    count: usize,
) -> Vec<PackedSheet> {
    let mut per_sheet: Vec<Vec<SpritePlacement>> = (0..count).map(|_| Vec::new()).collect();
    for placement in placements {
        let sprite = &sprites[placement.index];
        per_sheet[placement.sheet].push(SpritePlacement {
            sprite: placement.index,
            x: placement.x,
            y: placement.y,
            width: sprite.width(),
            height: sprite.height(),
        });
    }

    per_sheet
        .into_iter()
        .filter(|placements| !placements.is_empty())
        .enumerate()
        .map(|(index, placements)| PackedSheet {
            index,
            side,
            placements,
        })
        .collect()
}
