//! Filename grammar for source assets.
//!
//! Tile and animation structure is encoded in the asset's logical name:
//!
//! ```text
//! <name>[__<width>x<height>[p<padding>][fps<rate>[loop]]]
//! ```
//!
//! `width` and `height` are the tile size in pixels. [`parse_asset_name`] is
//! the only place that interprets this grammar; everything downstream works
//! on the typed [`AssetLayout`].

use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::SpecError;

/// Separator between the base name and the grid suffix.
pub const GRID_DELIMITER: &str = "__";

fn grammar() -> &'static Regex {
    static GRAMMAR: OnceLock<Regex> = OnceLock::new();
    GRAMMAR.get_or_init(|| {
        Regex::new(r"^(.*?)__(\d+)x(\d+)(?:p(\d+))?(?:fps(\d+)(loop)?)?$")
            .expect("grid grammar regex is valid")
    })
}

fn layer_label_filter() -> &'static Regex {
    static FILTER: OnceLock<Regex> = OnceLock::new();
    FILTER.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_ -]+").expect("label filter regex is valid"))
}

/// Tile geometry of a grid asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSpec {
    /// Tile width in pixels.
    pub tile_width: u32,
    /// Tile height in pixels.
    pub tile_height: u32,
    /// Gap between neighbouring tiles, in pixels.
    pub padding: u32,
}

impl GridSpec {
    /// Creates a grid spec without padding.
    pub fn new(tile_width: u32, tile_height: u32) -> Self {
        Self {
            tile_width,
            tile_height,
            padding: 0,
        }
    }

    /// Sets the inter-tile padding.
    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    /// Horizontal distance between the origins of adjacent tiles.
    pub fn stride_x(&self) -> u32 {
        self.tile_width.saturating_add(self.padding)
    }

    /// Vertical distance between the origins of adjacent tiles.
    pub fn stride_y(&self) -> u32 {
        self.tile_height.saturating_add(self.padding)
    }

    /// Number of whole tiles `(columns, rows)` in a raster of the given size.
    ///
    /// Remainder strips narrower than one stride are discarded.
    pub fn grid_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        (width / self.stride_x(), height / self.stride_y())
    }

    /// Re-derives the `<width>x<height>[p<padding>]` part of the suffix.
    pub fn suffix(&self) -> String {
        if self.padding > 0 {
            format!("{}x{}p{}", self.tile_width, self.tile_height, self.padding)
        } else {
            format!("{}x{}", self.tile_width, self.tile_height)
        }
    }
}

/// Playback settings carried inline by an animated grid's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InlinePlayback {
    /// Frames per second.
    pub fps: u32,
    /// Whether the clip loops.
    pub looping: bool,
}

impl InlinePlayback {
    /// Re-derives the `fps<rate>[loop]` part of the suffix.
    pub fn suffix(&self) -> String {
        if self.looping {
            format!("fps{}loop", self.fps)
        } else {
            format!("fps{}", self.fps)
        }
    }
}

/// How an asset is cut into sprites, as decided by its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLayout {
    /// The whole raster is one sprite.
    Single { name: String },
    /// A tile grid with no inline animation.
    PlainGrid { name: String, grid: GridSpec },
    /// A tile grid whose tiles form one inline clip.
    AnimatedGrid {
        name: String,
        grid: GridSpec,
        playback: InlinePlayback,
    },
}

impl AssetLayout {
    /// The base name, without any grid suffix.
    pub fn name(&self) -> &str {
        match self {
            AssetLayout::Single { name }
            | AssetLayout::PlainGrid { name, .. }
            | AssetLayout::AnimatedGrid { name, .. } => name,
        }
    }

    /// The tile geometry, if this is a grid.
    pub fn grid(&self) -> Option<GridSpec> {
        match self {
            AssetLayout::Single { .. } => None,
            AssetLayout::PlainGrid { grid, .. } | AssetLayout::AnimatedGrid { grid, .. } => {
                Some(*grid)
            }
        }
    }

    /// The inline playback settings, if any.
    pub fn playback(&self) -> Option<InlinePlayback> {
        match self {
            AssetLayout::AnimatedGrid { playback, .. } => Some(*playback),
            _ => None,
        }
    }

    /// Re-derives the full logical name this layout was parsed from.
    pub fn to_name(&self) -> String {
        match self {
            AssetLayout::Single { name } => name.clone(),
            AssetLayout::PlainGrid { name, grid } => {
                format!("{}{}{}", name, GRID_DELIMITER, grid.suffix())
            }
            AssetLayout::AnimatedGrid {
                name,
                grid,
                playback,
            } => format!(
                "{}{}{}{}",
                name,
                GRID_DELIMITER,
                grid.suffix(),
                playback.suffix()
            ),
        }
    }
}

/// Parses an asset's logical name into its layout.
///
/// Names without the grid delimiter are single sprites. Names with the
/// delimiter must match the full grammar; anything else is an
/// `InvalidNamingGrammar` error.
pub fn parse_asset_name(name: &str) -> Result<AssetLayout, SpecError> {
    let Some(caps) = grammar().captures(name) else {
        if name.contains(GRID_DELIMITER) {
            return Err(SpecError::invalid_name(
                name,
                "expected <name>__<width>x<height>[p<padding>][fps<rate>[loop]]",
            ));
        }
        return Ok(AssetLayout::Single {
            name: name.to_string(),
        });
    };

    let base = caps.get(1).map_or("", |m| m.as_str());
    if base.is_empty() || base.ends_with('/') {
        return Err(SpecError::invalid_name(name, "missing base name before '__'"));
    }

    let number = |index: usize| -> Result<Option<u32>, SpecError> {
        caps.get(index)
            .map(|m| {
                m.as_str()
                    .parse::<u32>()
                    .map_err(|_| {
                        SpecError::invalid_name(name, format!("'{}' is out of range", m.as_str()))
                    })
            })
            .transpose()
    };

    let tile_width = number(2)?.unwrap_or(0);
    let tile_height = number(3)?.unwrap_or(0);
    if tile_width == 0 || tile_height == 0 {
        return Err(SpecError::invalid_name(name, "tile size must be non-zero"));
    }

    let padding = number(4)?.unwrap_or(0);
    if tile_width.checked_add(padding).is_none() || tile_height.checked_add(padding).is_none() {
        return Err(SpecError::invalid_name(name, "tile size plus padding is out of range"));
    }

    let grid = GridSpec::new(tile_width, tile_height).with_padding(padding);
    let name = base.to_string();

    Ok(match number(5)? {
        Some(fps) => AssetLayout::AnimatedGrid {
            name,
            grid,
            playback: InlinePlayback {
                fps,
                looping: caps.get(6).is_some(),
            },
        },
        None => AssetLayout::PlainGrid { name, grid },
    })
}

/// Derives an asset's logical name from its path relative to the source root.
///
/// The extension is stripped, separators are normalized to `/`, and a
/// leading `./` is removed.
pub fn logical_name(rel_path: &Path) -> String {
    let stripped = rel_path.with_extension("");
    let name = stripped.to_string_lossy().replace('\\', "/");
    match name.strip_prefix("./") {
        Some(rest) => rest.to_string(),
        None => name,
    }
}

/// Reduces a vector layer label to `[A-Za-z0-9_ -]`.
pub fn sanitize_layer_label(label: &str) -> String {
    layer_label_filter().replace_all(label, "").into_owned()
}

/// Number of digits needed to print every index of an axis with `count` cells.
pub fn index_width(count: u32) -> usize {
    count.saturating_sub(1).to_string().len()
}

/// Name of the tile at `(row, col)` of the grid asset `base`.
///
/// Indices are zero-padded so every tile name of one grid has equal width.
pub fn tile_name(base: &str, row: u32, col: u32, row_width: usize, col_width: usize) -> String {
    format!(
        "{}{}{:0rw$}x{:0cw$}",
        base,
        GRID_DELIMITER,
        row,
        col,
        rw = row_width,
        cw = col_width
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::path::PathBuf;

    #[test]
    fn test_single_sprite() {
        let layout = parse_asset_name("ui/icon").unwrap();
        assert_eq!(
            layout,
            AssetLayout::Single {
                name: "ui/icon".to_string()
            }
        );
        assert!(layout.grid().is_none());
        assert!(layout.playback().is_none());
    }

    #[test]
    fn test_plain_grid() {
        let layout = parse_asset_name("chars/hero__4x2").unwrap();
        assert_eq!(
            layout,
            AssetLayout::PlainGrid {
                name: "chars/hero".to_string(),
                grid: GridSpec::new(4, 2),
            }
        );
    }

    #[test]
    fn test_plain_grid_with_padding() {
        let layout = parse_asset_name("tiles__16x16p2").unwrap();
        assert_eq!(layout.grid(), Some(GridSpec::new(16, 16).with_padding(2)));
        assert_eq!(layout.name(), "tiles");
    }

    #[test]
    fn test_animated_grid() {
        let layout = parse_asset_name("fx/spark__8x8p1fps24loop").unwrap();
        assert_eq!(
            layout,
            AssetLayout::AnimatedGrid {
                name: "fx/spark".to_string(),
                grid: GridSpec::new(8, 8).with_padding(1),
                playback: InlinePlayback {
                    fps: 24,
                    looping: true
                },
            }
        );

        let layout = parse_asset_name("coin__16x16fps10").unwrap();
        assert_eq!(
            layout.playback(),
            Some(InlinePlayback {
                fps: 10,
                looping: false
            })
        );
    }

    #[test]
    fn test_invalid_grammar() {
        for name in [
            "hero__",
            "hero__4",
            "hero__4x",
            "hero__4y2",
            "hero__4x2loop",
            "hero__4x2p",
            "hero__4x2fps",
            "hero__0x2",
            "__4x2",
            "dir/__4x2",
            "hero__99999999999x2",
            "a__4294967295x1p1",
            "a__1x4294967295p1",
        ] {
            let err = parse_asset_name(name).unwrap_err();
            assert!(
                matches!(err, SpecError::InvalidNamingGrammar { name: ref n, .. } if n == name),
                "expected grammar error for {}",
                name
            );
        }
    }

    #[test]
    fn test_largest_stride_is_accepted() {
        let layout = parse_asset_name("a__4294967294x1p1").unwrap();
        let AssetLayout::PlainGrid { grid, .. } = layout else {
            panic!("expected plain grid");
        };
        assert_eq!(grid.stride_x(), u32::MAX);
        assert_eq!(grid.grid_dimensions(8, 8), (0, 4));
    }

    #[test]
    fn test_stride_saturates() {
        let grid = GridSpec::new(u32::MAX, 2).with_padding(1);
        assert_eq!(grid.stride_x(), u32::MAX);
        assert_eq!(grid.grid_dimensions(8, 8), (0, 2));
    }

    #[test]
    fn test_delimiter_inside_base_name() {
        let layout = parse_asset_name("a__b__4x4").unwrap();
        assert_eq!(layout.name(), "a__b");
        assert_eq!(layout.grid(), Some(GridSpec::new(4, 4)));
    }

    #[test]
    fn test_grid_dimensions_discard_remainder() {
        let grid = GridSpec::new(16, 16).with_padding(2);
        assert_eq!(grid.grid_dimensions(100, 40), (5, 2));
        assert_eq!(GridSpec::new(4, 2).grid_dimensions(8, 8), (2, 4));
        assert_eq!(GridSpec::new(4, 4).grid_dimensions(3, 3), (0, 0));
    }

    #[test]
    fn test_logical_name() {
        assert_eq!(logical_name(&PathBuf::from("hero__4x2.png")), "hero__4x2");
        assert_eq!(logical_name(&PathBuf::from("./ui/icon.png")), "ui/icon");
        assert_eq!(logical_name(&PathBuf::from("ui\\icon.PNG")), "ui/icon");
        assert_eq!(logical_name(&PathBuf::from("v1.2/icon.png")), "v1.2/icon");
    }

    #[test]
    fn test_sanitize_layer_label() {
        assert_eq!(sanitize_layer_label("Layer #1 (copy)"), "Layer 1 copy");
        assert_eq!(sanitize_layer_label("walk_cycle-2"), "walk_cycle-2");
        assert_eq!(sanitize_layer_label("äö/\\"), "");
    }

    #[test]
    fn test_tile_name_padding() {
        assert_eq!(index_width(1), 1);
        assert_eq!(index_width(10), 1);
        assert_eq!(index_width(11), 2);
        assert_eq!(index_width(0), 1);
        assert_eq!(tile_name("hero", 3, 1, 1, 1), "hero__3x1");
        assert_eq!(tile_name("hero", 3, 1, 2, 3), "hero__03x001");
    }

    proptest! {
        #[test]
        fn grammar_round_trips(
            base in "[a-z][a-z0-9_/]{0,12}[a-z0-9]",
            width in 1u32..4096,
            height in 1u32..4096,
            padding in proptest::option::of(1u32..64),
            playback in proptest::option::of((0u32..120, any::<bool>())),
        ) {
            prop_assume!(!base.contains(GRID_DELIMITER));

            let mut name = format!("{}__{}x{}", base, width, height);
            if let Some(p) = padding {
                name.push_str(&format!("p{}", p));
            }
            if let Some((fps, looping)) = playback {
                name.push_str(&format!("fps{}", fps));
                if looping {
                    name.push_str("loop");
                }
            }

            let layout = parse_asset_name(&name).unwrap();
            let grid = layout.grid().unwrap();
            prop_assert_eq!(grid.tile_width, width);
            prop_assert_eq!(grid.tile_height, height);
            prop_assert_eq!(grid.padding, padding.unwrap_or(0));
            prop_assert_eq!(
                layout.playback().map(|p| (p.fps, p.looping)),
                playback
            );
            prop_assert_eq!(layout.to_name(), name);
        }
    }
}
