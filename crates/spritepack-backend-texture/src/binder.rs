//! Animation binding for tile grids.
//!
//! Binding decides which tiles of a grid become packable sprites and which
//! animation clips reference them. It runs in two phases: clips are built
//! against the full candidate set while coverage is recorded, then the
//! candidates are filtered by coverage.

use spritepack_spec::{
    AnimationClip, FrameTable, FrameTableRecord, InlinePlayback, SpecError, SpriteFrameSet,
    DEFAULT_CLIP_NAME,
};

use crate::sprite::Sprite;
use crate::tileset::TileGrid;

/// Source of animation data for a tile grid.
#[derive(Debug, Clone, Copy)]
pub enum Binding<'a> {
    /// A companion frame table; it takes precedence over inline playback.
    Table(&'a FrameTable),
    /// Playback parsed from the asset name: one clip over the whole grid.
    Inline(InlinePlayback),
    /// No animation; every tile is packed as a plain sprite.
    Unbound,
}

/// Outcome of binding one tile grid.
#[derive(Debug, Clone)]
pub struct BoundTileset {
    /// Retained tiles in column-major order.
    pub sprites: Vec<Sprite>,
    /// Clips of the grid, absent for unbound grids.
    pub frame_set: Option<SpriteFrameSet>,
    /// Number of tiles not covered by any clip.
    pub dropped: usize,
}

/// Binds `grid` according to `binding`.
///
/// Table records whose range leaves the grid fail with
/// [`SpecError::InvalidFrameTable`].
pub fn bind_tileset(grid: TileGrid, binding: Binding<'_>) -> Result<BoundTileset, SpecError> {
    match binding {
        Binding::Unbound => Ok(BoundTileset {
            sprites: grid.into_tiles(),
            frame_set: None,
            dropped: 0,
        }),
        Binding::Inline(playback) => {
            let mut clip = AnimationClip::new(DEFAULT_CLIP_NAME, playback.fps, playback.looping);
            clip.frames = grid.tiles().iter().map(|tile| tile.name.clone()).collect();

            let mut frame_set = SpriteFrameSet::new(grid.base.clone());
            frame_set.clips.push(clip);

            Ok(BoundTileset {
                sprites: grid.into_tiles().into_iter().map(Sprite::animated).collect(),
                frame_set: Some(frame_set),
                dropped: 0,
            })
        }
        Binding::Table(table) => bind_table(grid, table),
    }
}

fn bind_table(grid: TileGrid, table: &FrameTable) -> Result<BoundTileset, SpecError> {
    let mut frame_set = SpriteFrameSet::new(grid.base.clone());
    let mut covered = vec![false; grid.len()];

    for record in &table.records {
        check_range(&grid, table, record)?;

        let mut clip = AnimationClip::new(record.name.clone(), record.fps, record.looping);
        for col in record.columns() {
            for row in record.rows() {
                if let Some(index) = grid.index_of(col, row) {
                    covered[index] = true;
                    clip.frames.push(grid.tiles()[index].name.clone());
                }
            }
        }
        frame_set.clips.push(clip);
    }

    let candidates = grid.into_tiles();
    let total = candidates.len();
    let sprites: Vec<Sprite> = candidates
        .into_iter()
        .zip(covered)
        .filter(|(_, is_covered)| *is_covered)
        .map(|(tile, _)| tile.animated())
        .collect();
    let dropped = total - sprites.len();

    Ok(BoundTileset {
        sprites,
        frame_set: Some(frame_set),
        dropped,
    })
}

fn check_range(grid: &TileGrid, table: &FrameTable, record: &FrameTableRecord) -> Result<(), SpecError> {
    let columns = record.columns();
    let rows = record.rows();
    if columns.end > grid.columns() || rows.end > grid.rows() {
        return Err(SpecError::invalid_table(
            &table.source,
            record.line,
            format!(
                "clip '{}' covers columns {}..{} and rows {}..{}, but '{}' is only {}x{} tiles",
                record.name,
                columns.start,
                columns.end,
                rows.start,
                rows.end,
                grid.base,
                grid.columns(),
                grid.rows()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tileset::slice_tileset;
    use image::RgbaImage;
    use pretty_assertions::assert_eq;
    use spritepack_spec::GridSpec;

    const HEADER: &str = "name;start_col;start_row;col_count;row_count;fps;loop\n";

    fn grid_4x4() -> TileGrid {
        slice_tileset("g", &RgbaImage::new(16, 16), GridSpec::new(4, 4))
    }

    fn table(body: &str) -> FrameTable {
        FrameTable::parse("g.csv", &format!("{}{}", HEADER, body)).unwrap()
    }

    #[test]
    fn test_unbound_keeps_every_tile() {
        let bound = bind_tileset(grid_4x4(), Binding::Unbound).unwrap();
        assert_eq!(bound.sprites.len(), 16);
        assert!(bound.frame_set.is_none());
        assert!(bound.sprites.iter().all(|s| !s.animated));
    }

    #[test]
    fn test_inline_binding_is_column_major() {
        let grid = slice_tileset("coin", &RgbaImage::new(4, 4), GridSpec::new(2, 2));
        let playback = InlinePlayback {
            fps: 8,
            looping: true,
        };
        let bound = bind_tileset(grid, Binding::Inline(playback)).unwrap();

        let set = bound.frame_set.unwrap();
        assert_eq!(set.name, "coin");
        assert_eq!(set.clips.len(), 1);
        let clip = &set.clips[0];
        assert_eq!(clip.name, DEFAULT_CLIP_NAME);
        assert_eq!(clip.fps, 8);
        assert!(clip.looping);
        assert_eq!(
            clip.frames,
            vec!["coin__0x0", "coin__1x0", "coin__0x1", "coin__1x1"]
        );
        assert!(bound.sprites.iter().all(|s| s.animated));
    }

    #[test]
    fn test_overlapping_ranges_bind_subset() {
        // Two overlapping ranges cover columns 0..2 of rows 0..2 plus (2, 1).
        let t = table("a;0;0;2;2;10;true\nb;1;1;2;1;5;false\n");
        let bound = bind_tileset(grid_4x4(), Binding::Table(&t)).unwrap();

        let names: Vec<&str> = bound.sprites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["g__0x0", "g__1x0", "g__0x1", "g__1x1", "g__1x2"]);
        assert_eq!(bound.dropped, 11);
        assert!(bound.sprites.iter().all(|s| s.animated));

        let set = bound.frame_set.unwrap();
        assert_eq!(set.clips[0].frames, vec!["g__0x0", "g__1x0", "g__0x1", "g__1x1"]);
        assert_eq!(set.clips[1].frames, vec!["g__1x1", "g__1x2"]);
        assert!(!set.clips[1].looping);

        // Every referenced frame is retained.
        for frame in set.frame_refs() {
            assert!(names.contains(&frame), "{} was dropped", frame);
        }
    }

    #[test]
    fn test_walk_table_keeps_all_tiles() {
        let grid = slice_tileset("hero", &RgbaImage::new(8, 8), GridSpec::new(4, 2));
        let t = table("walk;0;0;2;4;12;true\n");
        let bound = bind_tileset(grid, Binding::Table(&t)).unwrap();

        assert_eq!(bound.sprites.len(), 8);
        assert_eq!(bound.dropped, 0);
        let clip = &bound.frame_set.unwrap().clips[0];
        assert_eq!(clip.name, "walk");
        assert_eq!(clip.fps, 12);
        assert!(clip.looping);
        assert_eq!(clip.frames.len(), 8);
        assert_eq!(clip.frames[0], "hero__0x0");
        assert_eq!(clip.frames[1], "hero__1x0");
        assert_eq!(clip.frames[4], "hero__0x1");
    }

    #[test]
    fn test_table_overrides_inline_playback() {
        let t = table("idle;0;0;1;1;4;false\n");
        let bound = bind_tileset(grid_4x4(), Binding::Table(&t)).unwrap();
        let set = bound.frame_set.unwrap();
        assert_eq!(set.clips.len(), 1);
        assert_eq!(set.clips[0].name, "idle");
        assert_eq!(bound.sprites.len(), 1);
    }

    #[test]
    fn test_empty_table_drops_everything() {
        let t = table("");
        let bound = bind_tileset(grid_4x4(), Binding::Table(&t)).unwrap();
        assert!(bound.sprites.is_empty());
        assert_eq!(bound.dropped, 16);
        assert!(bound.frame_set.unwrap().clips.is_empty());
    }

    #[test]
    fn test_out_of_range_record_is_fatal() {
        let t = table("ok;0;0;1;1;4;true\nrun;3;0;2;1;10;true\n");
        let err = bind_tileset(grid_4x4(), Binding::Table(&t)).unwrap_err();
        match err {
            SpecError::InvalidFrameTable { table, line, message } => {
                assert_eq!(table, "g.csv");
                assert_eq!(line, 3);
                assert!(message.contains("'run'"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
