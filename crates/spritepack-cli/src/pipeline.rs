//! The atlas assembly pipeline.
//!
//! One linear pass: discover → parse, slice, bind and extract → pack →
//! compose → emit. Nothing is written until every sheet has been composed,
//! so a failing run leaves the output locations untouched.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use spritepack_backend_inkscape::{
    InkscapeCli, InkscapeConfig, InkscapeError, LayerExporter, LayerExtractor, SkippedLayer,
};
use spritepack_backend_texture::{
    bind_tileset, load_rgba, render_sheet, slice_tileset, Binding, PackLayout, PackingError,
    PackingOrchestrator, PngConfig, PngError, RasterError, SheetImage, Sprite,
    DEFAULT_MAX_SHEET_SIDE,
};
use spritepack_spec::{
    parse_asset_name, BackendError, ErrorKind, FrameTable, SpecError, SpriteFrameSet,
};
use thiserror::Error;

use crate::discovery::{companion_table, discover, AssetKind, Discovery, SourceAsset};
use crate::emit::{self, EmittedFiles, DEFAULT_RESOURCE_DIR};

/// Settings of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory scanned for assets.
    pub source_dir: PathBuf,
    /// Sheet path without extension.
    pub output: PathBuf,
    /// Where individual sprite images are written, if anywhere.
    pub image_dir: Option<PathBuf>,
    /// Where Godot resources are written, if anywhere.
    pub godot_dir: Option<PathBuf>,
    /// Godot path prefix of the sheet images.
    pub resource_dir: String,
    /// Largest allowed sheet side.
    pub max_side: u32,
    /// Vector extraction settings.
    pub inkscape: InkscapeConfig,
    /// PNG settings for every written image.
    pub png: PngConfig,
}

impl PipelineConfig {
    pub fn new(source_dir: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output: output.into(),
            image_dir: None,
            godot_dir: None,
            resource_dir: DEFAULT_RESOURCE_DIR.to_string(),
            max_side: DEFAULT_MAX_SHEET_SIDE,
            inkscape: InkscapeConfig::default(),
            png: PngConfig::default(),
        }
    }

    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }

    pub fn godot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.godot_dir = Some(dir.into());
        self
    }

    pub fn resource_dir(mut self, prefix: impl Into<String>) -> Self {
        self.resource_dir = prefix.into();
        self
    }

    pub fn max_side(mut self, max_side: u32) -> Self {
        self.max_side = max_side;
        self
    }

    pub fn inkscape(mut self, inkscape: InkscapeConfig) -> Self {
        self.inkscape = inkscape;
        self
    }
}

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Source directory not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Failed to scan {}: {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("No sprites found in {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("Failed to read frame table {}: {source}", .path.display())]
    ReadTable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize atlas index: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Clip frame '{frame}' of '{set}' was not packed")]
    UnpackedFrame { set: String, frame: String },

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Raster(#[from] RasterError),

    #[error(transparent)]
    Inkscape(#[from] InkscapeError),

    #[error(transparent)]
    Packing(#[from] PackingError),

    #[error(transparent)]
    Png(#[from] PngError),
}

impl PipelineError {
    /// Process exit code: 1 for configuration errors, 2 for everything else.
    pub fn exit_code(&self) -> u8 {
        if self.kind().is_configuration() {
            1
        } else {
            2
        }
    }
}

impl BackendError for PipelineError {
    fn code(&self) -> &'static str {
        match self {
            PipelineError::SourceNotFound(_) => "PIPELINE_001",
            PipelineError::Scan { .. } => "PIPELINE_002",
            PipelineError::EmptyInput(_) => "PIPELINE_003",
            PipelineError::ReadTable { .. } => "PIPELINE_004",
            PipelineError::Write { .. } => "PIPELINE_005",
            PipelineError::Serialize(_) => "PIPELINE_006",
            PipelineError::UnpackedFrame { .. } => "PIPELINE_007",
            PipelineError::Spec(e) => e.code(),
            PipelineError::Raster(e) => e.code(),
            PipelineError::Inkscape(e) => e.code(),
            PipelineError::Packing(e) => e.code(),
            PipelineError::Png(e) => e.code(),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            PipelineError::Spec(e) => e.category(),
            PipelineError::Raster(e) => e.category(),
            PipelineError::Inkscape(e) => e.category(),
            PipelineError::Packing(e) => e.category(),
            PipelineError::Png(e) => e.category(),
            _ => "pipeline",
        }
    }

    fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::EmptyInput(_) => ErrorKind::EmptyInput,
            PipelineError::SourceNotFound(_)
            | PipelineError::Scan { .. }
            | PipelineError::ReadTable { .. }
            | PipelineError::Write { .. }
            | PipelineError::Serialize(_)
            | PipelineError::UnpackedFrame { .. } => ErrorKind::IoFailure,
            PipelineError::Spec(e) => e.kind(),
            PipelineError::Raster(e) => e.kind(),
            PipelineError::Inkscape(e) => e.kind(),
            PipelineError::Packing(e) => e.kind(),
            PipelineError::Png(e) => e.kind(),
        }
    }
}

/// Every packable sprite of a run plus the diagnostics gathered on the way.
#[derive(Debug, Default)]
pub struct SpriteCatalog {
    /// Packable sprites in discovery order.
    pub sprites: Vec<Sprite>,
    /// Frame sets in discovery order.
    pub frame_sets: Vec<SpriteFrameSet>,
    /// Tiles left out because no clip covered them.
    pub dropped_tiles: usize,
    /// Vector layers whose export failed.
    pub skipped_layers: Vec<SkippedLayer>,
    /// Files that are neither images, drawings nor frame tables.
    pub ignored: Vec<String>,
    /// Non-fatal problems.
    pub warnings: Vec<String>,
    origins: HashMap<String, String>,
    frame_set_origins: HashMap<String, String>,
}

impl SpriteCatalog {
    /// Adds a sprite, rejecting a name already used by a sprite or a frame set.
    pub fn push(&mut self, sprite: Sprite, origin: &str) -> Result<(), SpecError> {
        self.check_free(&sprite.name, origin)?;
        self.origins.insert(sprite.name.clone(), origin.to_string());
        self.sprites.push(sprite);
        Ok(())
    }

    /// Adds a frame set, rejecting a name already used by a sprite or a frame set.
    ///
    /// Both end up as `<name>.tres` in the resource directory.
    pub fn push_frame_set(
        &mut self,
        frame_set: SpriteFrameSet,
        origin: &str,
    ) -> Result<(), SpecError> {
        self.check_free(&frame_set.name, origin)?;
        self.frame_set_origins
            .insert(frame_set.name.clone(), origin.to_string());
        self.frame_sets.push(frame_set);
        Ok(())
    }

    fn check_free(&self, name: &str, origin: &str) -> Result<(), SpecError> {
        let taken = self
            .origins
            .get(name)
            .or_else(|| self.frame_set_origins.get(name));
        match taken {
            Some(first) => Err(SpecError::DuplicateSpriteName {
                name: name.to_string(),
                first: first.clone(),
                second: origin.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Returns true if some sprite already uses `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.origins.contains_key(name)
    }
}

/// Gathers every packable sprite of a discovered source tree.
///
/// `extractor` must be present when the tree contains vector drawings.
pub fn collect_sprites<E: LayerExporter>(
    discovery: &Discovery,
    extractor: Option<&LayerExtractor<E>>,
) -> Result<SpriteCatalog, PipelineError> {
    let mut catalog = SpriteCatalog::default();

    for asset in &discovery.assets {
        match asset.kind {
            AssetKind::Raster => collect_raster(asset, &mut catalog)?,
            AssetKind::Vector => {
                let extractor = extractor.ok_or(InkscapeError::InkscapeNotFound)?;
                let extracted = extractor.extract(&asset.path, &asset.name)?;
                let origin = asset.display_path();
                for sprite in extracted.sprites {
                    catalog.push(sprite, &origin)?;
                }
                catalog.skipped_layers.extend(extracted.skipped);
                catalog.warnings.extend(extracted.warnings);
            }
            AssetKind::FrameTable => {}
            AssetKind::Ignored => catalog.ignored.push(asset.display_path()),
        }
    }

    Ok(catalog)
}

fn collect_raster(asset: &SourceAsset, catalog: &mut SpriteCatalog) -> Result<(), PipelineError> {
    let layout = parse_asset_name(&asset.name)?;
    let image = load_rgba(&asset.path)?;
    let origin = asset.display_path();

    let grid = match layout.grid() {
        Some(grid) => grid,
        None => {
            catalog.push(Sprite::new(layout.name(), image), &origin)?;
            return Ok(());
        }
    };

    let tiles = slice_tileset(layout.name(), &image, grid);
    let table_path = companion_table(&asset.path, layout.name());
    let table = if table_path.is_file() {
        let text = std::fs::read_to_string(&table_path).map_err(|source| {
            PipelineError::ReadTable {
                path: table_path.clone(),
                source,
            }
        })?;
        let source = companion_table(&asset.rel_path, layout.name());
        Some(FrameTable::parse(
            source.to_string_lossy().replace('\\', "/"),
            &text,
        )?)
    } else {
        None
    };

    let binding = match (&table, layout.playback()) {
        (Some(table), _) => Binding::Table(table),
        (None, Some(playback)) => Binding::Inline(playback),
        (None, None) => Binding::Unbound,
    };

    let bound = bind_tileset(tiles, binding)?;
    for sprite in bound.sprites {
        catalog.push(sprite, &origin)?;
    }
    catalog.dropped_tiles += bound.dropped;
    if let Some(frame_set) = bound.frame_set {
        catalog.push_frame_set(frame_set, &origin)?;
    }
    Ok(())
}

/// Summary of one written sheet.
#[derive(Debug, Clone, Serialize)]
pub struct SheetReport {
    pub index: usize,
    pub image: PathBuf,
    pub index_file: PathBuf,
    pub sprites: usize,
    pub hash: String,
}

/// Summary of one frame set.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSetReport {
    pub name: String,
    pub clips: usize,
    pub frames: usize,
}

/// Summary of a skipped vector layer.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedLayerReport {
    pub svg: PathBuf,
    pub layer: String,
    pub reason: String,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    /// Side length shared by every sheet.
    pub sheet_side: u32,
    pub sheets: Vec<SheetReport>,
    pub sprite_count: usize,
    pub frame_sets: Vec<FrameSetReport>,
    pub dropped_tiles: usize,
    pub skipped_layers: Vec<SkippedLayerReport>,
    pub ignored_files: Vec<String>,
    pub warnings: Vec<String>,
    /// Godot resources written.
    pub resources: Vec<PathBuf>,
    /// Individual sprite images written.
    pub images: Vec<PathBuf>,
}

/// Runs the pipeline with the real Inkscape exporter.
///
/// Inkscape is only resolved when the source tree contains drawings; it
/// being unavailable then fails the run before any asset is processed.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
    let discovery = discover(&config.source_dir)?;
    if discovery.has_vectors() {
        let cli = InkscapeCli::locate(config.inkscape.inkscape_path.as_deref())?;
        let extractor = LayerExtractor::new(cli, &config.inkscape);
        run_discovered(config, &discovery, Some(&extractor))
    } else {
        run_discovered::<InkscapeCli>(config, &discovery, None)
    }
}

/// Runs the pipeline with a custom layer exporter.
pub fn run_pipeline_with<E: LayerExporter>(
    config: &PipelineConfig,
    exporter: E,
) -> Result<PipelineReport, PipelineError> {
    let discovery = discover(&config.source_dir)?;
    let extractor = LayerExtractor::new(exporter, &config.inkscape);
    run_discovered(config, &discovery, Some(&extractor))
}

fn run_discovered<E: LayerExporter>(
    config: &PipelineConfig,
    discovery: &Discovery,
    extractor: Option<&LayerExtractor<E>>,
) -> Result<PipelineReport, PipelineError> {
    let catalog = collect_sprites(discovery, extractor)?;
    if catalog.sprites.is_empty() {
        return Err(PipelineError::EmptyInput(config.source_dir.clone()));
    }

    let layout = PackingOrchestrator::new(config.max_side).pack(&catalog.sprites)?;
    let sheets = layout
        .sheets
        .iter()
        .map(|sheet| render_sheet(sheet, &catalog.sprites, &config.png))
        .collect::<Result<Vec<SheetImage>, PngError>>()?;

    let emitted = emit::write_outputs(config, &catalog, &layout, &sheets)?;
    Ok(build_report(&catalog, &layout, &sheets, emitted))
}

fn build_report(
    catalog: &SpriteCatalog,
    layout: &PackLayout,
    sheets: &[SheetImage],
    emitted: EmittedFiles,
) -> PipelineReport {
    let sheet_reports = sheets
        .iter()
        .zip(layout.sheets.iter())
        .zip(emitted.sheets)
        .map(|((image, packed), files)| SheetReport {
            index: image.index,
            image: files.png,
            index_file: files.json,
            sprites: packed.placements.len(),
            hash: image.hash.clone(),
        })
        .collect();

    PipelineReport {
        sheet_side: layout.side,
        sheets: sheet_reports,
        sprite_count: catalog.sprites.len(),
        frame_sets: catalog
            .frame_sets
            .iter()
            .map(|set| FrameSetReport {
                name: set.name.clone(),
                clips: set.clips.len(),
                frames: set.frame_count(),
            })
            .collect(),
        dropped_tiles: catalog.dropped_tiles,
        skipped_layers: catalog
            .skipped_layers
            .iter()
            .map(|skipped| SkippedLayerReport {
                svg: skipped.svg.clone(),
                layer: skipped.layer.clone(),
                reason: skipped.reason.clone(),
            })
            .collect(),
        ignored_files: catalog.ignored.clone(),
        warnings: catalog.warnings.clone(),
        resources: emitted.resources,
        images: emitted.images,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use spritepack_backend_texture::png::write_rgba;
    use std::path::Path;

    fn write_png(path: &Path, w: u32, h: u32) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        let image = RgbaImage::from_pixel(w, h, Rgba([200, 10, 10, 255]));
        write_rgba(&image, path, &PngConfig::default()).unwrap();
    }

    fn collect(dir: &Path) -> Result<SpriteCatalog, PipelineError> {
        let discovery = discover(dir)?;
        collect_sprites::<InkscapeCli>(&discovery, None)
    }

    #[test]
    fn test_collect_single_and_grid() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("hero__4x2.png"), 8, 8);
        write_png(&dir.path().join("icon.png"), 64, 64);

        let catalog = collect(dir.path()).unwrap();
        assert_eq!(catalog.sprites.len(), 9);
        assert!(catalog.frame_sets.is_empty());
        assert!(catalog.contains("icon"));
        assert!(catalog.contains("hero__3x1"));
    }

    #[test]
    fn test_companion_table_is_used() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("chars/hero__4x2.png"), 8, 8);
        std::fs::write(
            dir.path().join("chars/hero.csv"),
            "name;start_col;start_row;col_count;row_count;fps;loop\nidle;0;0;1;2;4;false\n",
        )
        .unwrap();

        let catalog = collect(dir.path()).unwrap();
        assert_eq!(catalog.sprites.len(), 2);
        assert_eq!(catalog.dropped_tiles, 6);
        assert_eq!(catalog.frame_sets[0].name, "chars/hero");
        assert_eq!(
            catalog.frame_sets[0].clips[0].frames,
            vec!["chars/hero__0x0", "chars/hero__1x0"]
        );
    }

    #[test]
    fn test_inline_playback() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("coin__4x4fps10loop.png"), 16, 4);

        let catalog = collect(dir.path()).unwrap();
        let set = &catalog.frame_sets[0];
        assert_eq!(set.name, "coin");
        assert_eq!(set.clips[0].fps, 10);
        assert!(set.clips[0].looping);
        assert!(catalog.sprites.iter().all(|s| s.animated));
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("a.png"), 2, 2);
        // Same logical name from a second file; decoding sniffs the format.
        std::fs::copy(dir.path().join("a.png"), dir.path().join("a.jpg")).unwrap();

        let err = collect(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateSpriteName);
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_frame_set_cannot_shadow_sprite() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("hero.png"), 4, 4);
        write_png(&dir.path().join("hero__4x2fps10.png"), 8, 8);

        let err = collect(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateSpriteName);
        let message = err.to_string();
        assert!(message.contains("hero.png"));
        assert!(message.contains("hero__4x2fps10.png"));
    }

    #[test]
    fn test_sprite_cannot_shadow_frame_set() {
        let mut catalog = SpriteCatalog::default();
        catalog
            .push_frame_set(SpriteFrameSet::new("hero"), "hero__4x2fps10.png")
            .unwrap();

        let image = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let err = catalog.push(Sprite::new("hero", image), "hero.svg").unwrap_err();
        assert!(matches!(
            err,
            SpecError::DuplicateSpriteName { ref first, ref second, .. }
                if first == "hero__4x2fps10.png" && second == "hero.svg"
        ));
        assert!(catalog.sprites.is_empty());
    }

    #[test]
    fn test_bad_grammar_names_asset() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("hero__big.png"), 2, 2);
        let err = collect(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidNamingGrammar);
        assert!(err.to_string().contains("hero__big"));
    }

    #[test]
    fn test_vectors_without_extractor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("art.svg"), "<svg/>").unwrap();
        let err = collect(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedEnvironment);
    }

    #[test]
    fn test_ignored_files_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("icon.png"), 2, 2);
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();
        let catalog = collect(dir.path()).unwrap();
        assert_eq!(catalog.ignored, vec!["notes.txt".to_string()]);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(PipelineError::EmptyInput(PathBuf::from("x")).exit_code(), 1);
        let err = PipelineError::from(PackingError::PackingInfeasible {
            name: "big".to_string(),
            width: 5000,
            height: 5000,
            margin: 2,
            max_side: 4096,
        });
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.code(), "PACK_001");
    }
}
