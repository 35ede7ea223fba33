//! Source asset discovery.
//!
//! Walks the source directory in file-name order so that every run visits
//! assets in the same sequence.

use std::path::{Path, PathBuf};

use spritepack_backend_texture::raster::is_raster_extension;
use spritepack_spec::frame_table::FRAME_TABLE_EXTENSION;
use spritepack_spec::naming::logical_name;
use walkdir::WalkDir;

use crate::pipeline::PipelineError;

/// Extension of vector drawings.
pub const VECTOR_EXTENSION: &str = "svg";

/// What a discovered file is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Decodable raster image.
    Raster,
    /// Layered vector drawing.
    Vector,
    /// Companion frame table; read on demand next to its grid image.
    FrameTable,
    /// Anything else; reported and skipped.
    Ignored,
}

impl AssetKind {
    /// Classifies a file by its extension.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        if is_raster_extension(&ext) {
            AssetKind::Raster
        } else if ext == VECTOR_EXTENSION {
            AssetKind::Vector
        } else if ext == FRAME_TABLE_EXTENSION {
            AssetKind::FrameTable
        } else {
            AssetKind::Ignored
        }
    }
}

/// A file found under the source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAsset {
    /// Full path.
    pub path: PathBuf,
    /// Path relative to the source directory.
    pub rel_path: PathBuf,
    /// Extensionless, `/`-separated relative path.
    pub name: String,
    pub kind: AssetKind,
}

impl SourceAsset {
    /// Relative path for messages, always `/`-separated.
    pub fn display_path(&self) -> String {
        self.rel_path.to_string_lossy().replace('\\', "/")
    }
}

/// All files of a source directory in visiting order.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub root: PathBuf,
    pub assets: Vec<SourceAsset>,
}

impl Discovery {
    /// Assets of one kind.
    pub fn of_kind(&self, kind: AssetKind) -> impl Iterator<Item = &SourceAsset> {
        self.assets.iter().filter(move |asset| asset.kind == kind)
    }

    /// Returns true if any vector drawing was found.
    pub fn has_vectors(&self) -> bool {
        self.of_kind(AssetKind::Vector).next().is_some()
    }
}

/// Lists every file under `source_dir`.
pub fn discover(source_dir: &Path) -> Result<Discovery, PipelineError> {
    if !source_dir.is_dir() {
        return Err(PipelineError::SourceNotFound(source_dir.to_path_buf()));
    }

    let mut assets = Vec::new();
    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|source| PipelineError::Scan {
            path: source_dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path().to_path_buf();
        let rel_path = path
            .strip_prefix(source_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.clone());
        assets.push(SourceAsset {
            name: logical_name(&rel_path),
            kind: AssetKind::from_path(&path),
            path,
            rel_path,
        });
    }

    Ok(Discovery {
        root: source_dir.to_path_buf(),
        assets,
    })
}

/// Companion frame table of a grid image: `<dir>/<base>.csv`, where `<base>`
/// is the last segment of the grid's base name.
pub fn companion_table(image_path: &Path, base_name: &str) -> PathBuf {
    let stem = base_name.rsplit('/').next().unwrap_or(base_name);
    let file = format!("{}.{}", stem, FRAME_TABLE_EXTENSION);
    match image_path.parent() {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    }
}
