//! SpritePack Inkscape Backend
//!
//! Rasterizes vector drawings one layer at a time by driving Inkscape as a
//! subprocess. Each top-level layer of a drawing becomes one sprite named
//! `<drawing>/<layer label>`.
//!
//! # Example
//!
//! ```no_run
//! use spritepack_backend_inkscape::{InkscapeCli, InkscapeConfig, LayerExtractor};
//! use std::path::Path;
//!
//! let config = InkscapeConfig::default();
//! let cli = InkscapeCli::locate(config.inkscape_path.as_deref())?;
//! let extractor = LayerExtractor::new(cli, &config);
//!
//! let extracted = extractor.extract(Path::new("art/hero.svg"), "art/hero")?;
//! for sprite in &extracted.sprites {
//!     println!("{} ({}x{})", sprite.name, sprite.width(), sprite.height());
//! }
//! # Ok::<(), spritepack_backend_inkscape::InkscapeError>(())
//! ```
//!
//! # Inkscape Requirements
//!
//! Inkscape 1.x is required. The executable is searched for in:
//!
//! 1. The explicitly configured path
//! 2. `INKSCAPE_PATH` environment variable
//! 3. System PATH
//! 4. Common installation locations (platform-specific)
//!
//! # Crate Structure
//!
//! - [`svg`] - Top-level layer discovery
//! - [`orchestrator`] - Inkscape subprocess management and extraction
//! - [`retry`] - Bounded polling and cleanup retries
//! - [`error`] - Error types

pub mod error;
pub mod orchestrator;
pub mod retry;
pub mod svg;

pub use error::{InkscapeError, InkscapeResult};
pub use orchestrator::{
    find_inkscape, ExportRequest, ExportStatus, ExtractedLayers, InkscapeCli, InkscapeConfig,
    LayerExporter, LayerExtractor, SkippedLayer, INKSCAPE_PATH_ENV,
};
pub use retry::RetryPolicy;
pub use svg::{scan_layers, VectorLayer};
