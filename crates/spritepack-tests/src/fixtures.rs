//! Test fixture utilities for creating synthetic source trees.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use spritepack_backend_texture::png::write_rgba;
use spritepack_backend_texture::PngConfig;
use spritepack_cli::pipeline::PipelineConfig;
use tempfile::TempDir;

/// Header row of companion frame tables.
pub const FRAME_TABLE_HEADER: &str = "name;start_col;start_row;col_count;row_count;fps;loop";

/// Color of tile `(col, row)` in images written by [`SourceTreeFixture::add_tile_sheet`].
pub fn tile_color(col: u32, row: u32) -> Rgba<u8> {
    Rgba([(col * 40 % 256) as u8, (row * 40 % 256) as u8, 120, 255])
}

/// A temporary project with a source directory and an output directory.
pub struct SourceTreeFixture {
    pub root: TempDir,
    pub source_dir: PathBuf,
    pub out_dir: PathBuf,
}

impl SourceTreeFixture {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let source_dir = root.path().join("assets");
        let out_dir = root.path().join("out");
        fs::create_dir_all(&source_dir).expect("Failed to create source dir");
        Self {
            root,
            source_dir,
            out_dir,
        }
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    /// Sheet path prefix inside the output directory.
    pub fn output(&self, name: &str) -> PathBuf {
        self.out_dir.join(name)
    }

    /// Pipeline settings writing `out/atlas.*`.
    pub fn config(&self) -> PipelineConfig {
        PipelineConfig::new(&self.source_dir, self.output("atlas"))
    }

    fn prepare(&self, rel: &str) -> PathBuf {
        let path = self.source_dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create asset dir");
        }
        path
    }

    /// Adds a solid-color PNG.
    pub fn add_png(&self, rel: &str, width: u32, height: u32, color: [u8; 4]) -> PathBuf {
        let path = self.prepare(rel);
        let image = RgbaImage::from_pixel(width, height, Rgba(color));
        write_rgba(&image, &path, &PngConfig::default()).expect("Failed to write PNG");
        path
    }

    /// Adds a tile sheet of `cols × rows` tiles, each filled with [`tile_color`].
    pub fn add_tile_sheet(
        &self,
        rel: &str,
        cols: u32,
        rows: u32,
        tile_w: u32,
        tile_h: u32,
    ) -> PathBuf {
        let path = self.prepare(rel);
        let image = RgbaImage::from_fn(cols * tile_w, rows * tile_h, |x, y| {
            tile_color(x / tile_w, y / tile_h)
        });
        write_rgba(&image, &path, &PngConfig::default()).expect("Failed to write PNG");
        path
    }

    /// Adds a companion frame table; `records` are data rows without the header.
    pub fn add_frame_table(&self, rel: &str, records: &[&str]) -> PathBuf {
        let path = self.prepare(rel);
        let mut text = String::from(FRAME_TABLE_HEADER);
        for record in records {
            text.push('\n');
            text.push_str(record);
        }
        text.push('\n');
        fs::write(&path, text).expect("Failed to write frame table");
        path
    }

    /// Adds an arbitrary file.
    pub fn add_file(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.prepare(rel);
        fs::write(&path, contents).expect("Failed to write file");
        path
    }

    /// Adds a drawing with one top-level layer per `(id, label)`.
    ///
    /// Labels are written verbatim; an empty label omits the attribute.
    pub fn add_svg(&self, rel: &str, layers: &[(&str, &str)]) -> PathBuf {
        let mut svg = String::from(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" \
             xmlns:inkscape=\"http://www.inkscape.org/namespaces/inkscape\">\n",
        );
        for (id, label) in layers {
            let label_attr = if label.is_empty() {
                String::new()
            } else {
                format!(" inkscape:label=\"{}\"", label)
            };
            svg.push_str(&format!(
                "  <g inkscape:groupmode=\"layer\" id=\"{}\"{}>\n    \
                 <rect width=\"4\" height=\"4\"/>\n  </g>\n",
                id, label_attr
            ));
        }
        svg.push_str("</svg>\n");
        self.add_file(rel, &svg)
    }
}

impl Default for SourceTreeFixture {
    fn default() -> Self {
        Self::new()
    }
}
