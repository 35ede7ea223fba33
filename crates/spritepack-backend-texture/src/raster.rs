//! Raster asset decoding.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use spritepack_spec::{BackendError, ErrorKind};
use thiserror::Error;

/// File extensions recognized as raster assets (lowercase).
pub const RASTER_EXTENSIONS: &[&str] = &["png", "bmp", "jpg", "jpeg"];

/// Returns true if `ext` names a supported raster format.
pub fn is_raster_extension(ext: &str) -> bool {
    let ext = ext.to_ascii_lowercase();
    RASTER_EXTENSIONS.contains(&ext.as_str())
}

/// Errors from loading raster assets.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode '{}': {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl BackendError for RasterError {
    fn code(&self) -> &'static str {
        match self {
            RasterError::Read { .. } => "RASTER_001",
            RasterError::Decode { .. } => "RASTER_002",
        }
    }

    fn category(&self) -> &'static str {
        "texture"
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::IoFailure
    }
}

/// Loads a raster file and converts it to 8-bit RGBA.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, RasterError> {
    let bytes = std::fs::read(path).map_err(|source| RasterError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode_rgba(&bytes, path)
}

/// Decodes in-memory raster bytes to 8-bit RGBA.
///
/// `path` is only used for error reporting.
pub fn decode_rgba(bytes: &[u8], path: &Path) -> Result<RgbaImage, RasterError> {
    let decoded = image::load_from_memory(bytes).map_err(|source| RasterError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decoded.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::png::{write_rgba, PngConfig};
    use image::Rgba;

    #[test]
    fn test_extensions() {
        assert!(is_raster_extension("png"));
        assert!(is_raster_extension("PNG"));
        assert!(is_raster_extension("jpeg"));
        assert!(!is_raster_extension("svg"));
        assert!(!is_raster_extension("csv"));
    }

    #[test]
    fn test_load_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        let image = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 40]));
        write_rgba(&image, &path, &PngConfig::default()).unwrap();

        let loaded = load_rgba(&path).unwrap();
        assert_eq!(loaded, image);
    }

    #[test]
    fn test_missing_and_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.png");
        assert!(matches!(
            load_rgba(&missing),
            Err(RasterError::Read { .. })
        ));

        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"not an image").unwrap();
        let err = load_rgba(&corrupt).unwrap_err();
        assert!(matches!(err, RasterError::Decode { .. }));
        assert_eq!(err.code(), "RASTER_002");
    }
}
