//! Deterministic PNG writer.
//!
//! Uses fixed compression settings so that the same sheet raster always
//! encodes to byte-identical output.

use std::io::Write;
use std::path::Path;

use image::RgbaImage;
use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use spritepack_spec::{BackendError, ErrorKind};
use thiserror::Error;

/// Errors from PNG operations.
#[derive(Debug, Error)]
pub enum PngError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PNG encoding error: {0}")]
    Encoding(#[from] png::EncodingError),
}

impl BackendError for PngError {
    fn code(&self) -> &'static str {
        match self {
            PngError::Io(_) => "PNG_001",
            PngError::Encoding(_) => "PNG_002",
        }
    }

    fn category(&self) -> &'static str {
        "texture"
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::IoFailure
    }
}

/// PNG export configuration for deterministic output.
#[derive(Debug, Clone)]
pub struct PngConfig {
    /// Compression level. Use a fixed value for determinism.
    pub compression: Compression,
    /// Filter type. Use a fixed value for determinism.
    pub filter: FilterType,
}

impl Default for PngConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Default,
            // Adaptive filtering picks per-row filters; a fixed filter keeps output stable
            filter: FilterType::NoFilter,
        }
    }
}

/// Write an RGBA image to a PNG file.
pub fn write_rgba(image: &RgbaImage, path: &Path, config: &PngConfig) -> Result<(), PngError> {
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);

    write_rgba_to_writer(image, writer, config)
}

/// Write an RGBA image to any writer.
pub fn write_rgba_to_writer<W: Write>(
    image: &RgbaImage,
    writer: W,
    config: &PngConfig,
) -> Result<(), PngError> {
    let mut encoder = Encoder::new(writer, image.width(), image.height());
    encoder.set_color(ColorType::Rgba);
    encoder.set_depth(BitDepth::Eight);
    encoder.set_compression(config.compression);
    encoder.set_filter(config.filter);

    // The png crate writes no timestamps or other variable chunks
    let mut png_writer = encoder.write_header()?;
    png_writer.write_image_data(image.as_raw())?;

    Ok(())
}

/// Compute the BLAKE3 hash of PNG data.
pub fn hash_png(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Write to a Vec<u8> and return the hash.
pub fn write_rgba_to_vec_with_hash(
    image: &RgbaImage,
    config: &PngConfig,
) -> Result<(Vec<u8>, String), PngError> {
    let mut data = Vec::new();
    write_rgba_to_writer(image, &mut data, config)?;
    let hash = hash_png(&data);
    Ok((data, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(size: u32) -> RgbaImage {
        RgbaImage::from_fn(size, size, |x, y| {
            Rgba([(x * 4) as u8, (y * 4) as u8, 128, 255])
        })
    }

    #[test]
    fn test_rgba_deterministic() {
        let image = gradient(64);
        let config = PngConfig::default();

        let (data1, hash1) = write_rgba_to_vec_with_hash(&image, &config).unwrap();
        let (data2, hash2) = write_rgba_to_vec_with_hash(&image, &config).unwrap();

        assert_eq!(data1, data2, "PNG data should be identical");
        assert_eq!(hash1, hash2, "PNG hashes should be identical");
    }

    #[test]
    fn test_png_decodes_back() {
        let image = gradient(16);
        let config = PngConfig {
            compression: Compression::Best,
            filter: FilterType::Paeth,
        };
        let (data, _) = write_rgba_to_vec_with_hash(&image, &config).unwrap();

        let decoded = image::load_from_memory(&data).unwrap().to_rgba8();
        assert_eq!(decoded, image);
    }

    #[test]
    fn test_write_rgba_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheet.png");
        write_rgba(&gradient(8), &path, &PngConfig::default()).unwrap();
        assert!(path.exists());
    }
}
