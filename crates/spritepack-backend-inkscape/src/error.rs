//! Error types for the Inkscape backend.

use spritepack_backend_texture::RasterError;
use spritepack_spec::{BackendError, ErrorKind};
use std::path::PathBuf;
use thiserror::Error;

/// Result type for Inkscape backend operations.
pub type InkscapeResult<T> = Result<T, InkscapeError>;

/// Errors that can occur during Inkscape backend operations.
#[derive(Debug, Error)]
pub enum InkscapeError {
    /// Inkscape executable not found.
    #[error("Inkscape executable not found. Ensure Inkscape is installed and in PATH, pass --inkscape-path, or set INKSCAPE_PATH environment variable")]
    InkscapeNotFound,

    /// Failed to spawn the Inkscape process.
    #[error("Failed to spawn Inkscape process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    /// Inkscape exited with non-zero status while exporting a layer.
    #[error("Inkscape failed to export layer '{layer}' of '{}' (status {exit_code}): {stderr}", .svg.display())]
    ExportFailed {
        svg: PathBuf,
        layer: String,
        exit_code: i32,
        stderr: String,
    },

    /// Inkscape reported success but the exported file never appeared.
    #[error("Inkscape export of layer '{layer}' of '{}' did not appear after {attempts} attempts", .svg.display())]
    ExportTimeout {
        svg: PathBuf,
        layer: String,
        attempts: u32,
    },

    /// Failed to read the vector source.
    #[error("Failed to read vector asset {}: {source}", .path.display())]
    ReadSvgFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to decode an exported layer.
    #[error("Failed to load exported layer '{layer}': {source}")]
    LoadExport {
        layer: String,
        #[source]
        source: RasterError,
    },

    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl InkscapeError {
    /// Creates a new export failed error.
    pub fn export_failed(
        svg: impl Into<PathBuf>,
        layer: impl Into<String>,
        exit_code: i32,
        stderr: impl Into<String>,
    ) -> Self {
        Self::ExportFailed {
            svg: svg.into(),
            layer: layer.into(),
            exit_code,
            stderr: stderr.into(),
        }
    }
}

impl BackendError for InkscapeError {
    fn code(&self) -> &'static str {
        match self {
            InkscapeError::InkscapeNotFound => "INKSCAPE_001",
            InkscapeError::SpawnFailed(_) => "INKSCAPE_002",
            InkscapeError::ExportFailed { .. } => "INKSCAPE_003",
            InkscapeError::ExportTimeout { .. } => "INKSCAPE_004",
            InkscapeError::ReadSvgFailed { .. } => "INKSCAPE_005",
            InkscapeError::LoadExport { .. } => "INKSCAPE_006",
            InkscapeError::Io(_) => "INKSCAPE_007",
        }
    }

    fn category(&self) -> &'static str {
        "inkscape"
    }

    fn kind(&self) -> ErrorKind {
        match self {
            InkscapeError::InkscapeNotFound => ErrorKind::UnsupportedEnvironment,
            InkscapeError::SpawnFailed(_) | InkscapeError::ExportFailed { .. } => {
                ErrorKind::ExternalToolFailure
            }
            InkscapeError::ExportTimeout { .. } => ErrorKind::ExternalToolTimeout,
            InkscapeError::ReadSvgFailed { .. }
            | InkscapeError::LoadExport { .. }
            | InkscapeError::Io(_) => ErrorKind::IoFailure,
        }
    }
}
