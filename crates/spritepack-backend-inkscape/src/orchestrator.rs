//! Inkscape subprocess orchestrator.
//!
//! Each top-level layer of a drawing is exported to its own PNG inside a
//! private temporary directory, decoded, and deleted again.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use spritepack_backend_texture::{load_rgba, Sprite};
use spritepack_spec::naming::sanitize_layer_label;

use crate::error::{InkscapeError, InkscapeResult};
use crate::retry::RetryPolicy;
use crate::svg::{scan_layers, VectorLayer};

/// Environment variable overriding the Inkscape executable.
pub const INKSCAPE_PATH_ENV: &str = "INKSCAPE_PATH";

/// Configuration for vector layer extraction.
#[derive(Debug, Clone, Default)]
pub struct InkscapeConfig {
    /// Path to the Inkscape executable.
    pub inkscape_path: Option<PathBuf>,
    /// Polling and cleanup policy.
    pub retry: RetryPolicy,
    /// Treat a failed layer export as fatal instead of skipping the layer.
    pub fail_on_export_error: bool,
}

impl InkscapeConfig {
    /// Sets the Inkscape executable path.
    pub fn inkscape_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.inkscape_path = Some(path.into());
        self
    }

    /// Sets the retry policy.
    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Makes failed layer exports fatal.
    pub fn fail_on_export_error(mut self, fatal: bool) -> Self {
        self.fail_on_export_error = fatal;
        self
    }
}

/// Finds the Inkscape executable path.
///
/// Search order: the explicit path, `INKSCAPE_PATH`, `PATH`, then common
/// installation locations.
pub fn find_inkscape(explicit: Option<&Path>) -> InkscapeResult<PathBuf> {
    // Check config override first
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(path.to_path_buf());
        }
    }

    if let Ok(path) = std::env::var(INKSCAPE_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Ok(path);
        }
    }

    let names = if cfg!(windows) {
        vec!["inkscape.com", "inkscape.exe", "inkscape"]
    } else {
        vec!["inkscape"]
    };

    for name in names {
        if let Ok(path) = which::which(name) {
            return Ok(path);
        }
    }

    let common_paths = if cfg!(windows) {
        vec![
            "C:\\Program Files\\Inkscape\\bin\\inkscape.com",
            "C:\\Program Files\\Inkscape\\bin\\inkscape.exe",
            "C:\\Program Files\\Inkscape\\inkscape.com",
            "C:\\Program Files (x86)\\Inkscape\\bin\\inkscape.exe",
        ]
    } else if cfg!(target_os = "macos") {
        vec![
            "/Applications/Inkscape.app/Contents/MacOS/inkscape",
            "/opt/homebrew/bin/inkscape",
            "/usr/local/bin/inkscape",
        ]
    } else {
        vec![
            "/usr/bin/inkscape",
            "/usr/local/bin/inkscape",
            "/snap/bin/inkscape",
            "/var/lib/flatpak/exports/bin/org.inkscape.Inkscape",
        ]
    };

    for path_str in common_paths {
        let path = PathBuf::from(path_str);
        if path.exists() {
            return Ok(path);
        }
    }

    Err(InkscapeError::InkscapeNotFound)
}

/// One layer export to perform.
#[derive(Debug, Clone, Copy)]
pub struct ExportRequest<'a> {
    /// Drawing to export from.
    pub svg: &'a Path,
    /// Element id of the layer.
    pub layer_id: &'a str,
    /// Where the PNG should be written.
    pub output: &'a Path,
}

/// Exit information of one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportStatus {
    /// Exit code, or -1 when terminated by a signal.
    pub exit_code: i32,
    /// Captured standard error.
    pub stderr: String,
}

impl ExportStatus {
    pub fn success() -> Self {
        Self {
            exit_code: 0,
            stderr: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// One-line description used when a layer is skipped.
    pub fn describe(&self) -> String {
        if self.stderr.is_empty() {
            format!("exit status {}", self.exit_code)
        } else {
            format!("exit status {}: {}", self.exit_code, self.stderr)
        }
    }
}

/// Rasterizes a single layer of a drawing.
pub trait LayerExporter {
    /// Runs one export. `Err` means the exporter could not be run at all.
    fn export(&self, request: &ExportRequest<'_>) -> InkscapeResult<ExportStatus>;
}

impl<E: LayerExporter + ?Sized> LayerExporter for &E {
    fn export(&self, request: &ExportRequest<'_>) -> InkscapeResult<ExportStatus> {
        (**self).export(request)
    }
}

/// The real Inkscape command-line exporter.
#[derive(Debug, Clone)]
pub struct InkscapeCli {
    executable: PathBuf,
}

impl InkscapeCli {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    /// Resolves the executable with [`find_inkscape`].
    pub fn locate(explicit: Option<&Path>) -> InkscapeResult<Self> {
        find_inkscape(explicit).map(Self::new)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Builds the export command line.
    ///
    /// `inkscape <svg> --export-area-drawing --export-type=png
    /// --export-id-only --export-id=<id> --export-filename=<output>`
    pub fn command(&self, request: &ExportRequest<'_>) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.arg(request.svg)
            .arg("--export-area-drawing")
            .arg("--export-type=png")
            .arg("--export-id-only")
            .arg(format!("--export-id={}", request.layer_id))
            .arg(format!("--export-filename={}", request.output.display()));
        cmd
    }

    /// Queries `inkscape --version`.
    pub fn version(&self) -> InkscapeResult<String> {
        let output = Command::new(&self.executable)
            .arg("--version")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(InkscapeError::SpawnFailed)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl LayerExporter for InkscapeCli {
    fn export(&self, request: &ExportRequest<'_>) -> InkscapeResult<ExportStatus> {
        // Stdout stays unpiped so a chatty Inkscape cannot fill the pipe
        let output = self
            .command(request)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(InkscapeError::SpawnFailed)?;

        Ok(ExportStatus {
            exit_code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

/// Sprite name part for a layer: its sanitized label, else its sanitized id.
fn sprite_suffix(layer: &VectorLayer, index: usize) -> String {
    [&layer.label, &layer.id]
        .into_iter()
        .map(|text| sanitize_layer_label(text))
        .find(|text| !text.trim().is_empty())
        .unwrap_or_else(|| format!("layer{index}"))
}

/// A layer that was skipped after a failed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLayer {
    pub svg: PathBuf,
    pub layer: String,
    pub reason: String,
}

/// Sprites extracted from one drawing.
#[derive(Debug, Default)]
pub struct ExtractedLayers {
    /// One sprite per exported layer, in document order.
    pub sprites: Vec<Sprite>,
    /// Layers whose export failed.
    pub skipped: Vec<SkippedLayer>,
    /// Non-fatal cleanup problems.
    pub warnings: Vec<String>,
}

/// Turns the layers of vector drawings into sprites.
pub struct LayerExtractor<E> {
    exporter: E,
    retry: RetryPolicy,
    fail_on_export_error: bool,
}

impl<E: LayerExporter> LayerExtractor<E> {
    pub fn new(exporter: E, config: &InkscapeConfig) -> Self {
        Self {
            exporter,
            retry: config.retry,
            fail_on_export_error: config.fail_on_export_error,
        }
    }

    /// Exports every top-level layer of `svg_path`.
    ///
    /// Sprites are named `<logical_name>/<sanitized label>`. A label that
    /// sanitizes to nothing falls back to the layer id.
    pub fn extract(&self, svg_path: &Path, logical_name: &str) -> InkscapeResult<ExtractedLayers> {
        let text =
            std::fs::read_to_string(svg_path).map_err(|source| InkscapeError::ReadSvgFailed {
                path: svg_path.to_path_buf(),
                source,
            })?;
        let layers = scan_layers(&text);

        let mut extracted = ExtractedLayers::default();
        if layers.is_empty() {
            return Ok(extracted);
        }

        let temp_dir = tempfile::Builder::new()
            .prefix("spritepack_layers_")
            .tempdir()?;

        for (index, layer) in layers.iter().enumerate() {
            let output = temp_dir.path().join(format!("layer_{index}.png"));
            let result = self.export_layer(svg_path, layer, &output);
            self.remove_temp(&output, &mut extracted.warnings);

            match result? {
                Ok(image) => extracted.sprites.push(Sprite::new(
                    format!("{}/{}", logical_name, sprite_suffix(layer, index)),
                    image,
                )),
                Err(status) => extracted.skipped.push(SkippedLayer {
                    svg: svg_path.to_path_buf(),
                    layer: layer.label.clone(),
                    reason: status.describe(),
                }),
            }
        }

        let dir_path = temp_dir.path().to_path_buf();
        if let Err(err) = temp_dir.close() {
            extracted.warnings.push(format!(
                "Could not remove temporary directory '{}': {}",
                dir_path.display(),
                err
            ));
        }

        Ok(extracted)
    }

    /// The inner `Err` carries the status of a skipped layer.
    fn export_layer(
        &self,
        svg_path: &Path,
        layer: &VectorLayer,
        output: &Path,
    ) -> InkscapeResult<Result<image::RgbaImage, ExportStatus>> {
        let request = ExportRequest {
            svg: svg_path,
            layer_id: &layer.id,
            output,
        };
        let status = self.exporter.export(&request)?;

        if !status.is_success() {
            if self.fail_on_export_error {
                return Err(InkscapeError::export_failed(
                    svg_path,
                    &layer.label,
                    status.exit_code,
                    status.stderr,
                ));
            }
            return Ok(Err(status));
        }

        if !self.retry.wait_for(|| output.exists()) {
            return Err(InkscapeError::ExportTimeout {
                svg: svg_path.to_path_buf(),
                layer: layer.label.clone(),
                attempts: self.retry.max_attempts,
            });
        }

        load_rgba(output)
            .map(Ok)
            .map_err(|source| InkscapeError::LoadExport {
                layer: layer.label.clone(),
                source,
            })
    }

    fn remove_temp(&self, path: &Path, warnings: &mut Vec<String>) {
        let result = self.retry.run(|_| match std::fs::remove_file(path) {
            Err(err) if err.kind() != IoErrorKind::NotFound => Err(err),
            _ => Ok(()),
        });
        if let Err(err) = result {
            warnings.push(format!(
                "Could not delete temporary file '{}': {}",
                path.display(),
                err
            ));
        }
    }
}
