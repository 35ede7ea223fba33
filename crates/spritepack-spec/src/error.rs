//! Error types shared across the pipeline.

use serde::Serialize;
use thiserror::Error;

/// Failure taxonomy for a packing run.
///
/// Every crate-level error maps onto exactly one kind. The kind decides
/// whether a failure is recovered locally or aborts the run, and which exit
/// code the CLI reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Pre-flight check failed (e.g. vector assets present, no export tool).
    UnsupportedEnvironment,
    /// An asset name contains the grid delimiter but does not parse.
    InvalidNamingGrammar,
    /// A companion frame table is malformed or references tiles outside the grid.
    InvalidFrameTable,
    /// Two sprites resolved to the same logical name.
    DuplicateSpriteName,
    /// The source directory produced no sprites.
    EmptyInput,
    /// The external export tool exited with a non-zero status for one layer.
    ExternalToolFailure,
    /// The external export tool never produced its output file.
    ExternalToolTimeout,
    /// A sprite cannot fit any sheet of the configured maximum size.
    PackingInfeasible,
    /// Reading or writing a file failed.
    IoFailure,
}

impl ErrorKind {
    /// Returns the snake_case identifier for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnsupportedEnvironment => "unsupported_environment",
            ErrorKind::InvalidNamingGrammar => "invalid_naming_grammar",
            ErrorKind::InvalidFrameTable => "invalid_frame_table",
            ErrorKind::DuplicateSpriteName => "duplicate_sprite_name",
            ErrorKind::EmptyInput => "empty_input",
            ErrorKind::ExternalToolFailure => "external_tool_failure",
            ErrorKind::ExternalToolTimeout => "external_tool_timeout",
            ErrorKind::PackingInfeasible => "packing_infeasible",
            ErrorKind::IoFailure => "io_failure",
        }
    }

    /// Returns true for failures caused by the source tree or the run's
    /// configuration rather than by the pipeline's own work.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ErrorKind::UnsupportedEnvironment
                | ErrorKind::InvalidNamingGrammar
                | ErrorKind::InvalidFrameTable
                | ErrorKind::DuplicateSpriteName
                | ErrorKind::EmptyInput
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Common trait for backend errors.
///
/// This trait provides a unified interface for error reporting across all
/// crates of the workspace. Each error type implements it so the CLI can
/// print a stable code, pick an exit status, and group failures.
///
/// # Example
///
/// ```ignore
/// use spritepack_spec::error::BackendError;
///
/// fn handle_error<E: BackendError>(err: E) {
///     eprintln!("[{}] {}", err.code(), err.message());
/// }
/// ```
pub trait BackendError: std::error::Error {
    /// Get the error code for reporting.
    ///
    /// Returns a static string like "SPEC_001" or "PACK_002". These codes are
    /// stable and can be used for programmatic error handling.
    fn code(&self) -> &'static str;

    /// Get a human-readable message describing the error.
    fn message(&self) -> String {
        self.to_string()
    }

    /// Get the error category for grouping related errors.
    ///
    /// Returns a category like "spec", "texture", "inkscape".
    fn category(&self) -> &'static str;

    /// Get the taxonomy kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// Errors raised while interpreting asset names and companion tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// The asset name uses the grid delimiter but does not match the grammar.
    #[error("Invalid image name '{name}': {reason}")]
    InvalidNamingGrammar { name: String, reason: String },

    /// A frame table line could not be interpreted.
    #[error("Invalid frame table '{table}' at line {line}: {message}")]
    InvalidFrameTable {
        table: String,
        line: usize,
        message: String,
    },

    /// Two sprites share one logical name.
    #[error("Duplicate sprite name '{name}' (produced by '{first}' and '{second}')")]
    DuplicateSpriteName {
        name: String,
        first: String,
        second: String,
    },
}

impl SpecError {
    /// Creates a new naming grammar error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidNamingGrammar {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a new frame table error.
    pub fn invalid_table(table: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self::InvalidFrameTable {
            table: table.into(),
            line,
            message: message.into(),
        }
    }
}

impl BackendError for SpecError {
    fn code(&self) -> &'static str {
        match self {
            SpecError::InvalidNamingGrammar { .. } => "SPEC_001",
            SpecError::InvalidFrameTable { .. } => "SPEC_002",
            SpecError::DuplicateSpriteName { .. } => "SPEC_003",
        }
    }

    fn category(&self) -> &'static str {
        "spec"
    }

    fn kind(&self) -> ErrorKind {
        match self {
            SpecError::InvalidNamingGrammar { .. } => ErrorKind::InvalidNamingGrammar,
            SpecError::InvalidFrameTable { .. } => ErrorKind::InvalidFrameTable,
            SpecError::DuplicateSpriteName { .. } => ErrorKind::DuplicateSpriteName,
        }
    }
}
