//! JSON output types for machine-readable CLI output.
//!
//! Printed by `pack --json` instead of the colored summary.

use serde::Serialize;
use spritepack_spec::BackendError;

use crate::pipeline::{PipelineError, PipelineReport};

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g., "PACK_001")
    pub code: String,
    /// Error kind in snake case (e.g., "packing_infeasible")
    pub kind: String,
    /// Human-readable error message
    pub message: String,
}

impl JsonError {
    pub fn new(
        code: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl From<&PipelineError> for JsonError {
    fn from(err: &PipelineError) -> Self {
        Self::new(err.code(), err.kind().as_str(), err.to_string())
    }
}

/// Output of `pack --json`.
#[derive(Debug, Clone, Serialize)]
pub struct PackOutput {
    pub success: bool,
    /// Run summary (on success)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PipelineReport>,
    /// Failure cause (on failure)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

impl PackOutput {
    pub fn success(report: PipelineReport) -> Self {
        Self {
            success: true,
            report: Some(report),
            error: None,
        }
    }

    pub fn failure(error: JsonError) -> Self {
        Self {
            success: false,
            report: None,
            error: Some(error),
        }
    }
}
