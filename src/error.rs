//! Error and warning types shared across the crate.

use std::fmt;
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Errors surfaced by strand generation, loading, configuration and rendering
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FurError {
    #[error("Degenerate (zero-length) normal at vertex {vertex}")]
    DegenerateNormal { vertex: usize },
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),
    #[error("Asset load failed: {0}")]
    AssetLoad(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Render error: {0}")]
    Render(String),
}

pub type FurResult<T> = Result<T, FurError>;

impl From<FurError> for JsValue {
    fn from(err: FurError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Non-fatal conditions reported alongside a successful result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FurWarning {
    /// No mesh exposes both positions and normals; no fur is generated.
    NoEligibleMesh,
    /// Zero-length normals replaced by the up vector.
    DegenerateNormalsSubstituted { count: usize },
    /// Vertices with zero-length normals emitted no strand.
    DegenerateNormalsSkipped { count: usize },
}

impl fmt::Display for FurWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FurWarning::NoEligibleMesh => {
                write!(f, "no mesh with both position and normal attributes, rendering without fur")
            }
            FurWarning::DegenerateNormalsSubstituted { count } => {
                write!(f, "{} zero-length normals replaced by the up vector", count)
            }
            FurWarning::DegenerateNormalsSkipped { count } => {
                write!(f, "{} vertices with zero-length normals skipped", count)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FurError::DegenerateNormal { vertex: 7 };
        assert_eq!(err.to_string(), "Degenerate (zero-length) normal at vertex 7");

        let err = FurError::AssetLoad("404".into());
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_warning_display() {
        let w = FurWarning::DegenerateNormalsSkipped { count: 3 };
        assert_eq!(w.to_string(), "3 vertices with zero-length normals skipped");
    }
}
