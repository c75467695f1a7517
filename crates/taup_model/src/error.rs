//! Error types for model loading, search, and serialization.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors produced while reading, searching, or caching an Earth model.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ModelError {
    /// A model file (legacy header/table, topography grid, cache blob) could
    /// not be opened or read.
    ModelReadFailure(String),
    /// A file was readable but its contents did not match the expected
    /// schema (bad record framing, wrong counts, truncated record).
    MalformedFile(String),
    /// A cached snapshot's format version or shape didn't match what this
    /// build expects. Treated as a cache miss, not a fatal error.
    SerializationMismatch(String),
    /// `find_slowness` was asked for a depth below the deepest tabulated
    /// sample.
    DepthTooDeep { z_flat: f64 },
    /// A branch's p-grid or tau array was empty, non-monotonic, or
    /// otherwise failed to build a spline basis.
    InvalidBranchData(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModelReadFailure(msg) => write!(f, "model read failure: {msg}"),
            Self::MalformedFile(msg) => write!(f, "malformed model file: {msg}"),
            Self::SerializationMismatch(msg) => write!(f, "serialization mismatch: {msg}"),
            Self::DepthTooDeep { z_flat } => {
                write!(f, "depth too deep: flat depth {z_flat} below deepest sample")
            }
            Self::InvalidBranchData(msg) => write!(f, "invalid branch data: {msg}"),
        }
    }
}

impl Error for ModelError {}

impl From<std::io::Error> for ModelError {
    fn from(e: std::io::Error) -> Self {
        Self::ModelReadFailure(e.to_string())
    }
}

impl From<taup_spline::SplineError> for ModelError {
    fn from(e: taup_spline::SplineError) -> Self {
        Self::InvalidBranchData(e.to_string())
    }
}
