//! Error types for depth-correcting and evaluating a branch.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from depth-correcting a branch or inverting it for a target
/// distance.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BranchError {
    /// The depth-corrected spline basis was singular (the branch's active
    /// p-range collapsed to a degenerate grid).
    InterpolationDegenerate(String),
    /// A tau/distance integral evaluated to a non-finite value while
    /// depth-correcting a branch.
    TauIntegralFailure(String),
}

impl Display for BranchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InterpolationDegenerate(msg) => write!(f, "interpolation degenerate: {msg}"),
            Self::TauIntegralFailure(msg) => write!(f, "tau integral failure: {msg}"),
        }
    }
}

impl Error for BranchError {}

impl From<taup_spline::SplineError> for BranchError {
    fn from(e: taup_spline::SplineError) -> Self {
        match e {
            taup_spline::SplineError::NonFinite => Self::TauIntegralFailure(e.to_string()),
            _ => {
                log::warn!("branch spline basis degenerate, branch will be disabled: {e}");
                Self::InterpolationDegenerate(e.to_string())
            }
        }
    }
}
