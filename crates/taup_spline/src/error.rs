//! Error types for spline construction and solving.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from building a branch's spline basis or solving for distance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum SplineError {
    /// Fewer than one grid point was supplied.
    EmptyGrid,
    /// The p-grid was not strictly monotonic.
    NotMonotonic,
    /// The penta-diagonal system was singular (a pivot vanished).
    Degenerate,
    /// A solved value was non-finite (NaN/infinite).
    NonFinite,
}

impl Display for SplineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "spline grid must have at least one point"),
            Self::NotMonotonic => write!(f, "spline grid is not strictly monotonic"),
            Self::Degenerate => write!(f, "penta-diagonal system is singular"),
            Self::NonFinite => write!(f, "spline solve produced a non-finite value"),
        }
    }
}

impl Error for SplineError {}
