//! Error types for session construction.
//!
//! `get_tt` itself is infallible: a branch whose root-finding misbehaves is
//! logged and skipped rather than aborting the whole call (see the
//! `get_tt`/`travel_times` implementation in `session.rs`), so only
//! construction-time failures are represented here.

use std::error::Error;
use std::fmt::{Display, Formatter};
use taup_branch::BranchError;
use taup_model::ModelError;

/// Errors from opening a model or starting a session against it.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum EngineError {
    /// The requested source depth fell outside `[0, z_max]` for this model.
    DepthOutOfRange { depth_km: f64 },
    /// One or more entries in a phase filter matched neither a branch nor a
    /// phase group.
    PhaseListInvalid(String),
    /// A tau/distance integral or spline setup produced a non-finite value
    /// while recomputing a branch for this session's depth.
    TauIntegralFailure(String),
    /// Propagated from loading or reading the underlying model.
    Model(ModelError),
    /// Propagated from recomputing a branch for this session's depth.
    Branch(BranchError),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DepthOutOfRange { depth_km } => {
                write!(f, "source depth {depth_km} km out of range for this model")
            }
            Self::PhaseListInvalid(msg) => write!(f, "invalid phase filter: {msg}"),
            Self::TauIntegralFailure(msg) => write!(f, "tau integral failure: {msg}"),
            Self::Model(e) => write!(f, "{e}"),
            Self::Branch(e) => write!(f, "{e}"),
        }
    }
}

impl Error for EngineError {}

impl From<ModelError> for EngineError {
    fn from(e: ModelError) -> Self {
        Self::Model(e)
    }
}

impl From<BranchError> for EngineError {
    fn from(e: BranchError) -> Self {
        match e {
            BranchError::TauIntegralFailure(msg) => Self::TauIntegralFailure(msg),
            other => Self::Branch(other),
        }
    }
}
