//! Depth-corrected branch evaluation (C8): the per-session mutable layer
//! that recomputes a surface-focus branch's active range for a source
//! depth and inverts it for a requested distance.

pub mod depth_corrected;
pub mod error;

pub use depth_corrected::{BranchArrival, DepthCorrectedBranch};
pub use error::BranchError;
