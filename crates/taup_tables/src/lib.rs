//! Normalization constants, generalized-index tables, and bilinear
//! interpolation shared by every other `taup_*` crate.
//!
//! This is the leaf crate of the workspace: it has no internal dependencies,
//! mirroring how the teacher's time-scale crate sits below its frame and
//! engine crates.

pub mod bilinear;
pub mod conversions;
pub mod index;

pub use bilinear::{Table2D, bilinear_interpolate};
pub use conversions::{EARTH_RADIUS_KM, ModelConversions};
pub use index::{IndexMap, SampledIndex, UniformIndex};
