//! Tunable epsilon tolerances, exposed as documented constants with
//! defaults matching the reference implementation's hard-coded values.

use serde::{Deserialize, Serialize};

/// Epsilon tolerances used across the engine: grid-point snapping in depth
/// search (`eps_z`), root acceptance in branch inversion (`eps_x`), and
/// arrival deduplication in a session (`eps_t`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    pub eps_z: f64,
    pub eps_x: f64,
    pub eps_t: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            eps_z: 1e-7,
            eps_x: 1e-7,
            eps_t: 1e-6,
        }
    }
}
