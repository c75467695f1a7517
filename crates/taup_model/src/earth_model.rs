//! Earth-model layer (C4): depth ↔ slowness search over a single wave
//! type's sampled model, with low-velocity-zone handling.

use crate::error::ModelError;
use crate::tolerances::Tolerances;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// One sampled (flat depth, normalized slowness) pair of a wave-type model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelSample {
    /// Flat-Earth depth `z_f = ln(r/R)`. Decreases (more negative) with
    /// increasing true depth; `f64::NEG_INFINITY` marks the Earth's center.
    pub z_flat: f64,
    /// Normalized slowness at this sample.
    pub p: f64,
    /// Index into the wave type's up-going table, or `None` if this sample
    /// has no up-going record.
    pub upgoing_index: Option<usize>,
}

/// The mutable state `find_slowness`/`find_depth` leave behind between
/// calls, read by `find_max_slowness` and by branch depth correction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LastFound {
    pub index: usize,
    pub z_flat: f64,
    pub p: f64,
    pub on_grid_point: bool,
}

/// A single wave type's sampled model plus the search cursor left by the
/// last `find_slowness`/`find_depth` call.
///
/// The sample array itself is immutable once built and safe to share across
/// sessions by reference; the search cursor is interior-mutable so that a
/// session can drive repeated searches through a shared `&EarthModel`
/// without needing exclusive access. Per the session's single-threaded
/// contract, no two sessions should drive searches on the same
/// `EarthModel` concurrently.
#[derive(Debug)]
pub struct EarthModel {
    samples: Vec<ModelSample>,
    tolerances: Tolerances,
    last_found: RefCell<LastFound>,
}

impl EarthModel {
    /// Build a model from samples already ordered by decreasing slowness
    /// (increasing depth), as produced by the table generator.
    pub fn new(samples: Vec<ModelSample>, tolerances: Tolerances) -> Result<Self, ModelError> {
        if samples.is_empty() {
            return Err(ModelError::InvalidBranchData(
                "earth model requires at least one sample".into(),
            ));
        }
        Ok(Self {
            samples,
            tolerances,
            last_found: RefCell::new(LastFound::default()),
        })
    }

    pub fn samples(&self) -> &[ModelSample] {
        &self.samples
    }

    pub fn last_found(&self) -> LastFound {
        *self.last_found.borrow()
    }

    /// Locate the model interval bracketing flat depth `z` and return the
    /// slowness there, interpolating in `(e^z - e^{z_{k-1}}) / (e^{z_k} -
    /// e^{z_{k-1}})` when `z` falls strictly between two grid points.
    pub fn find_slowness(&self, z: f64) -> Result<f64, ModelError> {
        let n = self.samples.len();
        let deepest = self.samples[n - 1].z_flat;
        if z < deepest && (deepest - z) > self.tolerances.eps_z {
            return Err(ModelError::DepthTooDeep { z_flat: z });
        }

        // z_flat is non-increasing with index; find the first index whose
        // z_flat is <= z (the lower bound of the bracketing interval).
        let mut k = 0usize;
        while k < n && self.samples[k].z_flat > z {
            k += 1;
        }
        let k = k.min(n - 1);

        if (self.samples[k].z_flat - z).abs() < self.tolerances.eps_z {
            let found = LastFound {
                index: k,
                z_flat: z,
                p: self.samples[k].p,
                on_grid_point: true,
            };
            *self.last_found.borrow_mut() = found;
            return Ok(found.p);
        }

        if k == 0 {
            // z is above the shallowest sample; extrapolate from the first
            // interval rather than failing.
            let k = 1.min(n - 1);
            return self.interpolate_between(0, k, z);
        }

        let p = self.interpolate_between(k - 1, k, z)?;
        Ok(p)
    }

    fn interpolate_between(&self, lo: usize, hi: usize, z: f64) -> Result<f64, ModelError> {
        let z_lo = self.samples[lo].z_flat;
        let z_hi = self.samples[hi].z_flat;
        let p_lo = self.samples[lo].p;
        let p_hi = self.samples[hi].p;

        if z_lo.is_infinite() || z_hi.is_infinite() {
            // One side touches the center record; hold the nearer sample's
            // slowness rather than evaluating e^{-inf}.
            let p = if (z - z_lo).abs() < (z - z_hi).abs() {
                p_lo
            } else {
                p_hi
            };
            *self.last_found.borrow_mut() = LastFound {
                index: hi,
                z_flat: z,
                p,
                on_grid_point: false,
            };
            return Ok(p);
        }

        let e_lo = z_lo.exp();
        let e_hi = z_hi.exp();
        let denom = e_hi - e_lo;
        if denom == 0.0 {
            return Err(ModelError::InvalidBranchData(
                "degenerate model interval (zero flat-depth span)".into(),
            ));
        }
        let frac = (z.exp() - e_lo) / denom;
        let p = p_lo + (p_hi - p_lo) * frac;

        *self.last_found.borrow_mut() = LastFound {
            index: hi,
            z_flat: z,
            p,
            on_grid_point: false,
        };
        Ok(p)
    }

    /// Locate the first model interval bracketing slowness `p`, scanning
    /// from the surface down when `top_of_lvz` (used to land on the
    /// shallow branch of a low-velocity zone) or from the center up
    /// otherwise, and invert the flat-Earth mapping logarithmically.
    pub fn find_depth(&self, p: f64, top_of_lvz: bool) -> Result<f64, ModelError> {
        let n = self.samples.len();
        if n < 2 {
            let z = self.samples[0].z_flat;
            *self.last_found.borrow_mut() = LastFound {
                index: 0,
                z_flat: z,
                p: self.samples[0].p,
                on_grid_point: true,
            };
            return Ok(z);
        }

        let indices: Box<dyn Iterator<Item = usize>> = if top_of_lvz {
            Box::new(0..n - 1)
        } else {
            Box::new((0..n - 1).rev())
        };

        for i in indices {
            let (lo, hi) = (i, i + 1);
            let p_lo = self.samples[lo].p;
            let p_hi = self.samples[hi].p;
            let (pmin, pmax) = if p_lo <= p_hi { (p_lo, p_hi) } else { (p_hi, p_lo) };
            if p < pmin - self.tolerances.eps_z || p > pmax + self.tolerances.eps_z {
                continue;
            }
            if (p - p_lo).abs() < self.tolerances.eps_z {
                let z = self.samples[lo].z_flat;
                *self.last_found.borrow_mut() = LastFound {
                    index: lo,
                    z_flat: z,
                    p,
                    on_grid_point: true,
                };
                return Ok(z);
            }
            if (p - p_hi).abs() < self.tolerances.eps_z {
                let z = self.samples[hi].z_flat;
                *self.last_found.borrow_mut() = LastFound {
                    index: hi,
                    z_flat: z,
                    p,
                    on_grid_point: true,
                };
                return Ok(z);
            }
            if p_hi == p_lo {
                continue;
            }
            let z_lo = self.samples[lo].z_flat;
            let z_hi = self.samples[hi].z_flat;
            if z_lo.is_infinite() || z_hi.is_infinite() {
                continue;
            }
            let frac = (p - p_lo) / (p_hi - p_lo);
            let e_lo = z_lo.exp();
            let e_hi = z_hi.exp();
            let z = (e_lo + frac * (e_hi - e_lo)).ln();
            *self.last_found.borrow_mut() = LastFound {
                index: hi,
                z_flat: z,
                p,
                on_grid_point: false,
            };
            return Ok(z);
        }

        Err(ModelError::InvalidBranchData(format!(
            "no model interval brackets slowness {p}"
        )))
    }

    /// Minimum slowness among samples from the surface down to the last
    /// located depth (inclusive): the smallest slowness "above" the current
    /// source, used to detect whether the source sits inside an LVZ.
    pub fn find_max_slowness(&self) -> f64 {
        let found = self.last_found.borrow();
        self.samples[..=found.index]
            .iter()
            .map(|s| s.p)
            .fold(f64::INFINITY, f64::min)
    }
}
