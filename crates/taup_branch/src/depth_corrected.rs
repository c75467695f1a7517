//! Depth-corrected branch evaluation (C8): per-session mutable view over a
//! surface-focus branch, root-finding for a target distance, and evaluation
//! of travel time and its derivatives.
//!
//! Distances and slownesses here are in the same normalized, nondimensional
//! units as the rest of the model (radians for angular distance); the
//! session layer converts to degrees at the API boundary.

use crate::error::BranchError;
use taup_model::{EarthModel, SurfaceFocusBranch, UpGoingTable};
use taup_spline::{SplineBasis, SplineSolution};
use taup_tables::{IndexMap, SampledIndex};

const MAX_NEWTON_ITERATIONS: usize = 16;

/// Linearly interpolate `values` sampled on `grid` at `p`, extrapolating
/// past the ends using the edge interval's slope.
fn interp_1d(grid: &[f64], values: &[f64], p: f64) -> f64 {
    if grid.len() == 1 {
        return values[0];
    }
    let index = SampledIndex::new(grid.to_vec());
    let frac = index.index_of(p);
    let n = values.len();
    let i0 = (frac.floor() as isize).clamp(0, n as isize - 2).max(0) as usize;
    let t = frac - i0 as f64;
    values[i0] + (values[i0 + 1] - values[i0]) * t
}

/// One raw arrival produced by inverting a depth-corrected branch for a
/// target distance, before corrections (C10) or arrival-record dressing
/// (C11) are applied.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchArrival {
    pub ray_parameter: f64,
    /// Delay time + p*distance, in normalized time units.
    pub tau_plus_p_delta: f64,
    /// dΔ/dp at the root, used to derive dt/dΔ = p and flag near-caustic
    /// arrivals.
    pub ddelta_dp: f64,
    pub is_back_branch: bool,
    pub is_diffracted: bool,
}

/// A surface-focus branch recomputed for one source depth.
pub struct DepthCorrectedBranch<'a> {
    branch: &'a SurfaceFocusBranch,
    enabled: bool,
    p_lo: f64,
    p_hi: f64,
    grid: Vec<f64>,
    tau: Vec<f64>,
    basis: SplineBasis,
    solution: SplineSolution,
    sign: f64,
}

impl<'a> DepthCorrectedBranch<'a> {
    /// Recompute `branch` for source depth `z_src_flat`, using `p_model`
    /// (the up-going leg's wave-type Earth model, already searched to
    /// `z_src_flat` by the caller) and `up_table` (that wave type's
    /// up-going table) to derive the up-going correction.
    pub fn build(
        branch: &'a SurfaceFocusBranch,
        p_model: &EarthModel,
        up_table: &UpGoingTable,
        z_src_flat: f64,
    ) -> Result<Self, BranchError> {
        let p_src = p_model.find_slowness(z_src_flat).map_err(|e| {
            BranchError::TauIntegralFailure(format!("source depth search failed: {e}"))
        })?;
        let p_src_min = p_model.find_max_slowness();

        let (p_min, p_max) = branch.p_range();
        let p_lo = p_min.max(p_src_min);
        let p_hi = p_max.min(p_src);

        if p_lo > p_hi {
            return Ok(Self {
                branch,
                enabled: false,
                p_lo,
                p_hi,
                grid: Vec::new(),
                tau: Vec::new(),
                basis: SplineBasis::build(&[0.0]).expect("single-point basis always builds"),
                solution: SplineSolution { g: vec![0.0], x: vec![0.0] },
                sign: branch.sign() as f64,
            });
        }

        let up = up_table.interpolate_at_depth(z_src_flat).map_err(|e| {
            BranchError::TauIntegralFailure(format!("up-going interpolation failed: {e}"))
        })?;
        let up_grid = &up_table.p_grid()[..up.tau.len()];

        let sign = branch.sign() as f64;
        let mantle_count = branch.mantle_count() as f64;
        let base = taup_spline::interpolate(branch.basis(), branch.tau(), branch.x_range().0, branch.x_range().1)?;

        let full_grid = branch.p_grid();
        let mut indices: Vec<usize> = (0..full_grid.len())
            .filter(|&i| {
                let p = full_grid[i];
                p >= p_lo - 1e-9 && p <= p_hi + 1e-9
            })
            .collect();
        if indices.len() < 2 {
            // Keep the two grid points bracketing the clipped range so the
            // spline still has a usable interval.
            indices = (0..full_grid.len()).collect();
        }

        let grid: Vec<f64> = indices.iter().map(|&i| full_grid[i]).collect();
        let tau: Vec<f64> = indices
            .iter()
            .map(|&i| {
                let tau_up = interp_1d(up_grid, &up.tau, full_grid[i]);
                branch.tau()[i] + sign * mantle_count * tau_up
            })
            .collect();
        let x_corrected: Vec<f64> = indices
            .iter()
            .map(|&i| {
                let x_up = interp_1d(up_grid, &up.distance, full_grid[i]);
                base.x[i] + sign * mantle_count * x_up
            })
            .collect();

        let basis = SplineBasis::build(&grid)?;
        let x_min = *x_corrected.first().unwrap();
        let x_max = *x_corrected.last().unwrap();
        let solution = taup_spline::interpolate(&basis, &tau, x_min.min(x_max), x_min.max(x_max))?;

        Ok(Self { branch, enabled: true, p_lo, p_hi, grid, tau, basis, solution, sign })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn p_range(&self) -> (f64, f64) {
        (self.p_lo, self.p_hi)
    }

    pub fn x_range(&self) -> (f64, f64) {
        if self.solution.x.is_empty() {
            return (0.0, 0.0);
        }
        let first = *self.solution.x.first().unwrap();
        let last = *self.solution.x.last().unwrap();
        (first.min(last), first.max(last))
    }

    fn eval(&self, p: f64) -> Result<(f64, f64), BranchError> {
        let (tau, x) = taup_spline::evaluate(&self.basis, &self.tau, &self.solution.g, p)?;
        Ok((tau, x))
    }

    /// Like [`Self::eval`], but additionally returns `dx/dp` at `p`, computed
    /// analytically from the spline's own Hermite piece.
    fn eval_with_slope(&self, p: f64) -> Result<(f64, f64, f64), BranchError> {
        let (tau, x, ddelta_dp) =
            taup_spline::evaluate_with_slope(&self.basis, &self.tau, &self.solution.g, p)?;
        Ok((tau, x, ddelta_dp))
    }

    /// Depth-corrected tau at ray parameter `p`, for callers (the session
    /// layer's dt/dz finite difference) that need the raw curve rather than
    /// a distance-rooted arrival.
    pub fn tau_at(&self, p: f64) -> Result<f64, BranchError> {
        self.eval(p).map(|(tau, _)| tau)
    }

    /// Enumerate every arrival whose distance equals `delta`, including a
    /// diffracted continuation where the branch supports one. Add-on phases
    /// (a synthetic arrival riding a base phase's curve) are not a property
    /// of a single branch's geometry and are assembled by the caller from
    /// these raw roots instead.
    pub fn find_arrivals(
        &self,
        delta: f64,
        eps_x: f64,
        return_back_branches: bool,
    ) -> Result<Vec<BranchArrival>, BranchError> {
        let mut arrivals = Vec::new();
        if !self.enabled || self.grid.len() < 2 {
            return Ok(arrivals);
        }

        let (x_lo, x_hi) = self.x_range();
        if (delta - x_lo).abs() < eps_x || (delta - x_hi).abs() < eps_x {
            let target_x = if (delta - x_lo).abs() < eps_x { x_lo } else { x_hi };
            // `x_lo`/`x_hi` are `min`/`max` of `solution.x`'s first and last
            // entries, and which grid end is the larger distance depends on
            // the sign of dΔ/dp for this branch — so match against the
            // actual sampled value rather than assuming `p_lo` is always the
            // low-distance end.
            let first_x = *self.solution.x.first().unwrap();
            let p_endpoint =
                if target_x == first_x { *self.grid.first().unwrap() } else { *self.grid.last().unwrap() };
            if let Some(arrival) = self.root_at_endpoint(p_endpoint, delta)? {
                arrivals.push(arrival);
            }
        } else if delta > x_lo && delta < x_hi {
            arrivals.extend(self.find_interior_roots(delta, eps_x, return_back_branches)?);
        } else if let Some(diff) = self.branch.diffracted() {
            if delta > x_hi && delta <= diff.x_diff {
                arrivals.push(self.diffracted_arrival(delta, x_hi)?);
            }
        }

        Ok(arrivals)
    }

    fn root_at_endpoint(&self, p: f64, delta: f64) -> Result<Option<BranchArrival>, BranchError> {
        let (tau, _x) = self.eval(p)?;
        Ok(Some(BranchArrival {
            ray_parameter: p,
            tau_plus_p_delta: tau + p * delta,
            ddelta_dp: 0.0,
            is_back_branch: false,
            is_diffracted: false,
        }))
    }

    fn diffracted_arrival(&self, delta: f64, x_max: f64) -> Result<BranchArrival, BranchError> {
        let p = self.p_lo.min(self.p_hi);
        let (tau, _) = self.eval(p)?;
        let t_at_xmax = tau + p * x_max;
        let t = t_at_xmax + p * (delta - x_max);
        Ok(BranchArrival {
            ray_parameter: p,
            tau_plus_p_delta: t,
            ddelta_dp: 0.0,
            is_back_branch: false,
            is_diffracted: true,
        })
    }

    fn find_interior_roots(
        &self,
        delta: f64,
        eps_x: f64,
        return_back_branches: bool,
    ) -> Result<Vec<BranchArrival>, BranchError> {
        let grid_x: Vec<f64> = self.solution.x.clone();
        let mut brackets = Vec::new();
        for i in 0..grid_x.len() - 1 {
            let d0 = grid_x[i] - delta;
            let d1 = grid_x[i + 1] - delta;
            if d0 == 0.0 || d1 == 0.0 || d0.signum() != d1.signum() {
                brackets.push((self.grid[i], self.grid[i + 1]));
            }
        }

        let mut roots = Vec::new();
        for (lo, hi) in brackets {
            if let Some(p_root) = self.invert_bracket(lo, hi, delta, eps_x)? {
                roots.push(p_root);
            }
        }
        roots.dedup_by(|a, b| (*a - *b).abs() < eps_x * 10.0);

        if roots.len() > 1 && !return_back_branches {
            // Keep only the first root when back branches are suppressed.
            roots.truncate(1);
        }

        let mut arrivals = Vec::with_capacity(roots.len());
        for (idx, p) in roots.into_iter().enumerate() {
            let (tau, _x, ddelta_dp) = self.eval_with_slope(p)?;
            arrivals.push(BranchArrival {
                ray_parameter: p,
                tau_plus_p_delta: tau + p * delta,
                ddelta_dp,
                is_back_branch: idx > 0,
                is_diffracted: false,
            });
        }
        Ok(arrivals)
    }

    /// Invert `x(p) = delta` within `[lo, hi]` using Newton iteration
    /// bounded by the bracket, falling back to bisection when a step would
    /// leave it.
    fn invert_bracket(&self, lo: f64, hi: f64, delta: f64, eps_x: f64) -> Result<Option<f64>, BranchError> {
        let (mut a, mut b) = (lo.min(hi), lo.max(hi));
        let (_, xa) = self.eval(a)?;
        let (_, xb) = self.eval(b)?;
        let mut fa = xa - delta;
        let fb = xb - delta;
        if fa == 0.0 {
            return Ok(Some(a));
        }
        if fb == 0.0 {
            return Ok(Some(b));
        }
        if fa.signum() == fb.signum() {
            return Ok(None);
        }

        let mut p = (a + b) / 2.0;
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let (_, x_p, derivative) = self.eval_with_slope(p)?;
            let f = x_p - delta;
            if f.abs() < eps_x {
                return Ok(Some(p));
            }

            let newton_p = if derivative.abs() > 1e-12 { p - f / derivative } else { f64::NAN };

            if newton_p.is_finite() && newton_p > a && newton_p < b {
                if f.signum() == fa.signum() {
                    a = p;
                    fa = f;
                } else {
                    b = p;
                }
                p = newton_p;
            } else {
                if f.signum() == fa.signum() {
                    a = p;
                    fa = f;
                } else {
                    b = p;
                }
                p = (a + b) / 2.0;
            }
        }

        let (_, x_final) = self.eval(p)?;
        if (x_final - delta).abs() <= eps_x * 10.0 {
            Ok(Some(p))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taup_model::{BranchInput, Tolerances, WaveType};

    fn flat_upgoing_table() -> UpGoingTable {
        UpGoingTable::new(vec![0.8, 0.6, 0.4, 0.2], vec![0.0, 0.0, 0.0, 0.0], vec![]).unwrap()
    }

    fn sample_branch() -> SurfaceFocusBranch {
        let p = vec![0.8, 0.6, 0.4, 0.2];
        let tau: Vec<f64> = p.iter().map(|&pi| 600.0 - 120.0 * pi - 30.0 * pi * pi).collect();
        let input = BranchInput::from_legacy_tables(
            "P".into(),
            "P".into(),
            vec![WaveType::P],
            1,
            1,
            p,
            tau,
            5.0,
            95.0,
        );
        SurfaceFocusBranch::from_input(input).unwrap()
    }

    fn sample_earth_model() -> EarthModel {
        let samples = vec![
            taup_model::ModelSample { z_flat: 0.0, p: 0.9, upgoing_index: Some(0) },
            taup_model::ModelSample { z_flat: -0.5, p: 0.1, upgoing_index: Some(1) },
        ];
        EarthModel::new(samples, Tolerances::default()).unwrap()
    }

    #[test]
    fn disabled_when_source_below_branch_slowness() {
        let branch = sample_branch();
        let model = sample_earth_model();
        let up = flat_upgoing_table();
        let dcb = DepthCorrectedBranch::build(&branch, &model, &up, -0.5).unwrap();
        assert!(!dcb.is_enabled());
    }

    #[test]
    fn enabled_branch_reproduces_endpoint_distances() {
        let branch = sample_branch();
        let model = sample_earth_model();
        let up = flat_upgoing_table();
        let dcb = DepthCorrectedBranch::build(&branch, &model, &up, -0.05).unwrap();
        assert!(dcb.is_enabled());
        let (x_lo, x_hi) = dcb.x_range();
        assert!(x_lo < x_hi);
    }

    #[test]
    fn finds_interior_root_for_in_range_distance() {
        let branch = sample_branch();
        let model = sample_earth_model();
        let up = flat_upgoing_table();
        let dcb = DepthCorrectedBranch::build(&branch, &model, &up, -0.05).unwrap();
        let (x_lo, x_hi) = dcb.x_range();
        let target = (x_lo + x_hi) / 2.0;
        let arrivals = dcb.find_arrivals(target, 1e-6, true).unwrap();
        assert!(!arrivals.is_empty());
        for arrival in &arrivals {
            assert!(arrival.ray_parameter >= dcb.p_lo.min(dcb.p_hi) - 1e-6);
            assert!(arrival.ray_parameter <= dcb.p_lo.max(dcb.p_hi) + 1e-6);
        }
    }

    #[test]
    fn no_arrival_outside_range_without_diffraction() {
        let branch = sample_branch();
        let model = sample_earth_model();
        let up = flat_upgoing_table();
        let dcb = DepthCorrectedBranch::build(&branch, &model, &up, -0.05).unwrap();
        let (_, x_hi) = dcb.x_range();
        let arrivals = dcb.find_arrivals(x_hi + 50.0, 1e-6, true).unwrap();
        assert!(arrivals.is_empty());
    }
}
