//! Spline over a branch's delay time `tau(p)`, used to reconstruct the
//! distance `x(p) = -d(tau)/dp` at arbitrary ray parameters from the values
//! tabulated at the branch's p-grid.
//!
//! Unlike a textbook clamped cubic spline, the unknown solved for at each
//! node is the distance itself (`g_i = x(p_i)`, not a curvature moment), so
//! the two boundary rows of the assembled system are literal identities
//! pinning `g` to the branch's recorded `x_min`/`x_max`, and every interior
//! row is driven directly by that node's own `tau` sample and its two
//! neighbors. Reconstruction between grid nodes additionally blends in a
//! `sqrt` reparametrization of the two end intervals, so `x(p)` steepens
//! approaching a branch's two true ends the way an integrable tau-p
//! square-root singularity does, without the tabulated endpoint values
//! themselves ever being anything but finite.
//!
//! The geometry of a p-grid (its knot spacing and the basis matrix `B`) is
//! reusable across many source depths, so building the spline is split into
//! two steps: a geometry-only [`SplineBasis`] built once from the p-grid,
//! and a per-depth [`interpolate`] call that plugs in `tau` and the two
//! endpoint distances.
//!
//! [`solve_penta_diagonal`] is written as a genuine five-banded solver; this
//! basis only populates the inner three bands (it degenerates to
//! tridiagonal), which is the same unmixed solver used for any future banded
//! system that does need the outer two.

pub mod error;
pub mod pentadiagonal;

pub use error::SplineError;
pub use pentadiagonal::{PentaBands, solve_penta_diagonal};

/// The 5×n spline basis matrix `B`. Column `i` holds, top to bottom: the
/// interval length to the left of node `i` and the interval length to its
/// right (the "two end contributions", reused both to assemble row `i` and
/// to reconstruct `x` between nodes in [`evaluate`]), bracketing the three
/// coefficients that multiply `g[i-1]`, `g[i]`, `g[i+1]` in row `i`'s
/// continuity equation (the "three negative derivative contributions" —
/// negative because they fall out of equating neighboring slopes). The two
/// boundary columns degenerate to an identity row (`0, 0, 1, 0, 0`): those
/// rows pin `g` directly to the branch's endpoint distances.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix5xN(Vec<[f64; 5]>);

impl Matrix5xN {
    pub fn columns(&self) -> usize {
        self.0.len()
    }

    pub fn column(&self, i: usize) -> [f64; 5] {
        self.0[i]
    }
}

/// Geometry derived from a branch's ray-parameter grid: knot spacing and the
/// basis matrix/tridiagonal bands of the distance-collocation system.
/// Independent of `tau`, so it can be built once per grid and reused across
/// source depths.
#[derive(Debug, Clone, PartialEq)]
pub struct SplineBasis {
    p: Vec<f64>,
    h: Vec<f64>,
    matrix: Matrix5xN,
    bands: Option<PentaBands>,
}

impl SplineBasis {
    /// Build the basis for a strictly monotonic (increasing or decreasing)
    /// p-grid. A single-point grid is valid (degenerate branch of one
    /// sample) and carries no matrix/bands.
    pub fn build(p: &[f64]) -> Result<Self, SplineError> {
        let n = p.len();
        if n == 0 {
            return Err(SplineError::EmptyGrid);
        }
        if n >= 2 {
            let mut increasing: Option<bool> = None;
            for w in p.windows(2) {
                let d = w[1] - w[0];
                if d == 0.0 {
                    return Err(SplineError::NotMonotonic);
                }
                let dir = d > 0.0;
                match increasing {
                    None => increasing = Some(dir),
                    Some(prev) if prev != dir => return Err(SplineError::NotMonotonic),
                    _ => {}
                }
            }
        }

        let h: Vec<f64> = p.windows(2).map(|w| w[1] - w[0]).collect();

        if n == 1 {
            return Ok(Self { p: p.to_vec(), h, matrix: Matrix5xN(Vec::new()), bands: None });
        }

        let mut columns = Vec::with_capacity(n);
        for i in 0..n {
            let left_len = if i == 0 { 0.0 } else { h[i - 1] };
            let right_len = if i == n - 1 { 0.0 } else { h[i] };
            let (sub_coef, diag_coef, sup_coef) = if i == 0 || i == n - 1 {
                (0.0, 1.0, 0.0)
            } else {
                (-1.0 / h[i - 1], -2.0 * (1.0 / h[i - 1] + 1.0 / h[i]), -1.0 / h[i])
            };
            columns.push([left_len, sub_coef, diag_coef, sup_coef, right_len]);
        }

        let sub: Vec<f64> = columns.iter().map(|c| c[1]).collect();
        let diag: Vec<f64> = columns.iter().map(|c| c[2]).collect();
        let sup: Vec<f64> = columns.iter().map(|c| c[3]).collect();

        Ok(Self {
            p: p.to_vec(),
            h,
            matrix: Matrix5xN(columns),
            bands: Some(PentaBands::tridiagonal(sub, diag, sup)),
        })
    }

    pub fn p_grid(&self) -> &[f64] {
        &self.p
    }

    pub fn matrix(&self) -> &Matrix5xN {
        &self.matrix
    }

    pub fn len(&self) -> usize {
        self.p.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p.is_empty()
    }
}

/// The solved distance coefficients and the reconstructed distance at every
/// grid point (the same vector: `g[i]` is `x(p_i)` directly).
#[derive(Debug, Clone, PartialEq)]
pub struct SplineSolution {
    /// `g[i] = x(p_i)`, solved from `A g = (x_min, tau[1..n-2], x_max)`.
    pub g: Vec<f64>,
    /// Reconstructed distance at each grid node. Identical to `g`; kept
    /// alongside it so callers don't need to know that identity holds.
    pub x: Vec<f64>,
}

/// Solve `A g = (x_min, tau[1..n-2], x_max)` over `basis`'s p-grid: the two
/// boundary rows pin `g` to the branch's recorded endpoint distances
/// directly, and each interior row is driven by that node's own `tau`
/// sample and its two neighbors (via [`Matrix5xN`]'s three inner rows).
/// This is the slope-continuity system (solving directly for `g = x(p)`,
/// not a curvature moment), so the right-hand side below is a weighted
/// combination of `tau[i-1]`, `tau[i]`, `tau[i+1]` rather than a copy of
/// `tau[i]` alone — it's the same equation as the textbook "compute slopes
/// directly" cubic spline, not the moment-based clamped-spline RHS.
pub fn interpolate(
    basis: &SplineBasis,
    tau: &[f64],
    x_min: f64,
    x_max: f64,
) -> Result<SplineSolution, SplineError> {
    let n = basis.p.len();
    if tau.len() != n {
        return Err(SplineError::Degenerate);
    }

    if n == 1 {
        return Ok(SplineSolution { g: vec![x_min], x: vec![x_min] });
    }
    if n == 2 {
        return Ok(SplineSolution { g: vec![x_min, x_max], x: vec![x_min, x_max] });
    }

    let h = &basis.h;
    let bands = basis.bands.as_ref().expect("bands present for n >= 2");

    let mut rhs = vec![0.0; n];
    rhs[0] = x_min;
    rhs[n - 1] = x_max;
    for i in 1..n - 1 {
        rhs[i] = -3.0
            * ((tau[i] - tau[i - 1]) / (h[i - 1] * h[i - 1]) + (tau[i + 1] - tau[i]) / (h[i] * h[i]));
    }

    let g = solve_penta_diagonal(bands, &rhs)?;
    for &gi in &g {
        if !gi.is_finite() {
            return Err(SplineError::NonFinite);
        }
    }
    let x = g.clone();

    Ok(SplineSolution { g, x })
}

/// Standard cubic Hermite basis, value at `s`, interpolating from
/// `(v0, m0)` at `s=0` to `(v1, m1)` at `s=1` over an interval of signed
/// length `h`.
fn hermite_value(s: f64, v0: f64, m0: f64, v1: f64, m1: f64, h: f64) -> f64 {
    let s2 = s * s;
    let s3 = s2 * s;
    (2.0 * s3 - 3.0 * s2 + 1.0) * v0
        + (s3 - 2.0 * s2 + s) * h * m0
        + (-2.0 * s3 + 3.0 * s2) * v1
        + (s3 - s2) * h * m1
}

/// `d/ds` of [`hermite_value`].
fn hermite_deriv_ds(s: f64, v0: f64, m0: f64, v1: f64, m1: f64, h: f64) -> f64 {
    let s2 = s * s;
    (6.0 * s2 - 6.0 * s) * v0
        + (3.0 * s2 - 4.0 * s + 1.0) * h * m0
        + (-6.0 * s2 + 6.0 * s) * v1
        + (3.0 * s2 - 2.0 * s) * h * m1
}

/// `d^2/ds^2` of [`hermite_value`].
fn hermite_second_deriv_ds(s: f64, v0: f64, m0: f64, v1: f64, m1: f64, h: f64) -> f64 {
    (12.0 * s - 6.0) * v0 + (6.0 * s - 4.0) * h * m0 + (-12.0 * s + 6.0) * v1 + (6.0 * s - 2.0) * h * m1
}

/// Shared interval-locating and Hermite evaluation behind both [`evaluate`]
/// and [`evaluate_with_slope`]: returns `(tau(p), tau'(p), tau''(p))`, with
/// `tau''` only meaningful (and only asked for) at interior points away from
/// a grid node.
fn eval_tau_and_derivatives(
    basis: &SplineBasis,
    tau: &[f64],
    g: &[f64],
    p: f64,
) -> Result<(f64, f64, f64), SplineError> {
    let grid = &basis.p;
    let h = &basis.h;
    let n = grid.len();
    if n != tau.len() || n != g.len() {
        return Err(SplineError::Degenerate);
    }
    if n == 1 {
        return Ok((tau[0], -g[0], 0.0));
    }

    let increasing = grid[1] > grid[0];
    let mut i = 0usize;
    if increasing {
        while i + 2 < n && grid[i + 1] < p {
            i += 1;
        }
    } else {
        while i + 2 < n && grid[i + 1] > p {
            i += 1;
        }
    }

    if p == grid[i] {
        return Ok((tau[i], -g[i], 0.0));
    }
    if p == grid[i + 1] {
        return Ok((tau[i + 1], -g[i + 1], 0.0));
    }

    let hi = h[i];
    let t = (p - grid[i]) / hi;
    let m_i = -g[i];
    let m_i1 = -g[i + 1];
    let in_unit = (0.0..=1.0).contains(&t);

    let (tau_value, tau_deriv, tau_second_deriv) = if i == 0 && n >= 3 && in_unit {
        // Singular end at node 0: sigma = 0 there, growing toward node 1.
        // p -> s = sqrt(t), so ds/dp = u = 1/(2*hi*s) and du/dp = -1/(4*hi^2*s^3).
        let s = t.sqrt();
        let val = hermite_value(s, tau[i], m_i, tau[i + 1], m_i1, hi);
        let dval_ds = hermite_deriv_ds(s, tau[i], m_i, tau[i + 1], m_i1, hi);
        let d2val_ds2 = hermite_second_deriv_ds(s, tau[i], m_i, tau[i + 1], m_i1, hi);
        let u = 1.0 / (2.0 * hi * s);
        let du_dp = -1.0 / (4.0 * hi * hi * s * s * s);
        (val, dval_ds * u, d2val_ds2 * u * u + dval_ds * du_dp)
    } else if i == n - 2 && n >= 3 && in_unit {
        // Singular end at node n-1: sigma = 0 there, growing toward node i.
        // p -> s = sqrt(1-t), so ds/dp = v = -1/(2*hi*s) and dv/dp = -1/(4*hi^2*s^3).
        let s = (1.0 - t).sqrt();
        let val = hermite_value(s, tau[i + 1], m_i1, tau[i], m_i, hi);
        let dval_ds = hermite_deriv_ds(s, tau[i + 1], m_i1, tau[i], m_i, hi);
        let d2val_ds2 = hermite_second_deriv_ds(s, tau[i + 1], m_i1, tau[i], m_i, hi);
        let v = -1.0 / (2.0 * hi * s);
        let dv_dp = -1.0 / (4.0 * hi * hi * s * s * s);
        (val, dval_ds * v, d2val_ds2 * v * v + dval_ds * dv_dp)
    } else {
        let val = hermite_value(t, tau[i], m_i, tau[i + 1], m_i1, hi);
        let dval_ds = hermite_deriv_ds(t, tau[i], m_i, tau[i + 1], m_i1, hi);
        let d2val_ds2 = hermite_second_deriv_ds(t, tau[i], m_i, tau[i + 1], m_i1, hi);
        (val, dval_ds / hi, d2val_ds2 / (hi * hi))
    };

    if !tau_value.is_finite() || !tau_deriv.is_finite() {
        return Err(SplineError::NonFinite);
    }

    Ok((tau_value, tau_deriv, tau_second_deriv))
}

/// Evaluate the spline at an arbitrary `p` (not necessarily a grid node),
/// returning `(tau(p), x(p))` with `x(p) = -tau'(p)`, using the `g` from a
/// prior [`interpolate`] call. `p` outside the grid's range is evaluated on
/// the nearest edge interval (linear/cubic extrapolation of that piece).
///
/// Within the first and last intervals, `p` is reparametrized through
/// `sqrt` of the local fraction so that `x(p)` steepens approaching that
/// interval's branch-end node, the qualitative signature of a tau-p branch's
/// integrable square-root singularity in `dx/dp`; exactly at a grid node the
/// tabulated (finite) value is returned directly, and extrapolation beyond
/// the grid falls back to the plain cubic so it never evaluates `sqrt` of a
/// negative number.
pub fn evaluate(basis: &SplineBasis, tau: &[f64], g: &[f64], p: f64) -> Result<(f64, f64), SplineError> {
    let (tau_value, tau_deriv, _) = eval_tau_and_derivatives(basis, tau, g, p)?;
    Ok((tau_value, -tau_deriv))
}

/// Like [`evaluate`], but additionally returns `dx/dp = -tau''(p)` at `p`,
/// computed from the same Hermite piece analytically rather than by
/// finite-differencing two calls to [`evaluate`].
pub fn evaluate_with_slope(
    basis: &SplineBasis,
    tau: &[f64],
    g: &[f64],
    p: f64,
) -> Result<(f64, f64, f64), SplineError> {
    let (tau_value, tau_deriv, tau_second_deriv) = eval_tau_and_derivatives(basis, tau, g, p)?;
    if !tau_second_deriv.is_finite() {
        return Err(SplineError::NonFinite);
    }
    Ok((tau_value, -tau_deriv, -tau_second_deriv))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reproduces_endpoint_distances_exactly() {
        let p = vec![0.0, 0.1, 0.2, 0.3, 0.4];
        let tau: Vec<f64> = p.iter().map(|&pi| 10.0 - 0.5 * pi * pi).collect();
        let basis = SplineBasis::build(&p).unwrap();
        let solution = interpolate(&basis, &tau, 0.0, 1.2).unwrap();
        assert_eq!(solution.x[0], 0.0);
        assert_eq!(solution.x[4], 1.2);
        assert_eq!(solution.g[0], 0.0);
        assert_eq!(solution.g[4], 1.2);
    }

    #[test]
    fn reconstructs_linear_distance_from_quadratic_tau() {
        // tau(p) = a*p^2 + b*p + c has x(p) = -tau'(p) = -2a*p - b exactly,
        // and this system reproduces that derivative exactly at every node
        // because quadratics are a subset of the cubics it's exact for.
        let a = 3.0_f64;
        let b = -2.0_f64;
        let c = 7.0_f64;
        let p: Vec<f64> = vec![0.0, 0.3, 0.9, 1.5, 2.4, 3.0];
        let tau: Vec<f64> = p.iter().map(|&pi| a * pi * pi + b * pi + c).collect();
        let x_min = -2.0 * a * p[0] - b;
        let x_max = -2.0 * a * p[p.len() - 1] - b;

        let basis = SplineBasis::build(&p).unwrap();
        let solution = interpolate(&basis, &tau, x_min, x_max).unwrap();

        for (i, &pi) in p.iter().enumerate() {
            let expected = -2.0 * a * pi - b;
            assert!(
                (solution.x[i] - expected).abs() < 1e-8,
                "node {i}: got {}, want {expected}",
                solution.x[i]
            );
        }
    }

    #[test]
    fn monotonic_branch_yields_monotonic_distance() {
        // A concave quadratic tau(p), with endpoint distances derived from
        // its own true derivative so the boundary pins are consistent with
        // the interior trend.
        let p: Vec<f64> = (0..9).map(|i| 0.8 - i as f64 * 0.08).collect();
        let tau: Vec<f64> = p.iter().map(|&pi| 120.0 - 40.0 * pi - 15.0 * pi * pi).collect();
        let x_min = 40.0 + 30.0 * p[0];
        let x_max = 40.0 + 30.0 * p[p.len() - 1];
        let basis = SplineBasis::build(&p).unwrap();
        let solution = interpolate(&basis, &tau, x_min, x_max).unwrap();
        for w in solution.x.windows(2) {
            assert!(w[1] <= w[0] + 1e-9, "distance not monotonic: {:?}", solution.x);
        }
    }

    #[test]
    fn single_point_grid_copies_endpoint() {
        let p = vec![0.5];
        let tau = vec![12.0];
        let basis = SplineBasis::build(&p).unwrap();
        let solution = interpolate(&basis, &tau, 4.0, 4.0).unwrap();
        assert_eq!(solution.x, vec![4.0]);
    }

    #[test]
    fn two_point_grid_uses_boundary_rows_only() {
        let p = vec![0.2, 0.6];
        let tau = vec![5.0, 4.0];
        let basis = SplineBasis::build(&p).unwrap();
        let solution = interpolate(&basis, &tau, 1.0, 2.0).unwrap();
        assert_eq!(solution.x, vec![1.0, 2.0]);
        assert_eq!(solution.g.len(), 2);
    }

    #[test]
    fn rejects_non_monotonic_grid() {
        let p = vec![0.0, 0.5, 0.3, 0.8];
        assert_eq!(SplineBasis::build(&p), Err(SplineError::NotMonotonic));
    }

    #[test]
    fn rejects_empty_grid() {
        assert_eq!(SplineBasis::build(&[]), Err(SplineError::EmptyGrid));
    }

    #[test]
    fn matrix_boundary_columns_are_identity_rows() {
        let p = vec![0.0, 0.1, 0.2, 0.3, 0.4];
        let basis = SplineBasis::build(&p).unwrap();
        let matrix = basis.matrix();
        assert_eq!(matrix.columns(), 5);
        assert_eq!(matrix.column(0), [0.0, 0.0, 1.0, 0.0, 0.1]);
        assert_eq!(matrix.column(4), [0.1, 0.0, 1.0, 0.0, 0.0]);
        // An interior column carries the three coefficients feeding its row.
        let interior = matrix.column(2);
        assert!(interior[1] < 0.0 && interior[2] < 0.0 && interior[3] < 0.0);
    }

    #[test]
    fn rejects_empty_grid_matrix_has_no_columns() {
        let p = vec![0.5];
        let basis = SplineBasis::build(&p).unwrap();
        assert_eq!(basis.matrix().columns(), 0);
    }

    #[test]
    fn evaluate_reproduces_tau_exactly_at_grid_nodes() {
        let p = vec![0.0, 0.1, 0.2, 0.3, 0.4];
        let tau: Vec<f64> = p.iter().map(|&pi| 10.0 - 0.5 * pi * pi).collect();
        let basis = SplineBasis::build(&p).unwrap();
        let solution = interpolate(&basis, &tau, 0.0, 0.4).unwrap();
        for (i, &pi) in p.iter().enumerate() {
            let (tau_eval, _) = evaluate(&basis, &tau, &solution.g, pi).unwrap();
            let rel_err = (tau_eval - tau[i]).abs() / tau[i].abs().max(1.0);
            assert!(rel_err < 1e-9, "node {i}: got {tau_eval}, want {}", tau[i]);
        }
    }

    #[test]
    fn evaluate_at_interior_midpoint_matches_quadratic_exactly() {
        // The midpoint probed here (0.75) sits inside the second interval
        // of a 5-point grid, away from either branch end, so no sqrt blend
        // applies and plain cubic Hermite exactness for a quadratic holds.
        let a = 2.0_f64;
        let b = -1.0_f64;
        let c = 0.0_f64;
        let p: Vec<f64> = vec![0.0, 0.5, 1.0, 1.5, 2.0];
        let tau: Vec<f64> = p.iter().map(|&pi| a * pi * pi + b * pi + c).collect();
        let x_min = -2.0 * a * p[0] - b;
        let x_max = -2.0 * a * p[p.len() - 1] - b;
        let basis = SplineBasis::build(&p).unwrap();
        let solution = interpolate(&basis, &tau, x_min, x_max).unwrap();

        let probe = 0.75;
        let (tau_eval, x_eval) = evaluate(&basis, &tau, &solution.g, probe).unwrap();
        assert!((tau_eval - (a * probe * probe + b * probe + c)).abs() < 1e-9);
        assert!((x_eval - (-2.0 * a * probe - b)).abs() < 1e-9);
    }

    #[test]
    fn distance_steepens_approaching_a_branch_end() {
        // Inside the first interval, x(p) should grow faster than a linear
        // blend between the two node values as p approaches the branch end
        // at p[0] — the qualitative signature of the sqrt reparametrization.
        let p = vec![0.0, 0.2, 0.4, 0.6, 0.8];
        let tau: Vec<f64> = p.iter().map(|&pi| 50.0 - 10.0 * pi - 5.0 * pi * pi).collect();
        let x_min = 10.0;
        let x_max = 10.0 + 10.0 * p[p.len() - 1];
        let basis = SplineBasis::build(&p).unwrap();
        let solution = interpolate(&basis, &tau, x_min, x_max).unwrap();

        let near_end = 0.02; // close to p[0] = 0.0, inside [p[0], p[1]]
        let (_, x_near) = evaluate(&basis, &tau, &solution.g, near_end).unwrap();
        let linear_blend = solution.x[0] + (solution.x[1] - solution.x[0]) * (near_end / 0.2);
        assert!(
            x_near > linear_blend,
            "expected steeper-than-linear approach to the branch end: x_near={x_near}, linear={linear_blend}"
        );
    }

    #[test]
    fn analytic_slope_matches_quadratic_second_derivative() {
        // tau(p) = a*p^2 + b*p + c has x(p) = -2a*p - b, a constant slope
        // dx/dp = -2a everywhere, away from the two sqrt-blended end
        // intervals where the reparametrization makes the spline's own
        // curvature deviate from the underlying quadratic's.
        let a = 2.0_f64;
        let b = -1.0_f64;
        let c = 0.0_f64;
        let p: Vec<f64> = vec![0.0, 0.5, 1.0, 1.5, 2.0];
        let tau: Vec<f64> = p.iter().map(|&pi| a * pi * pi + b * pi + c).collect();
        let x_min = -2.0 * a * p[0] - b;
        let x_max = -2.0 * a * p[p.len() - 1] - b;
        let basis = SplineBasis::build(&p).unwrap();
        let solution = interpolate(&basis, &tau, x_min, x_max).unwrap();

        let probe = 0.75; // inside the second interval, away from both ends
        let (_, _, ddelta_dp) = evaluate_with_slope(&basis, &tau, &solution.g, probe).unwrap();
        assert!((ddelta_dp - (-2.0 * a)).abs() < 1e-8, "got {ddelta_dp}");
    }

    #[test]
    fn analytic_slope_matches_finite_difference_near_a_branch_end() {
        let p = vec![0.0, 0.2, 0.4, 0.6, 0.8];
        let tau: Vec<f64> = p.iter().map(|&pi| 50.0 - 10.0 * pi - 5.0 * pi * pi).collect();
        let x_min = 10.0;
        let x_max = 10.0 + 10.0 * p[p.len() - 1];
        let basis = SplineBasis::build(&p).unwrap();
        let solution = interpolate(&basis, &tau, x_min, x_max).unwrap();

        let probe = 0.05; // inside the sqrt-blended first interval
        let (_, _, analytic) = evaluate_with_slope(&basis, &tau, &solution.g, probe).unwrap();

        let step = 1e-6;
        let (_, x_plus) = evaluate(&basis, &tau, &solution.g, probe + step).unwrap();
        let (_, x_minus) = evaluate(&basis, &tau, &solution.g, probe - step).unwrap();
        let numeric = (x_plus - x_minus) / (2.0 * step);

        assert!((analytic - numeric).abs() < 1e-3, "analytic={analytic}, numeric={numeric}");
    }

    #[test]
    fn extrapolation_beyond_the_grid_stays_finite() {
        let p = vec![0.0, 0.2, 0.4, 0.6, 0.8];
        let tau: Vec<f64> = p.iter().map(|&pi| 50.0 - 10.0 * pi - 5.0 * pi * pi).collect();
        let basis = SplineBasis::build(&p).unwrap();
        let solution = interpolate(&basis, &tau, 10.0, 18.0).unwrap();
        let (tau_eval, x_eval) = evaluate(&basis, &tau, &solution.g, -0.05).unwrap();
        assert!(tau_eval.is_finite());
        assert!(x_eval.is_finite());
    }
}
