//! General penta-diagonal linear solve via Thomas-style forward elimination
//! and back substitution.
//!
//! A penta-diagonal system has, on each row `i`, at most five non-zero
//! entries at columns `i-2, i-1, i, i+1, i+2`. The branch spline system is a
//! special case where the outer two bands happen to be zero (it reduces to
//! tridiagonal), but the solver itself does not assume that.

use crate::error::SplineError;

/// The five diagonals of a penta-diagonal matrix, each length `n`.
/// `sub2[0]`, `sub2[1]`, `sub[0]`, `sup[n-1]`, `sup2[n-1]`, `sup2[n-2]` are
/// unused padding (kept so every array has the same length as `diag`).
#[derive(Debug, Clone, PartialEq)]
pub struct PentaBands {
    pub sub2: Vec<f64>,
    pub sub: Vec<f64>,
    pub diag: Vec<f64>,
    pub sup: Vec<f64>,
    pub sup2: Vec<f64>,
}

impl PentaBands {
    pub fn tridiagonal(sub: Vec<f64>, diag: Vec<f64>, sup: Vec<f64>) -> Self {
        let n = diag.len();
        Self {
            sub2: vec![0.0; n],
            sub,
            diag,
            sup,
            sup2: vec![0.0; n],
        }
    }

    fn len(&self) -> usize {
        self.diag.len()
    }
}

/// Solve `A x = rhs` for a penta-diagonal `A`, using forward elimination to
/// zero the two sub-diagonals row by row, then back substitution.
pub fn solve_penta_diagonal(bands: &PentaBands, rhs: &[f64]) -> Result<Vec<f64>, SplineError> {
    let n = bands.len();
    if n == 0 {
        return Err(SplineError::EmptyGrid);
    }
    if rhs.len() != n {
        return Err(SplineError::Degenerate);
    }
    if n == 1 {
        if bands.diag[0] == 0.0 {
            return Err(SplineError::Degenerate);
        }
        return Ok(vec![rhs[0] / bands.diag[0]]);
    }

    // Working copies; forward elimination mutates these in place.
    let mut sub = bands.sub.clone();
    let mut diag = bands.diag.clone();
    let mut sup = bands.sup.clone();
    let mut sup2 = bands.sup2.clone();
    let mut sub2 = bands.sub2.clone();
    let mut b = rhs.to_vec();

    const EPS: f64 = 1e-300;

    for i in 0..n {
        if diag[i].abs() < EPS {
            return Err(SplineError::Degenerate);
        }
        // Eliminate sub2[i+2] using row i (two rows below).
        if i + 2 < n && sub2[i + 2] != 0.0 {
            let factor = sub2[i + 2] / diag[i];
            sub2[i + 2] = 0.0;
            if i + 2 < n {
                sub[i + 2] -= factor * sup[i];
            }
            diag[i + 2] -= factor * sup2[i];
            b[i + 2] -= factor * b[i];
        }
        // Eliminate sub[i+1] using row i (one row below).
        if i + 1 < n && sub[i + 1] != 0.0 {
            let factor = sub[i + 1] / diag[i];
            sub[i + 1] = 0.0;
            diag[i + 1] -= factor * sup[i];
            if i + 2 < n {
                sup[i + 1] -= factor * sup2[i];
            }
            b[i + 1] -= factor * b[i];
        }
    }

    // Back substitution.
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut value = b[i];
        if i + 1 < n {
            value -= sup[i] * x[i + 1];
        }
        if i + 2 < n {
            value -= sup2[i] * x[i + 2];
        }
        if diag[i].abs() < EPS {
            return Err(SplineError::Degenerate);
        }
        let xi = value / diag[i];
        if !xi.is_finite() {
            return Err(SplineError::NonFinite);
        }
        x[i] = xi;
    }

    Ok(x)
}
