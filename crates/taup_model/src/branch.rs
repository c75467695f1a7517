//! Surface-focus branch reference data (C6): the immutable per-phase
//! tau(p) samples and spline basis shared by every session.
//!
//! Two callers build branches from different raw sources (legacy binary
//! tables and freshly generated ones); both converge on the same
//! [`BranchInput`] shape so the construction logic — and its validation —
//! lives exactly once.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use taup_spline::SplineBasis;

/// Wave type traversed by one leg of a branch's ray path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveType {
    P,
    S,
}

/// The diffracted-phase extension of a branch past `x_max`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffractedInfo {
    pub phase_code: String,
    pub x_diff: f64,
}

/// Turning-shell label and radius range, carried for diagnostics only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurningShell {
    pub label: String,
    pub radius_min_km: f64,
    pub radius_max_km: f64,
}

/// The common intermediate form both legacy-table and freshly-generated
/// branch construction converge on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchInput {
    pub phase_code: String,
    pub segment_code: String,
    pub legs: Vec<WaveType>,
    pub sign: i8,
    pub mantle_count: u32,
    pub p_min: f64,
    pub p_max: f64,
    pub x_min: f64,
    pub x_max: f64,
    pub p_grid: Vec<f64>,
    pub tau: Vec<f64>,
    pub diffracted: Option<DiffractedInfo>,
    pub add_on_phase: Option<String>,
    pub reflection_type: Option<String>,
    pub turning_shell: Option<TurningShell>,
}

impl BranchInput {
    /// Build an input from the legacy `.hed`/`.tbl` record layout, whose
    /// caller has already decoded the flat arrays.
    pub fn from_legacy_tables(
        phase_code: String,
        segment_code: String,
        legs: Vec<WaveType>,
        sign: i8,
        mantle_count: u32,
        p_grid: Vec<f64>,
        tau: Vec<f64>,
        x_min: f64,
        x_max: f64,
    ) -> Self {
        let p_min = p_grid.last().copied().unwrap_or(0.0).min(p_grid.first().copied().unwrap_or(0.0));
        let p_max = p_grid.last().copied().unwrap_or(0.0).max(p_grid.first().copied().unwrap_or(0.0));
        Self {
            phase_code,
            segment_code,
            legs,
            sign,
            mantle_count,
            p_min,
            p_max,
            x_min,
            x_max,
            p_grid,
            tau,
            diffracted: None,
            add_on_phase: None,
            reflection_type: None,
            turning_shell: None,
        }
    }

    /// Build an input from the freshly-generated table schema, which
    /// additionally carries diffraction/add-on/reflection metadata
    /// up front.
    #[allow(clippy::too_many_arguments)]
    pub fn from_generated_tables(
        phase_code: String,
        segment_code: String,
        legs: Vec<WaveType>,
        sign: i8,
        mantle_count: u32,
        p_grid: Vec<f64>,
        tau: Vec<f64>,
        x_min: f64,
        x_max: f64,
        diffracted: Option<DiffractedInfo>,
        add_on_phase: Option<String>,
        reflection_type: Option<String>,
        turning_shell: Option<TurningShell>,
    ) -> Self {
        let mut input = Self::from_legacy_tables(
            phase_code, segment_code, legs, sign, mantle_count, p_grid, tau, x_min, x_max,
        );
        input.diffracted = diffracted;
        input.add_on_phase = add_on_phase;
        input.reflection_type = reflection_type;
        input.turning_shell = turning_shell;
        input
    }
}

/// An immutable, per-phase reference branch: the sampled tau(p) curve and
/// its spline basis, shared across every session built from this model.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceFocusBranch {
    phase_code: String,
    segment_code: String,
    legs: Vec<WaveType>,
    sign: i8,
    mantle_count: u32,
    p_min: f64,
    p_max: f64,
    x_min: f64,
    x_max: f64,
    p_grid: Vec<f64>,
    tau: Vec<f64>,
    basis: SplineBasis,
    diffracted: Option<DiffractedInfo>,
    add_on_phase: Option<String>,
    reflection_type: Option<String>,
    turning_shell: Option<TurningShell>,
}

impl SurfaceFocusBranch {
    pub fn from_input(input: BranchInput) -> Result<Self, ModelError> {
        if input.p_grid.len() != input.tau.len() {
            return Err(ModelError::InvalidBranchData(format!(
                "branch {}: p_grid/tau length mismatch ({} vs {})",
                input.phase_code,
                input.p_grid.len(),
                input.tau.len()
            )));
        }
        let basis = SplineBasis::build(&input.p_grid)?;
        Ok(Self {
            phase_code: input.phase_code,
            segment_code: input.segment_code,
            legs: input.legs,
            sign: input.sign,
            mantle_count: input.mantle_count,
            p_min: input.p_min,
            p_max: input.p_max,
            x_min: input.x_min,
            x_max: input.x_max,
            p_grid: input.p_grid,
            tau: input.tau,
            basis,
            diffracted: input.diffracted,
            add_on_phase: input.add_on_phase,
            reflection_type: input.reflection_type,
            turning_shell: input.turning_shell,
        })
    }

    pub fn phase_code(&self) -> &str {
        &self.phase_code
    }

    pub fn segment_code(&self) -> &str {
        &self.segment_code
    }

    pub fn legs(&self) -> &[WaveType] {
        &self.legs
    }

    pub fn sign(&self) -> i8 {
        self.sign
    }

    pub fn mantle_count(&self) -> u32 {
        self.mantle_count
    }

    pub fn p_range(&self) -> (f64, f64) {
        (self.p_min, self.p_max)
    }

    pub fn x_range(&self) -> (f64, f64) {
        (self.x_min, self.x_max)
    }

    pub fn p_grid(&self) -> &[f64] {
        &self.p_grid
    }

    pub fn tau(&self) -> &[f64] {
        &self.tau
    }

    pub fn basis(&self) -> &SplineBasis {
        &self.basis
    }

    pub fn diffracted(&self) -> Option<&DiffractedInfo> {
        self.diffracted.as_ref()
    }

    pub fn add_on_phase(&self) -> Option<&str> {
        self.add_on_phase.as_deref()
    }

    pub fn reflection_type(&self) -> Option<&str> {
        self.reflection_type.as_deref()
    }

    pub fn turning_shell(&self) -> Option<&TurningShell> {
        self.turning_shell.as_ref()
    }
}
