//! Up-going-ray tables (C5): per-depth tau and distance integrals for the
//! portion of a ray between the source and the surface.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};

/// One stored up-going record: the (possibly truncated) tau and distance
/// arrays for a source at a fixed flat depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpGoingRecord {
    pub depth_flat: f64,
    pub tau: Vec<f64>,
    pub distance: Vec<f64>,
}

/// The shared p-grid and per-depth up-going records for one wave type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpGoingTable {
    p_grid: Vec<f64>,
    x_end: Vec<f64>,
    records: Vec<UpGoingRecord>,
}

/// Linearly interpolated tau/distance arrays for a source at an arbitrary
/// flat depth, truncated to the shorter of the two bracketing records.
#[derive(Debug, Clone, PartialEq)]
pub struct UpGoingAtDepth {
    pub tau: Vec<f64>,
    pub distance: Vec<f64>,
}

impl UpGoingTable {
    pub fn new(
        p_grid: Vec<f64>,
        x_end: Vec<f64>,
        mut records: Vec<UpGoingRecord>,
    ) -> Result<Self, ModelError> {
        if p_grid.is_empty() {
            return Err(ModelError::InvalidBranchData(
                "up-going table requires a non-empty p-grid".into(),
            ));
        }
        if x_end.len() != p_grid.len() {
            return Err(ModelError::InvalidBranchData(
                "up-going x_end length must match p_grid length".into(),
            ));
        }
        for record in &records {
            if record.tau.len() > p_grid.len() || record.distance.len() != record.tau.len() {
                return Err(ModelError::InvalidBranchData(format!(
                    "up-going record at depth {} has mismatched lengths",
                    record.depth_flat
                )));
            }
        }
        records.sort_by(|a, b| a.depth_flat.total_cmp(&b.depth_flat));
        Ok(Self { p_grid, x_end, records })
    }

    pub fn p_grid(&self) -> &[f64] {
        &self.p_grid
    }

    pub fn x_end(&self) -> &[f64] {
        &self.x_end
    }

    /// Interpolate the up-going tau/distance arrays at `z_flat`, linearly
    /// blending the two neighboring stored depths in the flat-depth scheme.
    pub fn interpolate_at_depth(&self, z_flat: f64) -> Result<UpGoingAtDepth, ModelError> {
        if self.records.is_empty() {
            return Err(ModelError::InvalidBranchData(
                "up-going table has no stored depth records".into(),
            ));
        }
        if self.records.len() == 1 {
            let r = &self.records[0];
            return Ok(UpGoingAtDepth { tau: r.tau.clone(), distance: r.distance.clone() });
        }

        let idx = self
            .records
            .partition_point(|r| r.depth_flat <= z_flat)
            .min(self.records.len() - 1)
            .max(1);
        let lo = &self.records[idx - 1];
        let hi = &self.records[idx];

        if (hi.depth_flat - lo.depth_flat).abs() < 1e-15 {
            return Ok(UpGoingAtDepth { tau: lo.tau.clone(), distance: lo.distance.clone() });
        }

        let frac = ((z_flat - lo.depth_flat) / (hi.depth_flat - lo.depth_flat)).clamp(0.0, 1.0);
        let n = lo.tau.len().min(hi.tau.len());

        let tau = (0..n)
            .map(|i| lo.tau[i] + (hi.tau[i] - lo.tau[i]) * frac)
            .collect();
        let distance = (0..n)
            .map(|i| lo.distance[i] + (hi.distance[i] - lo.distance[i]) * frac)
            .collect();

        Ok(UpGoingAtDepth { tau, distance })
    }
}
