//! Ellipticity correction (C10 / §3): a second-order travel-time
//! adjustment for Earth's oblateness, tabulated per phase on a 5° distance
//! grid and a fixed 6-point depth grid.

use taup_tables::{IndexMap, SampledIndex, Table2D, UniformIndex, bilinear_interpolate};

/// The depth grid every ellipticity table is sampled on.
pub const DEPTH_GRID_KM: [f64; 6] = [0.0, 100.0, 200.0, 300.0, 500.0, 700.0];

/// One phase's ellipticity table: three (distance × depth) coefficient
/// grids on an implied 5° distance spacing.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipticityTable {
    delta_min_deg: f64,
    delta_step_deg: f64,
    t0: Table2D,
    t1: Table2D,
    t2: Table2D,
}

impl EllipticityTable {
    pub fn new(delta_min_deg: f64, delta_step_deg: f64, t0: Table2D, t1: Table2D, t2: Table2D) -> Self {
        assert_eq!(t0.rows(), DEPTH_GRID_KM.len());
        assert_eq!(t0.rows(), t1.rows());
        assert_eq!(t0.rows(), t2.rows());
        assert_eq!(t0.cols(), t1.cols());
        assert_eq!(t0.cols(), t2.cols());
        Self { delta_min_deg, delta_step_deg, t0, t1, t2 }
    }

    /// Correction in seconds at source colatitude `theta_deg` (clamped to
    /// `[0, 180]`), azimuth `azimuth_deg`, distance `delta_deg`, and source
    /// depth `depth_km`.
    pub fn correction(&self, theta_deg: f64, azimuth_deg: f64, delta_deg: f64, depth_km: f64) -> f64 {
        let theta = theta_deg.clamp(0.0, 180.0).to_radians();
        let azimuth = azimuth_deg.to_radians();

        let depth_index = SampledIndex::new(DEPTH_GRID_KM.to_vec());
        let delta_index = UniformIndex::new(self.delta_min_deg, self.delta_step_deg, self.t0.cols());

        let t0 = bilinear_interpolate(&self.t0, &depth_index, &delta_index, depth_km, delta_deg);
        let t1 = bilinear_interpolate(&self.t1, &depth_index, &delta_index, depth_km, delta_deg);
        let t2 = bilinear_interpolate(&self.t2, &depth_index, &delta_index, depth_km, delta_deg);

        let sqrt3_over_2 = 3.0_f64.sqrt() / 2.0;
        0.25 * (1.0 + 3.0 * (2.0 * theta).cos()) * t0
            + sqrt3_over_2 * (2.0 * theta).sin() * azimuth.cos() * t1
            + sqrt3_over_2 * theta.sin().powi(2) * (2.0 * azimuth).cos() * t2
    }
}
