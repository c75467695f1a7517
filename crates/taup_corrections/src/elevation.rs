//! Receiver-elevation correction (C10 / §4.7):
//! `t_elev = e_rec * sqrt(1/v_surface^2 - (p*sinΔ/R)^2)`.

use taup_tables::ModelConversions;

/// Travel-time correction in seconds for a receiver at elevation `e_rec_km`
/// above the reference surface.
pub fn elevation_correction(
    conversions: &ModelConversions,
    e_rec_km: f64,
    v_surface_km_s: f64,
    p_norm: f64,
    delta_rad: f64,
) -> f64 {
    let p = conversions.denormalize_slowness(p_norm);
    let r = conversions.radius_km();
    let horizontal = p * delta_rad.sin() / r;
    let term = 1.0 / (v_surface_km_s * v_surface_km_s) - horizontal * horizontal;
    e_rec_km * term.max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_incidence_reduces_to_simple_scaling() {
        let conversions = ModelConversions::standard(4.5);
        // p = 0 means vertical incidence: correction = e_rec / v_surface.
        let t = elevation_correction(&conversions, 1.2, 6.0, 0.0, 0.5);
        assert!((t - 1.2 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn correction_is_non_negative() {
        let conversions = ModelConversions::standard(4.5);
        let p_norm = conversions.normalize_slowness(6.0 / conversions.radius_km() * 0.1);
        let t = elevation_correction(&conversions, 0.8, 6.0, p_norm, 1.0);
        assert!(t >= 0.0);
    }
}
