//! Normalization constants and the flat-Earth transform.
//!
//! Radii, distances, slownesses, tau, and times are carried internally in a
//! non-dimensional form: radii are scaled by the Earth radius, and slowness
//! units follow from a reference surface shear velocity. A flat-Earth
//! transformation maps spherical depth to a non-dimensional flat depth.

/// Radius of the Earth in km (IASP91/ak135 convention).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Immutable conversion constants for one model, fixed for the life of the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelConversions {
    radius_km: f64,
    /// Reference surface shear velocity in km/s, used to non-dimensionalize slowness.
    reference_velocity_km_s: f64,
}

impl ModelConversions {
    /// Build conversions for a model with the given radius and reference velocity.
    pub fn new(radius_km: f64, reference_velocity_km_s: f64) -> Self {
        Self {
            radius_km,
            reference_velocity_km_s,
        }
    }

    /// Conventional ak135/IASP91 conversions (6371 km radius).
    pub fn standard(reference_velocity_km_s: f64) -> Self {
        Self::new(EARTH_RADIUS_KM, reference_velocity_km_s)
    }

    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    pub fn reference_velocity_km_s(&self) -> f64 {
        self.reference_velocity_km_s
    }

    /// Flat-Earth depth: z_f = ln(r / R), for spherical radius `r_km`.
    pub fn flat_depth(&self, r_km: f64) -> f64 {
        (r_km / self.radius_km).ln()
    }

    /// Inverse of [`Self::flat_depth`]: recover spherical radius from flat depth.
    pub fn radius_from_flat_depth(&self, z_flat: f64) -> f64 {
        self.radius_km * z_flat.exp()
    }

    /// Convert spherical depth below the surface (km) to flat-Earth depth.
    pub fn flat_depth_from_spherical_depth(&self, depth_km: f64) -> f64 {
        self.flat_depth(self.radius_km - depth_km)
    }

    /// Convert flat-Earth depth back to spherical depth below the surface (km).
    pub fn spherical_depth_from_flat_depth(&self, z_flat: f64) -> f64 {
        self.radius_km - self.radius_from_flat_depth(z_flat)
    }

    /// Flat-Earth velocity: v_f = v * R / r.
    pub fn flat_velocity(&self, v_km_s: f64, r_km: f64) -> f64 {
        v_km_s * self.radius_km / r_km
    }

    /// Non-dimensional slowness from a spherical slowness (s/radian) at radius `r_km`.
    ///
    /// The reference velocity and radius together fix the units: a
    /// spherical ray parameter `p = r * sin(i) / v` becomes dimensionless
    /// once divided by `radius_km / reference_velocity_km_s`.
    pub fn normalize_slowness(&self, p_s_per_rad: f64) -> f64 {
        p_s_per_rad * self.reference_velocity_km_s / self.radius_km
    }

    /// Inverse of [`Self::normalize_slowness`].
    pub fn denormalize_slowness(&self, p_norm: f64) -> f64 {
        p_norm * self.radius_km / self.reference_velocity_km_s
    }

    /// Non-dimensional time from seconds.
    pub fn normalize_time(&self, seconds: f64) -> f64 {
        seconds * self.reference_velocity_km_s / self.radius_km
    }

    /// Inverse of [`Self::normalize_time`].
    pub fn denormalize_time(&self, t_norm: f64) -> f64 {
        t_norm * self.radius_km / self.reference_velocity_km_s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn flat_depth_roundtrip() {
        let c = ModelConversions::standard(4.5);
        let r = 5800.0;
        let z = c.flat_depth(r);
        assert!((c.radius_from_flat_depth(z) - r).abs() < EPS * r);
    }

    #[test]
    fn surface_flat_depth_is_zero() {
        let c = ModelConversions::standard(4.5);
        assert!(c.flat_depth(c.radius_km()).abs() < EPS);
    }

    #[test]
    fn spherical_depth_roundtrip() {
        let c = ModelConversions::standard(4.5);
        let depth_km = 123.4;
        let z = c.flat_depth_from_spherical_depth(depth_km);
        assert!((c.spherical_depth_from_flat_depth(z) - depth_km).abs() < 1e-9);
    }

    #[test]
    fn slowness_roundtrip() {
        let c = ModelConversions::standard(4.5);
        let p = 6.5;
        let norm = c.normalize_slowness(p);
        assert!((c.denormalize_slowness(norm) - p).abs() < EPS * p);
    }

    #[test]
    fn time_roundtrip() {
        let c = ModelConversions::standard(4.5);
        let t = 373.7;
        assert!((c.denormalize_time(c.normalize_time(t)) - t).abs() < EPS * t);
    }
}
