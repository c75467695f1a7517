//! Bounce-point topography and pwP corrections (C10 / §4.7): a depth
//! phase's surface reflection is adjusted for the actual elevation at its
//! bounce point instead of an assumed sea-level reflector.

use crate::geodesy::{GeoPoint, bounce_point};
use taup_model::{ModelError, TopographyGrid};
use taup_tables::ModelConversions;

/// Speed of sound in the water layer used for the pwP correction, km/s.
pub const WATER_VELOCITY_KM_S: f64 = 1.5;

/// Elevation (km, positive up) at the surface-reflection bounce point
/// halfway between source and receiver along the great-circle arc.
pub fn bounce_point_elevation_km(
    grid: &TopographyGrid,
    source: GeoPoint,
    receiver: GeoPoint,
) -> Result<f64, ModelError> {
    let point = bounce_point(source, receiver);
    grid.elevation_km(point.lat_deg(), point.lon_deg())
}

/// Travel-time correction in seconds for non-zero bounce-point elevation:
/// `2*cos(i)/v_surface * elevation_km`, with incidence angle `i` derived
/// from the ray parameter at the bounce.
pub fn topography_correction(
    conversions: &ModelConversions,
    elevation_km: f64,
    p_norm: f64,
    v_surface_km_s: f64,
) -> f64 {
    let p = conversions.denormalize_slowness(p_norm);
    let r = conversions.radius_km();
    let sin_i = (p * v_surface_km_s / r).clamp(-1.0, 1.0);
    let incidence = sin_i.asin();
    2.0 * incidence.cos() / v_surface_km_s * elevation_km
}

/// pwP time given a pP arrival time and the bounce-point elevation, when
/// the bounce point is below sea level (`elevation_km < 0`).
pub fn pwp_time(pp_time_s: f64, elevation_km: f64) -> Option<f64> {
    if elevation_km >= 0.0 {
        return None;
    }
    let water_depth_km = -elevation_km;
    Some(pp_time_s + 2.0 * water_depth_km / WATER_VELOCITY_KM_S)
}
