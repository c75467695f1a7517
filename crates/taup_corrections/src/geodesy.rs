//! Great-circle geometry shared by the bounce-point and elevation
//! corrections: angular distance, azimuth, and the arc midpoint between
//! two geodetic points.

use std::f64::consts::PI;

/// A point on the sphere in geocentric latitude/longitude, radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat_rad: f64,
    pub lon_rad: f64,
}

impl GeoPoint {
    pub fn from_degrees(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_rad: lat_deg.to_radians(), lon_rad: lon_deg.to_radians() }
    }

    pub fn lat_deg(&self) -> f64 {
        self.lat_rad.to_degrees()
    }

    pub fn lon_deg(&self) -> f64 {
        self.lon_rad.to_degrees()
    }
}

/// Angular distance (radians) between two points via the haversine formula.
pub fn angular_distance_rad(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlat = b.lat_rad - a.lat_rad;
    let dlon = b.lon_rad - a.lon_rad;
    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();
    let h = sin_dlat * sin_dlat + a.lat_rad.cos() * b.lat_rad.cos() * sin_dlon * sin_dlon;
    2.0 * h.sqrt().clamp(-1.0, 1.0).asin()
}

/// Initial bearing (radians, clockwise from north) of the great-circle arc
/// from `a` to `b`.
pub fn azimuth_rad(a: GeoPoint, b: GeoPoint) -> f64 {
    let dlon = b.lon_rad - a.lon_rad;
    let y = dlon.sin() * b.lat_rad.cos();
    let x = a.lat_rad.cos() * b.lat_rad.sin() - a.lat_rad.sin() * b.lat_rad.cos() * dlon.cos();
    let bearing = y.atan2(x);
    if bearing < 0.0 { bearing + 2.0 * PI } else { bearing }
}

/// The point a fraction `f` of the way along the great-circle arc from `a`
/// to `b` (`f = 0.5` is the midpoint, used for surface-reflection bounce
/// points).
pub fn arc_point(a: GeoPoint, b: GeoPoint, f: f64) -> GeoPoint {
    let angular = angular_distance_rad(a, b);
    if angular.abs() < 1e-12 {
        return a;
    }
    let sin_angular = angular.sin();
    let a_weight = ((1.0 - f) * angular).sin() / sin_angular;
    let b_weight = (f * angular).sin() / sin_angular;

    let ax = a.lat_rad.cos() * a.lon_rad.cos();
    let ay = a.lat_rad.cos() * a.lon_rad.sin();
    let az = a.lat_rad.sin();
    let bx = b.lat_rad.cos() * b.lon_rad.cos();
    let by = b.lat_rad.cos() * b.lon_rad.sin();
    let bz = b.lat_rad.sin();

    let x = a_weight * ax + b_weight * bx;
    let y = a_weight * ay + b_weight * by;
    let z = a_weight * az + b_weight * bz;

    let lat_rad = z.atan2((x * x + y * y).sqrt());
    let lon_rad = y.atan2(x);
    GeoPoint { lat_rad, lon_rad }
}

/// The halfway bounce point for a surface reflection between source and
/// receiver.
pub fn bounce_point(source: GeoPoint, receiver: GeoPoint) -> GeoPoint {
    arc_point(source, receiver, 0.5)
}
