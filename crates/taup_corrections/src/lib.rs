//! Travel-time corrections applied to raw branch arrivals (C10): Earth
//! ellipticity, receiver elevation, and bounce-point topography/pwP.

pub mod elevation;
pub mod ellipticity;
pub mod geodesy;
pub mod topography;

pub use elevation::elevation_correction;
pub use ellipticity::{DEPTH_GRID_KM, EllipticityTable};
pub use geodesy::{GeoPoint, angular_distance_rad, arc_point, azimuth_rad, bounce_point};
pub use topography::{WATER_VELOCITY_KM_S, bounce_point_elevation_km, pwp_time, topography_correction};
