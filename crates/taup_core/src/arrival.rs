//! Arrival records and receiver geometry (part of C11).

/// Source-receiver geometry for one `get_tt` call.
///
/// `Distance` is used when the caller already has Δ (and, for corrections
/// that need it, an azimuth); `Geodetic` lets the session derive both from
/// coordinates, and additionally enables the bounce-point topography and
/// ellipticity corrections, which need real source/receiver positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReceiverGeometry {
    Distance {
        delta_deg: f64,
        azimuth_deg: Option<f64>,
        receiver_elev_km: f64,
    },
    Geodetic {
        source_lat_deg: f64,
        source_lon_deg: f64,
        receiver_lat_deg: f64,
        receiver_lon_deg: f64,
        receiver_elev_km: f64,
    },
}

impl ReceiverGeometry {
    pub fn receiver_elev_km(&self) -> f64 {
        match self {
            Self::Distance { receiver_elev_km, .. } => *receiver_elev_km,
            Self::Geodetic { receiver_elev_km, .. } => *receiver_elev_km,
        }
    }
}

/// One phase arrival, fully dressed with corrections, statistics, and
/// classification flags (§3, Arrival record).
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalRecord {
    pub phase_code: String,
    /// `{phase_code}ab` for the first root on a triplicated branch,
    /// `{phase_code}bc` for the second.
    pub unique_code: String,
    pub time_s: f64,
    pub dt_ddelta_s_per_deg: f64,
    pub dt_dz_s_per_km: f64,
    pub ddelta_dp: f64,
    pub ray_parameter_s_per_rad: f64,
    pub spread_s: Option<f64>,
    pub observability: Option<f64>,
    pub spread_slope: Option<f64>,
    pub association_window_s: Option<f64>,
    pub phase_group: Option<String>,
    pub is_regional: bool,
    pub is_depth_sensitive: bool,
    pub can_use_for_location: bool,
    pub down_weight: bool,
    pub needs_statistics_bias: bool,
    /// A synthetic arrival riding a base phase's curve, surfaced only
    /// because that base phase's branch satisfies an add-on activation
    /// rule — not an independently rooted phase.
    pub is_add_on: bool,
}
