//! Plot driver (C13): a dense sweep over distance producing per-branch
//! tracks of (Δ, t, σ, observability, p), for visualizing the travel-time
//! curves a session's branches trace out.

use crate::arrival::ReceiverGeometry;
use crate::session::Session;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub delta_deg: f64,
    pub time_s: f64,
    pub spread_s: Option<f64>,
    pub observability: Option<f64>,
    pub ray_parameter_s_per_rad: f64,
}

/// Sweep `Δ` from 0 to `max_delta_deg` in steps of `delta_step_deg`,
/// dropping points past `max_time_s`, and return one ascending-by-ray-
/// parameter track per phase code.
///
/// Each step reuses [`Session::get_tt`] at that Δ with no receiver
/// elevation or azimuth, so corrections that need real geodetic coordinates
/// (ellipticity, bounce-point topography) do not apply to plot tracks.
pub fn plot(
    session: &Session,
    max_delta_deg: f64,
    max_time_s: f64,
    delta_step_deg: f64,
) -> BTreeMap<String, Vec<PlotPoint>> {
    let mut tracks: BTreeMap<String, Vec<PlotPoint>> = BTreeMap::new();
    if delta_step_deg <= 0.0 {
        return tracks;
    }

    let mut delta_deg = 0.0;
    while delta_deg <= max_delta_deg + 1e-9 {
        let geometry = ReceiverGeometry::Distance {
            delta_deg,
            azimuth_deg: None,
            receiver_elev_km: 0.0,
        };
        for arrival in session.get_tt(geometry) {
            if arrival.time_s > max_time_s {
                continue;
            }
            let track = tracks.entry(arrival.phase_code.clone()).or_default();
            if track.iter().any(|p| (p.delta_deg - delta_deg).abs() < 1e-9) {
                continue;
            }
            track.push(PlotPoint {
                delta_deg,
                time_s: arrival.time_s,
                spread_s: arrival.spread_s,
                observability: arrival.observability,
                ray_parameter_s_per_rad: arrival.ray_parameter_s_per_rad,
            });
        }
        delta_deg += delta_step_deg;
    }

    for track in tracks.values_mut() {
        track.sort_by(|a, b| a.ray_parameter_s_per_rad.total_cmp(&b.ray_parameter_s_per_rad));
    }
    tracks
}
