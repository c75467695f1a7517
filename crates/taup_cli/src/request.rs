//! Service-mode request/response shapes (§6 "Service surface"): a thin
//! shell translating a JSON request file into `taup_core::Session` calls
//! and a JSON response file, not a second engine implementation.

use serde::{Deserialize, Serialize};
use taup_core::{ArrivalRecord, ReceiverGeometry};

#[derive(Debug, Deserialize)]
pub struct ServiceRequest {
    pub model_name: String,
    pub source_depth_km: f64,
    #[serde(default)]
    pub tectonic: bool,
    #[serde(default)]
    pub return_all_phases: bool,
    #[serde(default = "default_true")]
    pub return_back_branches: bool,
    #[serde(default)]
    pub phases: Option<Vec<String>>,
    pub receivers: Vec<ReceiverRequest>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ReceiverRequest {
    Distance {
        delta_deg: f64,
        azimuth_deg: Option<f64>,
        #[serde(default)]
        receiver_elev_km: f64,
    },
    Geodetic {
        source_lat_deg: f64,
        source_lon_deg: f64,
        receiver_lat_deg: f64,
        receiver_lon_deg: f64,
        #[serde(default)]
        receiver_elev_km: f64,
    },
}

impl From<&ReceiverRequest> for ReceiverGeometry {
    fn from(r: &ReceiverRequest) -> Self {
        match *r {
            ReceiverRequest::Distance { delta_deg, azimuth_deg, receiver_elev_km } => {
                ReceiverGeometry::Distance { delta_deg, azimuth_deg, receiver_elev_km }
            }
            ReceiverRequest::Geodetic {
                source_lat_deg,
                source_lon_deg,
                receiver_lat_deg,
                receiver_lon_deg,
                receiver_elev_km,
            } => ReceiverGeometry::Geodetic {
                source_lat_deg,
                source_lon_deg,
                receiver_lat_deg,
                receiver_lon_deg,
                receiver_elev_km,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceResponse {
    pub receivers: Vec<ReceiverArrivals>,
}

#[derive(Debug, Serialize)]
pub struct ReceiverArrivals {
    pub arrivals: Vec<ResponseArrival>,
}

#[derive(Debug, Serialize)]
pub struct ResponseArrival {
    pub phase_code: String,
    pub unique_code: String,
    pub time_s: f64,
    pub dt_ddelta_s_per_deg: f64,
    pub dt_dz_s_per_km: f64,
    pub ray_parameter_s_per_rad: f64,
    pub spread_s: Option<f64>,
    pub observability: Option<f64>,
    pub is_regional: bool,
    pub down_weight: bool,
    pub is_add_on: bool,
}

impl From<&ArrivalRecord> for ResponseArrival {
    fn from(a: &ArrivalRecord) -> Self {
        Self {
            phase_code: a.phase_code.clone(),
            unique_code: a.unique_code.clone(),
            time_s: a.time_s,
            dt_ddelta_s_per_deg: a.dt_ddelta_s_per_deg,
            dt_dz_s_per_km: a.dt_dz_s_per_km,
            ray_parameter_s_per_rad: a.ray_parameter_s_per_rad,
            spread_s: a.spread_s,
            observability: a.observability,
            is_regional: a.is_regional,
            down_weight: a.down_weight,
            is_add_on: a.is_add_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_distance_receiver() {
        let json = r#"{"delta_deg": 30.0, "azimuth_deg": null}"#;
        let receiver: ReceiverRequest = serde_json::from_str(json).unwrap();
        assert!(matches!(receiver, ReceiverRequest::Distance { delta_deg, .. } if delta_deg == 30.0));
    }

    #[test]
    fn parses_a_full_request() {
        let json = r#"{
            "model_name": "ak135",
            "source_depth_km": 10.0,
            "receivers": [{"delta_deg": 30.0}]
        }"#;
        let request: ServiceRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.receivers.len(), 1);
        assert!(request.return_back_branches);
    }
}
