//! High-level functions over a loaded model: open a session, evaluate one
//! geometry or sweep a plot, without the caller juggling `Session`
//! lifetimes directly.

use std::collections::BTreeMap;

use taup_core::{
    ArrivalRecord, AuxiliaryData, PhaseFilter, PlotPoint, ReceiverGeometry, Session, SessionOptions,
};
use taup_model::Model;

use crate::TaupError;

/// Thin wrapper over [`taup_core::Session`] construction for one model.
///
/// This is the single authoritative travel-time service type for this
/// facade: the convenience functions ([`travel_times`], [`plot`]) are
/// built on top of it against the global model singleton, not a second,
/// parallel implementation.
pub struct TravelTimeService<'m> {
    model: &'m Model,
}

impl<'m> TravelTimeService<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self { model }
    }

    /// Open a session at `depth_km` for `phase_filter` and evaluate one
    /// receiver geometry against it.
    pub fn travel_times(
        &self,
        depth_km: f64,
        phase_filter: PhaseFilter,
        options: SessionOptions,
        geometry: ReceiverGeometry,
    ) -> Result<Vec<ArrivalRecord>, TaupError> {
        let session = Session::new_session(self.model, depth_km, phase_filter, options, AuxiliaryData::default())?;
        Ok(session.get_tt(geometry))
    }

    /// Open a session at `depth_km` and sweep a plot (§4.5/C13).
    pub fn plot(
        &self,
        depth_km: f64,
        phase_filter: PhaseFilter,
        options: SessionOptions,
        max_delta_deg: f64,
        max_time_s: f64,
        delta_step_deg: f64,
    ) -> Result<BTreeMap<String, Vec<PlotPoint>>, TaupError> {
        let session = Session::new_session(self.model, depth_km, phase_filter, options, AuxiliaryData::default())?;
        Ok(taup_core::plot(&session, max_delta_deg, max_time_s, delta_step_deg))
    }
}

/// Evaluate travel times at `depth_km` for every known phase against the
/// global model singleton (see [`crate::init`]).
pub fn travel_times(depth_km: f64, geometry: ReceiverGeometry) -> Result<Vec<ArrivalRecord>, TaupError> {
    let model = crate::global::model()?;
    TravelTimeService::new(model).travel_times(depth_km, PhaseFilter::All, SessionOptions::default(), geometry)
}

/// Evaluate travel times at `depth_km` restricted to `phases`, against the
/// global model singleton.
pub fn travel_times_for_phases(
    depth_km: f64,
    phases: Vec<String>,
    geometry: ReceiverGeometry,
) -> Result<Vec<ArrivalRecord>, TaupError> {
    let model = crate::global::model()?;
    TravelTimeService::new(model).travel_times(
        depth_km,
        PhaseFilter::Named(phases),
        SessionOptions::default(),
        geometry,
    )
}

/// Sweep a plot at `depth_km` for every known phase, against the global
/// model singleton.
pub fn plot(
    depth_km: f64,
    max_delta_deg: f64,
    max_time_s: f64,
    delta_step_deg: f64,
) -> Result<BTreeMap<String, Vec<PlotPoint>>, TaupError> {
    let model = crate::global::model()?;
    TravelTimeService::new(model).plot(
        depth_km,
        PhaseFilter::All,
        SessionOptions::default(),
        max_delta_deg,
        max_time_s,
        delta_step_deg,
    )
}
