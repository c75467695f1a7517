//! All-branches session (C11): opens a depth, recomputes every branch's
//! depth-corrected view, and evaluates dressed arrivals for a geometry.

use crate::arrival::{ArrivalRecord, ReceiverGeometry};
use crate::error::EngineError;
use std::collections::HashMap;
use taup_branch::DepthCorrectedBranch;
use taup_corrections::{
    EllipticityTable, GeoPoint, angular_distance_rad, azimuth_rad, bounce_point_elevation_km,
    elevation_correction, pwp_time, topography_correction,
};
use taup_model::{Model, ModelError, SurfaceFocusBranch, TopographyGrid, WaveType};
use taup_tables::ModelConversions;

/// Flat-depth step used for the central-difference dt/dz estimate.
const DZ_STEP_FLAT: f64 = 1e-4;
/// Arrivals at or inside this distance are flagged regional rather than
/// teleseismic.
const REGIONAL_DELTA_DEG_MAX: f64 = 10.0;
/// Reference ak135 surface velocities, used by corrections that need a
/// near-surface velocity and have no other source for one.
const AK135_SURFACE_VP_KM_S: f64 = 5.8;
const AK135_SURFACE_VS_KM_S: f64 = 3.36;

fn surface_velocity_km_s(wave: WaveType) -> f64 {
    match wave {
        WaveType::P => AK135_SURFACE_VP_KM_S,
        WaveType::S => AK135_SURFACE_VS_KM_S,
    }
}

/// Which phases a session should evaluate.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseFilter {
    All,
    Named(Vec<String>),
}

/// Options that shape `new_session` and every `get_tt` call against it.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub return_all_phases: bool,
    pub return_back_branches: bool,
    /// Translate Pb/Sb crustal phases to Pg/Sg, as appropriate in a
    /// tectonically active region.
    pub tectonic: bool,
    /// Association-window scale: `w = max(alpha * sigma, w_min)`.
    pub alpha: f64,
    pub w_min: f64,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            return_all_phases: false,
            return_back_branches: true,
            tectonic: false,
            alpha: 4.0,
            w_min: 1.0,
        }
    }
}

/// Optional auxiliary data a session applies if loaded: per-phase
/// ellipticity tables and a topography grid for bounce-point corrections.
/// Not part of `Model` because the auxiliary data loader that produces
/// them is an external collaborator this engine only consumes.
#[derive(Default, Clone, Copy)]
pub struct AuxiliaryData<'a> {
    pub ellipticity: Option<&'a HashMap<String, EllipticityTable>>,
    pub topography: Option<&'a TopographyGrid>,
}

struct ActiveBranch<'m> {
    branch: &'m SurfaceFocusBranch,
    wave: WaveType,
    dcb: DepthCorrectedBranch<'m>,
    dcb_plus: DepthCorrectedBranch<'m>,
    dcb_minus: DepthCorrectedBranch<'m>,
}

/// An opened source depth: every branch recomputed once, read-only
/// thereafter (§5).
pub struct Session<'m> {
    model: &'m Model,
    depth_km: f64,
    conversions: ModelConversions,
    options: SessionOptions,
    auxiliary: AuxiliaryData<'m>,
    branches: Vec<ActiveBranch<'m>>,
}

fn phase_filter_matches(model: &Model, filter: &PhaseFilter) -> Result<(), EngineError> {
    let PhaseFilter::Named(names) = filter else {
        return Ok(());
    };
    for name in names {
        let extras = model.extras();
        let known = model.branches().iter().any(|b| b.phase_code() == name)
            || model
                .branches()
                .iter()
                .any(|b| b.diffracted().is_some_and(|d| &d.phase_code == name))
            || extras.group_names().any(|g| g == name);
        if !known {
            return Err(EngineError::PhaseListInvalid(format!(
                "phase filter entry {name:?} matches no branch or group"
            )));
        }
    }
    Ok(())
}

fn branch_passes_filter(model: &Model, branch: &SurfaceFocusBranch, filter: &PhaseFilter) -> bool {
    match filter {
        PhaseFilter::All => true,
        PhaseFilter::Named(names) => {
            let code = branch.phase_code();
            let group = model.extras().phase_group(code);
            let diff_code = branch.diffracted().map(|d| d.phase_code.as_str());
            names.iter().any(|n| {
                n == code || group == Some(n.as_str()) || diff_code == Some(n.as_str())
            })
        }
    }
}

/// The leg nearest the source determines which wave-type model and
/// up-going table lift a surface-focus branch to depth.
fn source_leg_wave(branch: &SurfaceFocusBranch) -> WaveType {
    branch.legs().first().copied().unwrap_or(WaveType::P)
}

impl<'m> Session<'m> {
    /// Open a session at `depth_km` for the phases in `phase_filter`.
    pub fn new_session(
        model: &'m Model,
        depth_km: f64,
        phase_filter: PhaseFilter,
        options: SessionOptions,
        auxiliary: AuxiliaryData<'m>,
    ) -> Result<Self, EngineError> {
        if !depth_km.is_finite() || depth_km < 0.0 {
            return Err(EngineError::DepthOutOfRange { depth_km });
        }
        phase_filter_matches(model, &phase_filter)?;

        let conversions = model.conversions();
        let z_src_flat = conversions.flat_depth_from_spherical_depth(depth_km);
        if let Err(ModelError::DepthTooDeep { .. }) =
            model.model_for(WaveType::P).find_slowness(z_src_flat)
        {
            return Err(EngineError::DepthOutOfRange { depth_km });
        }

        let mut branches = Vec::new();
        for branch in model.branches() {
            if !branch_passes_filter(model, branch, &phase_filter) {
                continue;
            }
            let wave = source_leg_wave(branch);
            let p_model = model.model_for(wave);
            let up_table = model.upgoing_for(wave);

            let dcb = match DepthCorrectedBranch::build(branch, p_model, up_table, z_src_flat) {
                Ok(dcb) => dcb,
                Err(taup_branch::BranchError::InterpolationDegenerate(msg)) => {
                    log::warn!(
                        "branch {} disabled for depth {depth_km} km: {msg}",
                        branch.phase_code()
                    );
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let dcb_plus =
                DepthCorrectedBranch::build(branch, p_model, up_table, z_src_flat + DZ_STEP_FLAT)
                    .unwrap_or_else(|_| {
                        DepthCorrectedBranch::build(branch, p_model, up_table, z_src_flat)
                            .expect("center build already succeeded")
                    });
            let dcb_minus =
                DepthCorrectedBranch::build(branch, p_model, up_table, z_src_flat - DZ_STEP_FLAT)
                    .unwrap_or_else(|_| {
                        DepthCorrectedBranch::build(branch, p_model, up_table, z_src_flat)
                            .expect("center build already succeeded")
                    });

            branches.push(ActiveBranch { branch, wave, dcb, dcb_plus, dcb_minus });
        }

        log::info!(
            "session opened at depth {depth_km} km: {} of {} branches active",
            branches.iter().filter(|b| b.dcb.is_enabled()).count(),
            model.branches().len()
        );

        Ok(Self { model, depth_km, conversions, options, auxiliary, branches })
    }

    pub fn depth_km(&self) -> f64 {
        self.depth_km
    }

    /// Distance (radians) and azimuth (degrees, if derivable) for `geometry`.
    fn delta_and_azimuth(&self, geometry: &ReceiverGeometry) -> (f64, Option<f64>, Option<(GeoPoint, GeoPoint)>) {
        match *geometry {
            ReceiverGeometry::Distance { delta_deg, azimuth_deg, .. } => {
                (delta_deg.to_radians(), azimuth_deg, None)
            }
            ReceiverGeometry::Geodetic {
                source_lat_deg,
                source_lon_deg,
                receiver_lat_deg,
                receiver_lon_deg,
                ..
            } => {
                let source = GeoPoint::from_degrees(source_lat_deg, source_lon_deg);
                let receiver = GeoPoint::from_degrees(receiver_lat_deg, receiver_lon_deg);
                let delta = angular_distance_rad(source, receiver);
                let azimuth = azimuth_rad(source, receiver).to_degrees();
                (delta, Some(azimuth), Some((source, receiver)))
            }
        }
    }

    /// Evaluate dressed arrivals for one receiver geometry (§4.5).
    ///
    /// Infallible by construction: a branch whose root-finding fails is
    /// logged and skipped rather than aborting the call, matching the
    /// "`get_tt` never allocates on the error path" policy by having no
    /// error path at all.
    pub fn get_tt(&self, geometry: ReceiverGeometry) -> Vec<ArrivalRecord> {
        let (delta_rad, azimuth_deg, geo_points) = self.delta_and_azimuth(&geometry);
        let delta_deg = delta_rad.to_degrees();
        let receiver_elev_km = geometry.receiver_elev_km();
        let tolerances = self.model.tolerances();
        let extras = self.model.extras();

        let mut records = Vec::new();

        for active in &self.branches {
            if active.branch.phase_code() == "PnPn" {
                log::debug!("PnPn branch reached in get_tt at delta={delta_deg} deg (diagnostic only)");
            }

            let arrivals = match active
                .dcb
                .find_arrivals(delta_rad, tolerances.eps_x, self.options.return_back_branches)
            {
                Ok(a) => a,
                Err(e) => {
                    log::warn!("branch {} root-finding failed, skipping: {e}", active.branch.phase_code());
                    continue;
                }
            };

            for raw in arrivals {
                let mut phase_code = active.branch.phase_code().to_string();
                if raw.is_diffracted {
                    if let Some(diff) = active.branch.diffracted() {
                        phase_code = diff.phase_code.clone();
                    }
                }
                if self.options.tectonic {
                    phase_code = match phase_code.as_str() {
                        "Pb" => "Pg".to_string(),
                        "Sb" => "Sg".to_string(),
                        _ => phase_code,
                    };
                }

                if extras.is_chaff(&phase_code) && !self.options.return_all_phases {
                    continue;
                }

                let p_norm = raw.ray_parameter;
                let p_denorm = self.conversions.denormalize_slowness(p_norm);
                let mut time_s = self.conversions.denormalize_time(raw.tau_plus_p_delta);

                // (a) ellipticity.
                if let (Some(tables), Some((source, _))) = (self.auxiliary.ellipticity, geo_points) {
                    if let Some(table) = tables.get(&phase_code) {
                        let theta_deg = 90.0 - source.lat_deg();
                        let az = azimuth_deg.unwrap_or(0.0);
                        time_s += table.correction(theta_deg, az, delta_deg, self.depth_km);
                    }
                }

                // (b) bounce-point topography, for depth/reflected phases only.
                let mut pwp_extra = None;
                if active.branch.reflection_type().is_some() {
                    if let (Some(grid), Some((source, receiver))) = (self.auxiliary.topography, geo_points) {
                        if let Ok(elevation_km) = bounce_point_elevation_km(grid, source, receiver) {
                            let v_surface = surface_velocity_km_s(active.wave);
                            time_s += topography_correction(&self.conversions, elevation_km, p_norm, v_surface);
                            if phase_code == "pP" {
                                if let Some(t_pwp) = pwp_time(time_s, elevation_km) {
                                    pwp_extra = Some(t_pwp);
                                }
                            }
                        }
                    }
                }

                // (c) receiver elevation.
                let v_surface = surface_velocity_km_s(active.wave);
                time_s += elevation_correction(&self.conversions, receiver_elev_km, v_surface, p_norm, delta_rad);

                let stats = extras.statistics_for(&phase_code);
                let needs_statistics_bias = stats.and_then(|s| s.bias_at(delta_deg)).is_some();
                if needs_statistics_bias {
                    if let Some(bias) = stats.and_then(|s| s.bias_at(delta_deg)) {
                        time_s += bias;
                    }
                }

                let dt_dz = {
                    let plus = active.dcb_plus.tau_at(p_norm);
                    let minus = active.dcb_minus.tau_at(p_norm);
                    match (plus, minus) {
                        (Ok(tp), Ok(tm)) => {
                            // d(tau)/d(z_flat) -> d(t)/d(depth_km) via
                            // z_flat = ln((R - depth)/R), so d(z_flat)/d(depth) = -1/r.
                            let dtau_dz_flat = (tp - tm) / (2.0 * DZ_STEP_FLAT);
                            let r_km = self.conversions.radius_km() - self.depth_km;
                            -self.conversions.denormalize_time(dtau_dz_flat) / r_km
                        }
                        _ => 0.0,
                    }
                };

                let spread = stats.and_then(|s| s.spread_at(delta_deg));
                let observability = stats.and_then(|s| s.observability_at(delta_deg));
                let spread_slope = stats.and_then(|s| s.spread_slope_at(delta_deg));
                let association_window_s = spread.map(|s| (self.options.alpha * s).max(self.options.w_min));

                let phase_group = extras.phase_group(&phase_code).map(str::to_string);
                let is_depth_sensitive = active.branch.reflection_type().is_some()
                    || phase_code
                        .chars()
                        .next()
                        .is_some_and(|c| c == 'p' || c == 's');
                let down_weight = extras.is_chaff(&phase_code) || raw.is_back_branch || raw.is_diffracted;

                records.push(ArrivalRecord {
                    unique_code: format!("{phase_code}{}", if raw.is_back_branch { "bc" } else { "ab" }),
                    time_s,
                    dt_ddelta_s_per_deg: p_denorm * (std::f64::consts::PI / 180.0),
                    dt_dz_s_per_km: dt_dz,
                    ddelta_dp: raw.ddelta_dp,
                    ray_parameter_s_per_rad: p_denorm,
                    spread_s: spread,
                    observability,
                    spread_slope,
                    association_window_s,
                    phase_group,
                    is_regional: delta_deg <= REGIONAL_DELTA_DEG_MAX,
                    is_depth_sensitive,
                    can_use_for_location: !down_weight,
                    down_weight,
                    needs_statistics_bias,
                    is_add_on: false,
                    phase_code,
                });

                // (d) add-on phase: a synthetic arrival riding this branch's
                // own curve, surfaced only past the base phase's activation
                // distance. A branch generated with its own add-on code
                // (`add_on_phase`) is always eligible; the auxiliary table
                // additionally gates (or substitutes) that by `x_max`.
                if !raw.is_diffracted {
                    let x_max_deg = active.branch.x_range().1.to_degrees();
                    let add_on_code = extras
                        .add_on_of(active.branch.phase_code(), x_max_deg)
                        .map(str::to_string)
                        .or_else(|| active.branch.add_on_phase().map(str::to_string));

                    if let Some(add_on_code) = add_on_code {
                        if !(extras.is_chaff(&add_on_code) && !self.options.return_all_phases) {
                            let add_on_stats = extras.statistics_for(&add_on_code);
                            let add_on_spread = add_on_stats.and_then(|s| s.spread_at(delta_deg));
                            let add_on_window =
                                add_on_spread.map(|s| (self.options.alpha * s).max(self.options.w_min));

                            records.push(ArrivalRecord {
                                unique_code: format!(
                                    "{add_on_code}{}",
                                    if raw.is_back_branch { "bc" } else { "ab" }
                                ),
                                time_s,
                                dt_ddelta_s_per_deg: p_denorm * (std::f64::consts::PI / 180.0),
                                dt_dz_s_per_km: dt_dz,
                                ddelta_dp: raw.ddelta_dp,
                                ray_parameter_s_per_rad: p_denorm,
                                spread_s: add_on_spread,
                                observability: add_on_stats.and_then(|s| s.observability_at(delta_deg)),
                                spread_slope: add_on_stats.and_then(|s| s.spread_slope_at(delta_deg)),
                                association_window_s: add_on_window,
                                phase_group: extras.phase_group(&add_on_code).map(str::to_string),
                                is_regional: delta_deg <= REGIONAL_DELTA_DEG_MAX,
                                is_depth_sensitive: true,
                                can_use_for_location: false,
                                down_weight: true,
                                needs_statistics_bias: add_on_stats.and_then(|s| s.bias_at(delta_deg)).is_some(),
                                is_add_on: true,
                                phase_code: add_on_code,
                            });
                        }
                    }
                }

                if let Some(t_pwp) = pwp_extra {
                    records.push(ArrivalRecord {
                        phase_code: "pwP".to_string(),
                        unique_code: "pwPab".to_string(),
                        time_s: t_pwp,
                        dt_ddelta_s_per_deg: p_denorm * (std::f64::consts::PI / 180.0),
                        dt_dz_s_per_km: dt_dz,
                        ddelta_dp: raw.ddelta_dp,
                        ray_parameter_s_per_rad: p_denorm,
                        spread_s: None,
                        observability: None,
                        spread_slope: None,
                        association_window_s: None,
                        phase_group: None,
                        is_regional: delta_deg <= REGIONAL_DELTA_DEG_MAX,
                        is_depth_sensitive: true,
                        can_use_for_location: false,
                        down_weight: true,
                        needs_statistics_bias: false,
                        is_add_on: true,
                    });
                }
            }
        }

        dedup_and_sort(&mut records, tolerances.eps_t);
        log::debug!("get_tt at delta={delta_deg} deg returned {} arrivals", records.len());
        records
    }
}

/// Keep the earliest arrival within ε_t of a prior arrival sharing the same
/// final phase code, then sort ascending by time with lexicographic
/// phase-code tie-break (§5).
fn dedup_and_sort(records: &mut Vec<ArrivalRecord>, eps_t: f64) {
    records.sort_by(|a, b| {
        a.phase_code
            .cmp(&b.phase_code)
            .then(a.time_s.total_cmp(&b.time_s))
    });

    let mut kept: Vec<ArrivalRecord> = Vec::with_capacity(records.len());
    for record in records.drain(..) {
        let duplicate = kept
            .iter()
            .any(|k| k.phase_code == record.phase_code && (k.time_s - record.time_s).abs() < eps_t);
        if !duplicate {
            kept.push(record);
        }
    }

    kept.sort_by(|a, b| a.time_s.total_cmp(&b.time_s).then_with(|| a.phase_code.cmp(&b.phase_code)));
    *records = kept;
}
