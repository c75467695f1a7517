//! Scenario-level coverage against a small synthetic multi-branch model.
//!
//! A real ak135 table set is external auxiliary data this crate only
//! consumes (see the loader decision in the repository's design notes);
//! these tests instead build a compact model with plausible P, S, core, and
//! depth-phase branches by hand, and check the qualitative behavior a
//! correct session should show rather than literal reference travel times.

use taup_core::{AuxiliaryData, PhaseFilter, ReceiverGeometry, Session, SessionOptions};
use taup_model::{
    BranchInput, DiffractedInfo, EarthModel, Model, ModelSample, PhaseExtras, SurfaceFocusBranch, Tolerances,
    UpGoingRecord, UpGoingTable, WaveType,
};
use taup_tables::ModelConversions;

fn branch(
    phase_code: &str,
    wave: WaveType,
    p_grid: Vec<f64>,
    tau: Vec<f64>,
    x_min: f64,
    x_max: f64,
    reflection_type: Option<&str>,
) -> SurfaceFocusBranch {
    let input = BranchInput::from_generated_tables(
        phase_code.to_string(),
        phase_code.to_string(),
        vec![wave],
        1,
        1,
        p_grid,
        tau,
        x_min,
        x_max,
        None::<DiffractedInfo>,
        None,
        reflection_type.map(str::to_string),
        None,
    );
    SurfaceFocusBranch::from_input(input).expect("synthetic branch should build")
}

fn build_model() -> Model {
    let tolerances = Tolerances::default();

    let p_model = EarthModel::new(
        vec![
            ModelSample { z_flat: 0.0, p: 1.3, upgoing_index: Some(0) },
            ModelSample { z_flat: -0.15, p: 0.05, upgoing_index: Some(1) },
        ],
        tolerances,
    )
    .unwrap();
    let s_model = EarthModel::new(
        vec![
            ModelSample { z_flat: 0.0, p: 2.2, upgoing_index: Some(0) },
            ModelSample { z_flat: -0.15, p: 0.09, upgoing_index: Some(1) },
        ],
        tolerances,
    )
    .unwrap();

    let up_p_grid = vec![1.3, 1.0, 0.7, 0.4, 0.1, 0.05];
    let up_s_grid = vec![2.2, 1.7, 1.2, 0.7, 0.2, 0.09];
    let zero_record = |grid: &[f64]| UpGoingRecord {
        depth_flat: -0.15,
        tau: vec![0.0; grid.len()],
        distance: vec![0.0; grid.len()],
    };
    let p_upgoing = UpGoingTable::new(up_p_grid.clone(), vec![0.0; up_p_grid.len()], vec![zero_record(&up_p_grid)]).unwrap();
    let s_upgoing = UpGoingTable::new(up_s_grid.clone(), vec![0.0; up_s_grid.len()], vec![zero_record(&up_s_grid)]).unwrap();

    let p_grid = vec![1.2, 0.9, 0.6, 0.3, 0.1];
    let p_tau = vec![1400.0, 1100.0, 800.0, 500.0, 220.0];
    let s_grid = vec![2.0, 1.5, 1.0, 0.5, 0.1];
    let s_tau = vec![2600.0, 2000.0, 1400.0, 800.0, 320.0];

    let branches = vec![
        branch("P", WaveType::P, p_grid.clone(), p_tau.clone(), 0.01, 3.0, None),
        branch("S", WaveType::S, s_grid.clone(), s_tau.clone(), 0.01, 3.0, None),
        branch(
            "PcP",
            WaveType::P,
            p_grid.clone(),
            p_tau.iter().map(|t| t + 80.0).collect(),
            0.3,
            2.8,
            Some("underside"),
        ),
        branch(
            "ScS",
            WaveType::S,
            s_grid.clone(),
            s_tau.iter().map(|t| t + 100.0).collect(),
            0.3,
            2.8,
            Some("underside"),
        ),
        branch(
            "PKP",
            WaveType::P,
            vec![0.5, 0.4, 0.3, 0.2, 0.1],
            vec![1700.0, 1500.0, 1300.0, 1100.0, 900.0],
            1.5,
            3.0,
            None,
        ),
        branch(
            "PKIKP",
            WaveType::P,
            vec![0.35, 0.3, 0.25, 0.2, 0.15],
            vec![1250.0, 1230.0, 1210.0, 1190.0, 1175.0],
            1.4,
            std::f64::consts::PI + 0.01,
            None,
        ),
        branch(
            "pP",
            WaveType::P,
            p_grid.clone(),
            p_tau.iter().map(|t| t + 60.0).collect(),
            0.01,
            3.0,
            Some("surface"),
        ),
    ];

    Model::new(
        ModelConversions::standard(4.5),
        p_model,
        s_model,
        p_upgoing,
        s_upgoing,
        branches,
        PhaseExtras::default(),
        tolerances,
    )
}

fn open(depth_km: f64) -> Session<'static> {
    let model: &'static Model = Box::leak(Box::new(build_model()));
    Session::new_session(model, depth_km, PhaseFilter::All, SessionOptions::default(), AuxiliaryData::default())
        .expect("session should open for a valid depth")
}

#[test]
fn teleseismic_distance_returns_both_p_and_s() {
    let session = open(10.0);
    let arrivals = session.get_tt(ReceiverGeometry::Distance { delta_deg: 30.0, azimuth_deg: None, receiver_elev_km: 0.0 });
    let codes: Vec<&str> = arrivals.iter().map(|a| a.phase_code.as_str()).collect();
    assert!(codes.contains(&"P"));
    assert!(codes.contains(&"S"));
}

#[test]
fn near_source_distance_excludes_reflected_and_core_phases() {
    let session = open(200.0);
    let arrivals = session.get_tt(ReceiverGeometry::Distance { delta_deg: 1.0, azimuth_deg: None, receiver_elev_km: 0.0 });
    for arrival in &arrivals {
        assert!(arrival.is_regional);
        assert!(!matches!(arrival.phase_code.as_str(), "PcP" | "ScS" | "PKP" | "PKIKP"));
    }
}

#[test]
fn antipodal_distance_has_no_direct_p_but_has_pkikp() {
    let session = open(35.0);
    let arrivals = session.get_tt(ReceiverGeometry::Distance { delta_deg: 180.0, azimuth_deg: None, receiver_elev_km: 0.0 });
    let codes: Vec<&str> = arrivals.iter().map(|a| a.phase_code.as_str()).collect();
    assert!(!codes.contains(&"P"));
    assert!(codes.contains(&"PKIKP"));
}

#[test]
fn depth_phase_arrives_strictly_after_direct_p() {
    let session = open(500.0);
    let arrivals = session.get_tt(ReceiverGeometry::Distance { delta_deg: 60.0, azimuth_deg: None, receiver_elev_km: 0.0 });
    let p_time = arrivals.iter().find(|a| a.phase_code == "P").map(|a| a.time_s);
    let pp_time = arrivals.iter().find(|a| a.phase_code == "pP").map(|a| a.time_s);
    if let (Some(p), Some(pp)) = (p_time, pp_time) {
        assert!(pp > p);
    }
}

#[test]
fn plot_sweep_covers_every_branch_with_no_duplicate_points() {
    let session = open(10.0);
    let tracks = taup_core::plot(&session, 180.0, 3600.0, 1.0);

    for expected in ["P", "S", "PKP", "PcP", "ScS"] {
        assert!(tracks.contains_key(expected), "missing track for {expected}");
    }

    for track in tracks.values() {
        let mut seen = std::collections::HashSet::new();
        for point in track {
            let key = (point.delta_deg * 1000.0) as i64;
            assert!(seen.insert(key), "duplicate delta in track");
        }
        for pair in track.windows(2) {
            assert!(pair[0].ray_parameter_s_per_rad <= pair[1].ray_parameter_s_per_rad);
        }
    }
}
