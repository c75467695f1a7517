use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use taup_branch::DepthCorrectedBranch;
use taup_model::{BranchInput, EarthModel, ModelSample, Tolerances, UpGoingTable, WaveType};
use taup_model::SurfaceFocusBranch;

fn build_branch() -> SurfaceFocusBranch {
    let p: Vec<f64> = (0..40).map(|i| 0.8 - i as f64 * 0.015).collect();
    let tau: Vec<f64> = p.iter().map(|&pi| 600.0 - 120.0 * pi - 30.0 * pi * pi).collect();
    let input = BranchInput::from_legacy_tables("P".into(), "P".into(), vec![WaveType::P], 1, 1, p, tau, 5.0, 95.0);
    SurfaceFocusBranch::from_input(input).unwrap()
}

fn build_model() -> EarthModel {
    let samples = vec![
        ModelSample { z_flat: 0.0, p: 0.9, upgoing_index: Some(0) },
        ModelSample { z_flat: -0.5, p: 0.1, upgoing_index: Some(1) },
    ];
    EarthModel::new(samples, Tolerances::default()).unwrap()
}

fn bench_depth_correction(c: &mut Criterion) {
    let branch = build_branch();
    let model = build_model();
    let up = UpGoingTable::new((0..40).map(|i| 0.8 - i as f64 * 0.015).collect(), vec![0.0; 40], vec![]).unwrap();

    c.bench_function("depth_corrected_branch_build", |b| {
        b.iter(|| black_box(DepthCorrectedBranch::build(black_box(&branch), black_box(&model), black_box(&up), black_box(-0.05))))
    });

    let dcb = DepthCorrectedBranch::build(&branch, &model, &up, -0.05).unwrap();
    let (x_lo, x_hi) = dcb.x_range();
    let target = (x_lo + x_hi) / 2.0;
    c.bench_function("depth_corrected_branch_find_arrivals", |b| {
        b.iter(|| black_box(dcb.find_arrivals(black_box(target), black_box(1e-6), black_box(true))))
    });
}

criterion_group!(benches, bench_depth_correction);
criterion_main!(benches);
