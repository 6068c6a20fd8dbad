//! Integration test: frequency-parallel migration against the sequential
//! baseline.

use plunge_core::{Complex32, MemoryVolume};
use plunge_engine::{DepthContinuationEngine, EngineConfig, EngineError};
use plunge_test_utils::{
    constant_slowness, gaussian_data, random_slowness, test_axes, FailingExtrapolator,
    FixedReferenceSelector, RecordingExtrapolator,
};

fn config() -> EngineConfig {
    let axes = test_axes(5, 10.0, 6, 15.0, 5.0, 12, 10.0);
    let mut cfg = EngineConfig::new(axes.depth, axes.frequency, axes.x, axes.y);
    cfg.max_references = 3;
    cfg.taper = (2, 2);
    cfg.padding = (4, 4);
    cfg
}

fn engine() -> DepthContinuationEngine {
    let cfg = config();
    let slow = random_slowness(cfg.slowness_shape(), 0.0005, 0.0001, 42);
    DepthContinuationEngine::split_step(cfg, Box::new(slow)).unwrap()
}

#[test]
fn parallel_matches_sequential() {
    let mut sequential = engine();
    let mut parallel = engine();
    let data = gaussian_data(sequential.config().data_shape(), 2.5);

    let mut scratch = sequential.alloc_image_scratch();
    let mut expected = MemoryVolume::<f32>::new(sequential.config().image_shape());
    let seq_report = sequential
        .migrate(&mut scratch, &data, &mut expected)
        .unwrap();

    let mut scratch = parallel.alloc_image_scratch();
    let mut actual = MemoryVolume::<f32>::filled(parallel.config().image_shape(), 1.0);
    let par_report = parallel
        .migrate_parallel(&mut scratch, &data, &mut actual, Some(3))
        .unwrap();

    let scale = expected
        .as_slice()
        .iter()
        .fold(0.0f32, |m, v| m.max(v.abs()));
    assert!(scale > 0.0);
    for (i, (a, e)) in actual.as_slice().iter().zip(expected.as_slice()).enumerate() {
        assert!((a - e).abs() <= 1e-4 * scale, "sample {i}: {a} vs {e}");
    }

    assert_eq!(par_report.frequencies, seq_report.frequencies);
    assert_eq!(par_report.extrapolation_steps, seq_report.extrapolation_steps);
    assert_eq!(par_report.slices_read, seq_report.slices_read);
    assert_eq!(par_report.slices_written, seq_report.slices_written);
}

#[test]
fn every_frequency_is_processed_exactly_once() {
    let axes = test_axes(3, 10.0, 7, 10.0, 5.0, 4, 10.0);
    let cfg = EngineConfig::new(axes.depth, axes.frequency, axes.x, axes.y);
    let slow = constant_slowness(cfg.slowness_shape(), 0.0005);
    let rec = RecordingExtrapolator::new();
    let sel = FixedReferenceSelector::from_slices(&[&[1e-6]]);
    let mut engine =
        DepthContinuationEngine::new(cfg, Box::new(slow), Box::new(rec.clone()), &sel).unwrap();

    let mut scratch = engine.alloc_image_scratch();
    let data = MemoryVolume::<Complex32>::new(engine.config().data_shape());
    let mut image = MemoryVolume::<f32>::new(engine.config().image_shape());
    let report = engine
        .migrate_parallel(&mut scratch, &data, &mut image, Some(4))
        .unwrap();
    assert_eq!(report.frequencies, 7);

    let mut omegas: Vec<f32> = rec.steps().iter().map(|s| -s.w.im).collect();
    omegas.sort_by(f32::total_cmp);
    omegas.dedup();
    assert_eq!(omegas.len(), 7);
    assert_eq!(rec.steps().len(), 14);
}

#[test]
fn worker_failure_is_reported() {
    let cfg = config();
    let slow = constant_slowness(cfg.slowness_shape(), 0.0005);
    let sel = FixedReferenceSelector::from_slices(&[&[1e-6]]);
    let mut engine = DepthContinuationEngine::new(
        cfg,
        Box::new(slow),
        Box::new(FailingExtrapolator::new(3)),
        &sel,
    )
    .unwrap();
    let mut scratch = engine.alloc_image_scratch();
    let data = MemoryVolume::<Complex32>::new(engine.config().data_shape());
    let mut image = MemoryVolume::<f32>::new(engine.config().image_shape());
    match engine.migrate_parallel(&mut scratch, &data, &mut image, Some(2)) {
        Err(EngineError::Kernel(_)) => {}
        other => panic!("expected Kernel error, got {other:?}"),
    }
}

#[test]
fn single_worker_is_sequential_order() {
    let mut sequential = engine();
    let mut parallel = engine();
    let data = gaussian_data(sequential.config().data_shape(), 1.5);

    let mut scratch = sequential.alloc_image_scratch();
    let mut expected = MemoryVolume::<f32>::new(sequential.config().image_shape());
    sequential.migrate(&mut scratch, &data, &mut expected).unwrap();

    let mut actual = MemoryVolume::<f32>::new(parallel.config().image_shape());
    parallel
        .migrate_parallel(&mut scratch, &data, &mut actual, Some(1))
        .unwrap();
    assert_eq!(actual, expected);
}
