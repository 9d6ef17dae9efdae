//! Integration test: execution modes, progress and cancellation.
//!
//! The threaded executor must reproduce the sequential result exactly for
//! a given caller seed, report progress once per site, and return nothing
//! once cancelled.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use vecol_core::{CancelToken, LookupError, ObserveError, SamplePoint, Site};
use vecol_obs::{
    get_observations, get_observations_with, Execution, LookupPolicy, ObservationRequest,
    RunContext, SamplingStrategy,
};
use vecol_test_utils::{ramp_field, RecordingProgress};

fn sites(n: u32) -> Vec<Site> {
    (0..n)
        .map(|i| Site::new(f64::from(i % 8) + 0.5, f64::from(i / 8 % 8) + 0.5))
        .collect()
}

fn request(strategy: SamplingStrategy, execution: Execution) -> ObservationRequest {
    ObservationRequest::builder()
        .strategy(strategy)
        .obs_error_param(Some(0.1))
        .execution(execution)
        .build()
        .unwrap()
}

#[test]
fn threaded_and_sequential_agree() {
    let (field, meta) = ramp_field(8, 8, 30);
    let strategies = [
        SamplingStrategy::RandomAllLayers { prop: 0.2 },
        SamplingStrategy::MonitoringBased {
            sites: sites(40),
            prob: 0.25,
        },
    ];
    for strategy in strategies {
        let seq = get_observations(
            &field,
            &meta,
            &request(strategy.clone(), Execution::Sequential),
            &mut ChaCha8Rng::seed_from_u64(2024),
        )
        .unwrap();
        for workers in [Some(2), Some(7), None] {
            let par = get_observations(
                &field,
                &meta,
                &request(strategy.clone(), Execution::Threaded { workers }),
                &mut ChaCha8Rng::seed_from_u64(2024),
            )
            .unwrap();
            assert_eq!(seq, par, "{} with {workers:?} workers", strategy.kind());
        }
    }
}

#[test]
fn progress_is_reported_per_site() {
    let (field, meta) = ramp_field(8, 8, 12);
    let mut progress = RecordingProgress::new();
    get_observations_with(
        &field,
        &meta,
        &request(
            SamplingStrategy::MonitoringBased {
                sites: sites(13),
                prob: 0.3,
            },
            Execution::Threaded { workers: Some(3) },
        ),
        &mut ChaCha8Rng::seed_from_u64(1),
        RunContext::new().with_progress(&mut progress),
    )
    .unwrap();
    assert_eq!(progress.total, Some(13));
    assert_eq!(progress.ticks, 13);
    assert!(progress.finished);
}

#[test]
fn cancellation_mid_run_returns_no_rows() {
    let (field, meta) = ramp_field(8, 8, 12);
    let cancel = CancelToken::new();
    let mut progress = RecordingProgress::cancelling_after(4, cancel.clone());
    let result = get_observations_with(
        &field,
        &meta,
        &request(
            SamplingStrategy::MonitoringBased {
                sites: sites(20),
                prob: 0.3,
            },
            Execution::Sequential,
        ),
        &mut ChaCha8Rng::seed_from_u64(1),
        RunContext::new()
            .with_progress(&mut progress)
            .with_cancel(cancel),
    );
    assert_eq!(result, Err(ObserveError::Cancelled));
    assert!(!progress.finished);
}

#[test]
fn threaded_cancellation_stops_progress_and_returns_no_rows() {
    let (field, meta) = ramp_field(8, 8, 12);
    let cancel = CancelToken::new();
    let mut progress = RecordingProgress::cancelling_after(4, cancel.clone());
    let result = get_observations_with(
        &field,
        &meta,
        &request(
            SamplingStrategy::MonitoringBased {
                sites: sites(20),
                prob: 0.3,
            },
            Execution::Threaded { workers: Some(4) },
        ),
        &mut ChaCha8Rng::seed_from_u64(1),
        RunContext::new()
            .with_progress(&mut progress)
            .with_cancel(cancel),
    );
    assert_eq!(result, Err(ObserveError::Cancelled));
    assert_eq!(progress.ticks, 4);
    assert!(!progress.finished);
}

#[test]
fn lookup_policy_controls_out_of_domain_points() {
    let (field, meta) = ramp_field(3, 3, 2);
    let points = vec![SamplePoint::new(0.5, 0.5, 1), SamplePoint::new(-4.0, 0.5, 1)];

    let lenient = ObservationRequest::builder()
        .strategy(SamplingStrategy::FromData {
            points: points.clone(),
        })
        .build()
        .unwrap();
    let table =
        get_observations(&field, &meta, &lenient, &mut ChaCha8Rng::seed_from_u64(0)).unwrap();
    assert_eq!(table.rows()[1].n, None);

    let strict = ObservationRequest::builder()
        .strategy(SamplingStrategy::FromData { points })
        .lookup_policy(LookupPolicy::Fail)
        .build()
        .unwrap();
    assert_eq!(
        get_observations(&field, &meta, &strict, &mut ChaCha8Rng::seed_from_u64(0)),
        Err(ObserveError::Lookup(LookupError::OutsideExtent { x: -4.0, y: 0.5 }))
    );
}
