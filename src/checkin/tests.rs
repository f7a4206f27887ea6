use super::*;
use crate::config::{CheckInConfig, RosterConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

fn create_test_config() -> CheckInConfig {
    RosterConfig::default().checkin
}

fn only_outcome(success: f64, failure: f64, no_face: f64) -> CheckInConfig {
    let mut config = create_test_config();
    config.success_weight = success;
    config.failure_weight = failure;
    config.no_face_weight = no_face;
    config
}

fn in_window(delay: Duration, (min, max): (u64, u64)) -> bool {
    let ms = delay.as_millis() as u64;
    ms >= min && ms <= max
}

/// Step from a fresh state up to and including the processing phase
fn to_processing(rng: &mut StdRng, config: &CheckInConfig) -> (CheckInState, Duration) {
    let (detected, _) = advance(&CheckInState::default(), rng, config);
    advance(&detected, rng, config)
}

#[test]
fn test_cycle_order_and_windows() {
    let config = create_test_config();
    let mut rng = StdRng::seed_from_u64(7);
    let start = CheckInState::default();
    assert_eq!(start.phase, CheckInPhase::Scanning);
    assert!(in_window(dwell(start.phase, &mut rng, &config), config.scanning_ms));

    let (detected, delay) = advance(&start, &mut rng, &config);
    assert_eq!(detected.phase, CheckInPhase::FaceDetected);
    assert!(in_window(delay, config.face_detected_ms));

    let (processing, delay) = advance(&detected, &mut rng, &config);
    assert_eq!(processing.phase, CheckInPhase::Processing);
    assert!(processing.processing);
    assert!(in_window(delay, config.processing_ms));

    let (result, delay) = advance(&processing, &mut rng, &config);
    assert!(result.phase.is_result());
    assert!(!result.processing);
    assert_eq!(result.results_shown, 1);
    assert!(in_window(delay, config.result_ms));

    let (again, delay) = advance(&result, &mut rng, &config);
    assert_eq!(again.phase, CheckInPhase::Scanning);
    assert!(in_window(delay, config.scanning_ms));
    assert_eq!(again.results_shown, 1);
}

#[test]
fn test_success_records_student_and_notice() {
    let config = only_outcome(1.0, 0.0, 0.0);
    let mut rng = StdRng::seed_from_u64(11);

    let (processing, processing_delay) = to_processing(&mut rng, &config);
    let (success, _) = advance(&processing, &mut rng, &config);

    assert_eq!(success.phase, CheckInPhase::Success);
    assert_eq!(success.successes, 1);
    let student = success.last_student.clone().unwrap();
    assert!(demo_pool().contains(&student));
    assert!(success.last_check_at.is_some());

    let reported = success.processing_ms.unwrap();
    let dwell_ms = processing_delay.as_millis() as u64;
    assert!(reported >= dwell_ms && reported <= dwell_ms + 250);

    assert_eq!(success.outbox.len(), 1);
    let notice = &success.outbox[0];
    assert_eq!(notice.student_id, student.id);
    assert_eq!(notice.phone, student.guardian_phone);
    assert!(notice.message.starts_with(&student.name));
}

#[test]
fn test_outbox_keeps_most_recent_notices() {
    let mut config = only_outcome(1.0, 0.0, 0.0);
    config.outbox_limit = 5;
    let mut rng = StdRng::seed_from_u64(21);

    let mut state = CheckInState::default();
    for _ in 0..200 {
        state = advance(&state, &mut rng, &config).0;
    }

    assert_eq!(state.successes, 50);
    assert_eq!(state.outbox.len(), 5);
    let newest = state.outbox.back().unwrap();
    assert_eq!(Some(&newest.student_id), state.last_student.as_ref().map(|s| &s.id));
}

#[test]
fn test_failure_and_no_face_leave_last_check() {
    for (config, expected) in [
        (only_outcome(0.0, 1.0, 0.0), CheckInPhase::Failure),
        (only_outcome(0.0, 0.0, 1.0), CheckInPhase::NoFace),
    ] {
        let mut rng = StdRng::seed_from_u64(3);
        let (processing, _) = to_processing(&mut rng, &config);
        let (result, _) = advance(&processing, &mut rng, &config);

        assert_eq!(result.phase, expected);
        assert!(result.last_student.is_none());
        assert!(result.last_check_at.is_none());
        assert!(result.outbox.is_empty());
    }
}

#[test]
fn test_empty_pool_cannot_succeed() {
    let config = only_outcome(1.0, 0.0, 0.0);
    let mut rng = StdRng::seed_from_u64(5);

    let (detected, _) = advance(&CheckInState::new(Vec::new()), &mut rng, &config);
    let (processing, _) = advance(&detected, &mut rng, &config);
    let (result, _) = advance(&processing, &mut rng, &config);

    assert_eq!(result.phase, CheckInPhase::Failure);
    assert!(result.outbox.is_empty());
}

#[test]
fn test_outcome_weights() {
    let config = create_test_config();
    let mut rng = StdRng::seed_from_u64(42);
    let (processing, _) = to_processing(&mut rng, &config);

    let runs = 10_000;
    let mut success = 0;
    let mut failure = 0;
    let mut no_face = 0;
    for _ in 0..runs {
        match advance(&processing, &mut rng, &config).0.phase {
            CheckInPhase::Success => success += 1,
            CheckInPhase::Failure => failure += 1,
            CheckInPhase::NoFace => no_face += 1,
            other => panic!("unexpected phase {:?}", other),
        }
    }

    let share = |n: i32| n as f64 / runs as f64;
    assert!((share(success) - 0.75).abs() < 0.03);
    assert!((share(failure) - 0.15).abs() < 0.03);
    assert!((share(no_face) - 0.10).abs() < 0.03);
}

#[tokio::test(start_paused = true)]
async fn test_simulation_runs_until_results() {
    let config = create_test_config();
    let mut handle = CheckInSimulation::seeded(&config, 99).start();
    assert!(handle.is_running());

    let state = handle.wait_for_results(3).await.unwrap();

    assert_eq!(state.results_shown, 3);
    assert!(state.phase.is_result());
    assert_eq!(state.outbox.len() as u64, state.successes);
}

#[tokio::test(start_paused = true)]
async fn test_stop_halts_transitions() {
    let config = create_test_config();
    let handle = CheckInSimulation::seeded(&config, 1).start();
    let mut observer = handle.subscribe();

    observer.changed().await.unwrap();
    handle.stop();
    let frozen = handle.state();

    tokio::time::sleep(Duration::from_secs(60)).await;

    let after = handle.state();
    assert_eq!(after.phase, frozen.phase);
    assert_eq!(after.results_shown, frozen.results_shown);
    assert!(!handle.is_running());

    let last = handle.shutdown().await.unwrap();
    assert_eq!(last.phase, frozen.phase);
}

#[tokio::test(start_paused = true)]
async fn test_wait_after_stop_is_cancelled() {
    let config = create_test_config();
    let mut handle = CheckInSimulation::seeded(&config, 2).start();
    handle.stop();

    let result = handle.wait_for_results(1).await;

    assert!(matches!(
        result,
        Err(crate::error::RosterError::Cancelled { .. })
    ));
}
