use std::time::Duration;

use lingua_core::ProgressEstimator;
use pretty_assertions::assert_eq;

#[test]
fn unknown_total_degrades_to_single_sentence() {
    let mut estimator = ProgressEstimator::new();
    let view = estimator.sample(20.0, None, Duration::from_secs(2));

    assert_eq!(view.total_sentences, 1);
    assert_eq!(view.current_sentence, 1);
    assert_eq!(view.elapsed_secs, 2.0);
}

#[test]
fn initial_eta_extrapolates_average_sentence_time() {
    let mut estimator = ProgressEstimator::new();
    let view = estimator.sample(30.0, Some(10), Duration::from_secs(3));

    // ceil(10 * 30%) = 3 sentences in 3s, 7 remaining at 1s each.
    assert_eq!(view.current_sentence, 3);
    assert_eq!(view.total_sentences, 10);
    assert_eq!(view.eta_secs, 7.0);
}

#[test]
fn eta_counts_down_by_wall_clock_not_percentage() {
    let mut estimator = ProgressEstimator::new();
    estimator.sample(30.0, Some(10), Duration::from_secs(3));

    // Percentage leaps forward; the ETA still only loses the elapsed second.
    let view = estimator.sample(90.0, Some(10), Duration::from_secs(4));
    assert_eq!(view.eta_secs, 6.0);
    assert_eq!(view.current_sentence, 9);
}

#[test]
fn eta_never_increases_between_ticks() {
    let mut estimator = ProgressEstimator::new();
    let mut last_eta = f64::INFINITY;
    let percents = [10.0, 15.0, 15.0, 40.0, 80.0, 95.0];
    for (tick, percent) in percents.into_iter().enumerate() {
        let view = estimator.sample(percent, Some(20), Duration::from_secs(tick as u64 + 1));
        assert!(view.eta_secs <= last_eta, "eta rose at tick {tick}");
        last_eta = view.eta_secs;
    }
}

#[test]
fn eta_floors_at_zero() {
    let mut estimator = ProgressEstimator::new();
    estimator.sample(50.0, Some(2), Duration::from_secs(1));
    let view = estimator.sample(50.0, Some(2), Duration::from_secs(60));
    assert_eq!(view.eta_secs, 0.0);
}

#[test]
fn server_total_is_adopted_once() {
    let mut estimator = ProgressEstimator::new();
    estimator.sample(10.0, Some(10), Duration::from_secs(1));

    // A later, different total does not retroactively rescale the task.
    let view = estimator.sample(50.0, Some(40), Duration::from_secs(2));
    assert_eq!(view.total_sentences, 10);
    assert_eq!(view.current_sentence, 5);
}

#[test]
fn current_sentence_is_clamped_to_range() {
    let mut estimator = ProgressEstimator::new();
    let view = estimator.sample(0.0, Some(5), Duration::from_secs(1));
    assert_eq!(view.current_sentence, 1);

    let view = estimator.sample(120.0, Some(5), Duration::from_secs(2));
    assert_eq!(view.current_sentence, 5);
}

#[test]
fn reset_forgets_previous_task() {
    let mut estimator = ProgressEstimator::new();
    estimator.sample(50.0, Some(10), Duration::from_secs(5));
    estimator.reset();

    let view = estimator.sample(20.0, None, Duration::from_secs(1));
    assert_eq!(view.total_sentences, 1);
    assert_eq!(view.current_sentence, 1);
}
