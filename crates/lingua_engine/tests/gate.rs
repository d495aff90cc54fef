use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lingua_engine::{AutoGate, Debouncer, GateSettings, Throttler};
use tokio::runtime::Handle;

fn counter() -> (Arc<AtomicUsize>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let action = {
        let count = count.clone();
        move || {
            count.fetch_add(1, Ordering::SeqCst);
        }
    };
    (count, action)
}

#[tokio::test(start_paused = true)]
async fn debounce_collapses_a_burst_into_one_fire() {
    let (count, action) = counter();
    let gate = Debouncer::new(Duration::from_millis(600), Handle::current(), action);

    for _ in 0..50 {
        gate.call();
    }
    tokio::time::sleep(Duration::from_millis(700)).await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn debounce_resets_the_timer_on_each_call() {
    let (count, action) = counter();
    let gate = Debouncer::new(Duration::from_millis(600), Handle::current(), action);

    gate.call();
    tokio::time::sleep(Duration::from_millis(300)).await;
    gate.call();

    // 700ms after the first call the reset timer has not expired yet.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn throttle_fires_immediately_when_cold() {
    let (count, action) = counter();
    let gate = Throttler::new(Duration::from_millis(800), Handle::current(), action);

    gate.call();
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn throttle_coalesces_calls_inside_the_cooldown() {
    let (count, action) = counter();
    let gate = Throttler::new(Duration::from_millis(800), Handle::current(), action);

    gate.call();
    gate.call();
    gate.call();
    gate.call();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    // The deferred calls collapse into exactly one fire at the window edge.
    tokio::time::sleep(Duration::from_millis(900)).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn throttle_reopens_after_the_interval() {
    let (count, action) = counter();
    let gate = Throttler::new(Duration::from_millis(800), Handle::current(), action);

    gate.call();
    tokio::time::sleep(Duration::from_millis(900)).await;
    gate.call();

    // Cooldown had expired, so the second call fired immediately.
    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn auto_gate_fires_once_per_burst_with_the_latest_input() {
    let state = Arc::new(Mutex::new(String::new()));
    let fired = Arc::new(Mutex::new(Vec::<String>::new()));
    let gate = {
        let state = state.clone();
        let fired = fired.clone();
        AutoGate::new(&GateSettings::default(), Handle::current(), move || {
            let value = state.lock().unwrap().clone();
            fired.lock().unwrap().push(value);
        })
    };

    // 50 keystrokes inside 500ms.
    for i in 0..50 {
        *state.lock().unwrap() = format!("input-{i}");
        gate.call();
        tokio::time::advance(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(700)).await;

    assert_eq!(*fired.lock().unwrap(), vec!["input-49".to_string()]);

    // A follow-up burst lands inside the throttle cooldown and is deferred
    // to the window edge, still reflecting the latest state.
    *state.lock().unwrap() = "postscript".to_string();
    gate.call();
    tokio::time::sleep(Duration::from_millis(900)).await;

    let fired = fired.lock().unwrap();
    assert_eq!(fired.len(), 2);
    assert_eq!(fired[1], "postscript");
}
