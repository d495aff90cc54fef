use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Delays shaping automatic triggers into a bounded call rate.
#[derive(Debug, Clone)]
pub struct GateSettings {
    pub debounce_delay: Duration,
    pub throttle_interval: Duration,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            debounce_delay: Duration::from_millis(600),
            throttle_interval: Duration::from_millis(800),
        }
    }
}

type Action = Arc<dyn Fn() + Send + Sync>;

/// Fires the wrapped action only once `delay` has elapsed with no further
/// calls; every call resets the pending timer.
pub struct Debouncer {
    delay: Duration,
    runtime: Handle,
    action: Action,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new(delay: Duration, runtime: Handle, action: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            delay,
            runtime,
            action: Arc::new(action),
            pending: Mutex::new(None),
        }
    }

    pub fn call(&self) {
        let mut pending = self.pending.lock().expect("debounce timer lock");
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        let delay = self.delay;
        let action = self.action.clone();
        *pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        }));
    }
}

/// Guarantees at most one execution of the wrapped action per `interval`.
///
/// A call inside the cooldown window is deferred and coalesced (only the
/// most recent deferred call survives) and fires exactly once when the
/// cooldown expires; a call after the cooldown fires immediately and
/// restarts it.
pub struct Throttler {
    interval: Duration,
    runtime: Handle,
    action: Action,
    state: Arc<Mutex<ThrottleState>>,
}

#[derive(Default)]
struct ThrottleState {
    last_fire: Option<Instant>,
    deferred: Option<JoinHandle<()>>,
}

impl Throttler {
    pub fn new(
        interval: Duration,
        runtime: Handle,
        action: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            interval,
            runtime,
            action: Arc::new(action),
            state: Arc::new(Mutex::new(ThrottleState::default())),
        }
    }

    pub fn call(&self) {
        let now = Instant::now();
        let mut state = self.state.lock().expect("throttle state lock");

        let last_fire = match state.last_fire {
            Some(last) if now.duration_since(last) < self.interval => last,
            _ => {
                state.last_fire = Some(now);
                drop(state);
                (self.action)();
                return;
            }
        };

        // Within the cooldown: coalesce onto a single deferred fire at the
        // window edge.
        if let Some(previous) = state.deferred.take() {
            previous.abort();
        }
        let remaining = self.interval - now.duration_since(last_fire);
        let shared = Arc::clone(&self.state);
        let action = self.action.clone();
        state.deferred = Some(self.runtime.spawn(async move {
            tokio::time::sleep(remaining).await;
            {
                let mut state = shared.lock().expect("throttle state lock");
                state.last_fire = Some(Instant::now());
                state.deferred = None;
            }
            action();
        }));
    }
}

/// Debounce feeding throttle, the shaping applied to every automatic
/// trigger: a keystroke burst fires at most once per throttle interval and
/// always reflects the latest input at fire time.
pub struct AutoGate {
    debouncer: Debouncer,
}

impl AutoGate {
    pub fn new(
        settings: &GateSettings,
        runtime: Handle,
        action: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        let throttler = Throttler::new(settings.throttle_interval, runtime.clone(), action);
        let debouncer = Debouncer::new(settings.debounce_delay, runtime, move || throttler.call());
        Self { debouncer }
    }

    pub fn call(&self) {
        self.debouncer.call();
    }
}
