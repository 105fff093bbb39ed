use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Monotonic time source in seconds.
pub trait Clock: Send + 'static {
    fn now(&self) -> f64;
}

/// Wall clock measured from the moment it was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

#[derive(Debug, Default)]
struct ManualState {
    now: f64,
    auto_step: f64,
}

/// Shared, explicitly driven clock for tests and headless simulation.
///
/// Clones observe the same time. With an auto-advance step every read moves
/// time forward by that step after returning the current value.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_auto_advance(step: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                now: 0.0,
                auto_step: step,
            })),
        }
    }

    pub fn advance(&self, secs: f64) {
        self.lock().now += secs;
    }

    pub fn set(&self, secs: f64) {
        self.lock().now = secs;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        let mut state = self.lock();
        let t = state.now;
        state.now += state.auto_step;
        t
    }
}
