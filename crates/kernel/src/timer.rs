use crate::clock::Clock;

/// Frame delta source and FPS/UPS sampler for the loop thread.
///
/// Reading the delta also feeds a rolling one-second window, so
/// [`Timer::delta`] must be called exactly once per loop iteration.
#[derive(Debug)]
pub struct Timer<C> {
    clock: C,
    last_loop_time: f64,
    rolling: f64,
    tick_count: u32,
    fps: u32,
    fps_count: u32,
    ups: u32,
    ups_count: u32,
}

impl<C: Clock> Timer<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            last_loop_time: 0.0,
            rolling: 0.0,
            tick_count: 0,
            fps: 0,
            fps_count: 0,
            ups: 0,
            ups_count: 0,
        }
    }

    /// Record the current time as the baseline for the first delta.
    pub fn start(&mut self) {
        self.last_loop_time = self.clock.now();
    }

    /// Seconds since the previous call (or since [`Timer::start`]).
    pub fn delta(&mut self) -> f64 {
        let now = self.clock.now();
        let delta = now - self.last_loop_time;
        self.last_loop_time = now;
        self.rolling += delta;
        delta
    }

    /// Count one fixed simulation step.
    pub fn mark_update(&mut self) {
        self.ups_count += 1;
        self.tick_count += 1;
    }

    /// Count one rendered frame.
    pub fn mark_render(&mut self) {
        self.fps_count += 1;
    }

    /// Snapshot the sample counters once more than a second has accumulated.
    ///
    /// The rolling window keeps its remainder: one second is subtracted, not
    /// cleared. Returns whether new rates were published.
    pub fn publish(&mut self) -> bool {
        if self.rolling <= 1.0 {
            return false;
        }
        self.fps = self.fps_count;
        self.fps_count = 0;
        self.ups = self.ups_count;
        self.ups_count = 0;
        self.rolling -= 1.0;
        true
    }

    /// Last published frame rate, or the live sample count before the first
    /// non-zero publication.
    pub fn fps(&self) -> u32 {
        if self.fps > 0 { self.fps } else { self.fps_count }
    }

    /// Last published update rate, with the same fallback as [`Timer::fps`].
    pub fn ups(&self) -> u32 {
        if self.ups > 0 { self.ups } else { self.ups_count }
    }

    /// Update steps since the last [`Timer::reset_tick_count`].
    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    pub fn reset_tick_count(&mut self) {
        self.tick_count = 0;
    }

    /// Seconds accumulated in the current rate window.
    pub fn rolling_seconds(&self) -> f64 {
        self.rolling
    }

    pub fn time(&self) -> f64 {
        self.clock.now()
    }

    pub fn last_loop_time(&self) -> f64 {
        self.last_loop_time
    }
}
