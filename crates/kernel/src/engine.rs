use crate::clock::{Clock, SystemClock};
use crate::config::{ConfigError, LoopConfig, RenderMode};
use crate::game::{BoxError, Game, Platform};
use crate::stepper::FixedStep;
use crate::timer::Timer;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

/// Name of the dedicated loop thread spawned by [`Engine::start`].
pub const LOOP_THREAD_NAME: &str = "facet-loop";

/// Errors that stop or prevent a loop.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("loop already started (state: {0})")]
    AlreadyStarted(LoopState),
    #[error("platform initialization failed: {0}")]
    FatalInit(String),
    #[error("game initialization failed: {0}")]
    GameInit(String),
    #[error("loop thread panicked")]
    LoopPanicked,
    #[error("failed to spawn loop thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Lifecycle of the loop. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Uninitialized,
    Running,
    Stopping,
    Terminated,
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::Uninitialized => "uninitialized",
            LoopState::Running => "running",
            LoopState::Stopping => "stopping",
            LoopState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// Totals for one completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopReport {
    pub updates: u64,
    pub frames: u64,
    pub fps: u32,
    pub ups: u32,
}

/// Window title carrying the latest published rates.
pub fn format_title(base: &str, fps: u32, ups: u32) -> String {
    format!("{base} | FPS: {fps}, UPS: {ups}")
}

/// Handle to a loop running on its own thread.
#[derive(Debug)]
pub struct LoopHandle {
    thread: JoinHandle<Result<LoopReport, EngineError>>,
}

impl LoopHandle {
    /// Wait for the loop to terminate.
    pub fn join(self) -> Result<LoopReport, EngineError> {
        self.thread.join().map_err(|_| EngineError::LoopPanicked)?
    }
}

/// Fixed-timestep loop controller.
///
/// One engine drives at most one loop over its lifetime: the first `start`
/// or `run` claims it, and every later call is rejected with
/// [`EngineError::AlreadyStarted`] without touching the game.
#[derive(Debug)]
pub struct Engine<C: Clock + Clone = SystemClock> {
    config: LoopConfig,
    title: String,
    clock: C,
    state: Arc<Mutex<LoopState>>,
}

impl Engine<SystemClock> {
    pub fn new(config: LoopConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock + Clone> Engine<C> {
    pub fn with_clock(config: LoopConfig, clock: C) -> Self {
        Self {
            config,
            title: "Window".to_owned(),
            clock,
            state: Arc::new(Mutex::new(LoopState::Uninitialized)),
        }
    }

    /// Base window title the rate report is appended to.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    pub fn state(&self) -> LoopState {
        *lock(&self.state)
    }

    /// Run the loop on a dedicated thread.
    ///
    /// The platform is built by `create_platform` on that thread, so it need
    /// not be `Send`.
    pub fn start<G, P, F>(&self, game: G, create_platform: F) -> Result<LoopHandle, EngineError>
    where
        G: Game<P> + Send + 'static,
        P: Platform + 'static,
        F: FnOnce() -> Result<P, BoxError> + Send + 'static,
    {
        self.claim()?;
        let runner = LoopRunner {
            config: self.config.clone(),
            title: self.title.clone(),
            clock: self.clock.clone(),
            state: Arc::clone(&self.state),
        };
        let spawned = std::thread::Builder::new()
            .name(LOOP_THREAD_NAME.to_owned())
            .spawn(move || runner.run(game, create_platform));
        match spawned {
            Ok(thread) => Ok(LoopHandle { thread }),
            Err(e) => {
                *lock(&self.state) = LoopState::Uninitialized;
                Err(EngineError::Spawn(e))
            }
        }
    }

    /// Run the loop on the calling thread until it terminates.
    pub fn run<G, P, F>(&self, game: G, create_platform: F) -> Result<LoopReport, EngineError>
    where
        G: Game<P>,
        P: Platform,
        F: FnOnce() -> Result<P, BoxError>,
    {
        self.claim()?;
        let runner = LoopRunner {
            config: self.config.clone(),
            title: self.title.clone(),
            clock: self.clock.clone(),
            state: Arc::clone(&self.state),
        };
        runner.run(game, create_platform)
    }

    fn claim(&self) -> Result<(), EngineError> {
        let mut state = lock(&self.state);
        if *state != LoopState::Uninitialized {
            tracing::warn!(state = %*state, "rejected start: loop already claimed");
            return Err(EngineError::AlreadyStarted(*state));
        }
        if let Err(e) = self.config.validate() {
            tracing::error!(error = %e, "rejected start: invalid loop config");
            return Err(e.into());
        }
        *state = LoopState::Running;
        Ok(())
    }
}

fn lock(state: &Mutex<LoopState>) -> MutexGuard<'_, LoopState> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

struct LoopRunner<C> {
    config: LoopConfig,
    title: String,
    clock: C,
    state: Arc<Mutex<LoopState>>,
}

impl<C: Clock + Clone> LoopRunner<C> {
    fn transition(&self, next: LoopState) {
        let mut state = lock(&self.state);
        tracing::info!(from = %*state, to = %next, "loop state");
        *state = next;
    }

    /// Run the whole lifecycle. A panic anywhere in it still leaves the
    /// state at `Terminated` and surfaces as [`EngineError::LoopPanicked`].
    fn run<G, P, F>(self, game: G, create_platform: F) -> Result<LoopReport, EngineError>
    where
        G: Game<P>,
        P: Platform,
        F: FnOnce() -> Result<P, BoxError>,
    {
        match panic::catch_unwind(AssertUnwindSafe(|| self.lifecycle(game, create_platform))) {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("loop panicked");
                if self.state() == LoopState::Running {
                    self.transition(LoopState::Stopping);
                }
                if self.state() != LoopState::Terminated {
                    self.transition(LoopState::Terminated);
                }
                Err(EngineError::LoopPanicked)
            }
        }
    }

    fn state(&self) -> LoopState {
        *lock(&self.state)
    }

    fn lifecycle<G, P, F>(&self, mut game: G, create_platform: F) -> Result<LoopReport, EngineError>
    where
        G: Game<P>,
        P: Platform,
        F: FnOnce() -> Result<P, BoxError>,
    {
        let mut platform = match create_platform() {
            Ok(platform) => platform,
            Err(e) => {
                tracing::error!(error = %e, "platform initialization failed");
                self.transition(LoopState::Stopping);
                self.transition(LoopState::Terminated);
                return Err(EngineError::FatalInit(e.to_string()));
            }
        };

        if let Err(e) = game.initialize(&mut platform) {
            tracing::error!(error = %e, "game initialization failed");
            self.transition(LoopState::Stopping);
            game.dispose(&mut platform);
            platform.destroy();
            self.transition(LoopState::Terminated);
            return Err(EngineError::GameInit(e.to_string()));
        }
        platform.show();

        let driven =
            panic::catch_unwind(AssertUnwindSafe(|| self.drive(&mut game, &mut platform)));

        self.transition(LoopState::Stopping);
        let torn_down = panic::catch_unwind(AssertUnwindSafe(|| {
            game.dispose(&mut platform);
            platform.destroy();
        }));
        self.transition(LoopState::Terminated);

        let report = match (driven, torn_down) {
            (Ok(report), Ok(())) => report,
            _ => {
                tracing::error!("loop panicked; game disposed and platform destroyed");
                return Err(EngineError::LoopPanicked);
            }
        };
        tracing::info!(
            updates = report.updates,
            frames = report.frames,
            "loop finished"
        );
        Ok(report)
    }

    fn drive<G, P>(&self, game: &mut G, platform: &mut P) -> LoopReport
    where
        G: Game<P>,
        P: Platform,
    {
        let mut timer = Timer::new(self.clock.clone());
        let mut stepper = FixedStep::new(self.config.ups);
        let frame_budget = 1.0 / f64::from(self.config.target_fps);
        let mut updates = 0u64;
        let mut frames = 0u64;

        timer.start();
        loop {
            if platform.should_close() {
                tracing::debug!("close requested");
                break;
            }

            let delta = timer.delta();
            let steps = stepper.advance(delta, |dt| {
                game.update(platform, dt);
                timer.mark_update();
            });
            updates += u64::from(steps);

            let owed = stepper.take_render_owed();
            let render = match self.config.render_mode {
                RenderMode::EveryIteration => true,
                RenderMode::Staggered => owed,
            };
            if render {
                game.render(platform, stepper.alpha());
                timer.mark_render();
                frames += 1;
            }

            if timer.publish() {
                tracing::trace!(fps = timer.fps(), ups = timer.ups(), "rates published");
            }
            if timer.tick_count() >= self.config.report_interval_ticks {
                let (fps, ups) = (timer.fps(), timer.ups());
                platform.set_title(&format_title(&self.title, fps, ups));
                tracing::info!(fps, ups, "frame rates");
                timer.reset_tick_count();
            }

            platform.present();

            if !platform.vsync() {
                sync(&timer, frame_budget);
            }
        }

        LoopReport {
            updates,
            frames,
            fps: timer.fps(),
            ups: timer.ups(),
        }
    }
}

/// Spin, yielding each pass, until a full frame budget has elapsed since the
/// current iteration began.
fn sync<C: Clock>(timer: &Timer<C>, frame_budget: f64) {
    let end = timer.last_loop_time() + frame_budget;
    while timer.time() < end {
        std::thread::yield_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::headless::HeadlessPlatform;
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Log = Arc<Mutex<Vec<String>>>;

    fn push(log: &Log, entry: impl Into<String>) {
        log.lock().unwrap().push(entry.into());
    }

    /// Headless platform that records lifecycle calls and titles.
    struct Recorder {
        inner: HeadlessPlatform,
        log: Log,
    }

    impl Platform for Recorder {
        fn should_close(&self) -> bool {
            self.inner.should_close()
        }
        fn show(&mut self) {
            push(&self.log, "show");
        }
        fn present(&mut self) {
            self.inner.present();
        }
        fn set_title(&mut self, title: &str) {
            push(&self.log, format!("title:{title}"));
        }
        fn vsync(&self) -> bool {
            self.inner.vsync()
        }
        fn drawable_size(&self) -> (u32, u32) {
            self.inner.drawable_size()
        }
        fn destroy(&mut self) {
            push(&self.log, "destroy");
        }
    }

    #[derive(Default)]
    struct Witness {
        log: Log,
        alphas: Arc<Mutex<Vec<f64>>>,
        inits: Arc<AtomicUsize>,
        disposes: Arc<AtomicUsize>,
        fail_init: bool,
        panic_on_update: bool,
    }

    impl<P: Platform> Game<P> for Witness {
        fn initialize(&mut self, _platform: &mut P) -> Result<(), BoxError> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            push(&self.log, "initialize");
            if self.fail_init {
                return Err("shader missing".into());
            }
            Ok(())
        }
        fn update(&mut self, _platform: &mut P, dt: f64) {
            if self.panic_on_update {
                panic!("update blew up");
            }
            assert!((dt - 1.0 / 60.0).abs() < 1e-12);
            push(&self.log, "update");
        }
        fn render(&mut self, _platform: &mut P, alpha: f64) {
            self.alphas.lock().unwrap().push(alpha);
            push(&self.log, "render");
        }
        fn dispose(&mut self, _platform: &mut P) {
            self.disposes.fetch_add(1, Ordering::SeqCst);
            push(&self.log, "dispose");
        }
    }

    fn scripted(frame_times: Vec<f64>, frames: u64) -> (ManualClock, HeadlessPlatform) {
        let clock = ManualClock::new();
        let platform = HeadlessPlatform::new(860, 480)
            .with_clock(clock.clone(), frame_times)
            .close_after(frames);
        (clock, platform)
    }

    #[test]
    fn crate_loads() {
        assert_eq!(crate::crate_info(), "facet-kernel v0.1.0");
    }

    #[test]
    fn title_template() {
        assert_eq!(format_title("Demo", 75, 60), "Demo | FPS: 75, UPS: 60");
    }

    #[test]
    fn second_start_is_rejected_and_initializes_once() {
        let (clock, platform) = scripted(vec![0.01], 50);
        let engine = Engine::with_clock(LoopConfig::default(), clock);
        let witness = Witness::default();
        let inits = Arc::clone(&witness.inits);

        let handle = engine.start(witness, move || Ok(platform)).unwrap();
        let second = engine.start(Witness::default(), || Ok(HeadlessPlatform::new(1, 1)));
        assert!(matches!(second, Err(EngineError::AlreadyStarted(_))));

        handle.join().unwrap();
        assert_eq!(inits.load(Ordering::SeqCst), 1);
        assert_eq!(engine.state(), LoopState::Terminated);
    }

    #[test]
    fn run_after_termination_is_rejected() {
        let (clock, platform) = scripted(vec![0.01], 3);
        let engine = Engine::with_clock(LoopConfig::default(), clock);
        engine.run(Witness::default(), move || Ok(platform)).unwrap();

        let again = engine.run(Witness::default(), || Ok(HeadlessPlatform::new(1, 1)));
        assert!(matches!(
            again,
            Err(EngineError::AlreadyStarted(LoopState::Terminated))
        ));
    }

    #[test]
    fn lifecycle_order() {
        let (clock, inner) = scripted(vec![0.02], 10);
        let witness = Witness::default();
        let log = Arc::clone(&witness.log);
        let platform_log = Arc::clone(&log);
        let engine = Engine::with_clock(LoopConfig::default(), clock);
        engine
            .run(witness, move || {
                Ok(Recorder {
                    inner,
                    log: platform_log,
                })
            })
            .unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log[0], "initialize");
        assert_eq!(log[1], "show");
        assert!(log.iter().any(|e| e == "update"));
        let n = log.len();
        assert_eq!(log[n - 2], "dispose");
        assert_eq!(log[n - 1], "destroy");
    }

    #[test]
    fn update_count_follows_simulated_time() {
        // 41 presents feed 40 deltas of 25ms into the loop: 1s of simulation
        let (clock, platform) = scripted(vec![0.025], 41);
        let engine = Engine::with_clock(LoopConfig::default(), clock);
        let report = engine.run(Witness::default(), move || Ok(platform)).unwrap();

        assert!((report.updates as i64 - 60).abs() <= 1, "{report:?}");
        assert_eq!(report.frames, 41);
    }

    #[test]
    fn alpha_passed_to_render_is_in_unit_interval() {
        let (clock, platform) = scripted(vec![0.003, 0.021, 0.0167, 0.05, 0.0], 200);
        let witness = Witness::default();
        let alphas = Arc::clone(&witness.alphas);
        let engine = Engine::with_clock(LoopConfig::default(), clock);
        engine.run(witness, move || Ok(platform)).unwrap();

        let alphas = alphas.lock().unwrap();
        assert_eq!(alphas.len(), 200);
        assert!(alphas.iter().all(|a| (0.0..1.0).contains(a)));
    }

    #[test]
    fn title_rewritten_once_per_report_interval() {
        // 99 deltas of 20ms is about 118 updates: one report at 100 ticks
        let (clock, inner) = scripted(vec![0.02], 100);
        let log: Log = Arc::default();
        let platform_log = Arc::clone(&log);
        let engine = Engine::with_clock(LoopConfig::default(), clock).with_title("Test");
        engine
            .run(Witness::default(), move || {
                Ok(Recorder {
                    inner,
                    log: platform_log,
                })
            })
            .unwrap();

        let log = log.lock().unwrap();
        let titles: Vec<_> = log.iter().filter(|e| e.starts_with("title:")).collect();
        assert_eq!(titles.len(), 1);
        assert!(titles[0].starts_with("title:Test | FPS: "));
        assert!(titles[0].contains(", UPS: "));
    }

    #[test]
    fn platform_failure_skips_game_entirely() {
        let engine = Engine::with_clock(LoopConfig::default(), ManualClock::new());
        let witness = Witness::default();
        let (inits, disposes) = (Arc::clone(&witness.inits), Arc::clone(&witness.disposes));

        let result = engine.run(witness, || -> Result<HeadlessPlatform, BoxError> {
            Err("no display".into())
        });
        assert!(matches!(result, Err(EngineError::FatalInit(msg)) if msg == "no display"));
        assert_eq!(inits.load(Ordering::SeqCst), 0);
        assert_eq!(disposes.load(Ordering::SeqCst), 0);
        assert_eq!(engine.state(), LoopState::Terminated);
    }

    #[test]
    fn game_init_failure_still_disposes_and_tears_down() {
        let (clock, inner) = scripted(vec![0.01], 10);
        let witness = Witness {
            fail_init: true,
            ..Witness::default()
        };
        let log = Arc::clone(&witness.log);
        let platform_log = Arc::clone(&log);
        let engine = Engine::with_clock(LoopConfig::default(), clock);
        let result = engine.run(witness, move || {
            Ok(Recorder {
                inner,
                log: platform_log,
            })
        });

        assert!(matches!(result, Err(EngineError::GameInit(_))));
        assert_eq!(engine.state(), LoopState::Terminated);
        let log = log.lock().unwrap();
        assert_eq!(*log, vec!["initialize", "dispose", "destroy"]);
    }

    #[test]
    fn panicking_update_still_terminates_and_disposes() {
        let (clock, platform) = scripted(vec![0.02], 10);
        let witness = Witness {
            panic_on_update: true,
            ..Witness::default()
        };
        let disposes = Arc::clone(&witness.disposes);
        let engine = Engine::with_clock(LoopConfig::default(), clock);

        let handle = engine.start(witness, move || Ok(platform)).unwrap();
        assert!(matches!(handle.join(), Err(EngineError::LoopPanicked)));
        assert_eq!(engine.state(), LoopState::Terminated);
        assert_eq!(disposes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn panicking_platform_factory_still_terminates() {
        let engine = Engine::with_clock(LoopConfig::default(), ManualClock::new());
        let result = engine.run(Witness::default(), || -> Result<HeadlessPlatform, BoxError> {
            panic!("driver crashed")
        });
        assert!(matches!(result, Err(EngineError::LoopPanicked)));
        assert_eq!(engine.state(), LoopState::Terminated);
    }

    #[test]
    fn staggered_mode_renders_only_after_updates() {
        let (clock, platform) = scripted(vec![0.005], 60);
        let config = LoopConfig {
            render_mode: RenderMode::Staggered,
            ..LoopConfig::default()
        };
        let engine = Engine::with_clock(config, clock);
        let report = engine.run(Witness::default(), move || Ok(platform)).unwrap();

        // a 5ms frame never holds two 16.6ms steps, so each render follows exactly one update
        assert!(report.updates > 0);
        assert_eq!(report.frames, report.updates);
        assert!(report.frames < 60);
    }

    #[test]
    fn sync_waits_out_the_frame_budget_without_vsync() {
        let clock = ManualClock::with_auto_advance(0.001);
        let platform = HeadlessPlatform::new(8, 8).with_vsync(false).close_after(10);
        let engine = Engine::with_clock(LoopConfig::default(), clock.clone());
        let report = engine.run(Witness::default(), move || Ok(platform)).unwrap();

        assert_eq!(report.frames, 10);
        let budget = 1.0 / 75.0;
        assert!(clock.now() >= 10.0 * budget);
        assert!(report.updates >= 7, "{report:?}");
    }

    #[test]
    fn invalid_config_is_rejected_before_claiming() {
        let config = LoopConfig {
            ups: 0,
            ..LoopConfig::default()
        };
        let engine = Engine::with_clock(config, ManualClock::new());
        let result = engine.run(Witness::default(), || Ok(HeadlessPlatform::new(1, 1)));
        assert!(matches!(result, Err(EngineError::Config(_))));
        assert_eq!(engine.state(), LoopState::Uninitialized);
    }
}
