//! Engine kernel: frame pacing, fixed-timestep simulation stepping and the
//! game lifecycle.
//!
//! # Invariants
//! - Simulation advances only in whole fixed intervals, independent of how
//!   irregularly frames arrive.
//! - `initialize` happens before any `update`; every `update`/`render`
//!   happens before `dispose`.
//! - At most one loop is active per [`Engine`].
//! - The whole update/render sequence runs on one thread. Input and scene
//!   state are confined to it, so nothing here locks them.

pub mod clock;
pub mod config;
pub mod engine;
pub mod game;
pub mod headless;
pub mod stepper;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EngineConfig, LoopConfig, RenderMode, WindowSettings};
pub use engine::{Engine, EngineError, LoopHandle, LoopReport, LoopState, format_title};
pub use game::{BoxError, Game, Platform};
pub use headless::HeadlessPlatform;
pub use stepper::FixedStep;
pub use timer::Timer;

pub fn crate_info() -> &'static str {
    "facet-kernel v0.1.0"
}
