/// Boxed error returned from game initialization.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Callbacks the loop drives.
///
/// `P` is the platform the game runs on; each call receives it so a game can
/// read input, query the drawable size or submit draw work without holding
/// global state.
pub trait Game<P> {
    /// Called once after the platform exists and before the first update.
    fn initialize(&mut self, platform: &mut P) -> Result<(), BoxError>;

    /// One fixed simulation step of `dt` seconds.
    fn update(&mut self, platform: &mut P, dt: f64);

    /// Draw the current state. `alpha` is the progress toward the next update, in `[0, 1)`.
    fn render(&mut self, platform: &mut P, alpha: f64);

    /// Called once after the loop exits, before the platform is destroyed.
    fn dispose(&mut self, platform: &mut P);
}

/// Window/context services the loop needs each iteration.
pub trait Platform {
    /// Whether a close was requested since the last check.
    fn should_close(&self) -> bool;

    /// Make the window visible. Called once, after game initialization.
    fn show(&mut self) {}

    /// Present the frame and pump platform events.
    fn present(&mut self);

    fn set_title(&mut self, title: &str);

    /// Whether the platform limits the frame rate itself.
    fn vsync(&self) -> bool;

    /// Current drawable size in pixels.
    fn drawable_size(&self) -> (u32, u32);

    /// Release the window and context. Called once, last.
    fn destroy(&mut self) {}
}
