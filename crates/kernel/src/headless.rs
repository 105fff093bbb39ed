use crate::clock::ManualClock;
use crate::game::Platform;

/// Windowless platform for tests and offline simulation.
///
/// Each `present` counts a frame and, when driven by a [`ManualClock`],
/// advances it by the next scripted frame time (cycling through the list).
#[derive(Debug)]
pub struct HeadlessPlatform {
    width: u32,
    height: u32,
    vsync: bool,
    close_requested: bool,
    close_after: Option<u64>,
    frames: u64,
    title: String,
    clock: Option<ManualClock>,
    frame_times: Vec<f64>,
    destroyed: bool,
}

impl HeadlessPlatform {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            vsync: true,
            close_requested: false,
            close_after: None,
            frames: 0,
            title: String::new(),
            clock: None,
            frame_times: Vec::new(),
            destroyed: false,
        }
    }

    /// Advance `clock` by `frame_times[i % len]` on the i-th present.
    pub fn with_clock(mut self, clock: ManualClock, frame_times: Vec<f64>) -> Self {
        self.clock = Some(clock);
        self.frame_times = frame_times;
        self
    }

    /// Request close once `frames` frames have been presented.
    pub fn close_after(mut self, frames: u64) -> Self {
        self.close_after = Some(frames);
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl Platform for HeadlessPlatform {
    fn should_close(&self) -> bool {
        self.close_requested
    }

    fn present(&mut self) {
        if let Some(clock) = &self.clock {
            if !self.frame_times.is_empty() {
                let i = (self.frames as usize) % self.frame_times.len();
                clock.advance(self.frame_times[i]);
            }
        }
        self.frames += 1;
        if self.close_after.is_some_and(|n| self.frames >= n) {
            self.close_requested = true;
        }
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_owned();
    }

    fn vsync(&self) -> bool {
        self.vsync
    }

    fn drawable_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn destroy(&mut self) {
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;

    #[test]
    fn closes_after_requested_frames() {
        let mut p = HeadlessPlatform::new(4, 3).close_after(2);
        assert!(!p.should_close());
        p.present();
        assert!(!p.should_close());
        p.present();
        assert!(p.should_close());
        assert_eq!(p.frames(), 2);
    }

    #[test]
    fn present_advances_scripted_clock() {
        let clock = ManualClock::new();
        let mut p = HeadlessPlatform::new(4, 3).with_clock(clock.clone(), vec![0.01, 0.03]);
        p.present();
        p.present();
        p.present();
        assert!((clock.now() - 0.05).abs() < 1e-12);
    }

    #[test]
    fn keeps_last_title_and_size() {
        let mut p = HeadlessPlatform::new(860, 480);
        p.set_title("a");
        p.set_title("b");
        assert_eq!(p.title(), "b");
        assert_eq!(p.drawable_size(), (860, 480));
        assert!(p.vsync());
        p.destroy();
        assert!(p.is_destroyed());
    }
}
