use glam::{DVec2, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Other,
}

/// Cursor tracking and the per-tick look vector.
#[derive(Debug, Clone)]
pub struct MouseState {
    previous: DVec2,
    current: DVec2,
    display: Vec2,
    in_window: bool,
    left: bool,
    right: bool,
}

impl Default for MouseState {
    fn default() -> Self {
        Self {
            previous: DVec2::new(-1.0, -1.0),
            current: DVec2::ZERO,
            display: Vec2::ZERO,
            in_window: false,
            left: false,
            right: false,
        }
    }
}

impl MouseState {
    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        self.current = DVec2::new(x, y);
    }

    pub fn cursor_entered(&mut self, inside: bool) {
        self.in_window = inside;
    }

    pub fn button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.left = pressed,
            MouseButton::Right => self.right = pressed,
            MouseButton::Other => {}
        }
    }

    /// Recompute the display vector from cursor motion since the last call.
    ///
    /// `x` holds the vertical delta and `y` the horizontal one, matching
    /// pitch and yaw. Motion only counts once a previous position with
    /// positive coordinates exists and the cursor is inside the window.
    pub fn update(&mut self) {
        self.display = Vec2::ZERO;
        if self.previous.x > 0.0 && self.previous.y > 0.0 && self.in_window {
            let delta = self.current - self.previous;
            self.display = Vec2::new(delta.y as f32, delta.x as f32);
        }
        self.previous = self.current;
    }

    pub fn display_vec(&self) -> Vec2 {
        self.display
    }

    pub fn position(&self) -> DVec2 {
        self.current
    }

    pub fn is_in_window(&self) -> bool {
        self.in_window
    }

    pub fn is_left_pressed(&self) -> bool {
        self.left
    }

    pub fn is_right_pressed(&self) -> bool {
        self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inside() -> MouseState {
        let mut m = MouseState::default();
        m.cursor_entered(true);
        m
    }

    #[test]
    fn first_update_only_records_position() {
        let mut m = inside();
        m.cursor_moved(100.0, 50.0);
        m.update();
        assert_eq!(m.display_vec(), Vec2::ZERO);
    }

    #[test]
    fn axes_are_swapped() {
        let mut m = inside();
        m.cursor_moved(100.0, 50.0);
        m.update();
        m.cursor_moved(103.0, 45.0);
        m.update();
        assert_eq!(m.display_vec(), Vec2::new(-5.0, 3.0));

        // no motion since the last update
        m.update();
        assert_eq!(m.display_vec(), Vec2::ZERO);
    }

    #[test]
    fn outside_window_is_ignored() {
        let mut m = MouseState::default();
        m.cursor_moved(10.0, 10.0);
        m.update();
        m.cursor_moved(20.0, 20.0);
        m.update();
        assert_eq!(m.display_vec(), Vec2::ZERO);
    }

    #[test]
    fn edge_positions_do_not_count() {
        let mut m = inside();
        m.cursor_moved(0.0, 40.0);
        m.update();
        m.cursor_moved(10.0, 40.0);
        m.update();
        assert_eq!(m.display_vec(), Vec2::ZERO);
    }

    #[test]
    fn buttons_are_tracked_independently() {
        let mut m = MouseState::default();
        m.button(MouseButton::Right, true);
        m.button(MouseButton::Left, true);
        assert!(m.is_right_pressed() && m.is_left_pressed());
        m.button(MouseButton::Left, false);
        assert!(m.is_right_pressed());
        assert!(!m.is_left_pressed());
    }
}
