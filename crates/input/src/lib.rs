//! Input state owned by the platform and read by the game on the loop thread.
//!
//! # Invariants
//! - There is no global input state; an [`InputState`] is created by the
//!   platform and passed by reference.
//! - Events are written during the platform's event pump and read during
//!   `update`, both on the loop thread.

pub mod action;
pub mod keyboard;
pub mod mouse;

pub use action::Action;
pub use keyboard::{Key, KeyboardState};
pub use mouse::{MouseButton, MouseState};

use glam::Vec3;

/// Keyboard and mouse state for one window.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit movement offsets from the held keys: W/S on z, A/D on x, Q/E on y.
    ///
    /// When both keys of a pair are held the first one (W, A, Q) wins.
    pub fn movement(&self) -> Vec3 {
        let axis = |neg: Key, pos: Key| {
            if self.keyboard.is_pressed(neg) {
                -1.0
            } else if self.keyboard.is_pressed(pos) {
                1.0
            } else {
                0.0
            }
        };
        Vec3::new(
            axis(Key::A, Key::D),
            axis(Key::Q, Key::E),
            axis(Key::W, Key::S),
        )
    }

    /// Actions for this tick. Call after [`MouseState::update`].
    pub fn actions(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.keyboard.is_pressed(Key::Escape) {
            actions.push(Action::Close);
        }
        let movement = self.movement();
        if movement != Vec3::ZERO {
            actions.push(Action::Move(movement));
        }
        if self.mouse.is_right_pressed() {
            let look = self.mouse.display_vec();
            if look != glam::Vec2::ZERO {
                actions.push(Action::Look(look));
            }
        }
        actions
    }
}

pub fn crate_info() -> &'static str {
    "facet-input v0.1.0"
}
