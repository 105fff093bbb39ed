use glam::{Vec2, Vec3};

/// A game-level intent derived from raw input.
///
/// Games consume actions, never raw key codes, so the key layout lives in
/// one place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Unit camera offset: x strafes, y rises, z walks along the heading.
    Move(Vec3),
    /// Mouse look: x is pitch delta, y is yaw delta, in pixels.
    Look(Vec2),
    /// Ask the platform to close.
    Close,
}

impl Action {
    /// Scale a movement or look action; other actions pass through.
    pub fn scaled(self, factor: f32) -> Self {
        match self {
            Action::Move(v) => Action::Move(v * factor),
            Action::Look(v) => Action::Look(v * factor),
            other => other,
        }
    }
}
