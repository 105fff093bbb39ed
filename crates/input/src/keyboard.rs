use std::collections::HashSet;

/// Keys the engine reacts to. Anything else is [`Key::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Q,
    E,
    Space,
    Escape,
    Other,
}

/// Currently held keys.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<Key>,
}

impl KeyboardState {
    pub fn set(&mut self, key: Key, pressed: bool) {
        if key == Key::Other {
            return;
        }
        if pressed {
            self.pressed.insert(key);
        } else {
            self.pressed.remove(&key);
        }
    }

    pub fn is_pressed(&self, key: Key) -> bool {
        self.pressed.contains(&key)
    }

    /// Forget every held key, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut kb = KeyboardState::default();
        assert!(!kb.is_pressed(Key::W));
        kb.set(Key::W, true);
        kb.set(Key::W, true);
        assert!(kb.is_pressed(Key::W));
        kb.set(Key::W, false);
        assert!(!kb.is_pressed(Key::W));
    }

    #[test]
    fn other_is_never_held() {
        let mut kb = KeyboardState::default();
        kb.set(Key::Other, true);
        assert!(!kb.is_pressed(Key::Other));
    }

    #[test]
    fn clear_releases_everything() {
        let mut kb = KeyboardState::default();
        kb.set(Key::Q, true);
        kb.set(Key::Escape, true);
        kb.clear();
        assert!(!kb.is_pressed(Key::Q));
        assert!(!kb.is_pressed(Key::Escape));
    }
}
