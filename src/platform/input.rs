//! Raw keyboard state
//!
//! Strafe keys are level-triggered (held or not). Jump is edge-triggered:
//! a press latches one request which the controller consumes on the next
//! frame, so holding space or keyboard auto-repeat never queues extra jumps.

use std::collections::HashSet;

/// Game actions a key can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Jump,
}

impl Action {
    /// Map a DOM `KeyboardEvent.key` value to an action
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "a" | "arrowleft" => Some(Action::Left),
            "d" | "arrowright" => Some(Action::Right),
            " " | "spacebar" => Some(Action::Jump),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct KeyState {
    held: HashSet<Action>,
    jump_latched: bool,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Returns whether the key is one the game uses.
    pub fn key_down(&mut self, key: &str) -> bool {
        match Action::from_key(key) {
            Some(action) => {
                self.press(action);
                true
            }
            None => false,
        }
    }

    /// Record a key release. Returns whether the key is one the game uses.
    pub fn key_up(&mut self, key: &str) -> bool {
        match Action::from_key(key) {
            Some(action) => {
                self.release(action);
                true
            }
            None => false,
        }
    }

    pub fn press(&mut self, action: Action) {
        // insert() is false for a repeat while held
        if self.held.insert(action) && action == Action::Jump {
            self.jump_latched = true;
        }
    }

    pub fn release(&mut self, action: Action) {
        self.held.remove(&action);
    }

    #[inline]
    pub fn is_held(&self, action: Action) -> bool {
        self.held.contains(&action)
    }

    /// Consume the pending jump request, if any
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.jump_latched)
    }

    /// Forget everything (restart, focus loss)
    pub fn clear(&mut self) {
        self.held.clear();
        self.jump_latched = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(Action::from_key("a"), Some(Action::Left));
        assert_eq!(Action::from_key("A"), Some(Action::Left));
        assert_eq!(Action::from_key("ArrowLeft"), Some(Action::Left));
        assert_eq!(Action::from_key("d"), Some(Action::Right));
        assert_eq!(Action::from_key("ArrowRight"), Some(Action::Right));
        assert_eq!(Action::from_key(" "), Some(Action::Jump));
        assert_eq!(Action::from_key("Spacebar"), Some(Action::Jump));
        assert_eq!(Action::from_key("w"), None);
        assert_eq!(Action::from_key("Enter"), None);
    }

    #[test]
    fn test_hold_and_release() {
        let mut keys = KeyState::new();
        assert!(keys.key_down("ArrowLeft"));
        assert!(keys.is_held(Action::Left));
        assert!(!keys.key_down("q"));
        assert!(keys.key_up("ArrowLeft"));
        assert!(!keys.is_held(Action::Left));
    }

    #[test]
    fn test_jump_latches_once_per_press() {
        let mut keys = KeyState::new();
        keys.key_down(" ");
        // Auto-repeat while held
        keys.key_down(" ");
        keys.key_down(" ");
        assert!(keys.take_jump());
        assert!(!keys.take_jump());

        keys.key_up(" ");
        keys.key_down(" ");
        assert!(keys.take_jump());
    }

    #[test]
    fn test_clear_drops_pending_jump() {
        let mut keys = KeyState::new();
        keys.key_down("d");
        keys.key_down(" ");
        keys.clear();
        assert!(!keys.is_held(Action::Right));
        assert!(!keys.take_jump());
    }
}
