//! Keyboard input
//!
//! Hosts feed raw key codes (`"KeyW"`, `"ArrowUp"`, `"Space"`...) into a
//! [`Keyboard`]. The game reads the held-key snapshot every tick and drains
//! the down/up edges once per frame.

use serde::{Deserialize, Serialize};

/// Game actions a key can map to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Forward,
    Backward,
    Leftward,
    Rightward,
    Jump,
}

impl Key {
    pub const ALL: [Key; 5] = [
        Key::Forward,
        Key::Backward,
        Key::Leftward,
        Key::Rightward,
        Key::Jump,
    ];

    /// Map a DOM-style key code to an action
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ArrowUp" | "KeyW" => Some(Key::Forward),
            "ArrowDown" | "KeyS" => Some(Key::Backward),
            "ArrowLeft" | "KeyA" => Some(Key::Leftward),
            "ArrowRight" | "KeyD" => Some(Key::Rightward),
            "Space" => Some(Key::Jump),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A change in a key's state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEdge {
    pub key: Key,
    pub pressed: bool,
}

/// Held movement directions for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MovementIntent {
    pub forward: bool,
    pub backward: bool,
    pub leftward: bool,
    pub rightward: bool,
}

impl MovementIntent {
    pub fn any(&self) -> bool {
        self.forward || self.backward || self.leftward || self.rightward
    }
}

/// Held-key snapshot plus pending edges
#[derive(Debug, Clone, Default)]
pub struct Keyboard {
    held: u8,
    edges: Vec<KeyEdge>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key state. Auto-repeat (same state again) produces no edge.
    pub fn set(&mut self, key: Key, pressed: bool) {
        if self.is_held(key) == pressed {
            return;
        }
        if pressed {
            self.held |= key.bit();
        } else {
            self.held &= !key.bit();
        }
        self.edges.push(KeyEdge { key, pressed });
    }

    pub fn press(&mut self, key: Key) {
        self.set(key, true);
    }

    pub fn release(&mut self, key: Key) {
        self.set(key, false);
    }

    /// Feed a raw key code; unmapped codes are ignored.
    /// Returns true when the code maps to an action.
    pub fn handle_code(&mut self, code: &str, pressed: bool) -> bool {
        match Key::from_code(code) {
            Some(key) => {
                self.set(key, pressed);
                true
            }
            None => false,
        }
    }

    /// Release everything (e.g. on focus loss)
    pub fn release_all(&mut self) {
        for key in Key::ALL {
            self.release(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held & key.bit() != 0
    }

    pub fn movement(&self) -> MovementIntent {
        MovementIntent {
            forward: self.is_held(Key::Forward),
            backward: self.is_held(Key::Backward),
            leftward: self.is_held(Key::Leftward),
            rightward: self.is_held(Key::Rightward),
        }
    }

    /// Take the edges recorded since the last drain, oldest first
    pub fn drain_edges(&mut self) -> Vec<KeyEdge> {
        std::mem::take(&mut self.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_codes() {
        assert_eq!(Key::from_code("KeyW"), Some(Key::Forward));
        assert_eq!(Key::from_code("ArrowUp"), Some(Key::Forward));
        assert_eq!(Key::from_code("KeyS"), Some(Key::Backward));
        assert_eq!(Key::from_code("ArrowLeft"), Some(Key::Leftward));
        assert_eq!(Key::from_code("KeyD"), Some(Key::Rightward));
        assert_eq!(Key::from_code("Space"), Some(Key::Jump));
        assert_eq!(Key::from_code("KeyQ"), None);
    }

    #[test]
    fn test_edges_only_on_change() {
        let mut kb = Keyboard::new();
        kb.press(Key::Forward);
        kb.press(Key::Forward); // auto-repeat
        kb.press(Key::Jump);
        kb.release(Key::Forward);
        kb.release(Key::Backward); // never held

        let edges = kb.drain_edges();
        assert_eq!(
            edges,
            vec![
                KeyEdge { key: Key::Forward, pressed: true },
                KeyEdge { key: Key::Jump, pressed: true },
                KeyEdge { key: Key::Forward, pressed: false },
            ]
        );
        assert!(kb.drain_edges().is_empty());
        assert!(kb.is_held(Key::Jump));
    }

    #[test]
    fn test_movement_snapshot() {
        let mut kb = Keyboard::new();
        assert!(!kb.movement().any());
        kb.handle_code("KeyA", true);
        kb.handle_code("ArrowDown", true);
        let intent = kb.movement();
        assert!(intent.leftward && intent.backward);
        assert!(!intent.forward && !intent.rightward);

        assert!(!kb.handle_code("Escape", true));
        kb.release_all();
        assert!(!kb.movement().any());
    }
}
