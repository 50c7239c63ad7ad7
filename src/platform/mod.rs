//! Platform abstraction layer
//!
//! Handles the pieces that differ between hosts:
//! - Input events (key codes to game actions, edge detection)

pub mod input;

pub use input::{Key, KeyEdge, Keyboard, MovementIntent};
