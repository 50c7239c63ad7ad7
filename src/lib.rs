//! Marble Race - a physics-driven obstacle course
//!
//! Core modules:
//! - `sim`: Game phases, level assembly, hazards, player control
//! - `physics`: Narrow rigid-body engine interface (rapier3d backend)
//! - `platform`: Keyboard mapping and edge-triggered input
//! - `settings`: Data-driven course and player tuning

pub mod physics;
pub mod platform;
pub mod settings;
pub mod sim;

pub use settings::{PlayerTuning, Settings, SettingsError};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta accepted before clamping
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// World gravity (m/s²)
    pub const GRAVITY: f32 = -9.81;

    /// Length of one course block along -Z
    pub const BLOCK_LENGTH: f32 = 4.0;
    /// Half width of the walkable course (X extent of a block floor)
    pub const BLOCK_HALF_WIDTH: f32 = 2.0;
    /// Floor slab thickness
    pub const FLOOR_THICKNESS: f32 = 0.2;

    /// Side/back wall thickness and height
    pub const WALL_THICKNESS: f32 = 0.3;
    pub const WALL_HEIGHT: f32 = 1.5;
    /// Side walls sit just outside the floor edge
    pub const WALL_OFFSET_X: f32 = 2.15;

    /// Shared surface material for walls and hazards
    pub const SURFACE_RESTITUTION: f32 = 0.2;
    pub const HAZARD_FRICTION: f32 = 0.0;
    pub const FLOOR_FRICTION: f32 = 1.0;

    /// Hazard bodies spawn this far above their block
    pub const HAZARD_SPAWN_HEIGHT: f32 = 0.3;
    /// Spinner/limbo bar half extents
    pub const BAR_HALF_EXTENTS: [f32; 3] = [1.75, 0.15, 0.15];
    /// Axe blade half extents
    pub const AXE_HALF_EXTENTS: [f32; 3] = [0.75, 0.75, 0.15];
    /// Minimum spinner speed magnitude (rad/s)
    pub const SPINNER_MIN_SPEED: f32 = 0.2;
    /// Limbo bar rests this high on average
    pub const LIMBO_BASE_HEIGHT: f32 = 1.15;
    /// Axe swing amplitude along X
    pub const AXE_AMPLITUDE: f32 = 1.25;
    /// Axe blade center height
    pub const AXE_HEIGHT: f32 = 0.75;

    /// Reward prop on the finish block
    pub const TROPHY_HEIGHT: f32 = 0.25;
    pub const TROPHY_HALF_EXTENTS: [f32; 3] = [0.3, 0.25, 0.3];

    /// Player marble
    pub const PLAYER_RADIUS: f32 = 0.3;
    pub const PLAYER_START: [f32; 3] = [0.0, 1.0, 0.0];
    pub const PLAYER_RESTITUTION: f32 = 0.2;
    pub const PLAYER_FRICTION: f32 = 1.0;
    pub const PLAYER_DAMPING: f32 = 0.5;

    /// Movement impulse per second of held input
    pub const IMPULSE_STRENGTH: f32 = 0.6;
    /// Rolling torque impulse per second of held input
    pub const TORQUE_STRENGTH: f32 = 0.2;
    /// Upward impulse applied by a grounded jump
    pub const JUMP_IMPULSE: f32 = 0.5;

    /// Grounded check: ray starts this far below the body center
    pub const GROUND_RAY_OFFSET: f32 = 0.31;
    /// Grounded check: maximum ray length
    pub const GROUND_RAY_MAX: f32 = 10.0;
    /// Grounded check: hits closer than this count as standing on something
    pub const GROUNDED_DISTANCE: f32 = 0.15;

    /// Below this height the marble has fallen off the course
    pub const FALL_HEIGHT: f32 = -4.0;
    /// The finish line sits this far past the last hazard block
    pub const FINISH_MARGIN: f32 = 2.0;

    /// Camera trails behind and above the marble
    pub const CAMERA_OFFSET: [f32; 3] = [0.0, 0.65, 2.25];
    /// Camera looks slightly above the marble
    pub const CAMERA_TARGET_OFFSET: [f32; 3] = [0.0, 0.25, 0.0];
    /// Camera low-pass rate (per second)
    pub const CAMERA_SMOOTHING: f32 = 5.0;
    pub const CAMERA_INITIAL_POSITION: [f32; 3] = [10.0, 10.0, 10.0];

    /// Default course length (hazard blocks)
    pub const DEFAULT_BLOCKS_COUNT: u32 = 10;
}

/// Center of course block `index` (0 = start block)
#[inline]
pub fn block_position(index: u32) -> Vec3 {
    Vec3::new(0.0, 0.0, -(index as f32) * consts::BLOCK_LENGTH)
}

/// Z coordinate past which the course counts as completed
#[inline]
pub fn finish_line_z(blocks_count: u32) -> f32 {
    -(blocks_count as f32 * consts::BLOCK_LENGTH + consts::FINISH_MARGIN)
}

/// Frame-rate independent low-pass factor, clamped so it never overshoots
#[inline]
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    (rate * dt).clamp(0.0, 1.0)
}

/// Build a `Vec3` from a constant triple
#[inline]
pub fn vec3(v: [f32; 3]) -> Vec3 {
    Vec3::from_array(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_positions_step_along_negative_z() {
        assert_eq!(block_position(0), Vec3::ZERO);
        assert_eq!(block_position(3).z, -12.0);
    }

    #[test]
    fn test_finish_line() {
        assert_eq!(finish_line_z(10), -42.0);
        assert_eq!(finish_line_z(0), -2.0);
    }

    #[test]
    fn test_smoothing_factor_clamped() {
        assert!((smoothing_factor(5.0, 0.1) - 0.5).abs() < 1e-6);
        assert_eq!(smoothing_factor(5.0, 1.0), 1.0);
        assert_eq!(smoothing_factor(5.0, -1.0), 0.0);
    }
}
