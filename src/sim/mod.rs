//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed and inputs a session
//! plays out the same way:
//! - Fixed timestep only
//! - Seeded RNG only (course layout, restart seeds)
//! - Physics behind the [`RigidBodyWorld`](crate::physics::RigidBodyWorld) trait
//! - No rendering dependencies

pub mod camera;
pub mod game;
pub mod level;
pub mod obstacle;
pub mod phase;
pub mod player;
pub mod tick;

pub use camera::{CameraPose, CameraRig};
pub use game::{Game, Hud, RunSummary};
pub use level::{
    BlockKind, BlockPlacement, Bounds, BoxPlacement, Level, LevelError, LevelLayout, SpawnedLevel,
    build,
};
pub use obstacle::{HazardKind, HazardSpec, KinematicPose, ObstacleController};
pub use phase::{GamePhase, GamePhaseMachine, GameState, PhaseChange, Subscription};
pub use player::{CourseCheck, PlayerController};
pub use tick::TickInput;
