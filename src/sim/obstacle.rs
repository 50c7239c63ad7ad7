//! Hazard archetypes and their kinematic motion
//!
//! A hazard's pose is a pure function of elapsed simulation time and the
//! parameter drawn when the level was built. Nothing accumulates per tick,
//! so motion is identical at any frame rate.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::physics::{BodyDesc, BodyHandle, ColliderDesc, RigidBodyWorld};
use crate::vec3;

/// Hazard archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    /// Bar spinning about the vertical axis
    Spinner,
    /// Bar bobbing up and down
    Limbo,
    /// Blade swinging side to side
    Axe,
}

impl HazardKind {
    pub const ALL: [HazardKind; 3] = [HazardKind::Spinner, HazardKind::Axe, HazardKind::Limbo];

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardKind::Spinner => "spinner",
            HazardKind::Limbo => "limbo",
            HazardKind::Axe => "axe",
        }
    }

    /// Collider half extents of the moving part
    pub fn half_extents(&self) -> Vec3 {
        match self {
            HazardKind::Spinner | HazardKind::Limbo => vec3(BAR_HALF_EXTENTS),
            HazardKind::Axe => vec3(AXE_HALF_EXTENTS),
        }
    }
}

/// A hazard archetype with its frozen random parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HazardSpec {
    /// Signed angular speed (rad/s), magnitude in [0.2, 1.2)
    Spinner { speed: f32 },
    /// Phase offset in [0, 2π)
    Limbo { phase: f32 },
    /// Phase offset in [0, 2π)
    Axe { phase: f32 },
}

impl HazardSpec {
    /// Draw the parameter for `kind`
    pub fn sample<R: Rng>(kind: HazardKind, rng: &mut R) -> Self {
        match kind {
            HazardKind::Spinner => {
                let magnitude = rng.random::<f32>() + SPINNER_MIN_SPEED;
                let direction = if rng.random_bool(0.5) { -1.0 } else { 1.0 };
                HazardSpec::Spinner {
                    speed: magnitude * direction,
                }
            }
            HazardKind::Limbo => HazardSpec::Limbo {
                phase: rng.random_range(0.0..TAU),
            },
            HazardKind::Axe => HazardSpec::Axe {
                phase: rng.random_range(0.0..TAU),
            },
        }
    }

    pub fn kind(&self) -> HazardKind {
        match self {
            HazardSpec::Spinner { .. } => HazardKind::Spinner,
            HazardSpec::Limbo { .. } => HazardKind::Limbo,
            HazardSpec::Axe { .. } => HazardKind::Axe,
        }
    }
}

/// Pose a kinematic hazard should take on the next physics step.
/// `None` components are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct KinematicPose {
    pub translation: Option<Vec3>,
    pub rotation: Option<Quat>,
}

/// Drives one hazard body
#[derive(Debug, Clone)]
pub struct ObstacleController {
    spec: HazardSpec,
    /// Center of the block the hazard sits on
    origin: Vec3,
    body: Option<BodyHandle>,
}

impl ObstacleController {
    pub fn new(spec: HazardSpec, origin: Vec3) -> Self {
        Self {
            spec,
            origin,
            body: None,
        }
    }

    pub fn spec(&self) -> HazardSpec {
        self.spec
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn attach(&mut self, body: BodyHandle) {
        self.body = Some(body);
    }

    pub fn detach(&mut self) -> Option<BodyHandle> {
        self.body.take()
    }

    /// Kinematic body resting just above the block floor
    pub fn body_desc(&self) -> BodyDesc {
        BodyDesc::kinematic(self.origin + Vec3::Y * HAZARD_SPAWN_HEIGHT).with_collider(
            ColliderDesc::cuboid(self.spec.kind().half_extents())
                .with_material(SURFACE_RESTITUTION, HAZARD_FRICTION),
        )
    }

    /// Create and attach the hazard body
    pub fn spawn(&mut self, world: &mut dyn RigidBodyWorld) -> BodyHandle {
        let handle = world.create_body(&self.body_desc());
        self.attach(handle);
        handle
    }

    /// Pose at elapsed simulation time `t` (seconds)
    pub fn pose_at(&self, t: f32) -> KinematicPose {
        match self.spec {
            HazardSpec::Spinner { speed } => KinematicPose {
                translation: None,
                rotation: Some(Quat::from_rotation_y(t * speed)),
            },
            HazardSpec::Limbo { phase } => KinematicPose {
                translation: Some(
                    self.origin + Vec3::new(0.0, (t + phase).sin() + LIMBO_BASE_HEIGHT, 0.0),
                ),
                rotation: None,
            },
            HazardSpec::Axe { phase } => KinematicPose {
                translation: Some(
                    self.origin + Vec3::new((t + phase).sin() * AXE_AMPLITUDE, AXE_HEIGHT, 0.0),
                ),
                rotation: None,
            },
        }
    }

    /// Push the pose for time `t`. Does nothing until a body is attached.
    pub fn tick(&self, world: &mut dyn RigidBodyWorld, t: f32) {
        let Some(body) = self.body else {
            return;
        };
        let pose = self.pose_at(t);
        if let Some(translation) = pose.translation {
            world.set_next_kinematic_translation(body, translation);
        }
        if let Some(rotation) = pose.rotation {
            world.set_next_kinematic_rotation(body, rotation);
        }
    }
}
