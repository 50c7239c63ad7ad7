//! Rigid-body engine interface
//!
//! The game core never talks to the physics engine directly. Everything it
//! needs (creating bodies, pushing kinematic poses, impulses, ray casts,
//! stepping) goes through [`RigidBodyWorld`]. Operations on a handle the
//! world does not know are silent no-ops; getters return `None`.

pub mod rapier;

#[cfg(test)]
pub(crate) mod test_world;

use glam::{Quat, Vec3};

pub use rapier::RapierWorld;

/// Opaque handle to a body owned by a [`RigidBodyWorld`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle {
    pub index: u32,
    pub generation: u32,
}

/// How the engine drives a body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves
    Fixed,
    /// Pose set externally every tick
    KinematicPosition,
    /// Integrated from forces and contacts
    Dynamic,
}

/// Collider geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColliderShape {
    Ball { radius: f32 },
    Cuboid { half_extents: Vec3 },
}

/// A collider attached to a body, offset from the body origin
#[derive(Debug, Clone, PartialEq)]
pub struct ColliderDesc {
    pub shape: ColliderShape,
    pub offset: Vec3,
    pub restitution: f32,
    pub friction: f32,
}

impl ColliderDesc {
    pub fn ball(radius: f32) -> Self {
        Self {
            shape: ColliderShape::Ball { radius },
            offset: Vec3::ZERO,
            restitution: 0.0,
            friction: 0.5,
        }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self {
            shape: ColliderShape::Cuboid { half_extents },
            offset: Vec3::ZERO,
            restitution: 0.0,
            friction: 0.5,
        }
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_material(mut self, restitution: f32, friction: f32) -> Self {
        self.restitution = restitution;
        self.friction = friction;
        self
    }
}

/// Everything needed to create a body and its colliders in one call
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub translation: Vec3,
    pub colliders: Vec<ColliderDesc>,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub can_sleep: bool,
}

impl BodyDesc {
    pub fn new(kind: BodyKind, translation: Vec3) -> Self {
        Self {
            kind,
            translation,
            colliders: Vec::new(),
            linear_damping: 0.0,
            angular_damping: 0.0,
            can_sleep: true,
        }
    }

    pub fn fixed(translation: Vec3) -> Self {
        Self::new(BodyKind::Fixed, translation)
    }

    pub fn kinematic(translation: Vec3) -> Self {
        Self::new(BodyKind::KinematicPosition, translation)
    }

    pub fn dynamic(translation: Vec3) -> Self {
        Self::new(BodyKind::Dynamic, translation)
    }

    pub fn with_collider(mut self, collider: ColliderDesc) -> Self {
        self.colliders.push(collider);
        self
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn with_sleep(mut self, can_sleep: bool) -> Self {
        self.can_sleep = can_sleep;
        self
    }
}

/// Contract the game core drives the physics engine through
pub trait RigidBodyWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle;
    fn remove_body(&mut self, handle: BodyHandle);

    fn translation(&self, handle: BodyHandle) -> Option<Vec3>;
    fn rotation(&self, handle: BodyHandle) -> Option<Quat>;
    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3>;
    fn angular_velocity(&self, handle: BodyHandle) -> Option<Vec3>;

    fn set_translation(&mut self, handle: BodyHandle, translation: Vec3);
    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3);
    fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3);

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3);
    fn apply_torque_impulse(&mut self, handle: BodyHandle, torque: Vec3);

    fn set_next_kinematic_translation(&mut self, handle: BodyHandle, translation: Vec3);
    fn set_next_kinematic_rotation(&mut self, handle: BodyHandle, rotation: Quat);

    /// Distance to the nearest collider along `direction`, if any within `max_distance`
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32>;

    /// Advance the simulation by `dt` seconds
    fn step(&mut self, dt: f32);
}
