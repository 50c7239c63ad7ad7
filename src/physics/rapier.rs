//! [`RigidBodyWorld`] backed by rapier3d
//!
//! Owns the full rapier pipeline state. glam types cross the boundary and
//! are converted to nalgebra here, nowhere else.

use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude::*;

use super::{BodyDesc, BodyHandle, BodyKind, ColliderShape, RigidBodyWorld};

#[inline]
fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

#[inline]
fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

#[inline]
fn to_handle(handle: BodyHandle) -> RigidBodyHandle {
    RigidBodyHandle::from_raw_parts(handle.index, handle.generation)
}

#[inline]
fn from_handle(handle: RigidBodyHandle) -> BodyHandle {
    let (index, generation) = handle.into_raw_parts();
    BodyHandle { index, generation }
}

pub struct RapierWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
}

impl RapierWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self {
            gravity: to_vector(gravity),
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    /// Number of live bodies (level geometry, hazards and the player)
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(to_handle(handle))
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(to_handle(handle))
    }
}

impl Default for RapierWorld {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, crate::consts::GRAVITY, 0.0))
    }
}

impl RigidBodyWorld for RapierWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let builder = match desc.kind {
            BodyKind::Fixed => RigidBodyBuilder::fixed(),
            BodyKind::KinematicPosition => RigidBodyBuilder::kinematic_position_based(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic(),
        };
        let body = builder
            .translation(to_vector(desc.translation))
            .linear_damping(desc.linear_damping)
            .angular_damping(desc.angular_damping)
            .can_sleep(desc.can_sleep)
            .build();
        let handle = self.bodies.insert(body);

        for collider in &desc.colliders {
            let builder = match collider.shape {
                ColliderShape::Ball { radius } => ColliderBuilder::ball(radius),
                ColliderShape::Cuboid { half_extents } => {
                    ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
                }
            };
            let collider = builder
                .translation(to_vector(collider.offset))
                .restitution(collider.restitution)
                .friction(collider.friction)
                .build();
            self.colliders
                .insert_with_parent(collider, handle, &mut self.bodies);
        }

        from_handle(handle)
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(
            to_handle(handle),
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    fn translation(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|b| from_vector(b.translation()))
    }

    fn rotation(&self, handle: BodyHandle) -> Option<Quat> {
        self.body(handle).map(|b| {
            let q = b.rotation();
            Quat::from_xyzw(q.i, q.j, q.k, q.w)
        })
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|b| from_vector(b.linvel()))
    }

    fn angular_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.body(handle).map(|b| from_vector(b.angvel()))
    }

    fn set_translation(&mut self, handle: BodyHandle, translation: Vec3) {
        if let Some(body) = self.body_mut(handle) {
            body.set_translation(to_vector(translation), true);
        }
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.body_mut(handle) {
            body.set_linvel(to_vector(velocity), true);
        }
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.body_mut(handle) {
            body.set_angvel(to_vector(velocity), true);
        }
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
        if let Some(body) = self.body_mut(handle) {
            body.apply_impulse(to_vector(impulse), true);
        }
    }

    fn apply_torque_impulse(&mut self, handle: BodyHandle, torque: Vec3) {
        if let Some(body) = self.body_mut(handle) {
            body.apply_torque_impulse(to_vector(torque), true);
        }
    }

    fn set_next_kinematic_translation(&mut self, handle: BodyHandle, translation: Vec3) {
        if let Some(body) = self.body_mut(handle) {
            body.set_next_kinematic_translation(to_vector(translation));
        }
    }

    fn set_next_kinematic_rotation(&mut self, handle: BodyHandle, rotation: Quat) {
        if let Some(body) = self.body_mut(handle) {
            let q = UnitQuaternion::new_normalize(Quaternion::new(
                rotation.w, rotation.x, rotation.y, rotation.z,
            ));
            body.set_next_kinematic_rotation(q);
        }
    }

    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        let ray = Ray::new(point![origin.x, origin.y, origin.z], to_vector(direction));
        self.query_pipeline
            .cast_ray(
                &self.bodies,
                &self.colliders,
                &ray,
                max_distance,
                true,
                QueryFilter::default(),
            )
            .map(|(_, toi)| toi)
    }

    fn step(&mut self, dt: f32) {
        self.integration_parameters.dt = dt;
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );
    }
}
