//! In-memory [`RigidBodyWorld`] for unit tests
//!
//! No integration: impulses change velocity by `impulse / mass` (mass 1),
//! kinematic targets are applied on `step`, and ray casts return whatever
//! `ray_hit` is set to.

use std::collections::HashMap;

use glam::{Quat, Vec3};

use super::{BodyDesc, BodyHandle, RigidBodyWorld};

#[derive(Debug, Clone)]
pub struct TestBody {
    pub desc: BodyDesc,
    pub translation: Vec3,
    pub rotation: Quat,
    pub linvel: Vec3,
    pub angvel: Vec3,
    pub next_translation: Option<Vec3>,
    pub next_rotation: Option<Quat>,
}

#[derive(Debug, Default)]
pub struct TestWorld {
    pub bodies: HashMap<BodyHandle, TestBody>,
    /// Distance returned by every ray cast
    pub ray_hit: Option<f32>,
    /// (origin, direction, max distance) of every ray cast
    pub rays: std::cell::RefCell<Vec<(Vec3, Vec3, f32)>>,
    pub steps: u32,
    next_index: u32,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self, handle: BodyHandle) -> &TestBody {
        &self.bodies[&handle]
    }
}

impl RigidBodyWorld for TestWorld {
    fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let handle = BodyHandle {
            index: self.next_index,
            generation: 0,
        };
        self.next_index += 1;
        self.bodies.insert(
            handle,
            TestBody {
                desc: desc.clone(),
                translation: desc.translation,
                rotation: Quat::IDENTITY,
                linvel: Vec3::ZERO,
                angvel: Vec3::ZERO,
                next_translation: None,
                next_rotation: None,
            },
        );
        handle
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        self.bodies.remove(&handle);
    }

    fn translation(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&handle).map(|b| b.translation)
    }

    fn rotation(&self, handle: BodyHandle) -> Option<Quat> {
        self.bodies.get(&handle).map(|b| b.rotation)
    }

    fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&handle).map(|b| b.linvel)
    }

    fn angular_velocity(&self, handle: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&handle).map(|b| b.angvel)
    }

    fn set_translation(&mut self, handle: BodyHandle, translation: Vec3) {
        if let Some(b) = self.bodies.get_mut(&handle) {
            b.translation = translation;
        }
    }

    fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(b) = self.bodies.get_mut(&handle) {
            b.linvel = velocity;
        }
    }

    fn set_angular_velocity(&mut self, handle: BodyHandle, velocity: Vec3) {
        if let Some(b) = self.bodies.get_mut(&handle) {
            b.angvel = velocity;
        }
    }

    fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) {
        if let Some(b) = self.bodies.get_mut(&handle) {
            b.linvel += impulse;
        }
    }

    fn apply_torque_impulse(&mut self, handle: BodyHandle, torque: Vec3) {
        if let Some(b) = self.bodies.get_mut(&handle) {
            b.angvel += torque;
        }
    }

    fn set_next_kinematic_translation(&mut self, handle: BodyHandle, translation: Vec3) {
        if let Some(b) = self.bodies.get_mut(&handle) {
            b.next_translation = Some(translation);
        }
    }

    fn set_next_kinematic_rotation(&mut self, handle: BodyHandle, rotation: Quat) {
        if let Some(b) = self.bodies.get_mut(&handle) {
            b.next_rotation = Some(rotation);
        }
    }

    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<f32> {
        self.rays.borrow_mut().push((origin, direction, max_distance));
        self.ray_hit.filter(|d| *d <= max_distance)
    }

    fn step(&mut self, _dt: f32) {
        self.steps += 1;
        for body in self.bodies.values_mut() {
            if let Some(t) = body.next_translation.take() {
                body.translation = t;
            }
            if let Some(r) = body.next_rotation.take() {
                body.rotation = r;
            }
        }
    }
}
