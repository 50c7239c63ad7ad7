//! Player marble controller
//!
//! Turns held directions into impulses plus a rolling torque, jumps when a
//! short downward ray finds ground, keeps the follow camera, and reports
//! finish/fall conditions to the phase machine.

use glam::Vec3;

use super::camera::{CameraPose, CameraRig};
use super::phase::GamePhaseMachine;
use crate::consts::*;
use crate::physics::{BodyDesc, BodyHandle, ColliderDesc, RigidBodyWorld};
use crate::platform::{Key, KeyEdge, MovementIntent};
use crate::settings::PlayerTuning;
use crate::{finish_line_z, vec3};

/// Outcome of the per-tick course checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseCheck {
    OnCourse,
    /// Past the finish line
    Finished,
    /// Below the fall height
    Fell,
}

#[derive(Debug, Clone)]
pub struct PlayerController {
    body: Option<BodyHandle>,
    tuning: PlayerTuning,
    camera: CameraRig,
    start: Vec3,
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new(PlayerTuning::default())
    }
}

impl PlayerController {
    pub fn new(tuning: PlayerTuning) -> Self {
        Self {
            body: None,
            tuning,
            camera: CameraRig::new(tuning.camera_smoothing),
            start: vec3(PLAYER_START),
        }
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

    pub fn start_position(&self) -> Vec3 {
        self.start
    }

    pub fn camera(&self) -> CameraPose {
        self.camera.pose()
    }

    /// Marble: always-awake damped ball
    pub fn body_desc(&self) -> BodyDesc {
        BodyDesc::dynamic(self.start)
            .with_collider(
                ColliderDesc::ball(PLAYER_RADIUS).with_material(PLAYER_RESTITUTION, PLAYER_FRICTION),
            )
            .with_damping(PLAYER_DAMPING, PLAYER_DAMPING)
            .with_sleep(false)
    }

    /// Create and attach the marble body
    pub fn spawn(&mut self, world: &mut dyn RigidBodyWorld) -> BodyHandle {
        let handle = world.create_body(&self.body_desc());
        self.attach(handle);
        handle
    }

    pub fn position(&self, world: &dyn RigidBodyWorld) -> Option<Vec3> {
        self.body.and_then(|b| world.translation(b))
    }

    /// Push the marble for every held direction, scaled by `dt`
    pub fn apply_movement(&self, world: &mut dyn RigidBodyWorld, intent: &MovementIntent, dt: f32) {
        let Some(body) = self.body else {
            return;
        };
        if !intent.any() {
            return;
        }

        let impulse_strength = self.tuning.impulse_strength * dt;
        let torque_strength = self.tuning.torque_strength * dt;
        let mut impulse = Vec3::ZERO;
        let mut torque = Vec3::ZERO;

        if intent.forward {
            impulse.z -= impulse_strength;
            torque.x -= torque_strength;
        }
        if intent.rightward {
            impulse.x += impulse_strength;
            torque.z -= torque_strength;
        }
        if intent.backward {
            impulse.z += impulse_strength;
            torque.x += torque_strength;
        }
        if intent.leftward {
            impulse.x -= impulse_strength;
            torque.z += torque_strength;
        }

        world.apply_impulse(body, impulse);
        world.apply_torque_impulse(body, torque);
    }

    /// Something solid right under the marble
    pub fn is_grounded(&self, world: &dyn RigidBodyWorld) -> bool {
        let Some(position) = self.position(world) else {
            return false;
        };
        let origin = position - Vec3::Y * GROUND_RAY_OFFSET;
        world
            .cast_ray(origin, Vec3::NEG_Y, GROUND_RAY_MAX)
            .is_some_and(|toi| toi < GROUNDED_DISTANCE)
    }

    /// Jump if grounded. Returns true when the impulse was applied.
    pub fn jump(&self, world: &mut dyn RigidBodyWorld) -> bool {
        let Some(body) = self.body else {
            return false;
        };
        if !self.is_grounded(world) {
            return false;
        }
        world.apply_impulse(body, Vec3::Y * self.tuning.jump_impulse);
        true
    }

    /// React to a key edge: any key-down starts the run, jump-down jumps
    pub fn handle_key(
        &self,
        edge: KeyEdge,
        world: &mut dyn RigidBodyWorld,
        machine: &mut GamePhaseMachine,
        now: f64,
    ) {
        if !edge.pressed {
            return;
        }
        machine.start(now);
        if edge.key == Key::Jump {
            self.jump(world);
        }
    }

    /// Finish and fall checks; signals `end` or `restart` on the machine
    pub fn check_course(
        &self,
        world: &dyn RigidBodyWorld,
        machine: &mut GamePhaseMachine,
        now: f64,
    ) -> CourseCheck {
        let Some(position) = self.position(world) else {
            return CourseCheck::OnCourse;
        };

        let mut check = CourseCheck::OnCourse;
        if position.z <= finish_line_z(machine.state().blocks_count()) {
            machine.end(now);
            check = CourseCheck::Finished;
        }
        if position.y < FALL_HEIGHT {
            machine.restart();
            check = CourseCheck::Fell;
        }
        check
    }

    /// Ease the camera toward the marble
    pub fn update_camera(&mut self, world: &dyn RigidBodyWorld, dt: f32) -> Option<CameraPose> {
        let position = self.position(world)?;
        Some(self.camera.follow(position, dt))
    }

    /// Camera follow then course checks, in one call
    pub fn on_tick(
        &mut self,
        world: &dyn RigidBodyWorld,
        machine: &mut GamePhaseMachine,
        dt: f32,
        now: f64,
    ) -> CourseCheck {
        if self.update_camera(world, dt).is_none() {
            return CourseCheck::OnCourse;
        }
        self.check_course(world, machine, now)
    }

    /// Back to the start, motionless
    pub fn on_phase_ready(&self, world: &mut dyn RigidBodyWorld) {
        let Some(body) = self.body else {
            return;
        };
        world.set_translation(body, self.start);
        world.set_linear_velocity(body, Vec3::ZERO);
        world.set_angular_velocity(body, Vec3::ZERO);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::BodyKind;
    use crate::physics::test_world::TestWorld;
    use crate::sim::phase::GamePhase;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (TestWorld, PlayerController, BodyHandle) {
        let mut world = TestWorld::new();
        let mut player = PlayerController::default();
        let body = player.spawn(&mut world);
        (world, player, body)
    }

    #[test]
    fn test_body_is_awake_damped_ball() {
        let (world, _, body) = setup();
        let desc = &world.body(body).desc;
        assert_eq!(desc.kind, BodyKind::Dynamic);
        assert_eq!(desc.translation, Vec3::new(0.0, 1.0, 0.0));
        assert!(!desc.can_sleep);
        assert_eq!(desc.linear_damping, 0.5);
        assert_eq!(desc.colliders.len(), 1);
    }

    #[test]
    fn test_forward_impulse_and_rolling_torque() {
        let (mut world, player, body) = setup();
        let intent = MovementIntent {
            forward: true,
            ..Default::default()
        };
        player.apply_movement(&mut world, &intent, 0.5);
        let b = world.body(body);
        assert!((b.linvel - Vec3::new(0.0, 0.0, -0.3)).length() < 1e-6);
        assert!((b.angvel - Vec3::new(-0.1, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_opposite_directions_cancel() {
        let (mut world, player, body) = setup();
        let intent = MovementIntent {
            forward: true,
            backward: true,
            leftward: true,
            rightward: true,
        };
        player.apply_movement(&mut world, &intent, 1.0);
        assert!(world.body(body).linvel.length() < 1e-6);
        assert!(world.body(body).angvel.length() < 1e-6);
    }

    #[test]
    fn test_sideways_torque_axis() {
        let (mut world, player, body) = setup();
        let intent = MovementIntent {
            rightward: true,
            ..Default::default()
        };
        player.apply_movement(&mut world, &intent, 1.0);
        let b = world.body(body);
        assert!((b.linvel.x - 0.6).abs() < 1e-6);
        assert!((b.angvel.z + 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_movement_scales_with_dt() {
        let (mut world, player, body) = setup();
        let intent = MovementIntent {
            leftward: true,
            ..Default::default()
        };
        for _ in 0..60 {
            player.apply_movement(&mut world, &intent, 1.0 / 60.0);
        }
        let per_second = world.body(body).linvel.x;

        let (mut world, player, body) = setup();
        for _ in 0..30 {
            player.apply_movement(&mut world, &intent, 1.0 / 30.0);
        }
        assert!((world.body(body).linvel.x - per_second).abs() < 1e-5);
    }

    #[test]
    fn test_no_body_no_effect() {
        let mut world = TestWorld::new();
        let player = PlayerController::default();
        let intent = MovementIntent {
            forward: true,
            ..Default::default()
        };
        player.apply_movement(&mut world, &intent, 1.0);
        assert!(!player.jump(&mut world));
        player.on_phase_ready(&mut world);
        assert!(world.rays.borrow().is_empty());
    }

    #[test]
    fn test_jump_when_grounded() {
        let (mut world, player, body) = setup();
        world.ray_hit = Some(0.10);
        assert!(player.jump(&mut world));
        assert!((world.body(body).linvel.y - 0.5).abs() < 1e-6);

        let rays = world.rays.borrow();
        let (origin, direction, _) = rays[0];
        assert!((origin - Vec3::new(0.0, 0.69, 0.0)).length() < 1e-6);
        assert_eq!(direction, Vec3::NEG_Y);
    }

    #[test]
    fn test_no_jump_when_airborne() {
        let (mut world, player, body) = setup();
        world.ray_hit = Some(0.20);
        assert!(!player.jump(&mut world));
        assert_eq!(world.body(body).linvel, Vec3::ZERO);

        world.ray_hit = None;
        assert!(!player.jump(&mut world));
        assert_eq!(world.body(body).linvel, Vec3::ZERO);
    }

    #[test]
    fn test_finish_line_ends_once() {
        let (mut world, mut player, body) = setup();
        let mut machine = GamePhaseMachine::new(10, 1);
        let ends = Rc::new(RefCell::new(0));
        let sink = ends.clone();
        let _sub = machine.subscribe(move |c| {
            if c.to == GamePhase::Ended {
                *sink.borrow_mut() += 1;
            }
        });

        machine.start(0.0);
        world.set_translation(body, Vec3::new(0.0, 0.3, -41.9));
        assert_eq!(player.on_tick(&world, &mut machine, SIM_DT, 1.0), CourseCheck::OnCourse);
        assert_eq!(machine.phase(), GamePhase::Playing);

        world.set_translation(body, Vec3::new(0.0, 0.3, -42.0));
        assert_eq!(player.on_tick(&world, &mut machine, SIM_DT, 2.0), CourseCheck::Finished);
        assert_eq!(machine.phase(), GamePhase::Ended);
        assert_eq!(machine.state().end_time(), Some(2.0));

        player.on_tick(&world, &mut machine, SIM_DT, 3.0);
        player.on_tick(&world, &mut machine, SIM_DT, 4.0);
        assert_eq!(machine.state().end_time(), Some(2.0));
        assert_eq!(*ends.borrow(), 1);
    }

    #[test]
    fn test_fall_restarts_and_ready_resets() {
        let (mut world, mut player, body) = setup();
        let mut machine = GamePhaseMachine::new(10, 1);
        machine.start(0.0);
        let seed = machine.state().blocks_seed();

        world.set_translation(body, Vec3::new(1.0, -5.0, -7.0));
        world.set_linear_velocity(body, Vec3::new(0.0, -9.0, 1.0));
        world.set_angular_velocity(body, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(player.on_tick(&world, &mut machine, SIM_DT, 1.0), CourseCheck::Fell);
        assert_eq!(machine.phase(), GamePhase::Ready);
        assert_ne!(machine.state().blocks_seed(), seed);

        player.on_phase_ready(&mut world);
        let b = world.body(body);
        assert_eq!(b.translation, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(b.linvel, Vec3::ZERO);
        assert_eq!(b.angvel, Vec3::ZERO);
    }

    #[test]
    fn test_any_key_starts_jump_key_jumps() {
        let (mut world, player, body) = setup();
        let mut machine = GamePhaseMachine::new(3, 1);
        world.ray_hit = Some(0.0);

        let up = KeyEdge { key: Key::Forward, pressed: false };
        player.handle_key(up, &mut world, &mut machine, 0.5);
        assert_eq!(machine.phase(), GamePhase::Ready);

        let down = KeyEdge { key: Key::Leftward, pressed: true };
        player.handle_key(down, &mut world, &mut machine, 1.0);
        assert_eq!(machine.phase(), GamePhase::Playing);
        assert_eq!(machine.state().start_time(), 1.0);
        assert_eq!(world.body(body).linvel, Vec3::ZERO);

        let jump = KeyEdge { key: Key::Jump, pressed: true };
        player.handle_key(jump, &mut world, &mut machine, 2.0);
        assert_eq!(machine.state().start_time(), 1.0);
        assert!((world.body(body).linvel.y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_camera_follows_body() {
        let (mut world, mut player, body) = setup();
        let mut machine = GamePhaseMachine::new(3, 1);
        world.set_translation(body, Vec3::new(0.0, 0.3, -4.0));
        for _ in 0..600 {
            player.on_tick(&world, &mut machine, SIM_DT, 0.0);
        }
        let pose = player.camera();
        assert!((pose.position - Vec3::new(0.0, 0.95, -1.75)).length() < 1e-3);
        assert!((pose.target - Vec3::new(0.0, 0.55, -4.0)).length() < 1e-3);
    }
}
