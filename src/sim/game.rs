//! A running game session
//!
//! Owns the physics world, the phase machine, the course and the marble,
//! and wires them together: phase changes reach the session through a
//! subscription, and a change back to `Ready` rebuilds the course and then
//! resets the marble before any further forces are applied.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::camera::CameraPose;
use super::level::{Level, LevelError};
use super::phase::{GamePhase, GamePhaseMachine, GameState, PhaseChange, Subscription};
use super::player::PlayerController;
use crate::physics::RigidBodyWorld;
use crate::platform::Keyboard;
use crate::settings::Settings;

/// Everything the display layer reads each frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hud {
    pub phase: GamePhase,
    /// Seconds on the run timer
    pub elapsed: f64,
    /// Timer text ("0.00")
    pub elapsed_label: String,
    pub camera: CameraPose,
    /// The restart button is only offered once the run has ended
    pub restart_available: bool,
}

/// End-of-run report printed by the headless runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub phase: GamePhase,
    pub blocks_count: u32,
    pub blocks_seed: u64,
    pub elapsed: f64,
    pub sim_time: f64,
    pub ticks: u64,
    pub restarts: u32,
    pub course_builds: u32,
}

pub struct Game<W: RigidBodyWorld> {
    pub(super) world: W,
    pub(super) machine: GamePhaseMachine,
    pub(super) level: Level,
    pub(super) player: PlayerController,
    pub(super) keyboard: Keyboard,
    /// Simulation clock (seconds); drives hazards and the run timer
    pub(super) clock: f64,
    pub(super) ticks: u64,
    pub(super) accumulator: f32,
    pub(super) restarts: u32,
    pending: Rc<RefCell<VecDeque<PhaseChange>>>,
    _phase_subscription: Subscription,
}

impl<W: RigidBodyWorld> Game<W> {
    /// Build the first course and spawn the marble into `world`
    pub fn new(settings: &Settings, mut world: W) -> Result<Self, LevelError> {
        let seed = settings.seed.unwrap_or_else(|| rand::rng().random());
        let machine = GamePhaseMachine::new(settings.blocks_count, seed);

        let mut level = Level::new(settings.hazards.clone())?;
        level.ensure(settings.blocks_count, seed, &mut world)?;

        let mut player = PlayerController::new(settings.player);
        player.spawn(&mut world);

        let pending = Rc::new(RefCell::new(VecDeque::new()));
        let sink = pending.clone();
        let subscription = machine.subscribe(move |change: &PhaseChange| {
            sink.borrow_mut().push_back(*change);
        });

        log::info!(
            "New game: {} hazard blocks, seed {}",
            settings.blocks_count,
            seed
        );

        Ok(Self {
            world,
            machine,
            level,
            player,
            keyboard: Keyboard::new(),
            clock: 0.0,
            ticks: 0,
            accumulator: 0.0,
            restarts: 0,
            pending,
            _phase_subscription: subscription,
        })
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn state(&self) -> &GameState {
        self.machine.state()
    }

    pub fn phase(&self) -> GamePhase {
        self.machine.phase()
    }

    pub fn machine(&self) -> &GamePhaseMachine {
        &self.machine
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn player(&self) -> &PlayerController {
        &self.player
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    /// Host-side key input
    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The restart button: same path as falling off
    pub fn restart(&mut self) {
        self.machine.restart();
        self.apply_phase_changes();
    }

    pub fn hud(&self) -> Hud {
        let state = self.machine.state();
        Hud {
            phase: state.phase(),
            elapsed: state.elapsed(self.clock),
            elapsed_label: state.elapsed_label(self.clock),
            camera: self.player.camera(),
            restart_available: state.phase() == GamePhase::Ended,
        }
    }

    pub fn summary(&self) -> RunSummary {
        let state = self.machine.state();
        RunSummary {
            phase: state.phase(),
            blocks_count: state.blocks_count(),
            blocks_seed: state.blocks_seed(),
            elapsed: state.elapsed(self.clock),
            sim_time: self.clock,
            ticks: self.ticks,
            restarts: self.restarts,
            course_builds: self.level.builds(),
        }
    }

    /// React to phase changes queued by the subscription
    pub(super) fn apply_phase_changes(&mut self) {
        loop {
            let Some(change) = self.pending.borrow_mut().pop_front() else {
                break;
            };
            log::info!("Phase {:?} -> {:?}", change.from, change.to);
            if change.to != GamePhase::Ready {
                continue;
            }

            self.restarts += 1;
            let count = self.machine.state().blocks_count();
            if let Err(e) = self.level.ensure(count, change.blocks_seed, &mut self.world) {
                log::error!("Failed to rebuild course: {}", e);
            }
            self.player.on_phase_ready(&mut self.world);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::test_world::TestWorld;
    use glam::Vec3;

    fn settings() -> Settings {
        Settings {
            blocks_count: 3,
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_builds_course_and_marble() {
        let game = Game::new(&settings(), TestWorld::new()).unwrap();
        // bounds + trophy + 3 hazards + marble
        assert_eq!(game.world().bodies.len(), 6);
        assert_eq!(game.phase(), GamePhase::Ready);
        assert_eq!(game.state().blocks_seed(), 42);
        assert_eq!(game.level().builds(), 1);
        assert_eq!(game.machine().subscriber_count(), 1);
    }

    #[test]
    fn test_empty_hazards_fail_fast() {
        let settings = Settings {
            hazards: Vec::new(),
            ..settings()
        };
        assert!(matches!(
            Game::new(&settings, TestWorld::new()),
            Err(LevelError::NoHazardTypes)
        ));
    }

    #[test]
    fn test_restart_rebuilds_then_resets() {
        let mut game = Game::new(&settings(), TestWorld::new()).unwrap();
        let body = game.player().body().unwrap();
        game.world.set_translation(body, Vec3::new(1.0, 0.3, -6.0));
        game.world.set_linear_velocity(body, Vec3::new(0.0, 0.0, -2.0));

        game.restart();
        assert_eq!(game.phase(), GamePhase::Ready);
        assert_ne!(game.state().blocks_seed(), 42);
        assert_eq!(game.level().builds(), 2);
        assert_eq!(
            game.level().layout().unwrap().seed,
            game.state().blocks_seed()
        );
        assert_eq!(game.world().body(body).translation, Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(game.world().body(body).linvel, Vec3::ZERO);
        // Old course removed, new one spawned
        assert_eq!(game.world().bodies.len(), 6);
        assert_eq!(game.summary().restarts, 1);
    }

    #[test]
    fn test_hud_reports_timer() {
        let mut game = Game::new(&settings(), TestWorld::new()).unwrap();
        let hud = game.hud();
        assert_eq!(hud.elapsed_label, "0.00");
        assert!(!hud.restart_available);

        game.machine.start(1.0);
        game.clock = 3.5;
        let hud = game.hud();
        assert_eq!(hud.phase, GamePhase::Playing);
        assert_eq!(hud.elapsed_label, "2.50");
    }
}
