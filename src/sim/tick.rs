//! Fixed timestep simulation tick
//!
//! Core game loop that advances the session deterministically. Per tick:
//! physics step, hazard poses for the next step, marble forces, then the
//! finish/fall checks. Key edges and the camera run once per frame.

use super::game::{Game, Hud};
use crate::consts::*;
use crate::physics::RigidBodyWorld;
use crate::platform::MovementIntent;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Directions held this tick
    pub movement: MovementIntent,
}

impl<W: RigidBodyWorld> Game<W> {
    /// Advance the session by one fixed timestep
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        self.world.step(dt);
        self.clock += dt as f64;
        self.ticks += 1;

        self.level.tick(&mut self.world, self.clock as f32);
        self.player
            .apply_movement(&mut self.world, &input.movement, dt);

        // A fall restarts here; the rebuild and reset happen before the next step
        self.player
            .check_course(&self.world, &mut self.machine, self.clock);
        self.apply_phase_changes();
    }

    /// One display frame: key edges, as many fixed ticks as `frame_dt`
    /// covers, then the camera
    pub fn frame(&mut self, frame_dt: f32) -> Hud {
        let frame_dt = frame_dt.min(MAX_FRAME_DT).max(0.0);

        for edge in self.keyboard.drain_edges() {
            self.player
                .handle_key(edge, &mut self.world, &mut self.machine, self.clock);
        }
        self.apply_phase_changes();

        self.accumulator += frame_dt;
        let input = TickInput {
            movement: self.keyboard.movement(),
        };
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick(&input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        self.player.update_camera(&self.world, frame_dt);
        self.hud()
    }
}
