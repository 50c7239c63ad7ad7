//! Marble Race - headless runner
//!
//! Plays one session against the rapier world with a scripted autopilot
//! (hold forward, hop now and then) and prints a JSON run summary.
//!
//! Usage: `marble-race [settings.json] [time-limit-seconds]`

use std::path::PathBuf;

use glam::Vec3;
use marble_race::consts::*;
use marble_race::physics::RapierWorld;
use marble_race::platform::Key;
use marble_race::sim::{Game, GamePhase};
use marble_race::Settings;

/// Simulated seconds before the autopilot gives up
const DEFAULT_TIME_LIMIT: f64 = 60.0;
/// Seconds between autopilot hops
const HOP_INTERVAL: f64 = 1.5;

fn main() {
    env_logger::init();
    log::info!("Marble Race (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings_path = args.next().map(PathBuf::from);
    let time_limit = args
        .next()
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(DEFAULT_TIME_LIMIT);

    let settings = Settings::load(settings_path.as_deref());
    let world = RapierWorld::new(Vec3::new(0.0, settings.gravity, 0.0));
    let mut game = match Game::new(&settings, world) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Failed to create game: {}", e);
            std::process::exit(1);
        }
    };

    let mut last_hop = 0.0;
    let mut last_phase = game.phase();
    game.keyboard_mut().press(Key::Forward);

    while game.clock() < time_limit {
        // Tap jump: release on one frame, press on the next
        if game.keyboard().is_held(Key::Jump) {
            game.keyboard_mut().release(Key::Jump);
        } else if game.clock() - last_hop >= HOP_INTERVAL {
            game.keyboard_mut().press(Key::Jump);
            last_hop = game.clock();
        }

        let hud = game.frame(SIM_DT);
        if hud.phase != last_phase {
            log::info!("[{}] {:?}", hud.elapsed_label, hud.phase);
            last_phase = hud.phase;
        }
        if hud.phase == GamePhase::Ended {
            break;
        }
    }

    let summary = game.summary();
    if summary.phase != GamePhase::Ended {
        log::warn!("Time limit of {}s reached before the finish", time_limit);
    }
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize summary: {}", e),
    }
}
