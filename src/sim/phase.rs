//! Game phase state machine
//!
//! [`GameState`] is only ever mutated through [`GamePhaseMachine::start`],
//! [`GamePhaseMachine::end`] and [`GamePhaseMachine::restart`]. Everything
//! else gets a shared reference.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Marble at the start, waiting for the first key press
    Ready,
    /// Timer running
    Playing,
    /// Finish reached, timer frozen
    Ended,
}

/// Phase, timing and course parameters of the current run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    phase: GamePhase,
    blocks_count: u32,
    blocks_seed: u64,
    start_time: f64,
    end_time: f64,
}

impl GameState {
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn blocks_count(&self) -> u32 {
        self.blocks_count
    }

    pub fn blocks_seed(&self) -> u64 {
        self.blocks_seed
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Only meaningful once the run has ended
    pub fn end_time(&self) -> Option<f64> {
        (self.phase == GamePhase::Ended).then_some(self.end_time)
    }

    /// Seconds on the run timer at `now`
    pub fn elapsed(&self, now: f64) -> f64 {
        match self.phase {
            GamePhase::Ready => 0.0,
            GamePhase::Playing => (now - self.start_time).max(0.0),
            GamePhase::Ended => (self.end_time - self.start_time).max(0.0),
        }
    }

    /// Timer text as shown by the display ("12.34")
    pub fn elapsed_label(&self, now: f64) -> String {
        format!("{:.2}", self.elapsed(now))
    }
}

/// Notification sent to observers after a state-changing action
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseChange {
    pub from: GamePhase,
    pub to: GamePhase,
    pub blocks_seed: u64,
}

type Listener = Box<dyn FnMut(&PhaseChange)>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
    /// Set while callbacks run; unsubscribes are deferred until they finish
    notifying: bool,
    removed: Vec<u64>,
}

/// Keeps a phase observer registered; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    listeners: Weak<RefCell<Listeners>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let Ok(mut listeners) = listeners.try_borrow_mut() else {
            return;
        };
        if listeners.notifying {
            listeners.removed.push(self.id);
        } else {
            listeners.entries.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Owner of [`GameState`]
pub struct GamePhaseMachine {
    state: GameState,
    rng: Pcg32,
    listeners: Rc<RefCell<Listeners>>,
}

impl GamePhaseMachine {
    /// New machine in `Ready`; `seed` is the first course seed and also
    /// seeds the generator for every later one
    pub fn new(blocks_count: u32, seed: u64) -> Self {
        Self {
            state: GameState {
                phase: GamePhase::Ready,
                blocks_count,
                blocks_seed: seed,
                start_time: 0.0,
                end_time: 0.0,
            },
            rng: Pcg32::seed_from_u64(seed),
            listeners: Rc::new(RefCell::new(Listeners::default())),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// Begin the run. No-op unless `Ready`.
    pub fn start(&mut self, now: f64) {
        if self.state.phase != GamePhase::Ready {
            return;
        }
        let from = self.state.phase;
        self.state.phase = GamePhase::Playing;
        self.state.start_time = now;
        log::info!("Run started at {:.2}s", now);
        self.notify(from);
    }

    /// Finish the run. No-op unless `Playing`.
    pub fn end(&mut self, now: f64) {
        if self.state.phase != GamePhase::Playing {
            return;
        }
        let from = self.state.phase;
        self.state.phase = GamePhase::Ended;
        self.state.end_time = now;
        log::info!("Run finished in {:.2}s", self.state.elapsed(now));
        self.notify(from);
    }

    /// Back to `Ready` with a fresh course seed, from any phase
    pub fn restart(&mut self) {
        let from = self.state.phase;
        let previous = self.state.blocks_seed;
        let mut seed = self.rng.next_u64();
        while seed == previous {
            seed = self.rng.next_u64();
        }
        self.state.phase = GamePhase::Ready;
        self.state.blocks_seed = seed;
        log::info!("Restart from {:?}, new course seed {}", from, seed);
        self.notify(from);
    }

    /// Register `callback` to run synchronously after every start, end and
    /// restart that changes state. Callbacks must not call back into the
    /// machine.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&PhaseChange) + 'static,
    {
        let mut listeners = self.listeners.borrow_mut();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Box::new(callback)));
        Subscription {
            id,
            listeners: Rc::downgrade(&self.listeners),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }

    fn notify(&mut self, from: GamePhase) {
        let change = PhaseChange {
            from,
            to: self.state.phase,
            blocks_seed: self.state.blocks_seed,
        };

        // Run callbacks without holding the borrow so they may subscribe or
        // drop subscriptions.
        let mut entries = {
            let mut listeners = self.listeners.borrow_mut();
            listeners.notifying = true;
            std::mem::take(&mut listeners.entries)
        };
        for (_, callback) in entries.iter_mut() {
            callback(&change);
        }

        let mut listeners = self.listeners.borrow_mut();
        listeners.notifying = false;
        let removed = std::mem::take(&mut listeners.removed);
        entries.retain(|(id, _)| !removed.contains(id));
        let added = std::mem::take(&mut listeners.entries);
        entries.extend(added);
        listeners.entries = entries;
    }
}
