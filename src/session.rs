//! Game session
//!
//! Owns the authoritative snapshot and the input queued for the next tick.
//! Input methods only record intent; nothing changes until `advance` or
//! `step` runs a tick and publishes its result.

use crate::consts::{DEFAULT_FRAME_MS, MAX_FRAME_MS};
use crate::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use crate::tuning::Rules;

/// Turns wall-clock timestamps into clamped tick lengths
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameClock {
    last_ms: Option<u64>,
}

impl FrameClock {
    /// Elapsed ms since the previous call. The first call has nothing to
    /// measure against and reports a nominal frame.
    pub fn delta(&mut self, now_ms: u64) -> u32 {
        let delta = match self.last_ms {
            None => DEFAULT_FRAME_MS,
            Some(last) => now_ms.saturating_sub(last).min(u64::from(MAX_FRAME_MS)) as u32,
        };
        self.last_ms = Some(now_ms);
        delta
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

/// A running game: one writer, snapshots out
#[derive(Debug, Clone)]
pub struct Session {
    state: GameState,
    rules: Rules,
    pending: TickInput,
    clock: FrameClock,
}

impl Session {
    pub fn new(seed: u64, rules: Rules) -> Self {
        Self {
            state: GameState::new(seed, &rules),
            rules,
            pending: TickInput::default(),
            clock: FrameClock::default(),
        }
    }

    /// Nudge the ship horizontally; repeated calls between ticks add up
    pub fn move_player(&mut self, delta: f32) {
        self.pending.move_by += delta;
    }

    /// Put the ship at an absolute horizontal fraction
    pub fn set_player_position(&mut self, fraction: f32) {
        self.pending.move_to = Some(fraction);
    }

    pub fn toggle_pause(&mut self) {
        // Two toggles before the next tick cancel out
        self.pending.toggle_pause = !self.pending.toggle_pause;
    }

    /// Host app lifecycle. Going to the background pauses a running game.
    pub fn on_app_paused(&mut self, paused: bool) {
        self.pending.app_paused = Some(paused);
        if self.will_auto_pause() {
            log::info!("Auto-paused (app in background)");
        }
    }

    /// The queued input will pause a game that is currently running
    fn will_auto_pause(&self) -> bool {
        self.pending.app_paused == Some(true) && self.state.phase == GamePhase::Running
    }

    /// Tap-to-collect a falling boost
    pub fn collect_boost(&mut self, id: u32) {
        if !self.pending.collect.contains(&id) {
            self.pending.collect.push(id);
        }
    }

    /// Run one tick timed from the wall clock
    pub fn advance(&mut self, now_ms: u64) -> Vec<GameEvent> {
        let elapsed_ms = self.clock.delta(now_ms);
        self.step(elapsed_ms)
    }

    /// Run one tick with an explicit frame length
    pub fn step(&mut self, elapsed_ms: u32) -> Vec<GameEvent> {
        let input = std::mem::take(&mut self.pending);
        let out = tick(&self.state, &input, elapsed_ms, &self.rules);
        self.state = out.state;
        out.events
    }

    /// Latest published snapshot
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Start over with a fresh run
    pub fn retry(&mut self, seed: u64) {
        self.state = GameState::new(seed, &self.rules);
        self.pending = TickInput::default();
        self.clock.reset();
        log::info!("Restarted with seed: {}", seed);
    }
}
