//! Space Attack - simulation core for a formation-sweeping arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (formations, kinematics, collisions, boosts, tick)
//! - `session`: Owns the authoritative game state and drives ticks from a clock
//! - `tuning`: Data-driven game balance
//! - `upgrades`: Upgrade tables and the boost parameter provider

pub mod session;
pub mod sim;
pub mod tuning;
pub mod upgrades;

pub use session::{FrameClock, Session};
pub use tuning::{Rules, Tuning, TuningError};
pub use upgrades::{BoostParams, Loadout, UpgradeLevels, UpgradeTable, UpgradeWallet};

/// Game configuration constants
pub mod consts {
    /// Nominal tick cadence (Hz)
    pub const TICK_HZ: u32 = 60;
    /// Elapsed time used for the very first tick (ms)
    pub const DEFAULT_FRAME_MS: u32 = 16;
    /// Upper bound on a single tick's elapsed time (ms), avoids huge steps after a stall
    pub const MAX_FRAME_MS: u32 = 32;

    /// Normalized playfield bounds (both axes)
    pub const FIELD_MIN: f32 = 0.0;
    pub const FIELD_MAX: f32 = 1.0;

    /// Player defaults
    pub const START_LIVES: u32 = 3;
    pub const PLAYER_START_X: f32 = 0.5;
    pub const PLAYER_Y: f32 = 0.92;
    pub const PLAYER_MIN_X: f32 = 0.05;
    pub const PLAYER_MAX_X: f32 = 0.95;
    /// Where player shots appear (just above the ship)
    pub const PLAYER_MUZZLE_Y: f32 = 0.86;

    /// Enemies at or below this y have reached the player's zone
    pub const LOSS_LINE_Y: f32 = 0.9;
}

/// Milliseconds to seconds
#[inline]
pub fn ms_to_secs(ms: u32) -> f32 {
    ms as f32 / 1000.0
}
