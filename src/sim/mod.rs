//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Elapsed time comes in as an argument, never from a clock
//! - Seeded RNG only, carried inside the snapshot
//! - Stable iteration order (formation order, then spawn order)
//! - No rendering, audio or platform dependencies

pub mod boost;
pub mod collision;
pub mod formation;
pub mod geometry;
pub mod kinematics;
pub mod levels;
pub mod state;
pub mod tick;

pub use boost::{apply_boost, roll_boost_drop, tick_effects};
pub use collision::{EnemyHits, PlayerHits, resolve_enemy_hits, resolve_player_hits};
pub use formation::{FormationPattern, generate_formation};
pub use geometry::collides;
pub use levels::{LevelConfig, LevelTable};
pub use state::{
    ActiveEffects, Boost, BoostKind, Enemy, EnemyKind, GameEvent, GamePhase, GameState, Heading,
    Owner, Projectile, ShotBoost, ShotKind,
};
pub use tick::{TickInput, TickOutput, tick};
