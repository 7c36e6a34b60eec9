//! Data-driven game balance
//!
//! Every number the simulation uses lives in `Tuning`. Defaults match the
//! shipped balance; a JSON file may override any subset of fields. Tables are
//! validated once, when `Rules` is built, so the tick never has to second
//! guess its configuration.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::levels::LevelTable;
use crate::sim::state::{BoostKind, EnemyKind, PerEnemyKind};
use crate::upgrades::Loadout;

/// Configuration problems, reported at startup
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed tuning JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be within [0, 1], got {value}")]
    NotProbability { field: &'static str, value: f32 },
    #[error("boost drop chances sum to {0}, above 1")]
    DropTableOverflow(f32),
    #[error("level table is empty")]
    NoLevels,
    #[error("level {level} follows level {previous}; level numbers must increase")]
    LevelOrder { level: u32, previous: u32 },
    #[error("player x bounds are inverted: min {min} > max {max}")]
    PlayerBounds { min: f32, max: f32 },
    #[error("boss_milestones {milestones} exceeds boss health {max}")]
    TooManyMilestones { milestones: u32, max: u32 },
    #[error("formation needs at least 2 columns, got {0}")]
    TooFewColumns(u32),
    #[error("upgrade table `{0}` is empty")]
    EmptyUpgradeTable(&'static str),
    #[error("{table} upgrade level {level} is outside 1..={max}")]
    UpgradeLevelOutOfRange {
        table: &'static str,
        level: u32,
        max: u32,
    },
}

/// Formation sweep and descent
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementTuning {
    /// Horizontal sweep speed (field widths per second)
    pub formation_speed: f32,
    /// Drop applied on every edge bounce
    pub descent_step: f32,
    /// Continuous creep downward (field heights per second)
    pub passive_descent_speed: f32,
    /// Enemies at or past this y end the run
    pub loss_line_y: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            formation_speed: 0.22,
            descent_step: 0.012,
            passive_descent_speed: 0.018,
            loss_line_y: LOSS_LINE_Y,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShootingTuning {
    pub player_cooldown_ms: u32,
    /// Chance that some enemy fires on a given tick (per tick, not per second)
    pub enemy_shot_chance: f32,
    /// Upward speed of player shots
    pub player_projectile_speed: f32,
    /// Downward speed of enemy shots by shooter kind
    pub enemy_projectile_speed: PerEnemyKind<f32>,
}

impl Default for ShootingTuning {
    fn default() -> Self {
        Self {
            player_cooldown_ms: 550,
            enemy_shot_chance: 0.006,
            player_projectile_speed: 0.7,
            enemy_projectile_speed: PerEnemyKind {
                small: 0.28,
                medium: 0.26,
                boss: 0.24,
            },
        }
    }
}

/// One row of the ordered drop table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropChance {
    pub kind: BoostKind,
    pub chance: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostTuning {
    pub fall_speed: f32,
    pub ttl_ms: u32,
    /// Walked in order; whatever probability is left over drops nothing
    pub drop_table: Vec<DropChance>,
    /// Enemy speed multiplier while slow time is active
    pub slow_time_factor: f32,
    /// Boss health is split into this many drop milestones
    pub boss_milestones: u32,
}

impl Default for BoostTuning {
    fn default() -> Self {
        Self {
            fall_speed: 0.18,
            ttl_ms: 8000,
            drop_table: vec![
                DropChance { kind: BoostKind::Shield, chance: 0.2 },
                DropChance { kind: BoostKind::SlowTime, chance: 0.25 },
                DropChance { kind: BoostKind::Lightning, chance: 0.2 },
                DropChance { kind: BoostKind::Nuclear, chance: 0.15 },
            ],
            slow_time_factor: 0.6,
            boss_milestones: 10,
        }
    }
}

/// Per-category hit circles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    /// Global multiplier on every summed radius
    pub collider_scale: f32,
    pub enemy_radius: f32,
    pub player_radius: f32,
    pub boost_radius: f32,
    pub projectile_radius: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            collider_scale: 1.0,
            enemy_radius: 0.07,
            player_radius: 0.065,
            boost_radius: 0.055,
            projectile_radius: 0.03,
        }
    }
}

impl CollisionTuning {
    pub fn enemy_vs_projectile(&self) -> f32 {
        (self.enemy_radius + self.projectile_radius) * self.collider_scale
    }

    pub fn player_vs_boost(&self) -> f32 {
        (self.player_radius + self.boost_radius) * self.collider_scale
    }
}

/// Grid used by the formation patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationTuning {
    pub columns: u32,
    /// Horizontal margin on each side
    pub margin_x: f32,
    /// y of the first row
    pub top_y: f32,
    pub row_spacing: f32,
    /// Extra y per column step for the V shape
    pub v_step: f32,
    /// Maximum jitter for the scattered pattern
    pub scatter_jitter: f32,
    pub boss_pos: Vec2,
}

impl Default for FormationTuning {
    fn default() -> Self {
        Self {
            columns: 6,
            margin_x: 1.0 / 7.0,
            top_y: 0.12,
            row_spacing: 0.08,
            v_step: 0.03,
            scatter_jitter: 0.025,
            boss_pos: Vec2::new(0.5, 0.1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub start_lives: u32,
    pub start_x: f32,
    pub y: f32,
    pub min_x: f32,
    pub max_x: f32,
    pub muzzle_y: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            start_lives: START_LIVES,
            start_x: PLAYER_START_X,
            y: PLAYER_Y,
            min_x: PLAYER_MIN_X,
            max_x: PLAYER_MAX_X,
            muzzle_y: PLAYER_MUZZLE_Y,
        }
    }
}

impl PlayerTuning {
    pub fn pos(&self, x: f32) -> Vec2 {
        Vec2::new(x, self.y)
    }
}

/// All balance data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub movement: MovementTuning,
    pub shooting: ShootingTuning,
    pub boosts: BoostTuning,
    pub collision: CollisionTuning,
    pub formation: FormationTuning,
    pub player: PlayerTuning,
    pub levels: LevelTable,
}

fn positive(field: &'static str, value: f32) -> Result<(), TuningError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(TuningError::NonPositive { field, value })
    }
}

fn probability(field: &'static str, value: f32) -> Result<(), TuningError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TuningError::NotProbability { field, value })
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Check every table for values the simulation can't work with
    pub fn validate(&self) -> Result<(), TuningError> {
        let m = &self.movement;
        positive("movement.formation_speed", m.formation_speed)?;
        positive("movement.descent_step", m.descent_step)?;
        positive("movement.passive_descent_speed", m.passive_descent_speed)?;
        probability("movement.loss_line_y", m.loss_line_y)?;

        let s = &self.shooting;
        positive("shooting.player_cooldown_ms", s.player_cooldown_ms as f32)?;
        probability("shooting.enemy_shot_chance", s.enemy_shot_chance)?;
        positive("shooting.player_projectile_speed", s.player_projectile_speed)?;
        positive("shooting.enemy_projectile_speed.small", s.enemy_projectile_speed.small)?;
        positive("shooting.enemy_projectile_speed.medium", s.enemy_projectile_speed.medium)?;
        positive("shooting.enemy_projectile_speed.boss", s.enemy_projectile_speed.boss)?;

        let b = &self.boosts;
        positive("boosts.fall_speed", b.fall_speed)?;
        positive("boosts.ttl_ms", b.ttl_ms as f32)?;
        positive("boosts.slow_time_factor", b.slow_time_factor)?;
        positive("boosts.boss_milestones", b.boss_milestones as f32)?;
        let boss_health = EnemyKind::Boss.max_health();
        if b.boss_milestones > boss_health {
            return Err(TuningError::TooManyMilestones {
                milestones: b.boss_milestones,
                max: boss_health,
            });
        }
        let mut total = 0.0;
        for entry in &b.drop_table {
            probability("boosts.drop_table.chance", entry.chance)?;
            total += entry.chance;
        }
        // Small slack for float accumulation of tables that sum to exactly 1
        if total > 1.0 + 1e-4 {
            return Err(TuningError::DropTableOverflow(total));
        }

        let c = &self.collision;
        positive("collision.collider_scale", c.collider_scale)?;
        positive("collision.enemy_radius", c.enemy_radius)?;
        positive("collision.player_radius", c.player_radius)?;
        positive("collision.boost_radius", c.boost_radius)?;
        positive("collision.projectile_radius", c.projectile_radius)?;

        let f = &self.formation;
        if f.columns < 2 {
            return Err(TuningError::TooFewColumns(f.columns));
        }
        probability("formation.margin_x", f.margin_x)?;
        positive("formation.row_spacing", f.row_spacing)?;

        let p = &self.player;
        positive("player.start_lives", p.start_lives as f32)?;
        probability("player.y", p.y)?;
        probability("player.min_x", p.min_x)?;
        probability("player.max_x", p.max_x)?;
        if p.min_x > p.max_x {
            return Err(TuningError::PlayerBounds {
                min: p.min_x,
                max: p.max_x,
            });
        }
        probability("player.muzzle_y", p.muzzle_y)?;

        // Level ordering is enforced by LevelTable itself
        Ok(())
    }
}

/// Validated tuning plus the player's upgrade loadout: everything a tick reads
#[derive(Debug, Clone, Default)]
pub struct Rules {
    pub tuning: Tuning,
    pub loadout: Loadout,
}

impl Rules {
    pub fn new(tuning: Tuning, loadout: Loadout) -> Result<Self, TuningError> {
        tuning.validate()?;
        Ok(Self { tuning, loadout })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_default_drop_table_leaves_room_for_nothing() {
        let total: f32 = BoostTuning::default().drop_table.iter().map(|d| d.chance).sum();
        assert!((total - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "movement": { "formation_speed": 0.3 } }"#).unwrap();
        assert_eq!(tuning.movement.formation_speed, 0.3);
        assert_eq!(tuning.movement.descent_step, 0.012);
        assert_eq!(tuning.shooting.player_cooldown_ms, 550);
        assert_eq!(tuning.levels.len(), 4);
    }

    #[test]
    fn test_rejects_overfull_drop_table() {
        let json = r#"{ "boosts": { "drop_table": [
            { "kind": "Shield", "chance": 0.7 },
            { "kind": "Nuclear", "chance": 0.6 }
        ] } }"#;
        assert!(matches!(
            Tuning::from_json(json),
            Err(TuningError::DropTableOverflow(_))
        ));
    }

    #[test]
    fn test_rejects_zero_radius() {
        let mut tuning = Tuning::default();
        tuning.collision.enemy_radius = 0.0;
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::NonPositive { field: "collision.enemy_radius", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_json() {
        assert!(matches!(Tuning::from_json("{ nope"), Err(TuningError::Json(_))));
    }

    #[test]
    fn test_rejects_empty_level_list() {
        assert!(Tuning::from_json(r#"{ "levels": [] }"#).is_err());
    }

    #[test]
    fn test_rejects_inverted_player_bounds() {
        let json = r#"{ "player": { "min_x": 0.9, "max_x": 0.1 } }"#;
        assert!(matches!(
            Tuning::from_json(json),
            Err(TuningError::PlayerBounds { .. })
        ));

        let mut tuning = Tuning::default();
        tuning.player.max_x = 1.5;
        assert!(matches!(
            Rules::new(tuning, Loadout::default()),
            Err(TuningError::NotProbability { field: "player.max_x", .. })
        ));
    }

    #[test]
    fn test_rejects_more_milestones_than_boss_health() {
        let mut tuning = Tuning::default();
        tuning.boosts.boss_milestones = u32::MAX;
        assert!(matches!(
            tuning.validate(),
            Err(TuningError::TooManyMilestones { max: 60, .. })
        ));

        tuning.boosts.boss_milestones = 60;
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_collision_radii_are_summed_and_scaled() {
        let mut c = CollisionTuning::default();
        c.collider_scale = 2.0;
        assert!((c.enemy_vs_projectile() - 0.2).abs() < 1e-6);
        assert!((c.player_vs_boost() - 0.24).abs() < 1e-6);
    }
}
