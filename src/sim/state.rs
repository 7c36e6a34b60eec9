//! Game state and core simulation types
//!
//! Everything a tick reads or produces lives here. A `GameState` is a
//! snapshot: `tick` never edits one in place, it builds the next one.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::formation::generate_formation;
use crate::tuning::Rules;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Ticks are ignored until the player resumes
    Paused,
    /// Out of lives, or the formation reached the player's zone
    Lost,
    /// Last configured level cleared
    Won,
    /// Level cleared with another one queued. Resolved inside the tick that
    /// produced it, so a published snapshot never carries this phase.
    LevelComplete,
}

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Small,
    Medium,
    Boss,
}

impl EnemyKind {
    pub const fn max_health(self) -> u32 {
        match self {
            EnemyKind::Small => 1,
            EnemyKind::Medium => 2,
            EnemyKind::Boss => 60,
        }
    }

    /// Points awarded when destroyed
    pub const fn score(self) -> u64 {
        match self {
            EnemyKind::Small => 25,
            EnemyKind::Medium => 50,
            EnemyKind::Boss => 500,
        }
    }
}

/// A value per enemy kind. One field per variant, so a table can't miss a kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerEnemyKind<T> {
    pub small: T,
    pub medium: T,
    pub boss: T,
}

impl<T: Copy> PerEnemyKind<T> {
    pub fn get(&self, kind: EnemyKind) -> T {
        match kind {
            EnemyKind::Small => self.small,
            EnemyKind::Medium => self.medium,
            EnemyKind::Boss => self.boss,
        }
    }
}

/// Horizontal heading of the formation sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Heading {
    #[default]
    Right,
    Left,
}

impl Heading {
    /// +1 for right, -1 for left
    pub fn sign(self) -> f32 {
        match self {
            Heading::Right => 1.0,
            Heading::Left => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Heading::Right => Heading::Left,
            Heading::Left => Heading::Right,
        }
    }
}

/// An enemy ship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub heading: Heading,
    /// Remaining health; a live enemy always has at least 1
    pub health: u32,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            heading: Heading::Right,
            health: kind.max_health(),
        }
    }

    /// Health as a fraction of the kind's maximum
    pub fn health_fraction(&self) -> f32 {
        self.health as f32 / self.kind.max_health() as f32
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// Shot variants. Doubles as the projectile's visual tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShotKind {
    #[default]
    Regular,
    Lightning,
    Nuclear,
}

impl ShotKind {
    pub const fn damage(self) -> u32 {
        match self {
            ShotKind::Regular => 1,
            ShotKind::Lightning => 2,
            ShotKind::Nuclear => 4,
        }
    }
}

/// A projectile in flight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    /// Normalized units per second
    pub vel: Vec2,
    pub owner: Owner,
    pub damage: u32,
    pub variant: ShotKind,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoostKind {
    Shield,
    SlowTime,
    Lightning,
    Nuclear,
}

/// A falling pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boost {
    pub id: u32,
    pub kind: BoostKind,
    pub pos: Vec2,
    pub ttl_ms: u32,
}

/// The shot-type slot. Lightning and Nuclear can't both be active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShotBoost {
    #[default]
    Regular,
    Lightning { remaining_ms: u32 },
    Nuclear { shots_left: u32 },
}

impl ShotBoost {
    pub fn shot_kind(self) -> ShotKind {
        match self {
            ShotBoost::Regular => ShotKind::Regular,
            ShotBoost::Lightning { .. } => ShotKind::Lightning,
            ShotBoost::Nuclear { .. } => ShotKind::Nuclear,
        }
    }
}

/// Active power-up effects
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub shot: ShotBoost,
    /// Shield time left; the shield is up while this is non-zero
    pub shield_ms: u32,
    pub slow_time_ms: u32,
}

impl ActiveEffects {
    pub fn shield_active(&self) -> bool {
        self.shield_ms > 0
    }

    pub fn slow_time_active(&self) -> bool {
        self.slow_time_ms > 0
    }

    /// Multiplier on enemy sweep, descent and shot speed
    pub fn speed_modifier(&self, slow_factor: f32) -> f32 {
        if self.slow_time_active() { slow_factor } else { 1.0 }
    }
}

/// One-shot notifications emitted by a tick (audio/UI collaborators consume these)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ShotFired { kind: ShotKind },
    EnemyHit { id: u32, kind: EnemyKind },
    EnemyDestroyed { id: u32, kind: EnemyKind },
    BoostDropped { id: u32, kind: BoostKind },
    BoostCollected { kind: BoostKind },
    ShieldAbsorbed,
    PlayerHit { lives_left: u32 },
    LevelAdvanced { level: u32 },
    Won,
    Lost,
}

/// Monotonic entity ID allocator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityIds(u32);

impl Default for EntityIds {
    fn default() -> Self {
        Self(1)
    }
}

impl EntityIds {
    pub fn next(&mut self) -> u32 {
        let id = self.0;
        self.0 += 1;
        id
    }
}

/// Complete game snapshot
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG driving formation choice, enemy fire and boost rolls
    #[serde(skip)]
    pub(crate) rng: Pcg32,
    /// Current level number (as configured, 1-based by default)
    pub level: u32,
    pub lives: u32,
    pub score: u64,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Player ship x (normalized); y is fixed by tuning
    pub player_x: f32,
    /// Live enemies, in formation order
    pub enemies: Vec<Enemy>,
    pub player_projectiles: Vec<Projectile>,
    pub enemy_projectiles: Vec<Projectile>,
    pub boosts: Vec<Boost>,
    pub effects: ActiveEffects,
    /// Formation sweep heading
    pub heading: Heading,
    /// Live boss health / max, 0 when no boss is present
    pub boss_health: f32,
    /// Boss health milestones already paid out as boost rolls
    pub boss_drops_triggered: u32,
    /// Time until the next player shot
    pub shot_cooldown_ms: u32,
    pub(crate) ids: EntityIds,
}

impl GameState {
    /// Create a new run at the first configured level
    pub fn new(seed: u64, rules: &Rules) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut ids = EntityIds::default();
        let first = rules.tuning.levels.first();
        let enemies = generate_formation(first, &rules.tuning.formation, &mut ids, &mut rng);
        let player = &rules.tuning.player;

        log::info!(
            "New run seed={} level={} enemies={}",
            seed,
            first.level,
            enemies.len()
        );

        Self {
            seed,
            rng,
            level: first.level,
            lives: player.start_lives,
            score: 0,
            phase: GamePhase::Running,
            time_ticks: 0,
            player_x: player.start_x,
            boss_health: boss_health_fraction(&enemies),
            enemies,
            player_projectiles: Vec::new(),
            enemy_projectiles: Vec::new(),
            boosts: Vec::new(),
            effects: ActiveEffects::default(),
            heading: Heading::Right,
            boss_drops_triggered: 0,
            shot_cooldown_ms: 0,
            ids,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, GamePhase::Won | GamePhase::Lost)
    }
}

/// Health fraction of the first live boss, 0 if there is none
pub fn boss_health_fraction(enemies: &[Enemy]) -> f32 {
    enemies
        .iter()
        .find(|e| e.kind == EnemyKind::Boss)
        .map_or(0.0, Enemy::health_fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_running_at_first_level() {
        let rules = Rules::default();
        let state = GameState::new(7, &rules);
        assert_eq!(state.phase, GamePhase::Running);
        assert_eq!(state.level, 1);
        assert_eq!(state.lives, 3);
        assert_eq!(state.enemies.len(), 16);
        assert_eq!(state.boss_health, 0.0);
        assert_eq!(state.effects.shot, ShotBoost::Regular);
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut ids = EntityIds::default();
        let a = ids.next();
        let b = ids.next();
        assert_ne!(a, b);
    }

    #[test]
    fn test_boss_health_fraction() {
        let mut boss = Enemy::new(1, EnemyKind::Boss, Vec2::new(0.5, 0.1));
        let small = Enemy::new(2, EnemyKind::Small, Vec2::new(0.2, 0.2));
        assert_eq!(boss_health_fraction(&[small.clone()]), 0.0);

        boss.health = 30;
        assert!((boss_health_fraction(&[small, boss]) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_speed_modifier_follows_slow_time() {
        let mut effects = ActiveEffects::default();
        assert_eq!(effects.speed_modifier(0.6), 1.0);
        effects.slow_time_ms = 10;
        assert_eq!(effects.speed_modifier(0.6), 0.6);
    }

    #[test]
    fn test_heading_flip() {
        assert_eq!(Heading::Right.flipped(), Heading::Left);
        assert_eq!(Heading::Left.sign(), -1.0);
    }
}
