//! Collision detection and hit resolution
//!
//! Everything is a circle. Radii come per category from `CollisionTuning`;
//! a pair collides when the distance between centers is below the summed,
//! scaled radius.

use glam::Vec2;

use super::geometry::collides;
use super::state::{Boost, Enemy, Owner, Projectile};
use crate::tuning::CollisionTuning;

/// Outcome of player shots against the formation
#[derive(Debug, Clone, Default)]
pub struct EnemyHits {
    /// Survivors, in list order (with reduced health where hit)
    pub enemies: Vec<Enemy>,
    /// Enemies whose health reached zero this pass
    pub destroyed: Vec<Enemy>,
    /// One entry per non-lethal hit, with health after that hit
    pub damaged: Vec<Enemy>,
    /// Projectiles that hit nothing (enemy shots always pass through)
    pub projectiles: Vec<Projectile>,
}

/// Apply every player-owned projectile to the first enemy it overlaps
///
/// Projectiles are considered in list order, enemies in current live order.
/// A projectile is consumed by at most one enemy. An enemy destroyed by an
/// earlier projectile is gone from the candidate set before the next one is
/// checked, so it can't absorb a second shot.
pub fn resolve_enemy_hits(
    enemies: &[Enemy],
    projectiles: &[Projectile],
    collision: &CollisionTuning,
) -> EnemyHits {
    let radius = collision.enemy_vs_projectile();
    let mut hits = EnemyHits {
        enemies: enemies.to_vec(),
        ..Default::default()
    };

    for projectile in projectiles {
        let target = if projectile.owner == Owner::Player {
            hits.enemies
                .iter()
                .position(|e| collides(projectile.pos, e.pos, radius))
        } else {
            None
        };

        let Some(idx) = target else {
            hits.projectiles.push(projectile.clone());
            continue;
        };

        let health = hits.enemies[idx].health.saturating_sub(projectile.damage);
        if health == 0 {
            let mut dead = hits.enemies.remove(idx);
            dead.health = 0;
            hits.destroyed.push(dead);
        } else {
            hits.enemies[idx].health = health;
            hits.damaged.push(hits.enemies[idx].clone());
        }
    }

    hits
}

/// Outcome of enemy shots against the player
#[derive(Debug, Clone, Default)]
pub struct PlayerHits {
    pub projectiles: Vec<Projectile>,
    /// At least one enemy shot connected this tick
    pub was_hit: bool,
}

/// Consume every enemy-owned projectile overlapping the player
///
/// Any number of connecting shots still reports a single hit; the caller
/// charges at most one life per tick.
pub fn resolve_player_hits(
    player_pos: Vec2,
    player_radius: f32,
    projectiles: &[Projectile],
    collision: &CollisionTuning,
) -> PlayerHits {
    let radius = (player_radius + collision.projectile_radius) * collision.collider_scale;
    let mut result = PlayerHits::default();
    for projectile in projectiles {
        if projectile.owner == Owner::Enemy && collides(player_pos, projectile.pos, radius) {
            result.was_hit = true;
        } else {
            result.projectiles.push(projectile.clone());
        }
    }
    result
}

/// Split pickups into (collected by the player, still falling)
pub fn partition_collected(
    boosts: Vec<Boost>,
    player_pos: Vec2,
    collision: &CollisionTuning,
) -> (Vec<Boost>, Vec<Boost>) {
    let radius = collision.player_vs_boost();
    boosts
        .into_iter()
        .partition(|b| collides(player_pos, b.pos, radius))
}
