//! Per-tick movement rules
//!
//! Pure transforms: each takes the current entities and elapsed time and
//! returns the moved set. Nothing here touches a `GameState`.

use glam::Vec2;
use rand::Rng;

use super::geometry::{clamp_to_field, in_field};
use super::state::{
    Boost, Enemy, EnemyKind, EntityIds, Heading, Owner, PerEnemyKind, Projectile, ShotKind,
};
use crate::consts::{FIELD_MAX, FIELD_MIN};
use crate::ms_to_secs;
use crate::tuning::{BoostTuning, MovementTuning, ShootingTuning};

/// Result of moving the formation
#[derive(Debug, Clone)]
pub struct Sweep {
    pub enemies: Vec<Enemy>,
    pub heading: Heading,
    /// The formation touched an edge this tick (heading flipped, extra descent applied)
    pub bounced: bool,
}

/// Move the whole formation in lockstep
///
/// Every enemy shifts horizontally by the shared speed and is clamped to the
/// field. If any enemy reaches the edge it was heading toward, the heading
/// flips for everyone and the formation drops by `descent_step`. The passive
/// creep downward applies every tick regardless.
pub fn sweep_enemies(
    enemies: &[Enemy],
    elapsed_ms: u32,
    speed_modifier: f32,
    heading: Heading,
    tuning: &MovementTuning,
) -> Sweep {
    let secs = ms_to_secs(elapsed_ms);
    let dx = tuning.formation_speed * heading.sign() * speed_modifier * secs;

    let moved_x: Vec<f32> = enemies
        .iter()
        .map(|e| clamp_to_field(e.pos.x + dx))
        .collect();
    let bounced = moved_x.iter().any(|&x| match heading {
        Heading::Right => x >= FIELD_MAX,
        Heading::Left => x <= FIELD_MIN,
    });

    let heading = if bounced { heading.flipped() } else { heading };
    let mut descent = tuning.passive_descent_speed * speed_modifier * secs;
    if bounced {
        descent += tuning.descent_step * speed_modifier;
    }

    let enemies = enemies
        .iter()
        .zip(moved_x)
        .map(|(e, x)| Enemy {
            pos: Vec2::new(x, (e.pos.y + descent).min(FIELD_MAX)),
            heading,
            ..e.clone()
        })
        .collect();

    Sweep {
        enemies,
        heading,
        bounced,
    }
}

/// Straight-line flight; anything that leaves the vertical bounds is dropped
pub fn advance_projectiles(projectiles: &[Projectile], elapsed_ms: u32) -> Vec<Projectile> {
    let secs = ms_to_secs(elapsed_ms);
    projectiles
        .iter()
        .map(|p| Projectile {
            pos: p.pos + p.vel * secs,
            ..p.clone()
        })
        .filter(|p| in_field(p.pos.y))
        .collect()
}

/// Let pickups fall and age
///
/// A boost is dropped once its TTL runs out or it has fallen more than its
/// own radius past the bottom edge.
pub fn advance_boosts(
    boosts: &[Boost],
    elapsed_ms: u32,
    tuning: &BoostTuning,
    boost_radius: f32,
) -> Vec<Boost> {
    let fall = tuning.fall_speed * ms_to_secs(elapsed_ms);
    boosts
        .iter()
        .filter_map(|b| {
            let ttl_ms = b.ttl_ms.saturating_sub(elapsed_ms);
            if ttl_ms == 0 {
                return None;
            }
            let y = b.pos.y + fall;
            if y > FIELD_MAX + boost_radius {
                return None;
            }
            Some(Boost {
                pos: Vec2::new(b.pos.x, y),
                ttl_ms,
                ..b.clone()
            })
        })
        .collect()
}

/// A new player shot leaving the muzzle
pub fn spawn_player_shot(
    muzzle: Vec2,
    kind: ShotKind,
    tuning: &ShootingTuning,
    ids: &mut EntityIds,
) -> Projectile {
    Projectile {
        id: ids.next(),
        pos: muzzle,
        vel: Vec2::new(0.0, -tuning.player_projectile_speed),
        owner: Owner::Player,
        damage: kind.damage(),
        variant: kind,
    }
}

/// Maybe fire one enemy shot this tick
///
/// A single coin flip per tick at a fixed `chance`, independent of frame
/// length. On success a uniformly chosen enemy fires straight down.
pub fn spawn_enemy_shot<R: Rng + ?Sized>(
    enemies: &[Enemy],
    chance: f32,
    speed_modifier: f32,
    speeds: &PerEnemyKind<f32>,
    ids: &mut EntityIds,
    rng: &mut R,
) -> Option<Projectile> {
    if enemies.is_empty() || rng.random::<f32>() >= chance {
        return None;
    }
    let shooter = &enemies[rng.random_range(0..enemies.len())];
    let variant = match shooter.kind {
        EnemyKind::Boss => ShotKind::Nuclear,
        _ => ShotKind::Lightning,
    };
    Some(Projectile {
        id: ids.next(),
        pos: shooter.pos,
        vel: Vec2::new(0.0, speeds.get(shooter.kind) * speed_modifier),
        owner: Owner::Enemy,
        damage: 1,
        variant,
    })
}
