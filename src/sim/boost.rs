//! Power-up lifecycle
//!
//! Drop rolls, effect application, timed expiry, and the boss's health
//! milestone drops.

use glam::Vec2;
use rand::Rng;

use super::state::{ActiveEffects, Boost, BoostKind, Enemy, EntityIds, ShotBoost};
use crate::tuning::{BoostTuning, DropChance};
use crate::upgrades::BoostParams;

/// Walk the ordered drop table with a roll in [0, 1)
///
/// Returns the first kind whose cumulative bound exceeds the roll, or `None`
/// if the roll lands past the last bound.
pub fn pick_from_table(table: &[DropChance], roll: f32) -> Option<BoostKind> {
    let mut cumulative = 0.0;
    for entry in table {
        cumulative += entry.chance;
        if roll < cumulative {
            return Some(entry.kind);
        }
    }
    None
}

/// One drop roll at `pos`
pub fn roll_boost_drop<R: Rng + ?Sized>(
    pos: Vec2,
    tuning: &BoostTuning,
    ids: &mut EntityIds,
    rng: &mut R,
) -> Option<Boost> {
    let roll: f32 = rng.random();
    let kind = pick_from_table(&tuning.drop_table, roll)?;
    Some(Boost {
        id: ids.next(),
        kind,
        pos,
        ttl_ms: tuning.ttl_ms,
    })
}

/// Effects after picking up a boost
///
/// Lightning and Nuclear replace whatever shot boost was active. Shield and
/// slow time restart their timers and leave the shot slot alone.
pub fn apply_boost(
    kind: BoostKind,
    effects: ActiveEffects,
    params: &impl BoostParams,
) -> ActiveEffects {
    match kind {
        BoostKind::Lightning => ActiveEffects {
            shot: ShotBoost::Lightning {
                remaining_ms: params.lightning_duration_ms(),
            },
            ..effects
        },
        BoostKind::Nuclear => ActiveEffects {
            shot: ShotBoost::Nuclear {
                shots_left: params.nuclear_shots(),
            },
            ..effects
        },
        BoostKind::Shield => ActiveEffects {
            shield_ms: params.shield_duration_ms(),
            ..effects
        },
        BoostKind::SlowTime => ActiveEffects {
            slow_time_ms: params.slow_time_duration_ms(),
            ..effects
        },
    }
}

/// Count down timed effects, reverting whatever ran out
pub fn tick_effects(effects: ActiveEffects, elapsed_ms: u32) -> ActiveEffects {
    let shot = match effects.shot {
        ShotBoost::Lightning { remaining_ms } => match remaining_ms.saturating_sub(elapsed_ms) {
            0 => ShotBoost::Regular,
            remaining_ms => ShotBoost::Lightning { remaining_ms },
        },
        ShotBoost::Nuclear { shots_left: 0 } => ShotBoost::Regular,
        other => other,
    };
    ActiveEffects {
        shot,
        shield_ms: effects.shield_ms.saturating_sub(elapsed_ms),
        slow_time_ms: effects.slow_time_ms.saturating_sub(elapsed_ms),
    }
}

/// Spend one round of limited ammo after a shot is fired
pub fn consume_shot(effects: ActiveEffects) -> ActiveEffects {
    let shot = match effects.shot {
        ShotBoost::Nuclear { shots_left } if shots_left > 1 => ShotBoost::Nuclear {
            shots_left: shots_left - 1,
        },
        ShotBoost::Nuclear { .. } => ShotBoost::Regular,
        other => other,
    };
    ActiveEffects { shot, ..effects }
}

/// Boss milestone bookkeeping for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Milestones {
    /// Extra drop rolls owed this tick
    pub rolls: u32,
    /// Trigger count to carry into the next tick
    pub triggered: u32,
}

/// Work out how many boss milestones were crossed since the last tick
///
/// `live` is the boss still in the formation, `destroyed` the boss killed this
/// tick (its final health still counts). The carried count drops back to zero
/// once no boss is live.
pub fn boss_milestones(
    previous: u32,
    live: Option<&Enemy>,
    destroyed: Option<&Enemy>,
    milestones: u32,
) -> Milestones {
    let Some(boss) = live.or(destroyed) else {
        return Milestones {
            rolls: 0,
            triggered: 0,
        };
    };

    let max = boss.kind.max_health();
    let lost = max.saturating_sub(boss.health);
    let reached = (u64::from(lost) * u64::from(milestones) / u64::from(max))
        .min(u64::from(milestones)) as u32;
    let rolls = reached.saturating_sub(previous);
    let triggered = if live.is_some() { reached.max(previous) } else { 0 };

    Milestones { rolls, triggered }
}
