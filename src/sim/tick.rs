//! Simulation tick
//!
//! One call turns the current snapshot, the queued input and the elapsed
//! frame time into the next snapshot plus the events it produced. The input
//! snapshot is never touched, so a caller can keep it around for replays.

use glam::Vec2;

use super::boost::{apply_boost, boss_milestones, consume_shot, roll_boost_drop, tick_effects};
use super::collision::{partition_collected, resolve_enemy_hits, resolve_player_hits};
use super::formation::generate_formation;
use super::kinematics::{
    advance_boosts, advance_projectiles, spawn_enemy_shot, spawn_player_shot, sweep_enemies,
};
use super::state::{EnemyKind, GameEvent, GamePhase, GameState, Heading, boss_health_fraction};
use crate::tuning::Rules;

/// Input collected between two ticks
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Relative horizontal move (normalized units)
    pub move_by: f32,
    /// Absolute horizontal position; applied after `move_by`
    pub move_to: Option<f32>,
    /// Pause/resume request
    pub toggle_pause: bool,
    /// Host app went to the background (`Some(true)`) or came back (`Some(false)`)
    pub app_paused: Option<bool>,
    /// Boost ids the player tapped to collect
    pub collect: Vec<u32>,
}

/// The next snapshot and everything that happened on the way there
#[derive(Debug, Clone)]
pub struct TickOutput {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

/// Advance the game by one frame
pub fn tick(state: &GameState, input: &TickInput, elapsed_ms: u32, rules: &Rules) -> TickOutput {
    let tuning = &rules.tuning;
    let mut next = state.clone();
    let mut events = Vec::new();

    apply_input(&mut next, input, rules, &mut events);

    if next.phase != GamePhase::Running {
        return TickOutput {
            state: next,
            events,
        };
    }

    let player_pos = tuning.player.pos(next.player_x);

    // Pickups fall first; anything under the ship is collected
    let falling = advance_boosts(
        &next.boosts,
        elapsed_ms,
        &tuning.boosts,
        tuning.collision.boost_radius,
    );
    let (collected, falling) = partition_collected(falling, player_pos, &tuning.collision);
    let mut effects = next.effects;
    for boost in &collected {
        log::debug!("Collected {:?} boost {}", boost.kind, boost.id);
        effects = apply_boost(boost.kind, effects, &rules.loadout);
        events.push(GameEvent::BoostCollected { kind: boost.kind });
    }
    next.boosts = falling;

    effects = tick_effects(effects, elapsed_ms);
    let speed_modifier = effects.speed_modifier(tuning.boosts.slow_time_factor);

    let sweep = sweep_enemies(
        &next.enemies,
        elapsed_ms,
        speed_modifier,
        next.heading,
        &tuning.movement,
    );
    next.heading = sweep.heading;

    // Enemy fire
    let mut enemy_projectiles = advance_projectiles(&next.enemy_projectiles, elapsed_ms);
    if let Some(shot) = spawn_enemy_shot(
        &sweep.enemies,
        tuning.shooting.enemy_shot_chance,
        speed_modifier,
        &tuning.shooting.enemy_projectile_speed,
        &mut next.ids,
        &mut next.rng,
    ) {
        enemy_projectiles.push(shot);
    }

    // Player fire is automatic on a cooldown
    let mut player_projectiles = advance_projectiles(&next.player_projectiles, elapsed_ms);
    next.shot_cooldown_ms = next.shot_cooldown_ms.saturating_sub(elapsed_ms);
    if next.shot_cooldown_ms == 0 {
        let kind = effects.shot.shot_kind();
        let muzzle = Vec2::new(next.player_x, tuning.player.muzzle_y);
        player_projectiles.push(spawn_player_shot(
            muzzle,
            kind,
            &tuning.shooting,
            &mut next.ids,
        ));
        effects = consume_shot(effects);
        next.shot_cooldown_ms = tuning.shooting.player_cooldown_ms;
        events.push(GameEvent::ShotFired { kind });
    }

    // Player shots against the formation
    let hits = resolve_enemy_hits(&sweep.enemies, &player_projectiles, &tuning.collision);
    for enemy in &hits.damaged {
        events.push(GameEvent::EnemyHit {
            id: enemy.id,
            kind: enemy.kind,
        });
    }
    let mut drops = Vec::new();
    for enemy in &hits.destroyed {
        next.score += enemy.kind.score();
        events.push(GameEvent::EnemyDestroyed {
            id: enemy.id,
            kind: enemy.kind,
        });
        if let Some(boost) =
            roll_boost_drop(enemy.pos, &tuning.boosts, &mut next.ids, &mut next.rng)
        {
            drops.push(boost);
        }
    }

    let live_boss = hits.enemies.iter().find(|e| e.kind == EnemyKind::Boss);
    let dead_boss = hits.destroyed.iter().find(|e| e.kind == EnemyKind::Boss);
    let milestones = boss_milestones(
        next.boss_drops_triggered,
        live_boss,
        dead_boss,
        tuning.boosts.boss_milestones,
    );
    if let Some(boss_pos) = live_boss.or(dead_boss).map(|b| b.pos) {
        for _ in 0..milestones.rolls {
            if let Some(boost) =
                roll_boost_drop(boss_pos, &tuning.boosts, &mut next.ids, &mut next.rng)
            {
                drops.push(boost);
            }
        }
    }
    next.boss_drops_triggered = milestones.triggered;

    for boost in &drops {
        log::debug!("Dropped {:?} boost {}", boost.kind, boost.id);
        events.push(GameEvent::BoostDropped {
            id: boost.id,
            kind: boost.kind,
        });
    }
    next.boosts.extend(drops);

    // Enemy shots against the player
    let player_hits = resolve_player_hits(
        player_pos,
        tuning.collision.player_radius,
        &enemy_projectiles,
        &tuning.collision,
    );
    if player_hits.was_hit {
        if effects.shield_active() {
            effects.shield_ms = 0;
            events.push(GameEvent::ShieldAbsorbed);
        } else {
            next.lives = next.lives.saturating_sub(1);
            events.push(GameEvent::PlayerHit {
                lives_left: next.lives,
            });
        }
    }

    next.enemies = hits.enemies;
    next.player_projectiles = hits.projectiles;
    next.enemy_projectiles = player_hits.projectiles;
    next.effects = effects;

    resolve_phase(&mut next, rules, &mut events);

    next.boss_health = boss_health_fraction(&next.enemies);
    next.time_ticks += 1;

    log::trace!(
        "tick={} enemies={} shots={}/{} boosts={}",
        next.time_ticks,
        next.enemies.len(),
        next.player_projectiles.len(),
        next.enemy_projectiles.len(),
        next.boosts.len()
    );

    TickOutput {
        state: next,
        events,
    }
}

/// Pause handling, movement and tap-to-collect
fn apply_input(
    state: &mut GameState,
    input: &TickInput,
    rules: &Rules,
    events: &mut Vec<GameEvent>,
) {
    if input.toggle_pause {
        state.phase = match state.phase {
            GamePhase::Running => GamePhase::Paused,
            GamePhase::Paused => GamePhase::Running,
            other => other,
        };
    }
    // Backgrounding pauses; returning to the foreground does not resume
    if input.app_paused == Some(true) && state.phase == GamePhase::Running {
        state.phase = GamePhase::Paused;
    }

    if state.phase != GamePhase::Running {
        return;
    }

    let player = &rules.tuning.player;
    let mut x = state.player_x + input.move_by;
    if let Some(target) = input.move_to {
        x = target;
    }
    state.player_x = x.clamp(player.min_x, player.max_x);

    for &id in &input.collect {
        let Some(idx) = state.boosts.iter().position(|b| b.id == id) else {
            continue;
        };
        let boost = state.boosts.remove(idx);
        log::debug!("Tapped {:?} boost {}", boost.kind, boost.id);
        state.effects = apply_boost(boost.kind, state.effects, &rules.loadout);
        events.push(GameEvent::BoostCollected { kind: boost.kind });
    }
}

/// Loss, win, or the jump to the next level
fn resolve_phase(state: &mut GameState, rules: &Rules, events: &mut Vec<GameEvent>) {
    let tuning = &rules.tuning;
    let overrun = state
        .enemies
        .iter()
        .any(|e| e.pos.y >= tuning.movement.loss_line_y);

    if state.lives == 0 || overrun {
        state.phase = GamePhase::Lost;
        log::info!(
            "Run lost at level {} with score {} (overrun={})",
            state.level,
            state.score,
            overrun
        );
        events.push(GameEvent::Lost);
        return;
    }

    if !state.enemies.is_empty() {
        return;
    }

    state.phase = GamePhase::LevelComplete;
    match tuning.levels.next_after(state.level) {
        Some(config) => {
            state.enemies =
                generate_formation(config, &tuning.formation, &mut state.ids, &mut state.rng);
            state.level = config.level;
            state.heading = Heading::Right;
            state.boss_drops_triggered = 0;
            state.phase = GamePhase::Running;
            log::info!(
                "Advanced to level {} with {} enemies",
                state.level,
                state.enemies.len()
            );
            events.push(GameEvent::LevelAdvanced { level: state.level });
        }
        None => {
            state.phase = GamePhase::Won;
            log::info!("Run won at level {} with score {}", state.level, state.score);
            events.push(GameEvent::Won);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::levels::{LevelConfig, LevelTable};
    use crate::sim::state::{Boost, BoostKind, Enemy, Owner, Projectile, ShotBoost, ShotKind};
    use crate::tuning::{DropChance, Tuning};
    use crate::upgrades::Loadout;

    fn quiet_rules() -> Rules {
        // No random enemy fire so tests control every projectile
        let mut tuning = Tuning::default();
        tuning.shooting.enemy_shot_chance = 0.0;
        Rules::new(tuning, Loadout::default()).unwrap()
    }

    fn with_enemies(rules: &Rules, enemies: Vec<Enemy>) -> GameState {
        let mut state = GameState::new(42, rules);
        state.enemies = enemies;
        state
    }

    fn enemy_shot(id: u32, pos: Vec2) -> Projectile {
        Projectile {
            id,
            pos,
            vel: Vec2::ZERO,
            owner: Owner::Enemy,
            damage: 1,
            variant: ShotKind::Lightning,
        }
    }

    fn player_shot(id: u32, pos: Vec2) -> Projectile {
        Projectile {
            id,
            pos,
            vel: Vec2::ZERO,
            owner: Owner::Player,
            damage: 1,
            variant: ShotKind::Regular,
        }
    }

    fn far_enemy(id: u32, kind: EnemyKind) -> Enemy {
        Enemy::new(id, kind, Vec2::new(0.5, 0.2))
    }

    #[test]
    fn test_shield_absorbs_hit() {
        let rules = quiet_rules();
        let mut state = with_enemies(&rules, vec![far_enemy(1, EnemyKind::Small)]);
        state.effects.shield_ms = 5_000;
        state.enemy_projectiles = vec![enemy_shot(900, Vec2::new(0.5, 0.92))];

        let out = tick(&state, &TickInput::default(), 16, &rules);
        assert_eq!(out.state.lives, 3);
        assert!(!out.state.effects.shield_active());
        assert!(out.state.enemy_projectiles.is_empty());
        assert!(out.events.contains(&GameEvent::ShieldAbsorbed));
    }

    #[test]
    fn test_unshielded_hit_costs_one_life() {
        let rules = quiet_rules();
        let mut state = with_enemies(&rules, vec![far_enemy(1, EnemyKind::Small)]);
        state.enemy_projectiles = vec![
            enemy_shot(900, Vec2::new(0.5, 0.92)),
            enemy_shot(901, Vec2::new(0.51, 0.92)),
        ];

        let out = tick(&state, &TickInput::default(), 16, &rules);
        assert_eq!(out.state.lives, 2);
        assert!(out.events.contains(&GameEvent::PlayerHit { lives_left: 2 }));
    }

    #[test]
    fn test_last_life_lost_ends_run() {
        let rules = quiet_rules();
        let mut state = with_enemies(&rules, vec![far_enemy(1, EnemyKind::Small)]);
        state.lives = 1;
        state.enemy_projectiles = vec![enemy_shot(900, Vec2::new(0.5, 0.92))];

        let out = tick(&state, &TickInput::default(), 16, &rules);
        assert_eq!(out.state.phase, GamePhase::Lost);
        assert!(out.events.contains(&GameEvent::Lost));
    }

    #[test]
    fn test_formation_reaching_loss_line_ends_run() {
        let rules = quiet_rules();
        let state = with_enemies(
            &rules,
            vec![Enemy::new(1, EnemyKind::Small, Vec2::new(0.2, 0.95))],
        );
        let out = tick(&state, &TickInput::default(), 16, &rules);
        assert_eq!(out.state.phase, GamePhase::Lost);
        assert_eq!(out.state.lives, 3);
    }

    #[test]
    fn test_medium_dies_on_second_tick() {
        let rules = quiet_rules();
        let medium = Enemy::new(1, EnemyKind::Medium, Vec2::new(0.3, 0.3));
        let mut state = with_enemies(&rules, vec![medium, far_enemy(2, EnemyKind::Small)]);
        state.shot_cooldown_ms = 10_000;
        state.player_projectiles = vec![player_shot(900, Vec2::new(0.3, 0.3))];

        let first = tick(&state, &TickInput::default(), 0, &rules);
        assert_eq!(first.state.enemies[0].health, 1);
        assert!(
            first
                .events
                .contains(&GameEvent::EnemyHit { id: 1, kind: EnemyKind::Medium })
        );

        let mut state = first.state;
        state.player_projectiles = vec![player_shot(901, state.enemies[0].pos)];
        let second = tick(&state, &TickInput::default(), 0, &rules);
        assert!(second.state.enemies.iter().all(|e| e.id != 1));
        assert_eq!(second.state.score, 50);
        assert!(
            second
                .events
                .contains(&GameEvent::EnemyDestroyed { id: 1, kind: EnemyKind::Medium })
        );
    }

    #[test]
    fn test_clearing_last_level_wins() {
        let rules = quiet_rules();
        let mut state = with_enemies(&rules, Vec::new());
        state.level = 4;

        let out = tick(&state, &TickInput::default(), 16, &rules);
        assert_eq!(out.state.phase, GamePhase::Won);
        assert!(out.events.contains(&GameEvent::Won));
    }

    #[test]
    fn test_clearing_level_advances_same_tick() {
        let rules = quiet_rules();
        let mut state = with_enemies(&rules, Vec::new());
        state.heading = Heading::Left;
        state.boss_drops_triggered = 3;

        let out = tick(&state, &TickInput::default(), 16, &rules);
        assert_eq!(out.state.phase, GamePhase::Running);
        assert_eq!(out.state.level, 2);
        assert_eq!(out.state.enemies.len(), 16);
        assert_eq!(out.state.heading, Heading::Right);
        assert_eq!(out.state.boss_drops_triggered, 0);
        assert!(out.events.contains(&GameEvent::LevelAdvanced { level: 2 }));
    }

    #[test]
    fn test_zero_enemy_level_is_skipped_in_one_tick_each() {
        let mut tuning = Tuning::default();
        tuning.shooting.enemy_shot_chance = 0.0;
        tuning.levels = LevelTable::new(vec![
            LevelConfig::new(1, 0, 0, false),
            LevelConfig::new(2, 1, 0, false),
        ])
        .unwrap();
        let rules = Rules::new(tuning, Loadout::default()).unwrap();

        let state = GameState::new(3, &rules);
        assert!(state.enemies.is_empty());
        let out = tick(&state, &TickInput::default(), 16, &rules);
        assert_eq!(out.state.level, 2);
        assert_eq!(out.state.enemies.len(), 1);
    }

    #[test]
    fn test_boss_milestone_drops() {
        let mut tuning = Tuning::default();
        tuning.shooting.enemy_shot_chance = 0.0;
        tuning.boosts.drop_table = vec![DropChance {
            kind: BoostKind::Shield,
            chance: 1.0,
        }];
        let rules = Rules::new(tuning, Loadout::default()).unwrap();

        let boss = Enemy::new(1, EnemyKind::Boss, Vec2::new(0.5, 0.1));
        let mut state = with_enemies(&rules, vec![boss]);
        state.shot_cooldown_ms = 10_000;
        // 27 damage takes the boss from 60 to 33 hp (55%)
        state.player_projectiles = (0..27)
            .map(|i| player_shot(900 + i, Vec2::new(0.5, 0.1)))
            .collect();

        let out = tick(&state, &TickInput::default(), 0, &rules);
        let dropped = out
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::BoostDropped { .. }))
            .count();
        assert_eq!(dropped, 4);
        assert_eq!(out.state.boss_drops_triggered, 4);
        assert!((out.state.boss_health - 0.55).abs() < 1e-6);
    }

    #[test]
    fn test_boost_under_ship_is_collected_once() {
        let rules = quiet_rules();
        let mut state = with_enemies(&rules, vec![far_enemy(1, EnemyKind::Small)]);
        state.boosts = vec![Boost {
            id: 500,
            kind: BoostKind::Nuclear,
            pos: Vec2::new(0.5, 0.92),
            ttl_ms: 1_000,
        }];
        state.shot_cooldown_ms = 10_000;

        let out = tick(&state, &TickInput::default(), 16, &rules);
        assert!(out.state.boosts.is_empty());
        assert_eq!(out.state.effects.shot, ShotBoost::Nuclear { shots_left: 2 });
        let collected = out
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::BoostCollected { .. }))
            .count();
        assert_eq!(collected, 1);

        let again = tick(&out.state, &TickInput::default(), 16, &rules);
        assert!(
            !again
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::BoostCollected { .. }))
        );
    }

    #[test]
    fn test_tap_collects_by_id() {
        let rules = quiet_rules();
        let mut state = with_enemies(&rules, vec![far_enemy(1, EnemyKind::Small)]);
        state.boosts = vec![Boost {
            id: 500,
            kind: BoostKind::SlowTime,
            pos: Vec2::new(0.1, 0.3),
            ttl_ms: 1_000,
        }];
        let input = TickInput {
            collect: vec![500, 777],
            ..Default::default()
        };

        let out = tick(&state, &input, 16, &rules);
        assert!(out.state.boosts.is_empty());
        assert!(out.state.effects.slow_time_active());
        assert!(out.events.contains(&GameEvent::BoostCollected { kind: BoostKind::SlowTime }));
    }

    #[test]
    fn test_nuclear_shot_spends_ammo() {
        let rules = quiet_rules();
        let mut state = with_enemies(&rules, vec![far_enemy(1, EnemyKind::Small)]);
        state.effects.shot = ShotBoost::Nuclear { shots_left: 2 };

        let out = tick(&state, &TickInput::default(), 16, &rules);
        assert!(out.events.contains(&GameEvent::ShotFired { kind: ShotKind::Nuclear }));
        assert_eq!(out.state.effects.shot, ShotBoost::Nuclear { shots_left: 1 });
        assert_eq!(out.state.shot_cooldown_ms, 550);
        assert_eq!(out.state.player_projectiles.last().map(|p| p.damage), Some(4));
    }

    #[test]
    fn test_cooldown_blocks_fire() {
        let rules = quiet_rules();
        let mut state = with_enemies(&rules, vec![far_enemy(1, EnemyKind::Small)]);
        state.shot_cooldown_ms = 100;

        let out = tick(&state, &TickInput::default(), 16, &rules);
        assert!(!out.events.iter().any(|e| matches!(e, GameEvent::ShotFired { .. })));
        assert_eq!(out.state.shot_cooldown_ms, 84);
    }

    #[test]
    fn test_pause_toggle_and_background() {
        let rules = quiet_rules();
        let state = GameState::new(1, &rules);
        let pause = TickInput {
            toggle_pause: true,
            ..Default::default()
        };

        let paused = tick(&state, &pause, 16, &rules).state;
        assert_eq!(paused.phase, GamePhase::Paused);
        assert_eq!(paused.time_ticks, state.time_ticks);

        // Paused ticks do nothing, even with movement queued
        let moved = TickInput {
            move_by: 0.2,
            ..Default::default()
        };
        let still = tick(&paused, &moved, 16, &rules).state;
        assert_eq!(still.player_x, paused.player_x);

        let resumed = tick(&paused, &pause, 16, &rules).state;
        assert_eq!(resumed.phase, GamePhase::Running);

        let background = TickInput {
            app_paused: Some(true),
            ..Default::default()
        };
        assert_eq!(tick(&resumed, &background, 16, &rules).state.phase, GamePhase::Paused);

        let foreground = TickInput {
            app_paused: Some(false),
            ..Default::default()
        };
        assert_eq!(tick(&paused, &foreground, 16, &rules).state.phase, GamePhase::Paused);
    }

    #[test]
    fn test_finished_runs_ignore_pause() {
        let rules = quiet_rules();
        let mut state = GameState::new(1, &rules);
        state.phase = GamePhase::Won;
        let pause = TickInput {
            toggle_pause: true,
            ..Default::default()
        };
        assert_eq!(tick(&state, &pause, 16, &rules).state.phase, GamePhase::Won);
    }

    #[test]
    fn test_movement_is_clamped() {
        let rules = quiet_rules();
        let state = GameState::new(1, &rules);
        let input = TickInput {
            move_by: -5.0,
            ..Default::default()
        };
        assert_eq!(tick(&state, &input, 16, &rules).state.player_x, 0.05);

        let input = TickInput {
            move_to: Some(2.0),
            ..Default::default()
        };
        assert_eq!(tick(&state, &input, 16, &rules).state.player_x, 0.95);
    }

    #[test]
    fn test_tick_is_deterministic() {
        let rules = Rules::default();
        let mut a = GameState::new(99, &rules);
        let mut b = GameState::new(99, &rules);
        let input = TickInput {
            move_by: 0.003,
            ..Default::default()
        };
        for _ in 0..600 {
            a = tick(&a, &input, 16, &rules).state;
            b = tick(&b, &input, 16, &rules).state;
        }
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_input_state_is_untouched() {
        let rules = quiet_rules();
        let state = GameState::new(5, &rules);
        let before = serde_json::to_string(&state).unwrap();
        let _ = tick(&state, &TickInput::default(), 16, &rules);
        assert_eq!(serde_json::to_string(&state).unwrap(), before);
    }
}
