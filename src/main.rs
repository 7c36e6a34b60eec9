//! Space Attack headless runner
//!
//! Plays one run with a simple autopilot and logs what happens.
//! Usage: `space-attack [seed] [tuning.json]`. Set `RUST_LOG=debug` to see
//! boost drops and pickups.

use std::error::Error;

use space_attack::consts::TICK_HZ;
use space_attack::sim::{GameEvent, GameState};
use space_attack::upgrades::coins_for_score;
use space_attack::{Loadout, Rules, Session, Tuning};

const FRAME_MS: u32 = 1000 / TICK_HZ;
/// Ten minutes of game time
const MAX_TICKS: u64 = 37_500;
/// Largest move the autopilot makes per tick
const MAX_STEP: f32 = 0.012;

/// Chase the closest pickup, otherwise line up under the lowest enemy
fn autopilot(state: &GameState) -> f32 {
    let x = state.player_x;
    let target = state
        .boosts
        .iter()
        .map(|b| b.pos.x)
        .min_by(|a, b| (a - x).abs().total_cmp(&(b - x).abs()))
        .or_else(|| {
            state
                .enemies
                .iter()
                .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
                .map(|e| e.pos.x)
        });
    target.map_or(0.0, |t| (t - x).clamp(-MAX_STEP, MAX_STEP))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => arg.parse::<u64>()?,
        None => 1,
    };
    let tuning = match args.next() {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let rules = Rules::new(tuning, Loadout::default())?;

    log::info!("Space Attack (headless) starting with seed: {}", seed);
    let mut session = Session::new(seed, rules);

    while !session.state().is_finished() && session.state().time_ticks < MAX_TICKS {
        session.move_player(autopilot(session.state()));
        for event in session.step(FRAME_MS) {
            match event {
                GameEvent::PlayerHit { lives_left } => {
                    log::info!("Player hit, {} lives left", lives_left)
                }
                GameEvent::ShieldAbsorbed => log::info!("Shield absorbed a hit"),
                GameEvent::BoostCollected { kind } => log::info!("Picked up {:?}", kind),
                GameEvent::LevelAdvanced { .. } | GameEvent::Won | GameEvent::Lost => {}
                other => log::debug!("{:?}", other),
            }
        }
    }

    let state = session.state();
    log::info!(
        "Finished: phase={:?} level={} score={} ticks={}",
        state.phase,
        state.level,
        state.score,
        state.time_ticks
    );
    log::info!("Coins earned: {}", coins_for_score(state.score));
    println!("{}", serde_json::to_string_pretty(state)?);
    Ok(())
}
