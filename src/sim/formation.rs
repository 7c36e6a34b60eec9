//! Formation generator
//!
//! Lays a level's enemies out on a fixed-column grid using one of several
//! randomly chosen patterns. A pattern decides two things: where each grid
//! slot sits on the field, and which slots are most deserving of a Medium
//! enemy. The `medium` best-ranked slots get Mediums, the rest get Smalls,
//! so requested counts are honored exactly.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::clamp_to_field;
use super::levels::LevelConfig;
use super::state::{Enemy, EnemyKind, EntityIds};
use crate::tuning::FormationTuning;

/// Spatial archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormationPattern {
    /// Mediums fill the rows closest to the player
    FrontHeavy,
    Checkerboard,
    /// Mediums on the outer columns
    SideWeighted,
    /// Center columns hang lowest, Mediums at the tip
    VShape,
    /// Rows narrow toward top and bottom, Mediums in the core
    Diamond,
    /// Jittered grid with randomly placed Mediums
    Scattered,
    /// Every other row is Medium
    RowAlternating,
    /// Mediums on the center columns
    CenterWeighted,
}

impl FormationPattern {
    pub const ALL: [FormationPattern; 8] = [
        FormationPattern::FrontHeavy,
        FormationPattern::Checkerboard,
        FormationPattern::SideWeighted,
        FormationPattern::VShape,
        FormationPattern::Diamond,
        FormationPattern::Scattered,
        FormationPattern::RowAlternating,
        FormationPattern::CenterWeighted,
    ];

    /// Uniform pick among all patterns
    pub fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }
}

/// One grid slot
#[derive(Debug, Clone, Copy)]
struct Slot {
    row: u32,
    col: u32,
    /// Column position after centering a partial last row
    col_f: f32,
}

/// Grid dimensions for `count` slots
#[derive(Debug, Clone, Copy)]
struct Grid {
    rows: u32,
    cols: u32,
}

impl Grid {
    fn new(count: u32, cols: u32) -> Self {
        Self {
            rows: count.div_ceil(cols),
            cols,
        }
    }

    fn slots(&self, count: u32) -> Vec<Slot> {
        (0..count)
            .map(|i| {
                let row = i / self.cols;
                let col = i % self.cols;
                let in_row = (count - row * self.cols).min(self.cols);
                let shift = (self.cols - in_row) as f32 / 2.0;
                Slot {
                    row,
                    col,
                    col_f: col as f32 + shift,
                }
            })
            .collect()
    }

    fn center_col(&self) -> f32 {
        (self.cols - 1) as f32 / 2.0
    }

    fn center_row(&self) -> f32 {
        (self.rows.max(1) - 1) as f32 / 2.0
    }
}

/// Generate the enemies for a level with a randomly chosen pattern
pub fn generate_formation<R: Rng + ?Sized>(
    config: &LevelConfig,
    tuning: &FormationTuning,
    ids: &mut EntityIds,
    rng: &mut R,
) -> Vec<Enemy> {
    let pattern = FormationPattern::pick(rng);
    generate_with_pattern(config, pattern, tuning, ids, rng)
}

/// Generate the enemies for a level with a specific pattern
pub fn generate_with_pattern<R: Rng + ?Sized>(
    config: &LevelConfig,
    pattern: FormationPattern,
    tuning: &FormationTuning,
    ids: &mut EntityIds,
    rng: &mut R,
) -> Vec<Enemy> {
    let total = config.small + config.medium;
    let mut enemies = Vec::with_capacity(config.enemy_count() as usize);

    if total > 0 {
        let grid = Grid::new(total, tuning.columns);
        let slots = grid.slots(total);

        let mut positions = Vec::with_capacity(slots.len());
        let mut ranks = Vec::with_capacity(slots.len());
        for slot in &slots {
            positions.push(slot_position(pattern, slot, &grid, tuning, rng));
            ranks.push(medium_rank(pattern, slot, &grid, rng));
        }

        // Best-ranked slots first; equal ranks keep slot order
        let mut order: Vec<usize> = (0..slots.len()).collect();
        order.sort_by(|&a, &b| ranks[b].total_cmp(&ranks[a]).then(a.cmp(&b)));
        let mut is_medium = vec![false; slots.len()];
        for &idx in order.iter().take(config.medium as usize) {
            is_medium[idx] = true;
        }

        for (pos, medium) in positions.into_iter().zip(is_medium) {
            let kind = if medium { EnemyKind::Medium } else { EnemyKind::Small };
            enemies.push(Enemy::new(ids.next(), kind, pos));
        }
    }

    if config.boss {
        enemies.push(Enemy::new(ids.next(), EnemyKind::Boss, tuning.boss_pos));
    }

    log::debug!(
        "Level {} formation {:?}: {} small, {} medium, boss={}",
        config.level,
        pattern,
        config.small,
        config.medium,
        config.boss
    );

    enemies
}

/// Field position of a slot
fn slot_position<R: Rng + ?Sized>(
    pattern: FormationPattern,
    slot: &Slot,
    grid: &Grid,
    tuning: &FormationTuning,
    rng: &mut R,
) -> Vec2 {
    let left = tuning.margin_x;
    let right = 1.0 - tuning.margin_x;
    let col_step = if grid.cols > 1 {
        (right - left) / (grid.cols - 1) as f32
    } else {
        0.0
    };
    let x = left + slot.col_f * col_step;
    let y = tuning.top_y + slot.row as f32 * tuning.row_spacing;

    let (x, y) = match pattern {
        FormationPattern::VShape => {
            let from_center = (slot.col_f - grid.center_col()).abs();
            (x, y + (grid.center_col() - from_center) * tuning.v_step)
        }
        FormationPattern::Diamond => {
            let width = if grid.rows > 1 {
                1.0 - (slot.row as f32 - grid.center_row()).abs() / grid.rows as f32
            } else {
                1.0
            };
            (0.5 + (x - 0.5) * width, y)
        }
        FormationPattern::Scattered => {
            let jx = (rng.random::<f32>() * 2.0 - 1.0) * tuning.scatter_jitter;
            let jy = (rng.random::<f32>() * 2.0 - 1.0) * tuning.scatter_jitter;
            (x + jx, y + jy)
        }
        _ => (x, y),
    };

    Vec2::new(clamp_to_field(x), clamp_to_field(y))
}

/// Higher rank = more likely to hold a Medium
fn medium_rank<R: Rng + ?Sized>(
    pattern: FormationPattern,
    slot: &Slot,
    grid: &Grid,
    rng: &mut R,
) -> f32 {
    let from_center_col = (slot.col_f - grid.center_col()).abs();
    match pattern {
        FormationPattern::FrontHeavy => slot.row as f32,
        FormationPattern::Checkerboard => ((slot.row + slot.col) % 2) as f32,
        FormationPattern::SideWeighted => from_center_col,
        FormationPattern::VShape | FormationPattern::CenterWeighted => -from_center_col,
        FormationPattern::Diamond => {
            let from_center_row = (slot.row as f32 - grid.center_row()).abs();
            -(from_center_col / grid.cols as f32 + from_center_row / grid.rows.max(1) as f32)
        }
        FormationPattern::Scattered => rng.random::<f32>(),
        FormationPattern::RowAlternating => (slot.row % 2) as f32,
    }
}
