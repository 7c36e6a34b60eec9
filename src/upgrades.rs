//! Upgrade tables and the boost parameter provider
//!
//! The simulation never stores upgrades itself. It reads boost strengths
//! through `BoostParams`, implemented by a validated `Loadout`. The wallet
//! holds the purchase rules; saving it is up to whoever owns it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tuning::TuningError;

/// Boost strengths for the current upgrade levels
pub trait BoostParams {
    fn shield_duration_ms(&self) -> u32;
    fn nuclear_shots(&self) -> u32;
    fn lightning_duration_ms(&self) -> u32;
    fn slow_time_duration_ms(&self) -> u32;
}

/// Upgradable boost lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeKind {
    Shield,
    Nuclear,
    Lightning,
    SlowTime,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 4] = [
        UpgradeKind::Shield,
        UpgradeKind::Nuclear,
        UpgradeKind::Lightning,
        UpgradeKind::SlowTime,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UpgradeKind::Shield => "shield",
            UpgradeKind::Nuclear => "nuclear",
            UpgradeKind::Lightning => "lightning",
            UpgradeKind::SlowTime => "slow_time",
        }
    }
}

/// Per-level values; index 0 is upgrade level 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeTable {
    pub shield_durations_ms: Vec<u32>,
    pub nuclear_shots: Vec<u32>,
    pub lightning_durations_ms: Vec<u32>,
    pub slow_time_durations_ms: Vec<u32>,
    pub base_cost: u32,
}

impl Default for UpgradeTable {
    fn default() -> Self {
        Self {
            shield_durations_ms: vec![5_000, 7_000, 9_000],
            nuclear_shots: vec![2, 3, 5],
            lightning_durations_ms: vec![6_000, 8_000, 10_000],
            slow_time_durations_ms: vec![5_000, 7_000, 9_000],
            base_cost: 120,
        }
    }
}

impl UpgradeTable {
    fn values(&self, kind: UpgradeKind) -> &[u32] {
        match kind {
            UpgradeKind::Shield => &self.shield_durations_ms,
            UpgradeKind::Nuclear => &self.nuclear_shots,
            UpgradeKind::Lightning => &self.lightning_durations_ms,
            UpgradeKind::SlowTime => &self.slow_time_durations_ms,
        }
    }

    /// Highest purchasable level for a line
    pub fn max_level(&self, kind: UpgradeKind) -> u32 {
        self.values(kind).len() as u32
    }

    /// Price of going from `current_level` to the next one
    pub fn upgrade_cost(&self, current_level: u32) -> u32 {
        self.base_cost.saturating_mul(current_level)
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        for kind in UpgradeKind::ALL {
            let values = self.values(kind);
            if values.is_empty() {
                return Err(TuningError::EmptyUpgradeTable(kind.name()));
            }
            if let Some(&bad) = values.iter().find(|&&v| v == 0) {
                return Err(TuningError::NonPositive {
                    field: kind.name(),
                    value: bad as f32,
                });
            }
        }
        Ok(())
    }
}

/// Current level per line, 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeLevels {
    pub shield: u32,
    pub nuclear: u32,
    pub lightning: u32,
    pub slow_time: u32,
}

impl Default for UpgradeLevels {
    fn default() -> Self {
        Self {
            shield: 1,
            nuclear: 1,
            lightning: 1,
            slow_time: 1,
        }
    }
}

impl UpgradeLevels {
    pub fn get(&self, kind: UpgradeKind) -> u32 {
        match kind {
            UpgradeKind::Shield => self.shield,
            UpgradeKind::Nuclear => self.nuclear,
            UpgradeKind::Lightning => self.lightning,
            UpgradeKind::SlowTime => self.slow_time,
        }
    }

    fn get_mut(&mut self, kind: UpgradeKind) -> &mut u32 {
        match kind {
            UpgradeKind::Shield => &mut self.shield,
            UpgradeKind::Nuclear => &mut self.nuclear,
            UpgradeKind::Lightning => &mut self.lightning,
            UpgradeKind::SlowTime => &mut self.slow_time,
        }
    }
}

/// Table plus levels, checked so every lookup lands inside the table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Loadout {
    table: UpgradeTable,
    levels: UpgradeLevels,
}

impl Loadout {
    pub fn new(table: UpgradeTable, levels: UpgradeLevels) -> Result<Self, TuningError> {
        table.validate()?;
        for kind in UpgradeKind::ALL {
            let level = levels.get(kind);
            let max = table.max_level(kind);
            if level == 0 || level > max {
                return Err(TuningError::UpgradeLevelOutOfRange {
                    table: kind.name(),
                    level,
                    max,
                });
            }
        }
        Ok(Self { table, levels })
    }

    pub fn table(&self) -> &UpgradeTable {
        &self.table
    }

    pub fn levels(&self) -> UpgradeLevels {
        self.levels
    }

    fn value(&self, kind: UpgradeKind) -> u32 {
        // In range: checked in `new`
        self.table.values(kind)[(self.levels.get(kind) - 1) as usize]
    }
}

impl BoostParams for Loadout {
    fn shield_duration_ms(&self) -> u32 {
        self.value(UpgradeKind::Shield)
    }

    fn nuclear_shots(&self) -> u32 {
        self.value(UpgradeKind::Nuclear)
    }

    fn lightning_duration_ms(&self) -> u32 {
        self.value(UpgradeKind::Lightning)
    }

    fn slow_time_duration_ms(&self) -> u32 {
        self.value(UpgradeKind::SlowTime)
    }
}

/// Why a purchase didn't go through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UpgradeRefused {
    #[error("already at max level {0}")]
    MaxLevel(u32),
    #[error("upgrade costs {cost} coins, only {coins} available")]
    InsufficientCoins { cost: u32, coins: u32 },
}

/// Coins and purchased levels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeWallet {
    pub coins: u32,
    pub levels: UpgradeLevels,
}

impl Default for UpgradeWallet {
    fn default() -> Self {
        Self {
            coins: 320,
            levels: UpgradeLevels::default(),
        }
    }
}

impl UpgradeWallet {
    /// Buy the next level of `kind`, returning the price paid
    pub fn try_upgrade(
        &mut self,
        kind: UpgradeKind,
        table: &UpgradeTable,
    ) -> Result<u32, UpgradeRefused> {
        let level = self.levels.get(kind);
        let max = table.max_level(kind);
        if level >= max {
            return Err(UpgradeRefused::MaxLevel(max));
        }
        let cost = table.upgrade_cost(level);
        if self.coins < cost {
            return Err(UpgradeRefused::InsufficientCoins {
                cost,
                coins: self.coins,
            });
        }
        self.coins -= cost;
        *self.levels.get_mut(kind) += 1;
        log::debug!("Upgraded {} to level {} for {} coins", kind.name(), level + 1, cost);
        Ok(cost)
    }

    pub fn add_coins(&mut self, amount: u32) {
        self.coins = self.coins.saturating_add(amount);
    }

    /// Build a loadout from the purchased levels
    pub fn loadout(&self, table: &UpgradeTable) -> Result<Loadout, TuningError> {
        Loadout::new(table.clone(), self.levels)
    }
}

/// Coins earned at the end of a run
pub fn coins_for_score(score: u64) -> u32 {
    (score as f64 / 10.0).round() as u32
}
