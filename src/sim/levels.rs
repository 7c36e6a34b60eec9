//! Level table
//!
//! Lookups return `Option` so "no next level" is an ordinary outcome
//! (it ends the run with a win) rather than an error.

use serde::{Deserialize, Serialize};

use crate::tuning::TuningError;

/// Enemy content for one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub level: u32,
    pub small: u32,
    pub medium: u32,
    #[serde(default)]
    pub boss: bool,
}

impl LevelConfig {
    pub const fn new(level: u32, small: u32, medium: u32, boss: bool) -> Self {
        Self {
            level,
            small,
            medium,
            boss,
        }
    }

    /// Total enemies the formation will contain
    pub fn enemy_count(&self) -> u32 {
        self.small + self.medium + u32::from(self.boss)
    }
}

/// Non-empty level list with strictly increasing level numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LevelConfig>", into = "Vec<LevelConfig>")]
pub struct LevelTable(Vec<LevelConfig>);

impl LevelTable {
    pub fn new(levels: Vec<LevelConfig>) -> Result<Self, TuningError> {
        if levels.is_empty() {
            return Err(TuningError::NoLevels);
        }
        for pair in levels.windows(2) {
            if pair[1].level <= pair[0].level {
                return Err(TuningError::LevelOrder {
                    level: pair[1].level,
                    previous: pair[0].level,
                });
            }
        }
        Ok(Self(levels))
    }

    /// The level a run starts on
    pub fn first(&self) -> &LevelConfig {
        &self.0[0]
    }

    /// The level after `level`, or `None` when `level` is the last (or unknown)
    pub fn next_after(&self, level: u32) -> Option<&LevelConfig> {
        let idx = self.0.iter().position(|c| c.level == level)?;
        self.0.get(idx + 1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self(vec![
            LevelConfig::new(1, 12, 4, false),
            LevelConfig::new(2, 8, 8, false),
            LevelConfig::new(3, 6, 10, false),
            LevelConfig::new(4, 4, 8, true),
        ])
    }
}

impl TryFrom<Vec<LevelConfig>> for LevelTable {
    type Error = TuningError;

    fn try_from(levels: Vec<LevelConfig>) -> Result<Self, Self::Error> {
        Self::new(levels)
    }
}

impl From<LevelTable> for Vec<LevelConfig> {
    fn from(table: LevelTable) -> Self {
        table.0
    }
}
