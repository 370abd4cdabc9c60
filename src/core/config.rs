//! Engine configuration and difficulty levels
//!
//! Difficulty is a closed set of variants, each carrying a small immutable
//! profile. A weaker level mutates the genome more aggressively, which makes
//! the player play worse over time - intentionally.

use serde::{Deserialize, Serialize};

use crate::core::error::Result;
use crate::core::types::{GameTime, MINUTE};

/// Closed set of computer-player difficulty levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    VeryWeak,
    Weak,
    #[default]
    Normal,
}

/// Immutable per-level tuning, derived from the difficulty level
#[derive(Debug, Clone, Copy)]
pub struct DifficultyProfile {
    /// Divides the mutation-probability denominator; higher = more mutation
    pub mutation_boost: u32,
    /// Added to attack score thresholds; higher = more hesitant
    pub attack_reluctance: i32,
    /// Upper bound for a single naval expedition
    pub expedition_max_duration: GameTime,
}

impl DifficultyLevel {
    pub fn profile(self) -> DifficultyProfile {
        match self {
            DifficultyLevel::VeryWeak => DifficultyProfile {
                mutation_boost: 4,
                attack_reluctance: 12,
                expedition_max_duration: 40 * MINUTE,
            },
            DifficultyLevel::Weak => DifficultyProfile {
                mutation_boost: 2,
                attack_reluctance: 6,
                expedition_max_duration: 60 * MINUTE,
            },
            DifficultyLevel::Normal => DifficultyProfile {
                mutation_boost: 1,
                attack_reluctance: 0,
                expedition_max_duration: 90 * MINUTE,
            },
        }
    }
}

/// Complete engine configuration
///
/// Hosts usually construct this directly; the TOML loader exists for
/// training-session harnesses that sweep configurations from files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    /// Difficulty level of this computer player
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    /// Training sessions enable periodic genome mutation and the wildcard
    /// intensifier that keeps a population diverse
    #[serde(default)]
    pub training_mode: bool,
    /// Chance denominator for the wildcard intensifier (1 in N mutation
    /// passes runs intensified); only meaningful in training mode
    #[serde(default = "default_wildcard_chance")]
    pub wildcard_chance: u32,
}

fn default_wildcard_chance() -> u32 {
    8
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            difficulty: DifficultyLevel::Normal,
            training_mode: false,
            wildcard_chance: default_wildcard_chance(),
        }
    }
}

impl AiConfig {
    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AiConfig = toml::from_str(text)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.wildcard_chance == 0 {
            return Err("wildcard_chance must be at least 1".into());
        }
        Ok(())
    }
}
