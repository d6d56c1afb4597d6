//! World Configuration
//!
//! Rates and toggles consulted by quest loading, reward computation and
//! snapshot building. Loaded once from TOML and passed around explicitly.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{QuestError, QuestResult};

/// Server-wide quest settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Load non-default locale text and pre-build snapshots for every locale
    pub load_locales: bool,
    pub rate_xp_quest: f32,
    pub rate_money_quest: f32,
    pub rate_money_max_level_quest: f32,
    /// Percentage of the unscaled XP reward a character always receives (0 = off)
    pub min_quest_scaled_xp_ratio: u32,
    pub quest_ignore_auto_accept: bool,
    pub quest_ignore_auto_complete: bool,
    pub quest_ignore_raid: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            load_locales: true,
            rate_xp_quest: 1.0,
            rate_money_quest: 1.0,
            rate_money_max_level_quest: 1.0,
            min_quest_scaled_xp_ratio: 0,
            quest_ignore_auto_accept: false,
            quest_ignore_auto_complete: false,
            quest_ignore_raid: false,
        }
    }
}

impl WorldConfig {
    /// Load the config file, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> QuestResult<Self> {
        if !path.exists() {
            warn!("Config file {:?} does not exist, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| QuestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_toml_str(&content).map_err(|source| QuestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded world config from {:?}", path);
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
