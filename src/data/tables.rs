//! Game Tables
//!
//! In-memory catalogs the quest loader and reward engine consult: spell,
//! emote and player-condition ids, the level-indexed XP and money reward
//! tables, content tuning bands, quest info, script names, quest pool state
//! and the quest text locale overrides.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use super::quest_locale::{QuestObjectivesLocale, QuestTemplateLocale};
use crate::error::{QuestError, QuestResult};

/// Number of difficulty tiers in the XP and money reward tables
pub const QUEST_DIFFICULTY_COUNT: usize = 10;

/// Newest expansion the server runs
pub const CURRENT_EXPANSION: i32 = 10;

/// Level cap of an expansion
pub fn max_level_for_expansion(expansion: i32) -> u32 {
    match expansion {
        0..=2 => 30,
        3 | 4 => 35,
        5 => 40,
        6 => 45,
        7 => 50,
        8 => 60,
        9 => 70,
        10 => 80,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QuestXpEntry {
    pub level: u32,
    pub difficulty: [u32; QUEST_DIFFICULTY_COUNT],
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QuestMoneyRewardEntry {
    pub level: u32,
    pub difficulty: [u32; QUEST_DIFFICULTY_COUNT],
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ContentTuningEntry {
    pub id: u32,
    #[serde(default)]
    pub min_level: u32,
    #[serde(default)]
    pub max_level: u32,
    #[serde(default = "default_multiplier")]
    pub quest_xp_multiplier: f32,
}

fn default_multiplier() -> f32 {
    1.0
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct QuestInfoEntry {
    pub id: u32,
    #[serde(rename = "type", default)]
    pub info_type: i8,
    #[serde(default)]
    pub modifiers: u32,
}

// ============================================================================
// Raw TOML Structures
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawGameTables {
    pub spells: Vec<u32>,
    pub emotes: Vec<u32>,
    pub player_conditions: Vec<u32>,
    /// Player condition ids that only exist as server-side condition registrations
    pub condition_registrations: Vec<u32>,
    /// Quests whose pool is currently inactive
    pub inactive_pool_quests: Vec<u32>,
    pub quest_xp: Vec<QuestXpEntry>,
    pub quest_money_reward: Vec<QuestMoneyRewardEntry>,
    pub content_tuning: Vec<ContentTuningEntry>,
    pub quest_info: Vec<QuestInfoEntry>,
    pub script_names: BTreeMap<String, u32>,
    pub quest_template_locale: Vec<QuestTemplateLocale>,
    pub quest_objectives_locale: Vec<QuestObjectivesLocale>,
}

// ============================================================================
// Resolved Tables
// ============================================================================

#[derive(Debug, Default)]
pub struct GameTables {
    spells: HashSet<u32>,
    emotes: HashSet<u32>,
    player_conditions: HashSet<u32>,
    condition_registrations: HashSet<u32>,
    inactive_pool_quests: HashSet<u32>,
    quest_xp: HashMap<u32, QuestXpEntry>,
    quest_money_reward: HashMap<u32, QuestMoneyRewardEntry>,
    content_tuning: HashMap<u32, ContentTuningEntry>,
    quest_info: HashMap<u32, QuestInfoEntry>,
    script_names: HashMap<String, u32>,
    quest_locales: HashMap<u32, QuestTemplateLocale>,
    objective_locales: HashMap<u32, QuestObjectivesLocale>,
}

impl GameTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_raw(raw: RawGameTables) -> Self {
        let mut tables = Self::new();
        tables.spells.extend(raw.spells);
        tables.emotes.extend(raw.emotes);
        tables.player_conditions.extend(raw.player_conditions);
        tables.condition_registrations.extend(raw.condition_registrations);
        tables.inactive_pool_quests.extend(raw.inactive_pool_quests);
        for entry in raw.quest_xp {
            tables.add_quest_xp(entry);
        }
        for entry in raw.quest_money_reward {
            tables.add_quest_money_reward(entry);
        }
        for entry in raw.content_tuning {
            tables.add_content_tuning(entry);
        }
        for entry in raw.quest_info {
            tables.quest_info.insert(entry.id, entry);
        }
        tables.script_names.extend(raw.script_names);
        for locale in raw.quest_template_locale {
            tables.add_quest_locale(locale);
        }
        for locale in raw.quest_objectives_locale {
            tables.add_objective_locale(locale);
        }
        tables
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        let raw: RawGameTables = toml::from_str(content)?;
        Ok(Self::from_raw(raw))
    }

    /// Load tables from a TOML file; a missing file yields empty tables
    pub fn load_from_file(path: &Path) -> QuestResult<Self> {
        if !path.exists() {
            warn!("Game tables file does not exist: {:?}", path);
            return Ok(Self::new());
        }

        let content = std::fs::read_to_string(path).map_err(|source| QuestError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let tables = Self::from_toml_str(&content).map_err(|source| QuestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        info!(
            "Loaded game tables: {} spells, {} emotes, {} XP levels, {} money levels, {} content tunings",
            tables.spells.len(),
            tables.emotes.len(),
            tables.quest_xp.len(),
            tables.quest_money_reward.len(),
            tables.content_tuning.len()
        );
        Ok(tables)
    }

    // ------------------------------------------------------------------------
    // Builders
    // ------------------------------------------------------------------------

    pub fn add_spell(&mut self, spell_id: u32) -> &mut Self {
        self.spells.insert(spell_id);
        self
    }

    pub fn add_emote(&mut self, emote_id: u32) -> &mut Self {
        self.emotes.insert(emote_id);
        self
    }

    pub fn add_player_condition(&mut self, condition_id: u32) -> &mut Self {
        self.player_conditions.insert(condition_id);
        self
    }

    pub fn add_condition_registration(&mut self, condition_id: u32) -> &mut Self {
        self.condition_registrations.insert(condition_id);
        self
    }

    pub fn deactivate_pool_quest(&mut self, quest_id: u32) -> &mut Self {
        self.inactive_pool_quests.insert(quest_id);
        self
    }

    pub fn add_quest_xp(&mut self, entry: QuestXpEntry) -> &mut Self {
        self.quest_xp.insert(entry.level, entry);
        self
    }

    pub fn add_quest_money_reward(&mut self, entry: QuestMoneyRewardEntry) -> &mut Self {
        self.quest_money_reward.insert(entry.level, entry);
        self
    }

    pub fn add_content_tuning(&mut self, entry: ContentTuningEntry) -> &mut Self {
        self.content_tuning.insert(entry.id, entry);
        self
    }

    pub fn add_quest_info(&mut self, entry: QuestInfoEntry) -> &mut Self {
        self.quest_info.insert(entry.id, entry);
        self
    }

    pub fn add_script_name(&mut self, name: &str, script_id: u32) -> &mut Self {
        self.script_names.insert(name.to_string(), script_id);
        self
    }

    pub fn add_quest_locale(&mut self, locale: QuestTemplateLocale) -> &mut Self {
        self.quest_locales.insert(locale.quest_id, locale);
        self
    }

    pub fn add_objective_locale(&mut self, locale: QuestObjectivesLocale) -> &mut Self {
        self.objective_locales.insert(locale.objective_id, locale);
        self
    }

    // ------------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------------

    pub fn has_spell(&self, spell_id: u32) -> bool {
        self.spells.contains(&spell_id)
    }

    pub fn has_emote(&self, emote_id: u32) -> bool {
        self.emotes.contains(&emote_id)
    }

    pub fn has_player_condition(&self, condition_id: u32) -> bool {
        self.player_conditions.contains(&condition_id)
    }

    /// Whether server-side conditions are registered under this player condition id
    pub fn has_condition_registration(&self, condition_id: u32) -> bool {
        self.condition_registrations.contains(&condition_id)
    }

    pub fn is_quest_active(&self, quest_id: u32) -> bool {
        !self.inactive_pool_quests.contains(&quest_id)
    }

    pub fn quest_xp(&self, level: u32) -> Option<&QuestXpEntry> {
        self.quest_xp.get(&level)
    }

    pub fn quest_money_reward(&self, level: u32) -> Option<&QuestMoneyRewardEntry> {
        self.quest_money_reward.get(&level)
    }

    pub fn content_tuning(&self, content_tuning_id: u32) -> Option<&ContentTuningEntry> {
        self.content_tuning.get(&content_tuning_id)
    }

    pub fn quest_info(&self, quest_info_id: u32) -> Option<&QuestInfoEntry> {
        self.quest_info.get(&quest_info_id)
    }

    /// Script id for a script name; the empty name and unknown names map to 0
    pub fn script_id(&self, name: &str) -> u32 {
        if name.is_empty() {
            return 0;
        }
        self.script_names.get(name).copied().unwrap_or(0)
    }

    pub fn quest_locale(&self, quest_id: u32) -> Option<&QuestTemplateLocale> {
        self.quest_locales.get(&quest_id)
    }

    pub fn objective_locale(&self, objective_id: u32) -> Option<&QuestObjectivesLocale> {
        self.objective_locales.get(&objective_id)
    }
}
