//! Quest Template Structures
//!
//! The static description of a quest shared by every character, assembled
//! from the primary `quest_template` row and its side tables.

use serde::Serialize;

use crate::config::WorldConfig;
use crate::data::GameTables;
use crate::locale::LocalizedText;

pub const QUEST_REWARD_ITEM_COUNT: usize = 4;
pub const QUEST_ITEM_DROP_COUNT: usize = 4;
pub const QUEST_REWARD_CHOICES_COUNT: usize = 6;
pub const QUEST_REWARD_REPUTATIONS_COUNT: usize = 5;
pub const QUEST_REWARD_CURRENCY_COUNT: usize = 4;
pub const QUEST_EMOTE_COUNT: usize = 4;
/// Capacity of the condition-gated completion display spell list sent to a client
pub const QUEST_REWARD_DISPLAY_SPELL_COUNT: usize = 3;

pub const QUEST_TYPE_TURN_IN: u8 = 0;

const QUEST_INFO_RAID: u16 = 62;
const QUEST_INFO_RAID_10: u16 = 88;
const QUEST_INFO_RAID_25: u16 = 89;

const QUEST_SORT_SEASONAL: i16 = 22;
const QUEST_SORT_SPECIAL: i16 = 284;
const QUEST_SORT_LUNAR_FESTIVAL: i16 = 366;
const QUEST_SORT_MIDSUMMER: i16 = 369;
const QUEST_SORT_BREWFEST: i16 = 370;
const QUEST_SORT_NOBLEGARDEN: i16 = 374;
const QUEST_SORT_LOVE_IS_IN_THE_AIR: i16 = 376;

const QUEST_INFO_MODIFIER_IMPORTANT: u32 = 0x400;
const QUEST_INFO_MODIFIER_META: u32 = 0x800;

// ============================================================================
// Flags
// ============================================================================

/// Primary quest flag set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestFlags(pub u32);

impl QuestFlags {
    pub const SHARABLE: Self = Self(0x0000_0008);
    pub const RAID_GROUP_OK: Self = Self(0x0000_0040);
    pub const NO_MONEY_FOR_XP: Self = Self(0x0000_0100);
    pub const HIDE_REWARD: Self = Self(0x0000_0200);
    pub const DAILY: Self = Self(0x0000_1000);
    pub const WEEKLY: Self = Self(0x0000_8000);
    pub const AUTO_COMPLETE: Self = Self(0x0001_0000);
    pub const AUTO_ACCEPT: Self = Self(0x0008_0000);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

/// Server-side flags from the addon row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestSpecialFlags(pub u8);

impl QuestSpecialFlags {
    pub const REPEATABLE: Self = Self(0x01);
    pub const AUTO_ACCEPT: Self = Self(0x02);
    pub const DF_QUEST: Self = Self(0x04);
    pub const MONTHLY: Self = Self(0x08);
    pub const CAST: Self = Self(0x10);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

// ============================================================================
// Enums
// ============================================================================

/// How the client presents a reward display spell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[repr(u32)]
pub enum QuestCompleteSpellType {
    #[default]
    LegacyBehavior = 0,
    Follower = 1,
    Tradeskill = 2,
    Ability = 3,
    Aura = 4,
    Spell = 5,
    Unlock = 6,
    Companion = 7,
    QuestlineUnlock = 8,
    QuestlineReward = 9,
    QuestlineUnlockPart = 10,
    PossibleReward = 11,
}

impl QuestCompleteSpellType {
    pub fn from_u32(value: u32) -> Option<Self> {
        use QuestCompleteSpellType::*;
        Some(match value {
            0 => LegacyBehavior,
            1 => Follower,
            2 => Tradeskill,
            3 => Ability,
            4 => Aura,
            5 => Spell,
            6 => Unlock,
            7 => Companion,
            8 => QuestlineUnlock,
            9 => QuestlineReward,
            10 => QuestlineUnlockPart,
            11 => PossibleReward,
            _ => return None,
        })
    }
}

/// What a reward choice slot hands out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum LootItemType {
    #[default]
    Item = 0,
    Currency = 1,
}

impl LootItemType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(LootItemType::Item),
            1 => Some(LootItemType::Currency),
            _ => None,
        }
    }
}

/// Objective kinds understood by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum QuestObjectiveType {
    Monster = 0,
    Item = 1,
    GameObject = 2,
    TalkTo = 3,
    Currency = 4,
    LearnSpell = 5,
    MinReputation = 6,
    MaxReputation = 7,
    Money = 8,
    PlayerKills = 9,
    AreaTrigger = 10,
    WinPetBattleAgainstNpc = 11,
    DefeatBattlePet = 12,
    WinPvpPetBattles = 13,
    CriteriaTree = 14,
    ProgressBar = 15,
    HaveCurrency = 16,
    ObtainCurrency = 17,
    IncreaseReputation = 18,
    AreaTriggerEnter = 19,
    AreaTriggerExit = 20,
    KillWithLabel = 21,
}

impl QuestObjectiveType {
    /// One past the highest known objective type
    pub const MAX: u8 = 22;
}

/// Instance difficulty, as far as raid quest checks care
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    None,
    Normal,
    Heroic,
    Raid10Normal,
    Raid25Normal,
    Raid10Heroic,
    Raid25Heroic,
}

// ============================================================================
// Reward Slots
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuestItemReward {
    pub item_id: u32,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuestChoiceItem {
    pub item_id: u32,
    pub quantity: u32,
    pub display_id: u32,
    pub loot_item_type: LootItemType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuestFactionReward {
    pub faction_id: u32,
    pub value: i32,
    pub override_value: i32,
    pub cap_in: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuestCurrencyReward {
    pub currency_id: u32,
    pub quantity: u32,
}

/// A spell shown on the reward panel, optionally gated by a player condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardDisplaySpell {
    pub spell_id: u32,
    /// 0 when ungated
    pub player_condition_id: u32,
    pub kind: QuestCompleteSpellType,
}

// ============================================================================
// Presentation
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestEmote {
    pub emote_id: u32,
    pub delay: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuestPoi {
    pub continent: u32,
    pub x: f32,
    pub y: f32,
    pub priority: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestPortraits {
    pub giver: u32,
    pub giver_mount: u32,
    pub giver_model_scene_id: i32,
    pub turn_in: u32,
}

/// Default-locale text of the quest log and portraits
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestText {
    pub log_title: String,
    pub log_description: String,
    pub quest_description: String,
    pub area_description: String,
    pub portrait_giver_text: String,
    pub portrait_giver_name: String,
    pub portrait_turn_in_text: String,
    pub portrait_turn_in_name: String,
    pub quest_completion_log: String,
}

/// Text variant selected by (player condition, quest giver creature)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionalText {
    pub player_condition_id: i32,
    pub quest_giver_creature_id: i32,
    pub text: LocalizedText,
}

// ============================================================================
// Behavior (addon row)
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestAddon {
    pub max_level: u8,
    pub allowable_classes: u32,
    pub source_spell_id: u32,
    pub prev_quest_id: i32,
    pub next_quest_id: u32,
    pub exclusive_group: i32,
    pub breadcrumb_for_quest_id: i32,
    pub reward_mail_template_id: u32,
    pub reward_mail_delay: u32,
    pub required_skill_id: u16,
    pub required_skill_points: u16,
    pub required_min_rep_faction: u16,
    pub required_max_rep_faction: u16,
    pub required_min_rep_value: i32,
    pub required_max_rep_value: i32,
    pub source_item_id_count: u8,
    pub special_flags: QuestSpecialFlags,
    pub script_id: u32,
}

// ============================================================================
// Objectives
// ============================================================================

/// Side effects fired when an objective completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompletionEffect {
    pub game_event_id: Option<u32>,
    pub spell_id: Option<u32>,
    pub conversation_id: Option<u32>,
    pub update_phase_shift: bool,
    pub update_zone_auras: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuestObjective {
    pub id: u32,
    pub quest_id: u32,
    pub objective_type: u8,
    pub storage_index: i8,
    pub object_id: i32,
    pub amount: i32,
    pub flags: u32,
    pub flags2: u32,
    pub progress_bar_weight: f32,
    pub description: String,
    pub visual_effects: Vec<i32>,
    pub completion_effect: Option<CompletionEffect>,
}

/// Presence set over raw objective type values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObjectiveTypeSet([u64; 4]);

impl ObjectiveTypeSet {
    pub fn insert(&mut self, objective_type: u8) {
        let index = objective_type as usize;
        self.0[index / 64] |= 1 << (index % 64);
    }

    pub fn contains(&self, objective_type: u8) -> bool {
        let index = objective_type as usize;
        self.0[index / 64] & (1 << (index % 64)) != 0
    }
}

// ============================================================================
// Quest Template
// ============================================================================

/// A fully assembled quest template
#[derive(Debug, Clone, Default)]
pub struct QuestTemplate {
    pub id: u32,
    pub quest_type: u8,
    pub package_id: u32,
    pub content_tuning_id: u32,
    /// Zone id when positive, negated quest sort id otherwise
    pub sort_id: i16,
    pub info_id: u16,
    pub suggested_players: u8,
    pub next_quest_in_chain: u32,
    pub expansion: i32,
    pub managed_world_state_id: i32,
    pub quest_session_bonus: i32,

    pub flags: QuestFlags,
    pub flags_ex: u32,
    pub flags_ex2: u32,
    pub flags_ex3: u32,

    pub xp_difficulty: u32,
    pub xp_multiplier: f32,
    pub money_difficulty: u32,
    pub money_multiplier: f32,
    pub bonus_money: u32,
    pub reward_spell: u32,
    pub reward_honor: u32,
    pub reward_kill_honor: u32,
    pub artifact_xp_difficulty: u32,
    pub artifact_xp_multiplier: f32,
    pub artifact_category_id: u32,
    pub source_item_id: u32,
    pub reward_title_id: u32,
    pub reward_arena_points: u32,
    pub reward_skill_id: u32,
    pub reward_skill_points: u32,
    pub reward_reputation_mask: u32,

    pub reward_items: [QuestItemReward; QUEST_REWARD_ITEM_COUNT],
    pub item_drops: [QuestItemReward; QUEST_ITEM_DROP_COUNT],
    pub reward_choice_items: [QuestChoiceItem; QUEST_REWARD_CHOICES_COUNT],
    pub reward_factions: [QuestFactionReward; QUEST_REWARD_REPUTATIONS_COUNT],
    pub reward_currencies: [QuestCurrencyReward; QUEST_REWARD_CURRENCY_COUNT],
    pub reward_display_spells: Vec<RewardDisplaySpell>,
    pub treasure_picker_ids: Vec<i32>,
    /// Non-zero entries of `reward_items`, counted at construction
    pub reward_items_count: usize,
    /// Non-zero entries of `reward_choice_items`, counted at construction
    pub reward_choice_items_count: usize,

    pub poi: QuestPoi,
    pub portraits: QuestPortraits,
    pub sound_accept: u32,
    pub sound_turn_in: u32,
    pub area_group_id: u32,
    pub limit_time: i64,
    pub allowable_races: u64,
    pub reset_by_scheduler: bool,

    pub text: QuestText,
    pub details_emotes: [QuestEmote; QUEST_EMOTE_COUNT],
    pub offer_reward_emotes: [QuestEmote; QUEST_EMOTE_COUNT],
    pub offer_reward_text: String,
    pub emote_on_complete: QuestEmote,
    pub emote_on_incomplete: QuestEmote,
    pub request_items_text: String,

    pub addon: QuestAddon,
    pub reward_mail_sender_entry: u32,

    pub objectives: Vec<QuestObjective>,
    pub used_objective_types: ObjectiveTypeSet,

    pub conditional_quest_description: Vec<ConditionalText>,
    pub conditional_request_items_text: Vec<ConditionalText>,
    pub conditional_offer_reward_text: Vec<ConditionalText>,
    pub conditional_quest_completion_log: Vec<ConditionalText>,
}

impl QuestTemplate {
    pub fn has_flag(&self, flag: QuestFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn has_special_flag(&self, flag: QuestSpecialFlags) -> bool {
        self.addon.special_flags.contains(flag)
    }

    pub fn has_objective_type(&self, objective_type: QuestObjectiveType) -> bool {
        self.used_objective_types.contains(objective_type as u8)
    }

    /// Get objective by ID
    pub fn get_objective(&self, objective_id: u32) -> Option<&QuestObjective> {
        self.objectives.iter().find(|o| o.id == objective_id)
    }

    pub fn is_daily(&self) -> bool {
        self.has_flag(QuestFlags::DAILY)
    }

    pub fn is_weekly(&self) -> bool {
        self.has_flag(QuestFlags::WEEKLY)
    }

    pub fn is_monthly(&self) -> bool {
        self.has_special_flag(QuestSpecialFlags::MONTHLY)
    }

    pub fn is_repeatable(&self) -> bool {
        self.has_special_flag(QuestSpecialFlags::REPEATABLE)
    }

    pub fn is_df_quest(&self) -> bool {
        self.has_special_flag(QuestSpecialFlags::DF_QUEST)
    }

    pub fn is_seasonal(&self) -> bool {
        let seasonal_sort = [
            QUEST_SORT_SEASONAL,
            QUEST_SORT_SPECIAL,
            QUEST_SORT_LUNAR_FESTIVAL,
            QUEST_SORT_MIDSUMMER,
            QUEST_SORT_BREWFEST,
            QUEST_SORT_LOVE_IS_IN_THE_AIR,
            QUEST_SORT_NOBLEGARDEN,
        ]
        .iter()
        .any(|&sort| self.sort_id == -sort);

        seasonal_sort && !self.is_repeatable()
    }

    pub fn is_auto_accept(&self, config: &WorldConfig) -> bool {
        !config.quest_ignore_auto_accept && self.has_flag(QuestFlags::AUTO_ACCEPT)
    }

    pub fn is_turn_in(&self, config: &WorldConfig) -> bool {
        !config.quest_ignore_auto_complete && self.quest_type == QUEST_TYPE_TURN_IN
    }

    pub fn is_raid_quest(&self, difficulty: Difficulty) -> bool {
        match self.info_id {
            QUEST_INFO_RAID => return true,
            QUEST_INFO_RAID_10 => {
                return matches!(difficulty, Difficulty::Raid10Normal | Difficulty::Raid10Heroic);
            }
            QUEST_INFO_RAID_25 => {
                return matches!(difficulty, Difficulty::Raid25Normal | Difficulty::Raid25Heroic);
            }
            _ => {}
        }

        self.has_flag(QuestFlags::RAID_GROUP_OK)
    }

    pub fn is_allowed_in_raid(&self, difficulty: Difficulty, config: &WorldConfig) -> bool {
        self.is_raid_quest(difficulty) || config.quest_ignore_raid
    }

    /// Dungeon finder, daily and plain repeatable quests are never recorded as rewarded
    pub fn can_increase_rewarded_quest_counters(&self) -> bool {
        !self.is_df_quest()
            && !self.is_daily()
            && (!self.is_repeatable() || self.is_weekly() || self.is_monthly() || self.is_seasonal())
    }

    /// Quest info type, if the quest info entry exists
    pub fn quest_tag(&self, tables: &GameTables) -> Option<i8> {
        tables.quest_info(self.info_id as u32).map(|info| info.info_type)
    }

    pub fn is_important(&self, tables: &GameTables) -> bool {
        tables
            .quest_info(self.info_id as u32)
            .is_some_and(|info| info.modifiers & QUEST_INFO_MODIFIER_IMPORTANT != 0)
    }

    pub fn is_meta(&self, tables: &GameTables) -> bool {
        tables
            .quest_info(self.info_id as u32)
            .is_some_and(|info| info.modifiers & QUEST_INFO_MODIFIER_META != 0)
    }

    /// Whether the quest may currently be offered at all
    pub fn is_taking_quest_enabled(quest_id: u32, tables: &GameTables) -> bool {
        tables.is_quest_active(quest_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::QuestInfoEntry;

    #[test]
    fn test_objective_type_set() {
        let mut set = ObjectiveTypeSet::default();
        set.insert(QuestObjectiveType::Item as u8);
        set.insert(200);

        assert!(set.contains(1));
        assert!(set.contains(200));
        assert!(!set.contains(0));
        assert!(!set.contains(201));
    }

    #[test]
    fn test_complete_spell_type_range() {
        assert_eq!(QuestCompleteSpellType::from_u32(5), Some(QuestCompleteSpellType::Spell));
        assert_eq!(
            QuestCompleteSpellType::from_u32(11),
            Some(QuestCompleteSpellType::PossibleReward)
        );
        assert_eq!(QuestCompleteSpellType::from_u32(12), None);
    }

    #[test]
    fn test_repeatable_classification() {
        let mut quest = QuestTemplate {
            addon: QuestAddon {
                special_flags: QuestSpecialFlags::REPEATABLE,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(quest.is_repeatable());
        assert!(!quest.can_increase_rewarded_quest_counters());

        quest.flags.insert(QuestFlags::WEEKLY);
        assert!(quest.can_increase_rewarded_quest_counters());

        quest.flags.insert(QuestFlags::DAILY);
        assert!(!quest.can_increase_rewarded_quest_counters());
    }

    #[test]
    fn test_seasonal_requires_holiday_sort() {
        let mut quest = QuestTemplate {
            sort_id: -QUEST_SORT_BREWFEST,
            ..Default::default()
        };
        assert!(quest.is_seasonal());

        quest.sort_id = 12;
        assert!(!quest.is_seasonal());
    }

    #[test]
    fn test_config_gated_predicates() {
        let mut config = WorldConfig::default();
        let quest = QuestTemplate {
            quest_type: QUEST_TYPE_TURN_IN,
            flags: QuestFlags::AUTO_ACCEPT,
            ..Default::default()
        };

        assert!(quest.is_auto_accept(&config));
        assert!(quest.is_turn_in(&config));

        config.quest_ignore_auto_accept = true;
        config.quest_ignore_auto_complete = true;
        assert!(!quest.is_auto_accept(&config));
        assert!(!quest.is_turn_in(&config));
    }

    #[test]
    fn test_raid_quests() {
        let mut config = WorldConfig::default();
        let raid_10 = QuestTemplate {
            info_id: QUEST_INFO_RAID_10,
            ..Default::default()
        };
        assert!(raid_10.is_raid_quest(Difficulty::Raid10Heroic));
        assert!(!raid_10.is_raid_quest(Difficulty::Raid25Normal));
        assert!(!raid_10.is_allowed_in_raid(Difficulty::Raid25Normal, &config));

        config.quest_ignore_raid = true;
        assert!(raid_10.is_allowed_in_raid(Difficulty::Raid25Normal, &config));

        let group_ok = QuestTemplate {
            flags: QuestFlags::RAID_GROUP_OK,
            ..Default::default()
        };
        assert!(group_ok.is_raid_quest(Difficulty::Normal));
    }

    #[test]
    fn test_quest_info_lookups() {
        let mut tables = GameTables::new();
        tables.add_quest_info(QuestInfoEntry {
            id: 7,
            info_type: 41,
            modifiers: QUEST_INFO_MODIFIER_META,
        });

        let quest = QuestTemplate {
            info_id: 7,
            ..Default::default()
        };
        assert_eq!(quest.quest_tag(&tables), Some(41));
        assert!(quest.is_meta(&tables));
        assert!(!quest.is_important(&tables));

        let unknown = QuestTemplate {
            info_id: 8,
            ..Default::default()
        };
        assert_eq!(unknown.quest_tag(&tables), None);
        assert!(!unknown.is_meta(&tables));
    }

    #[test]
    fn test_pool_gate() {
        let mut tables = GameTables::new();
        tables.deactivate_pool_quest(40);
        assert!(!QuestTemplate::is_taking_quest_enabled(40, &tables));
        assert!(QuestTemplate::is_taking_quest_enabled(41, &tables));
    }
}
