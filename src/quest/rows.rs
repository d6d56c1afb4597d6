//! Quest Data Rows
//!
//! One struct per source table, bound to the row's columns by name. Rows
//! arrive as TOML tables; binding happens once per row when the catalog is
//! built, so a column typo or a value that does not fit its column width is
//! caught at load time.

use serde::de::{DeserializeOwned, Error as _};
use serde::Deserialize;

use crate::error::{QuestError, QuestResult};

pub const QUEST_TEMPLATE: &str = "quest_template";
pub const QUEST_REWARD_DISPLAY_SPELL: &str = "quest_reward_display_spell";
pub const QUEST_REWARD_CHOICE_ITEMS: &str = "quest_reward_choice_items";
pub const QUEST_DETAILS: &str = "quest_details";
pub const QUEST_REQUEST_ITEMS: &str = "quest_request_items";
pub const QUEST_OFFER_REWARD: &str = "quest_offer_reward";
pub const QUEST_TEMPLATE_ADDON: &str = "quest_template_addon";
pub const QUEST_MAIL_SENDER: &str = "quest_mail_sender";
pub const QUEST_OBJECTIVES: &str = "quest_objectives";
pub const QUEST_VISUAL_EFFECT: &str = "quest_visual_effect";
pub const QUEST_DESCRIPTION_CONDITIONAL: &str = "quest_description_conditional";
pub const QUEST_REQUEST_ITEMS_CONDITIONAL: &str = "quest_request_items_conditional";
pub const QUEST_OFFER_REWARD_CONDITIONAL: &str = "quest_offer_reward_conditional";
pub const QUEST_COMPLETION_LOG_CONDITIONAL: &str = "quest_completion_log_conditional";
pub const QUEST_TREASURE_PICKERS: &str = "quest_treasure_pickers";

/// A row keyed by the quest it belongs to
pub trait QuestRow: DeserializeOwned {
    /// Column carrying the quest id
    const KEY_COLUMN: &'static str = "quest_id";

    fn quest_id(&self) -> u32;
}

/// Bind one raw row to its typed shape
pub fn parse_row<T: QuestRow>(table: &'static str, row: toml::Table) -> QuestResult<T> {
    let quest_id = row
        .get(T::KEY_COLUMN)
        .and_then(|v| v.as_integer())
        .and_then(|id| u32::try_from(id).ok());

    if !row.contains_key(T::KEY_COLUMN) {
        return Err(QuestError::MalformedRow {
            table,
            quest_id,
            source: toml::de::Error::missing_field(T::KEY_COLUMN),
        });
    }

    T::deserialize(toml::Value::Table(row)).map_err(|source| QuestError::MalformedRow {
        table,
        quest_id,
        source,
    })
}

// ============================================================================
// Row Set
// ============================================================================

/// All quest rows of one data load, grouped by source table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuestRowSet {
    pub quest_template: Vec<toml::Table>,
    pub quest_reward_display_spell: Vec<toml::Table>,
    pub quest_reward_choice_items: Vec<toml::Table>,
    pub quest_details: Vec<toml::Table>,
    pub quest_request_items: Vec<toml::Table>,
    pub quest_offer_reward: Vec<toml::Table>,
    pub quest_template_addon: Vec<toml::Table>,
    pub quest_mail_sender: Vec<toml::Table>,
    pub quest_objectives: Vec<toml::Table>,
    pub quest_visual_effect: Vec<toml::Table>,
    pub quest_description_conditional: Vec<toml::Table>,
    pub quest_request_items_conditional: Vec<toml::Table>,
    pub quest_offer_reward_conditional: Vec<toml::Table>,
    pub quest_completion_log_conditional: Vec<toml::Table>,
    pub quest_treasure_pickers: Vec<toml::Table>,
}

impl QuestRowSet {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Append another file's rows, preserving order
    pub fn merge(&mut self, other: QuestRowSet) {
        self.quest_template.extend(other.quest_template);
        self.quest_reward_display_spell.extend(other.quest_reward_display_spell);
        self.quest_reward_choice_items.extend(other.quest_reward_choice_items);
        self.quest_details.extend(other.quest_details);
        self.quest_request_items.extend(other.quest_request_items);
        self.quest_offer_reward.extend(other.quest_offer_reward);
        self.quest_template_addon.extend(other.quest_template_addon);
        self.quest_mail_sender.extend(other.quest_mail_sender);
        self.quest_objectives.extend(other.quest_objectives);
        self.quest_visual_effect.extend(other.quest_visual_effect);
        self.quest_description_conditional.extend(other.quest_description_conditional);
        self.quest_request_items_conditional.extend(other.quest_request_items_conditional);
        self.quest_offer_reward_conditional.extend(other.quest_offer_reward_conditional);
        self.quest_completion_log_conditional.extend(other.quest_completion_log_conditional);
        self.quest_treasure_pickers.extend(other.quest_treasure_pickers);
    }
}

// ============================================================================
// quest_template
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawQuestTemplate {
    pub id: u32,
    pub quest_type: u8,
    pub quest_package_id: u32,
    pub content_tuning_id: i32,
    pub quest_sort_id: i16,
    pub quest_info_id: u16,
    pub suggested_group_num: u8,
    pub reward_next_quest: u32,
    pub reward_xp_difficulty: u32,
    pub reward_xp_multiplier: f32,
    pub reward_money_difficulty: u32,
    pub reward_money_multiplier: f32,
    pub reward_bonus_money: u32,
    pub reward_spell: u32,
    pub reward_honor: u32,
    pub reward_kill_honor: u32,
    pub start_item: u32,
    pub reward_artifact_xp_difficulty: u32,
    pub reward_artifact_xp_multiplier: f32,
    pub reward_artifact_category_id: u32,
    pub flags: u32,
    pub flags_ex: u32,
    pub flags_ex2: u32,
    pub flags_ex3: u32,

    pub reward_item_1: u32,
    pub reward_amount_1: u32,
    pub item_drop_1: u32,
    pub item_drop_quantity_1: u32,
    pub reward_item_2: u32,
    pub reward_amount_2: u32,
    pub item_drop_2: u32,
    pub item_drop_quantity_2: u32,
    pub reward_item_3: u32,
    pub reward_amount_3: u32,
    pub item_drop_3: u32,
    pub item_drop_quantity_3: u32,
    pub reward_item_4: u32,
    pub reward_amount_4: u32,
    pub item_drop_4: u32,
    pub item_drop_quantity_4: u32,

    pub reward_choice_item_id_1: u32,
    pub reward_choice_item_quantity_1: u32,
    pub reward_choice_item_display_id_1: u32,
    pub reward_choice_item_id_2: u32,
    pub reward_choice_item_quantity_2: u32,
    pub reward_choice_item_display_id_2: u32,
    pub reward_choice_item_id_3: u32,
    pub reward_choice_item_quantity_3: u32,
    pub reward_choice_item_display_id_3: u32,
    pub reward_choice_item_id_4: u32,
    pub reward_choice_item_quantity_4: u32,
    pub reward_choice_item_display_id_4: u32,
    pub reward_choice_item_id_5: u32,
    pub reward_choice_item_quantity_5: u32,
    pub reward_choice_item_display_id_5: u32,
    pub reward_choice_item_id_6: u32,
    pub reward_choice_item_quantity_6: u32,
    pub reward_choice_item_display_id_6: u32,

    pub poi_continent: u32,
    pub poi_x: f32,
    pub poi_y: f32,
    pub poi_priority: u32,
    pub reward_title: u32,
    pub reward_arena_points: u32,
    pub reward_skill_line_id: u32,
    pub reward_num_skill_ups: u32,
    pub portrait_giver: u32,
    pub portrait_giver_mount: u32,
    pub portrait_giver_model_scene_id: i32,
    pub portrait_turn_in: u32,

    pub reward_faction_id_1: u32,
    pub reward_faction_value_1: i32,
    pub reward_faction_override_1: i32,
    pub reward_faction_cap_in_1: i32,
    pub reward_faction_id_2: u32,
    pub reward_faction_value_2: i32,
    pub reward_faction_override_2: i32,
    pub reward_faction_cap_in_2: i32,
    pub reward_faction_id_3: u32,
    pub reward_faction_value_3: i32,
    pub reward_faction_override_3: i32,
    pub reward_faction_cap_in_3: i32,
    pub reward_faction_id_4: u32,
    pub reward_faction_value_4: i32,
    pub reward_faction_override_4: i32,
    pub reward_faction_cap_in_4: i32,
    pub reward_faction_id_5: u32,
    pub reward_faction_value_5: i32,
    pub reward_faction_override_5: i32,
    pub reward_faction_cap_in_5: i32,
    pub reward_faction_flags: u32,

    pub reward_currency_id_1: u32,
    pub reward_currency_qty_1: u32,
    pub reward_currency_id_2: u32,
    pub reward_currency_qty_2: u32,
    pub reward_currency_id_3: u32,
    pub reward_currency_qty_3: u32,
    pub reward_currency_id_4: u32,
    pub reward_currency_qty_4: u32,

    pub accepted_sound_kit_id: u32,
    pub complete_sound_kit_id: u32,
    pub area_group_id: u32,
    pub time_allowed: i64,
    #[serde(deserialize_with = "race_mask")]
    pub allowable_races: u64,
    pub reset_by_scheduler: bool,
    pub expansion: i32,
    pub managed_world_state_id: i32,
    pub quest_session_bonus: i32,

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

impl QuestRow for RawQuestTemplate {
    const KEY_COLUMN: &'static str = "id";

    fn quest_id(&self) -> u32 {
        self.id
    }
}

/// Race masks use every bit; TOML integers are signed, so the mask is stored
/// as its two's complement bit pattern (`-1` is "all races").
fn race_mask<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    i64::deserialize(deserializer).map(|mask| mask as u64)
}

// ============================================================================
// Side tables
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRewardDisplaySpell {
    pub quest_id: u32,
    pub spell_id: u32,
    #[serde(default)]
    pub player_condition_id: u32,
    #[serde(rename = "type", default)]
    pub kind: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawRewardChoiceItems {
    pub quest_id: u32,
    #[serde(default)]
    pub type_1: u8,
    #[serde(default)]
    pub type_2: u8,
    #[serde(default)]
    pub type_3: u8,
    #[serde(default)]
    pub type_4: u8,
    #[serde(default)]
    pub type_5: u8,
    #[serde(default)]
    pub type_6: u8,
}

impl RawRewardChoiceItems {
    pub fn types(&self) -> [u8; 6] {
        [self.type_1, self.type_2, self.type_3, self.type_4, self.type_5, self.type_6]
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawQuestDetails {
    pub quest_id: u32,
    #[serde(default)]
    pub emote_1: u16,
    #[serde(default)]
    pub emote_2: u16,
    #[serde(default)]
    pub emote_3: u16,
    #[serde(default)]
    pub emote_4: u16,
    #[serde(default)]
    pub emote_delay_1: u32,
    #[serde(default)]
    pub emote_delay_2: u32,
    #[serde(default)]
    pub emote_delay_3: u32,
    #[serde(default)]
    pub emote_delay_4: u32,
}

impl RawQuestDetails {
    pub fn emotes(&self) -> [u32; 4] {
        [self.emote_1, self.emote_2, self.emote_3, self.emote_4].map(u32::from)
    }

    pub fn delays(&self) -> [u32; 4] {
        [self.emote_delay_1, self.emote_delay_2, self.emote_delay_3, self.emote_delay_4]
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawQuestOfferReward {
    pub quest_id: u32,
    #[serde(default)]
    pub emote_1: i16,
    #[serde(default)]
    pub emote_2: i16,
    #[serde(default)]
    pub emote_3: i16,
    #[serde(default)]
    pub emote_4: i16,
    #[serde(default)]
    pub emote_delay_1: u32,
    #[serde(default)]
    pub emote_delay_2: u32,
    #[serde(default)]
    pub emote_delay_3: u32,
    #[serde(default)]
    pub emote_delay_4: u32,
    #[serde(default)]
    pub reward_text: String,
}

impl RawQuestOfferReward {
    /// Signed columns widen with sign extension, so negative ids never match an emote
    pub fn emotes(&self) -> [u32; 4] {
        [self.emote_1, self.emote_2, self.emote_3, self.emote_4].map(|emote| emote as u32)
    }

    pub fn delays(&self) -> [u32; 4] {
        [self.emote_delay_1, self.emote_delay_2, self.emote_delay_3, self.emote_delay_4]
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawQuestRequestItems {
    pub quest_id: u32,
    #[serde(default)]
    pub emote_on_complete: u16,
    #[serde(default)]
    pub emote_on_incomplete: u16,
    #[serde(default)]
    pub emote_on_complete_delay: u32,
    #[serde(default)]
    pub emote_on_incomplete_delay: u32,
    #[serde(default)]
    pub completion_text: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawQuestTemplateAddon {
    pub quest_id: u32,
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
    pub provided_item_count: u8,
    pub special_flags: u8,
    pub script_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawQuestMailSender {
    pub quest_id: u32,
    #[serde(default)]
    pub reward_mail_sender_entry: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawQuestObjective {
    pub quest_id: u32,
    pub id: u32,
    #[serde(rename = "type", default)]
    pub objective_type: u8,
    #[serde(default)]
    pub storage_index: i8,
    #[serde(default)]
    pub object_id: i32,
    #[serde(default)]
    pub amount: i32,
    #[serde(default)]
    pub flags: u32,
    #[serde(default)]
    pub flags2: u32,
    #[serde(default)]
    pub progress_bar_weight: f32,
    #[serde(default)]
    pub description: String,
    // Nullable completion effect columns
    pub completion_event_id: Option<u32>,
    pub completion_spell_id: Option<u32>,
    pub completion_conversation_id: Option<u32>,
    pub update_phase_shift: Option<bool>,
    pub update_zone_auras: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawQuestVisualEffect {
    pub quest_id: u32,
    pub objective_id: u32,
    pub index: u8,
    #[serde(default)]
    pub visual_effect: i32,
}

/// Row shape shared by the four conditional text tables
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConditionalText {
    pub quest_id: u32,
    #[serde(default)]
    pub player_condition_id: i32,
    #[serde(default)]
    pub quest_giver_creature_id: i32,
    #[serde(default)]
    pub text: String,
    pub locale: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTreasurePicker {
    pub quest_id: u32,
    pub treasure_picker_id: i32,
}

macro_rules! impl_quest_row {
    ($($row:ty),* $(,)?) => {
        $(
            impl QuestRow for $row {
                fn quest_id(&self) -> u32 {
                    self.quest_id
                }
            }
        )*
    };
}

impl_quest_row!(
    RawRewardDisplaySpell,
    RawRewardChoiceItems,
    RawQuestDetails,
    RawQuestOfferReward,
    RawQuestRequestItems,
    RawQuestTemplateAddon,
    RawQuestMailSender,
    RawQuestObjective,
    RawQuestVisualEffect,
    RawConditionalText,
    RawTreasurePicker,
);

#[cfg(test)]
mod tests {
    use super::*;

    fn table(content: &str) -> toml::Table {
        content.parse::<toml::Table>().unwrap()
    }

    #[test]
    fn test_primary_row_binds_by_name() {
        let row: RawQuestTemplate = parse_row(
            QUEST_TEMPLATE,
            table("id = 25\nreward_item_2 = 6948\nreward_xp_multiplier = 1\nlog_title = \"The Hunt\""),
        )
        .unwrap();

        assert_eq!(row.id, 25);
        assert_eq!(row.reward_item_2, 6948);
        assert_eq!(row.reward_xp_multiplier, 1.0);
        assert_eq!(row.log_title, "The Hunt");
    }

    #[test]
    fn test_primary_row_requires_id() {
        let err = parse_row::<RawQuestTemplate>(QUEST_TEMPLATE, table("log_title = \"No id\""))
            .unwrap_err();
        assert!(matches!(
            err,
            QuestError::MalformedRow { table: QUEST_TEMPLATE, quest_id: None, .. }
        ));
    }

    #[test]
    fn test_primary_row_rejects_bad_shape() {
        let unknown_column =
            parse_row::<RawQuestTemplate>(QUEST_TEMPLATE, table("id = 3\nreward_itme_1 = 5"));
        assert!(matches!(
            unknown_column,
            Err(QuestError::MalformedRow { quest_id: Some(3), .. })
        ));

        let too_wide = parse_row::<RawQuestTemplate>(QUEST_TEMPLATE, table("id = 3\nquest_type = 300"));
        assert!(too_wide.is_err());

        let wrong_type = parse_row::<RawQuestTemplate>(QUEST_TEMPLATE, table("id = 3\nflags = \"x\""));
        assert!(wrong_type.is_err());
    }

    #[test]
    fn test_nullable_objective_columns() {
        let row: RawQuestObjective = parse_row(
            QUEST_OBJECTIVES,
            table("quest_id = 1\nid = 10\ntype = 1\ncompletion_spell_id = 44"),
        )
        .unwrap();

        assert_eq!(row.completion_spell_id, Some(44));
        assert_eq!(row.completion_event_id, None);
        assert_eq!(row.update_zone_auras, None);
    }

    #[test]
    fn test_row_set_merge_keeps_order() {
        let mut rows = QuestRowSet::from_toml_str(
            "[[quest_template]]\nid = 1\n[[quest_treasure_pickers]]\nquest_id = 1\ntreasure_picker_id = 5",
        )
        .unwrap();
        let more = QuestRowSet::from_toml_str(
            "[[quest_treasure_pickers]]\nquest_id = 1\ntreasure_picker_id = 3",
        )
        .unwrap();
        rows.merge(more);

        assert_eq!(rows.quest_template.len(), 1);
        let pickers: Vec<i64> = rows
            .quest_treasure_pickers
            .iter()
            .filter_map(|r| r.get("treasure_picker_id").and_then(|v| v.as_integer()))
            .collect();
        assert_eq!(pickers, vec![5, 3]);
    }
}
