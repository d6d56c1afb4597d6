//! Quest Query Snapshots
//!
//! The client-facing view of a quest: text resolved to one locale, reward
//! columns filtered by the reveal flags, per-character amounts filled in when
//! a viewer is known. Also builds the reward block shown on turn-in.

use std::sync::Arc;

use serde::Serialize;

use crate::locale::{Locale, TOTAL_LOCALES};
use crate::player::QuestViewer;

use super::context::QuestContext;
use super::definition::{
    ConditionalText, LootItemType, QuestCurrencyReward, QuestFactionReward, QuestFlags,
    QuestItemReward, QuestObjective, QuestTemplate, RewardDisplaySpell,
    QUEST_ITEM_DROP_COUNT, QUEST_REWARD_CHOICES_COUNT, QUEST_REWARD_CURRENCY_COUNT,
    QUEST_REWARD_DISPLAY_SPELL_COUNT, QUEST_REWARD_ITEM_COUNT, QUEST_REWARD_REPUTATIONS_COUNT,
};

// ============================================================================
// Response Shapes
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryQuestInfoResponse {
    pub allow: bool,
    pub quest_id: u32,
    pub info: QuestInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConditionalQuestText {
    pub player_condition_id: i32,
    pub quest_giver_creature_id: i32,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuestCompleteDisplaySpell {
    pub spell_id: u32,
    pub player_condition_id: u32,
    #[serde(rename = "type")]
    pub kind: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuestInfoChoiceItem {
    pub item_id: u32,
    pub quantity: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuestInfo {
    pub quest_id: u32,
    pub quest_type: u8,
    pub content_tuning_id: u32,
    pub quest_package_id: u32,
    pub quest_sort_id: i16,
    pub quest_info_id: u16,
    pub suggested_group_num: u8,
    pub reward_next_quest: u32,
    pub reward_xp_difficulty: u32,
    pub reward_xp_multiplier: f32,
    pub reward_money: u32,
    pub reward_money_difficulty: u32,
    pub reward_money_multiplier: f32,
    pub reward_bonus_money: u32,
    pub reward_display_spell: Vec<QuestCompleteDisplaySpell>,
    /// Condition-gated display spells the viewer qualifies for
    pub spell_completion_display_ids: [u32; QUEST_REWARD_DISPLAY_SPELL_COUNT],
    pub reward_spell: u32,
    pub reward_honor: u32,
    pub reward_kill_honor: u32,
    pub reward_artifact_xp_difficulty: u32,
    pub reward_artifact_xp_multiplier: f32,
    pub reward_artifact_category_id: u32,
    pub start_item: u32,
    pub flags: u32,
    pub flags_ex: u32,
    pub flags_ex2: u32,
    pub flags_ex3: u32,
    pub reward_title: u32,
    pub reward_arena_points: u32,
    pub reward_skill_line_id: u32,
    pub reward_num_skill_ups: u32,
    pub reward_faction_flags: u32,
    pub portrait_giver: u32,
    pub portrait_giver_mount: u32,
    pub portrait_giver_model_scene_id: i32,
    pub portrait_turn_in: u32,
    pub item_drop: [u32; QUEST_ITEM_DROP_COUNT],
    pub item_drop_quantity: [u32; QUEST_ITEM_DROP_COUNT],
    pub reward_items: [u32; QUEST_REWARD_ITEM_COUNT],
    pub reward_amount: [u32; QUEST_REWARD_ITEM_COUNT],
    pub unfiltered_choice_items: [QuestInfoChoiceItem; QUEST_REWARD_CHOICES_COUNT],
    pub reward_faction_id: [u32; QUEST_REWARD_REPUTATIONS_COUNT],
    pub reward_faction_value: [i32; QUEST_REWARD_REPUTATIONS_COUNT],
    pub reward_faction_override: [i32; QUEST_REWARD_REPUTATIONS_COUNT],
    pub reward_faction_cap_in: [i32; QUEST_REWARD_REPUTATIONS_COUNT],
    pub poi_continent: u32,
    pub poi_x: f32,
    pub poi_y: f32,
    pub poi_priority: u32,
    pub allowable_races: u64,
    pub treasure_picker_ids: Vec<i32>,
    pub expansion: i32,
    pub managed_world_state_id: i32,
    pub quest_session_bonus: i32,
    pub quest_giver_creature_id: i32,
    pub objectives: Vec<QuestObjective>,
    pub reward_currency_id: [u32; QUEST_REWARD_CURRENCY_COUNT],
    pub reward_currency_qty: [u32; QUEST_REWARD_CURRENCY_COUNT],
    pub accepted_sound_kit_id: u32,
    pub complete_sound_kit_id: u32,
    pub area_group_id: u32,
    pub time_allowed: i64,
    pub reset_by_scheduler: bool,

    pub log_title: String,
    pub log_description: String,
    pub quest_description: String,
    pub area_description: String,
    pub quest_completion_log: String,
    pub portrait_giver_text: String,
    pub portrait_giver_name: String,
    pub portrait_turn_in_text: String,
    pub portrait_turn_in_name: String,
    pub conditional_quest_description: Vec<ConditionalQuestText>,
    pub conditional_quest_completion_log: Vec<ConditionalQuestText>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuestRewardChoiceItem {
    pub loot_item_type: LootItemType,
    pub item_id: u32,
    pub quantity: u32,
}

/// Reward panel shown to a character
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestRewards {
    pub choice_item_count: usize,
    pub item_count: usize,
    pub money: u32,
    pub xp: u32,
    pub artifact_category_id: u32,
    pub title: u32,
    pub faction_flags: u32,
    pub spell_completion_display_ids: [u32; QUEST_REWARD_DISPLAY_SPELL_COUNT],
    pub spell_completion_id: u32,
    pub skill_line_id: u32,
    pub num_skill_ups: u32,
    pub treasure_picker_ids: Vec<i32>,
    pub choice_items: [QuestRewardChoiceItem; QUEST_REWARD_CHOICES_COUNT],
    pub items: [QuestItemReward; QUEST_REWARD_ITEM_COUNT],
    pub factions: [QuestFactionReward; QUEST_REWARD_REPUTATIONS_COUNT],
    pub currencies: [QuestCurrencyReward; QUEST_REWARD_CURRENCY_COUNT],
}

/// Pre-built snapshots of one quest, one slot per locale
#[derive(Debug, Clone, Default)]
pub struct LocaleSnapshots([Option<Arc<QueryQuestInfoResponse>>; TOTAL_LOCALES]);

impl LocaleSnapshots {
    pub fn get(&self, locale: Locale) -> Option<Arc<QueryQuestInfoResponse>> {
        self.0[locale.index()].clone()
    }

    pub fn len(&self) -> usize {
        self.0.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ============================================================================
// Builders
// ============================================================================

fn meets_condition(viewer: Option<&dyn QuestViewer>, player_condition_id: u32) -> bool {
    player_condition_id == 0
        || viewer.is_none_or(|viewer| viewer.meets_player_condition(player_condition_id))
}

/// First display spells whose condition holds, up to the client's capacity
fn display_spell_ids(
    spells: &[RewardDisplaySpell],
    viewer: Option<&dyn QuestViewer>,
) -> [u32; QUEST_REWARD_DISPLAY_SPELL_COUNT] {
    let mut ids = [0; QUEST_REWARD_DISPLAY_SPELL_COUNT];
    let mut filled = 0;

    for spell in spells {
        if !meets_condition(viewer, spell.player_condition_id) {
            continue;
        }

        ids[filled] = spell.spell_id;
        filled += 1;
        if filled == ids.len() {
            break;
        }
    }

    ids
}

fn project_conditional(entries: &[ConditionalText], locale: Locale) -> Vec<ConditionalQuestText> {
    entries
        .iter()
        .map(|entry| {
            let mut text = entry.text.default_text().to_string();
            entry.text.resolve_into(locale, &mut text);
            ConditionalQuestText {
                player_condition_id: entry.player_condition_id,
                quest_giver_creature_id: entry.quest_giver_creature_id,
                text,
            }
        })
        .collect()
}

impl QuestTemplate {
    /// Snapshot of this quest for `locale`, with per-character values when a viewer is given
    pub fn build_query_data(
        &self,
        locale: Locale,
        viewer: Option<&dyn QuestViewer>,
        ctx: QuestContext<'_>,
    ) -> QueryQuestInfoResponse {
        let mut info = QuestInfo {
            log_title: self.text.log_title.clone(),
            log_description: self.text.log_description.clone(),
            quest_description: self.text.quest_description.clone(),
            area_description: self.text.area_description.clone(),
            quest_completion_log: self.text.quest_completion_log.clone(),
            portrait_giver_text: self.text.portrait_giver_text.clone(),
            portrait_giver_name: self.text.portrait_giver_name.clone(),
            portrait_turn_in_text: self.text.portrait_turn_in_text.clone(),
            portrait_turn_in_name: self.text.portrait_turn_in_name.clone(),
            conditional_quest_description: project_conditional(&self.conditional_quest_description, locale),
            conditional_quest_completion_log: project_conditional(&self.conditional_quest_completion_log, locale),
            ..Default::default()
        };

        if !locale.is_default() {
            if let Some(text) = ctx.tables.quest_locale(self.id) {
                text.log_title.resolve_into(locale, &mut info.log_title);
                text.log_description.resolve_into(locale, &mut info.log_description);
                text.quest_description.resolve_into(locale, &mut info.quest_description);
                text.area_description.resolve_into(locale, &mut info.area_description);
                text.quest_completion_log.resolve_into(locale, &mut info.quest_completion_log);
                text.portrait_giver_text.resolve_into(locale, &mut info.portrait_giver_text);
                text.portrait_giver_name.resolve_into(locale, &mut info.portrait_giver_name);
                text.portrait_turn_in_text.resolve_into(locale, &mut info.portrait_turn_in_text);
                text.portrait_turn_in_name.resolve_into(locale, &mut info.portrait_turn_in_name);
            }
        }

        info.quest_id = self.id;
        info.quest_type = self.quest_type;
        info.content_tuning_id = self.content_tuning_id;
        info.quest_package_id = self.package_id;
        info.quest_sort_id = self.sort_id;
        info.quest_info_id = self.info_id;
        info.suggested_group_num = self.suggested_players;
        info.reward_next_quest = self.next_quest_in_chain;
        info.reward_xp_difficulty = self.xp_difficulty;
        info.reward_xp_multiplier = self.xp_multiplier;

        let hide_reward = self.has_flag(QuestFlags::HIDE_REWARD);
        if !hide_reward {
            info.reward_money = match viewer {
                Some(viewer) => self.quest_money_reward(viewer, ctx),
                None => self.max_money_reward(ctx),
            };
        }

        info.reward_money_difficulty = self.money_difficulty;
        info.reward_money_multiplier = self.money_multiplier;
        info.reward_bonus_money = self.money_reward_at_max_level(ctx.config);
        info.reward_display_spell = self
            .reward_display_spells
            .iter()
            .map(|spell| QuestCompleteDisplaySpell {
                spell_id: spell.spell_id,
                player_condition_id: spell.player_condition_id,
                kind: spell.kind as i32,
            })
            .collect();
        info.spell_completion_display_ids = display_spell_ids(&self.reward_display_spells, viewer);

        info.reward_spell = self.reward_spell;
        info.reward_honor = self.reward_honor;
        info.reward_kill_honor = self.reward_kill_honor;
        info.reward_artifact_xp_difficulty = self.artifact_xp_difficulty;
        info.reward_artifact_xp_multiplier = self.artifact_xp_multiplier;
        info.reward_artifact_category_id = self.artifact_category_id;
        info.start_item = self.source_item_id;
        info.flags = self.flags.bits();
        info.flags_ex = self.flags_ex;
        info.flags_ex2 = self.flags_ex2;
        info.flags_ex3 = self.flags_ex3;
        info.reward_title = self.reward_title_id;
        info.reward_arena_points = self.reward_arena_points;
        info.reward_skill_line_id = self.reward_skill_id;
        info.reward_num_skill_ups = self.reward_skill_points;
        info.reward_faction_flags = self.reward_reputation_mask;
        info.portrait_giver = self.portraits.giver;
        info.portrait_giver_mount = self.portraits.giver_mount;
        info.portrait_giver_model_scene_id = self.portraits.giver_model_scene_id;
        info.portrait_turn_in = self.portraits.turn_in;

        for (i, drop) in self.item_drops.iter().enumerate() {
            info.item_drop[i] = drop.item_id;
            info.item_drop_quantity[i] = drop.quantity;
        }

        if !hide_reward {
            for (i, item) in self.reward_items.iter().enumerate() {
                info.reward_items[i] = item.item_id;
                info.reward_amount[i] = item.quantity;
            }
            for (slot, choice) in info.unfiltered_choice_items.iter_mut().zip(&self.reward_choice_items) {
                slot.item_id = choice.item_id;
                slot.quantity = choice.quantity;
            }
        }

        for (i, faction) in self.reward_factions.iter().enumerate() {
            info.reward_faction_id[i] = faction.faction_id;
            info.reward_faction_value[i] = faction.value;
            info.reward_faction_override[i] = faction.override_value;
            info.reward_faction_cap_in[i] = faction.cap_in;
        }

        info.poi_continent = self.poi.continent;
        info.poi_x = self.poi.x;
        info.poi_y = self.poi.y;
        info.poi_priority = self.poi.priority;

        info.allowable_races = self.allowable_races;
        info.treasure_picker_ids = self.treasure_picker_ids.clone();
        info.expansion = self.expansion;
        info.managed_world_state_id = self.managed_world_state_id;
        // Filled in by the caller during a quest session or NPC interaction
        info.quest_session_bonus = 0;
        info.quest_giver_creature_id = 0;

        info.objectives = self
            .objectives
            .iter()
            .map(|objective| {
                let mut objective = objective.clone();
                if !locale.is_default() {
                    if let Some(text) = ctx.tables.objective_locale(objective.id) {
                        text.description.resolve_into(locale, &mut objective.description);
                    }
                }
                objective
            })
            .collect();

        for (i, currency) in self.reward_currencies.iter().enumerate() {
            info.reward_currency_id[i] = currency.currency_id;
            info.reward_currency_qty[i] = currency.quantity;
        }

        info.accepted_sound_kit_id = self.sound_accept;
        info.complete_sound_kit_id = self.sound_turn_in;
        info.area_group_id = self.area_group_id;
        info.time_allowed = self.limit_time;
        info.reset_by_scheduler = self.reset_by_scheduler;

        QueryQuestInfoResponse {
            allow: true,
            quest_id: self.id,
            info,
        }
    }

    /// Viewer-independent snapshots for every loaded locale
    pub fn initialize_query_data(&self, ctx: QuestContext<'_>) -> LocaleSnapshots {
        let mut snapshots = LocaleSnapshots::default();
        for locale in Locale::ALL {
            if !ctx.config.load_locales && !locale.is_default() {
                continue;
            }
            snapshots.0[locale.index()] = Some(Arc::new(self.build_query_data(locale, None, ctx)));
        }
        snapshots
    }

    pub fn build_quest_rewards(&self, viewer: &dyn QuestViewer, ctx: QuestContext<'_>) -> QuestRewards {
        let mut rewards = QuestRewards {
            choice_item_count: self.reward_choice_items_count,
            item_count: self.reward_items_count,
            money: self.quest_money_reward(viewer, ctx),
            xp: self.quest_xp_reward(viewer, ctx),
            artifact_category_id: self.artifact_category_id,
            title: self.reward_title_id,
            faction_flags: self.reward_reputation_mask,
            spell_completion_display_ids: display_spell_ids(&self.reward_display_spells, Some(viewer)),
            spell_completion_id: self.reward_spell,
            skill_line_id: self.reward_skill_id,
            num_skill_ups: self.reward_skill_points,
            treasure_picker_ids: self.treasure_picker_ids.clone(),
            items: self.reward_items,
            factions: self.reward_factions,
            currencies: self.reward_currencies,
            ..Default::default()
        };

        for (slot, choice) in rewards.choice_items.iter_mut().zip(&self.reward_choice_items) {
            *slot = QuestRewardChoiceItem {
                loot_item_type: choice.loot_item_type,
                item_id: choice.item_id,
                quantity: choice.quantity,
            };
        }

        rewards
    }
}
