//! Quest Assembly
//!
//! Builds a [`QuestTemplate`] from its primary row, then layers each side
//! table onto it. Only the primary row can fail; a bad side row is logged
//! and the affected value keeps its default.

use tracing::warn;

use super::context::QuestContext;
use super::definition::{
    CompletionEffect, ConditionalText, LootItemType, QuestAddon, QuestChoiceItem,
    QuestCompleteSpellType, QuestCurrencyReward, QuestEmote, QuestFactionReward, QuestFlags,
    QuestItemReward, QuestObjective, QuestObjectiveType, QuestPoi, QuestPortraits,
    QuestSpecialFlags, QuestTemplate, QuestText, RewardDisplaySpell, QUEST_EMOTE_COUNT,
};
use super::rows::{
    self, parse_row, RawConditionalText, RawQuestDetails, RawQuestMailSender, RawQuestObjective,
    RawQuestOfferReward, RawQuestRequestItems, RawQuestTemplate, RawQuestTemplateAddon,
    RawQuestVisualEffect, RawRewardChoiceItems, RawRewardDisplaySpell, RawTreasurePicker,
};
use crate::error::QuestResult;
use crate::locale::Locale;

impl QuestTemplate {
    /// Bind and build a quest from a raw `quest_template` row
    pub fn parse(row: toml::Table) -> QuestResult<Self> {
        let raw: RawQuestTemplate = parse_row(rows::QUEST_TEMPLATE, row)?;
        Ok(Self::from_row(raw))
    }

    /// Build a quest from its primary row
    pub fn from_row(raw: RawQuestTemplate) -> Self {
        let reward_items = [
            QuestItemReward { item_id: raw.reward_item_1, quantity: raw.reward_amount_1 },
            QuestItemReward { item_id: raw.reward_item_2, quantity: raw.reward_amount_2 },
            QuestItemReward { item_id: raw.reward_item_3, quantity: raw.reward_amount_3 },
            QuestItemReward { item_id: raw.reward_item_4, quantity: raw.reward_amount_4 },
        ];

        let item_drops = [
            QuestItemReward { item_id: raw.item_drop_1, quantity: raw.item_drop_quantity_1 },
            QuestItemReward { item_id: raw.item_drop_2, quantity: raw.item_drop_quantity_2 },
            QuestItemReward { item_id: raw.item_drop_3, quantity: raw.item_drop_quantity_3 },
            QuestItemReward { item_id: raw.item_drop_4, quantity: raw.item_drop_quantity_4 },
        ];

        let choice = |item_id, quantity, display_id| QuestChoiceItem {
            item_id,
            quantity,
            display_id,
            loot_item_type: LootItemType::Item,
        };
        let reward_choice_items = [
            choice(raw.reward_choice_item_id_1, raw.reward_choice_item_quantity_1, raw.reward_choice_item_display_id_1),
            choice(raw.reward_choice_item_id_2, raw.reward_choice_item_quantity_2, raw.reward_choice_item_display_id_2),
            choice(raw.reward_choice_item_id_3, raw.reward_choice_item_quantity_3, raw.reward_choice_item_display_id_3),
            choice(raw.reward_choice_item_id_4, raw.reward_choice_item_quantity_4, raw.reward_choice_item_display_id_4),
            choice(raw.reward_choice_item_id_5, raw.reward_choice_item_quantity_5, raw.reward_choice_item_display_id_5),
            choice(raw.reward_choice_item_id_6, raw.reward_choice_item_quantity_6, raw.reward_choice_item_display_id_6),
        ];

        let faction = |faction_id, value, override_value, cap_in| QuestFactionReward {
            faction_id,
            value,
            override_value,
            cap_in,
        };
        let reward_factions = [
            faction(raw.reward_faction_id_1, raw.reward_faction_value_1, raw.reward_faction_override_1, raw.reward_faction_cap_in_1),
            faction(raw.reward_faction_id_2, raw.reward_faction_value_2, raw.reward_faction_override_2, raw.reward_faction_cap_in_2),
            faction(raw.reward_faction_id_3, raw.reward_faction_value_3, raw.reward_faction_override_3, raw.reward_faction_cap_in_3),
            faction(raw.reward_faction_id_4, raw.reward_faction_value_4, raw.reward_faction_override_4, raw.reward_faction_cap_in_4),
            faction(raw.reward_faction_id_5, raw.reward_faction_value_5, raw.reward_faction_override_5, raw.reward_faction_cap_in_5),
        ];

        let reward_currencies = [
            QuestCurrencyReward { currency_id: raw.reward_currency_id_1, quantity: raw.reward_currency_qty_1 },
            QuestCurrencyReward { currency_id: raw.reward_currency_id_2, quantity: raw.reward_currency_qty_2 },
            QuestCurrencyReward { currency_id: raw.reward_currency_id_3, quantity: raw.reward_currency_qty_3 },
            QuestCurrencyReward { currency_id: raw.reward_currency_id_4, quantity: raw.reward_currency_qty_4 },
        ];

        let reward_items_count = reward_items.iter().filter(|r| r.item_id != 0).count();
        let reward_choice_items_count = reward_choice_items.iter().filter(|r| r.item_id != 0).count();

        QuestTemplate {
            id: raw.id,
            quest_type: raw.quest_type,
            package_id: raw.quest_package_id,
            content_tuning_id: raw.content_tuning_id as u32,
            sort_id: raw.quest_sort_id,
            info_id: raw.quest_info_id,
            suggested_players: raw.suggested_group_num,
            next_quest_in_chain: raw.reward_next_quest,
            expansion: raw.expansion,
            managed_world_state_id: raw.managed_world_state_id,
            quest_session_bonus: raw.quest_session_bonus,

            flags: QuestFlags(raw.flags),
            flags_ex: raw.flags_ex,
            flags_ex2: raw.flags_ex2,
            flags_ex3: raw.flags_ex3,

            xp_difficulty: raw.reward_xp_difficulty,
            xp_multiplier: raw.reward_xp_multiplier,
            money_difficulty: raw.reward_money_difficulty,
            money_multiplier: raw.reward_money_multiplier,
            bonus_money: raw.reward_bonus_money,
            reward_spell: raw.reward_spell,
            reward_honor: raw.reward_honor,
            reward_kill_honor: raw.reward_kill_honor,
            artifact_xp_difficulty: raw.reward_artifact_xp_difficulty,
            artifact_xp_multiplier: raw.reward_artifact_xp_multiplier,
            artifact_category_id: raw.reward_artifact_category_id,
            source_item_id: raw.start_item,
            reward_title_id: raw.reward_title,
            reward_arena_points: raw.reward_arena_points,
            reward_skill_id: raw.reward_skill_line_id,
            reward_skill_points: raw.reward_num_skill_ups,
            reward_reputation_mask: raw.reward_faction_flags,

            reward_items,
            item_drops,
            reward_choice_items,
            reward_factions,
            reward_currencies,
            reward_items_count,
            reward_choice_items_count,

            poi: QuestPoi {
                continent: raw.poi_continent,
                x: raw.poi_x,
                y: raw.poi_y,
                priority: raw.poi_priority,
            },
            portraits: QuestPortraits {
                giver: raw.portrait_giver,
                giver_mount: raw.portrait_giver_mount,
                giver_model_scene_id: raw.portrait_giver_model_scene_id,
                turn_in: raw.portrait_turn_in,
            },
            sound_accept: raw.accepted_sound_kit_id,
            sound_turn_in: raw.complete_sound_kit_id,
            area_group_id: raw.area_group_id,
            limit_time: raw.time_allowed,
            allowable_races: raw.allowable_races,
            reset_by_scheduler: raw.reset_by_scheduler,

            text: QuestText {
                log_title: raw.log_title,
                log_description: raw.log_description,
                quest_description: raw.quest_description,
                area_description: raw.area_description,
                portrait_giver_text: raw.portrait_giver_text,
                portrait_giver_name: raw.portrait_giver_name,
                portrait_turn_in_text: raw.portrait_turn_in_text,
                portrait_turn_in_name: raw.portrait_turn_in_name,
                quest_completion_log: raw.quest_completion_log,
            },

            ..Default::default()
        }
    }

    // ========================================================================
    // Rewards
    // ========================================================================

    pub fn load_reward_display_spell(&mut self, row: &RawRewardDisplaySpell, ctx: QuestContext<'_>) {
        if !ctx.tables.has_spell(row.spell_id) {
            warn!(
                "Table `quest_reward_display_spell` has non-existing Spell ({}) set for quest {}. Skipped.",
                row.spell_id, row.quest_id
            );
            return;
        }

        let mut player_condition_id = row.player_condition_id;
        if player_condition_id != 0
            && !ctx.tables.has_player_condition(player_condition_id)
            && !ctx.tables.has_condition_registration(player_condition_id)
        {
            warn!(
                "Table `quest_reward_display_spell` has serverside PlayerCondition ({}) set for quest {} and spell {} without conditions. Set to 0.",
                player_condition_id, row.quest_id, row.spell_id
            );
            player_condition_id = 0;
        }

        let kind = QuestCompleteSpellType::from_u32(row.kind).unwrap_or_else(|| {
            warn!(
                "Table `quest_reward_display_spell` invalid type value ({}) set for quest {} and spell {}. Set to 0.",
                row.kind, row.quest_id, row.spell_id
            );
            QuestCompleteSpellType::LegacyBehavior
        });

        self.reward_display_spells.push(RewardDisplaySpell {
            spell_id: row.spell_id,
            player_condition_id,
            kind,
        });
    }

    pub fn load_reward_choice_items(&mut self, row: &RawRewardChoiceItems) {
        for (slot, value) in self.reward_choice_items.iter_mut().zip(row.types()) {
            slot.loot_item_type = LootItemType::from_u8(value).unwrap_or_else(|| {
                warn!(
                    "Table `quest_reward_choice_items` has unknown loot item type ({}) set for quest {}. Set to item.",
                    value, row.quest_id
                );
                LootItemType::Item
            });
        }
    }

    // ========================================================================
    // Presentation
    // ========================================================================

    pub fn load_quest_details(&mut self, row: &RawQuestDetails, ctx: QuestContext<'_>) {
        apply_emotes(
            &mut self.details_emotes,
            row.emotes(),
            row.delays(),
            "quest_details",
            row.quest_id,
            ctx,
        );
    }

    pub fn load_quest_request_items(&mut self, row: &RawQuestRequestItems, ctx: QuestContext<'_>) {
        let on_complete = u32::from(row.emote_on_complete);
        let on_incomplete = u32::from(row.emote_on_incomplete);

        if !ctx.tables.has_emote(on_complete) {
            warn!(
                "Table `quest_request_items` has non-existing EmoteOnComplete ({}) set for quest {}.",
                on_complete, row.quest_id
            );
        }

        if !ctx.tables.has_emote(on_incomplete) {
            warn!(
                "Table `quest_request_items` has non-existing EmoteOnIncomplete ({}) set for quest {}.",
                on_incomplete, row.quest_id
            );
        }

        self.emote_on_complete = QuestEmote { emote_id: on_complete, delay: row.emote_on_complete_delay };
        self.emote_on_incomplete = QuestEmote { emote_id: on_incomplete, delay: row.emote_on_incomplete_delay };
        self.request_items_text = row.completion_text.clone();
    }

    pub fn load_quest_offer_reward(&mut self, row: &RawQuestOfferReward, ctx: QuestContext<'_>) {
        apply_emotes(
            &mut self.offer_reward_emotes,
            row.emotes(),
            row.delays(),
            "quest_offer_reward",
            row.quest_id,
            ctx,
        );
        self.offer_reward_text = row.reward_text.clone();
    }

    // ========================================================================
    // Behavior
    // ========================================================================

    pub fn load_quest_template_addon(&mut self, row: &RawQuestTemplateAddon, ctx: QuestContext<'_>) {
        self.addon = QuestAddon {
            max_level: row.max_level,
            allowable_classes: row.allowable_classes,
            source_spell_id: row.source_spell_id,
            prev_quest_id: row.prev_quest_id,
            next_quest_id: row.next_quest_id,
            exclusive_group: row.exclusive_group,
            breadcrumb_for_quest_id: row.breadcrumb_for_quest_id,
            reward_mail_template_id: row.reward_mail_template_id,
            reward_mail_delay: row.reward_mail_delay,
            required_skill_id: row.required_skill_id,
            required_skill_points: row.required_skill_points,
            required_min_rep_faction: row.required_min_rep_faction,
            required_max_rep_faction: row.required_max_rep_faction,
            required_min_rep_value: row.required_min_rep_value,
            required_max_rep_value: row.required_max_rep_value,
            source_item_id_count: row.provided_item_count,
            special_flags: QuestSpecialFlags(row.special_flags),
            script_id: ctx.tables.script_id(&row.script_name),
        };

        if self.addon.special_flags.contains(QuestSpecialFlags::AUTO_ACCEPT) {
            self.flags.insert(QuestFlags::AUTO_ACCEPT);
        }
    }

    pub fn load_quest_mail_sender(&mut self, row: &RawQuestMailSender) {
        self.reward_mail_sender_entry = row.reward_mail_sender_entry;
    }

    // ========================================================================
    // Objectives
    // ========================================================================

    pub fn load_quest_objective(&mut self, row: &RawQuestObjective) {
        let has_completion_effect = row.completion_event_id.is_some()
            || row.completion_spell_id.is_some()
            || row.completion_conversation_id.is_some()
            || row.update_phase_shift.is_some()
            || row.update_zone_auras.is_some();

        let completion_effect = has_completion_effect.then(|| CompletionEffect {
            game_event_id: row.completion_event_id,
            spell_id: row.completion_spell_id,
            conversation_id: row.completion_conversation_id,
            update_phase_shift: row.update_phase_shift.unwrap_or(false),
            update_zone_auras: row.update_zone_auras.unwrap_or(false),
        });

        if row.objective_type >= QuestObjectiveType::MAX {
            warn!(
                "Table `quest_objectives` has unknown type ({}) set for objective {} of quest {}.",
                row.objective_type, row.id, row.quest_id
            );
        }

        self.objectives.push(QuestObjective {
            id: row.id,
            quest_id: row.quest_id,
            objective_type: row.objective_type,
            storage_index: row.storage_index,
            object_id: row.object_id,
            amount: row.amount,
            flags: row.flags,
            flags2: row.flags2,
            progress_bar_weight: row.progress_bar_weight,
            description: row.description.clone(),
            visual_effects: Vec::new(),
            completion_effect,
        });

        self.used_objective_types.insert(row.objective_type);
    }

    /// Set one visual effect slot on an already loaded objective
    pub fn load_quest_objective_visual_effect(&mut self, row: &RawQuestVisualEffect) {
        let Some(objective) = self.objectives.iter_mut().find(|o| o.id == row.objective_id) else {
            return;
        };

        let index = usize::from(row.index);
        if index >= objective.visual_effects.len() {
            objective.visual_effects.resize(index + 1, 0);
        }
        objective.visual_effects[index] = row.visual_effect;
    }

    // ========================================================================
    // Conditional Text
    // ========================================================================

    pub fn load_conditional_quest_description(&mut self, row: &RawConditionalText, ctx: QuestContext<'_>) {
        load_conditional_text(
            &mut self.conditional_quest_description,
            rows::QUEST_DESCRIPTION_CONDITIONAL,
            row,
            ctx,
        );
    }

    pub fn load_conditional_request_items_text(&mut self, row: &RawConditionalText, ctx: QuestContext<'_>) {
        load_conditional_text(
            &mut self.conditional_request_items_text,
            rows::QUEST_REQUEST_ITEMS_CONDITIONAL,
            row,
            ctx,
        );
    }

    pub fn load_conditional_offer_reward_text(&mut self, row: &RawConditionalText, ctx: QuestContext<'_>) {
        load_conditional_text(
            &mut self.conditional_offer_reward_text,
            rows::QUEST_OFFER_REWARD_CONDITIONAL,
            row,
            ctx,
        );
    }

    pub fn load_conditional_quest_completion_log(&mut self, row: &RawConditionalText, ctx: QuestContext<'_>) {
        load_conditional_text(
            &mut self.conditional_quest_completion_log,
            rows::QUEST_COMPLETION_LOG_CONDITIONAL,
            row,
            ctx,
        );
    }

    pub fn load_treasure_picker(&mut self, row: &RawTreasurePicker) {
        self.treasure_picker_ids.push(row.treasure_picker_id);
    }
}

/// Validated emotes fill their slot; every delay is applied regardless
fn apply_emotes(
    slots: &mut [QuestEmote; QUEST_EMOTE_COUNT],
    emotes: [u32; QUEST_EMOTE_COUNT],
    delays: [u32; QUEST_EMOTE_COUNT],
    table: &str,
    quest_id: u32,
    ctx: QuestContext<'_>,
) {
    for (i, (slot, emote)) in slots.iter_mut().zip(emotes).enumerate() {
        if !ctx.tables.has_emote(emote) {
            warn!(
                "Table `{}` has non-existing Emote{} ({}) set for quest {}. Skipped.",
                table,
                i + 1,
                emote,
                quest_id
            );
            continue;
        }
        slot.emote_id = emote;
    }

    for (slot, delay) in slots.iter_mut().zip(delays) {
        slot.delay = delay;
    }
}

fn load_conditional_text(
    entries: &mut Vec<ConditionalText>,
    table: &str,
    row: &RawConditionalText,
    ctx: QuestContext<'_>,
) {
    let locale = Locale::from_name(&row.locale);
    if !ctx.config.load_locales && !locale.is_some_and(|l| l.is_default()) {
        return;
    }

    let Some(locale) = locale else {
        warn!(
            "Table `{}` has invalid locale {} set for quest {}. Skipped.",
            table, row.locale, row.quest_id
        );
        return;
    };

    let position = entries.iter().position(|entry| {
        entry.player_condition_id == row.player_condition_id
            && entry.quest_giver_creature_id == row.quest_giver_creature_id
    });

    let entry = match position {
        Some(index) => &mut entries[index],
        None => {
            entries.push(ConditionalText {
                player_condition_id: row.player_condition_id,
                quest_giver_creature_id: row.quest_giver_creature_id,
                ..Default::default()
            });
            let last = entries.len() - 1;
            &mut entries[last]
        }
    };

    entry.text.set(locale, &row.text);
}
