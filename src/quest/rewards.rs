//! Quest Reward Computation
//!
//! Experience and money amounts derived from a quest's reward columns, the
//! viewing character and the world rates. Every function here is total: a
//! missing table entry contributes zero.

use crate::config::WorldConfig;
use crate::data::tables::{max_level_for_expansion, CURRENT_EXPANSION, QUEST_DIFFICULTY_COUNT};
use crate::player::QuestViewer;

use super::context::QuestContext;
use super::definition::{QuestFlags, QuestTemplate};

/// Round an XP amount to the granularity of its tier
pub fn round_xp_value(xp: u32) -> u32 {
    if xp <= 100 {
        5 * (xp.saturating_add(2) / 5)
    } else if xp <= 500 {
        10 * (xp.saturating_add(5) / 10)
    } else if xp <= 1000 {
        25 * (xp.saturating_add(12) / 25)
    } else {
        50 * (xp.saturating_add(25) / 50)
    }
}

/// XP scaling for the gap between quest level and character level, in tenths
pub fn level_difference_factor(quest_level: u32, level: u32) -> u32 {
    let factor = 2 * (i64::from(quest_level) - i64::from(level)) + 12;
    factor.clamp(1, 10) as u32
}

/// XP a character earns for a set of reward columns
///
/// `expansion` is the quest's expansion; older content is cut to a ninth for
/// characters past the previous expansion's cap playing the current one.
pub fn xp_value(
    viewer: Option<&dyn QuestViewer>,
    content_tuning_id: u32,
    xp_difficulty: u32,
    xp_multiplier: f32,
    expansion: i32,
    ctx: QuestContext<'_>,
) -> u32 {
    let Some(viewer) = viewer else {
        return 0;
    };

    let quest_level = viewer.quest_level(content_tuning_id);
    let Some(quest_xp) = ctx.tables.quest_xp(quest_level) else {
        return 0;
    };
    if xp_difficulty as usize >= QUEST_DIFFICULTY_COUNT {
        return 0;
    }

    let base = quest_xp.difficulty[xp_difficulty as usize];
    let mut xp = base;
    if let Some(content_tuning) = ctx.tables.content_tuning(content_tuning_id) {
        xp = (xp as f32 * content_tuning.quest_xp_multiplier) as u32;
    }

    let level = viewer.level();
    let factor = level_difference_factor(quest_level, level);
    xp = (factor.saturating_mul(xp) as f32 * xp_multiplier / 10.0) as u32;

    if level >= max_level_for_expansion(CURRENT_EXPANSION - 1)
        && viewer.session_expansion() == CURRENT_EXPANSION
        && (0..CURRENT_EXPANSION).contains(&expansion)
    {
        xp = (xp as f32 / 9.0) as u32;
    }

    xp = round_xp_value(xp);

    let ratio = ctx.config.min_quest_scaled_xp_ratio;
    if ratio != 0 {
        let unscaled = round_xp_value((base as f32 * xp_multiplier) as u32);
        let min_scaled_xp = unscaled.saturating_mul(ratio) / 100;
        xp = xp.max(min_scaled_xp);
    }

    xp
}

fn money_for_level(level: u32, difficulty: u32, multiplier: f32, ctx: QuestContext<'_>) -> u32 {
    ctx.tables
        .quest_money_reward(level)
        .and_then(|money| money.difficulty.get(difficulty as usize))
        .map_or(0, |&amount| (amount as f32 * multiplier) as u32)
}

impl QuestTemplate {
    pub fn xp_value(&self, viewer: Option<&dyn QuestViewer>, ctx: QuestContext<'_>) -> u32 {
        xp_value(
            viewer,
            self.content_tuning_id,
            self.xp_difficulty,
            self.xp_multiplier,
            self.expansion,
            ctx,
        )
    }

    /// Money at the character's effective quest level
    pub fn money_value(&self, viewer: &dyn QuestViewer, ctx: QuestContext<'_>) -> u32 {
        let quest_level = viewer.quest_level(self.content_tuning_id);
        money_for_level(quest_level, self.money_difficulty, self.money_multiplier, ctx)
    }

    /// Money at the top of the quest's content tuning band
    pub fn max_money_value(&self, ctx: QuestContext<'_>) -> u32 {
        ctx.tables
            .content_tuning(self.content_tuning_id)
            .map_or(0, |tuning| {
                money_for_level(tuning.max_level, self.money_difficulty, self.money_multiplier, ctx)
            })
    }

    pub fn max_money_reward(&self, ctx: QuestContext<'_>) -> u32 {
        (self.max_money_value(ctx) as f32 * ctx.config.rate_money_quest) as u32
    }

    /// Bonus money paid instead of XP at the level cap
    pub fn money_reward_at_max_level(&self, config: &WorldConfig) -> u32 {
        if self.has_flag(QuestFlags::NO_MONEY_FOR_XP) {
            return 0;
        }
        (self.bonus_money as f32 * config.rate_money_max_level_quest) as u32
    }

    pub fn quest_xp_reward(&self, viewer: &dyn QuestViewer, ctx: QuestContext<'_>) -> u32 {
        (self.xp_value(Some(viewer), ctx) as f32 * ctx.config.rate_xp_quest) as u32
    }

    pub fn quest_money_reward(&self, viewer: &dyn QuestViewer, ctx: QuestContext<'_>) -> u32 {
        (self.money_value(viewer, ctx) as f32 * ctx.config.rate_money_quest) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::GameTables;
    use crate::quest::testing::{sample_tables, TestViewer};
    use proptest::prelude::*;

    fn quest(content_tuning_id: u32, xp_difficulty: u32, money_difficulty: u32) -> QuestTemplate {
        QuestTemplate {
            id: 1,
            content_tuning_id,
            xp_difficulty,
            xp_multiplier: 1.0,
            money_difficulty,
            money_multiplier: 1.0,
            expansion: -1,
            ..Default::default()
        }
    }

    #[test]
    fn test_round_xp_value_tiers() {
        assert_eq!(round_xp_value(0), 0);
        assert_eq!(round_xp_value(83), 85);
        assert_eq!(round_xp_value(82), 80);
        assert_eq!(round_xp_value(100), 100);
        assert_eq!(round_xp_value(101), 100);
        assert_eq!(round_xp_value(105), 110);
        assert_eq!(round_xp_value(500), 500);
        assert_eq!(round_xp_value(517), 525);
        assert_eq!(round_xp_value(512), 500);
        assert_eq!(round_xp_value(1000), 1000);
        assert_eq!(round_xp_value(1012), 1000);
        assert_eq!(round_xp_value(1025), 1050);
    }

    #[test]
    fn test_level_difference_factor_bounds() {
        assert_eq!(level_difference_factor(10, 10), 10);
        assert_eq!(level_difference_factor(10, 11), 10);
        assert_eq!(level_difference_factor(10, 12), 8);
        assert_eq!(level_difference_factor(10, 15), 2);
        assert_eq!(level_difference_factor(10, 16), 1);
        assert_eq!(level_difference_factor(1, 80), 1);
        assert_eq!(level_difference_factor(80, 1), 10);
    }

    #[test]
    fn test_xp_value_scales_with_level_gap() {
        let tables = sample_tables();
        let config = WorldConfig::default();
        let ctx = QuestContext::new(&tables, &config);
        let quest = quest(42, 2, 0);

        // Same level: full 180
        assert_eq!(quest.xp_value(Some(&TestViewer::new(10, 10)), ctx), 180);
        // Four levels above: factor 4 -> 72 -> 70
        assert_eq!(quest.xp_value(Some(&TestViewer::new(14, 10)), ctx), 70);
        // Far above: factor 1 -> 18 -> 20
        assert_eq!(quest.xp_value(Some(&TestViewer::new(30, 10)), ctx), 20);
    }

    #[test]
    fn test_xp_value_uses_content_tuning_multiplier() {
        let tables = sample_tables();
        let config = WorldConfig::default();
        let ctx = QuestContext::new(&tables, &config);

        // Tuning 43 halves the base: 270 -> 135 -> 140
        let quest = quest(43, 3, 0);
        assert_eq!(quest.xp_value(Some(&TestViewer::new(10, 10)), ctx), 140);
    }

    #[test]
    fn test_xp_value_zero_cases() {
        let tables = sample_tables();
        let config = WorldConfig::default();
        let ctx = QuestContext::new(&tables, &config);

        assert_eq!(quest(42, 2, 0).xp_value(None, ctx), 0);
        assert_eq!(quest(42, 10, 0).xp_value(Some(&TestViewer::new(10, 10)), ctx), 0);
        assert_eq!(quest(42, 2, 0).xp_value(Some(&TestViewer::new(11, 11)), ctx), 0);
    }

    #[test]
    fn test_xp_value_old_expansion_penalty() {
        let tables = sample_tables();
        let config = WorldConfig::default();
        let ctx = QuestContext::new(&tables, &config);
        let viewer = TestViewer::new(70, 70).with_expansion(CURRENT_EXPANSION);

        let mut old = quest(0, 1, 0);
        old.expansion = 2;
        // 4500 / 9 = 500
        assert_eq!(old.xp_value(Some(&viewer), ctx), 500);

        let mut current = quest(0, 1, 0);
        current.expansion = CURRENT_EXPANSION;
        assert_eq!(current.xp_value(Some(&viewer), ctx), 4500);

        // Session still on an older expansion
        let legacy_session = TestViewer::new(70, 70).with_expansion(CURRENT_EXPANSION - 1);
        assert_eq!(old.xp_value(Some(&legacy_session), ctx), 4500);
    }

    #[test]
    fn test_min_scaled_xp_ratio_floor() {
        let tables = sample_tables();
        let config = WorldConfig {
            min_quest_scaled_xp_ratio: 50,
            ..Default::default()
        };
        let ctx = QuestContext::new(&tables, &config);
        let quest = quest(42, 2, 0);

        // Factor 1 would give 20, floor is half of 180
        assert_eq!(quest.xp_value(Some(&TestViewer::new(30, 10)), ctx), 90);
        // Floor never lowers a larger reward
        assert_eq!(quest.xp_value(Some(&TestViewer::new(10, 10)), ctx), 180);
    }

    #[test]
    fn test_money_values() {
        let tables = sample_tables();
        let config = WorldConfig {
            rate_money_quest: 2.0,
            ..Default::default()
        };
        let ctx = QuestContext::new(&tables, &config);
        let mut quest = quest(42, 0, 3);
        quest.money_multiplier = 1.5;

        let viewer = TestViewer::new(10, 10);
        assert_eq!(quest.money_value(&viewer, ctx), 450);
        assert_eq!(quest.quest_money_reward(&viewer, ctx), 900);
        // Band 42 tops out at level 20
        assert_eq!(quest.max_money_value(ctx), 4500);
        assert_eq!(quest.max_money_reward(ctx), 9000);

        // No table entry for the level
        assert_eq!(quest.money_value(&TestViewer::new(15, 15), ctx), 0);
        // No content tuning entry
        quest.content_tuning_id = 777;
        assert_eq!(quest.max_money_value(ctx), 0);
        // Tier out of range
        quest.money_difficulty = 40;
        assert_eq!(quest.money_value(&viewer, ctx), 0);
    }

    #[test]
    fn test_money_reward_at_max_level() {
        let config = WorldConfig {
            rate_money_max_level_quest: 1.5,
            ..Default::default()
        };
        let mut quest = quest(0, 0, 0);
        quest.bonus_money = 1000;
        assert_eq!(quest.money_reward_at_max_level(&config), 1500);

        quest.flags.insert(QuestFlags::NO_MONEY_FOR_XP);
        assert_eq!(quest.money_reward_at_max_level(&config), 0);
    }

    #[test]
    fn test_quest_xp_reward_applies_rate() {
        let tables = sample_tables();
        let config = WorldConfig {
            rate_xp_quest: 2.0,
            ..Default::default()
        };
        let ctx = QuestContext::new(&tables, &config);
        let quest = quest(42, 2, 0);

        assert_eq!(quest.quest_xp_reward(&TestViewer::new(10, 10), ctx), 360);
    }

    proptest! {
        #[test]
        fn prop_round_xp_value_is_idempotent(xp in 0u32..10_000_000) {
            let rounded = round_xp_value(xp);
            prop_assert_eq!(round_xp_value(rounded), rounded);
        }

        #[test]
        fn prop_level_difference_factor_is_clamped(quest_level in 0u32..200, level in 0u32..200) {
            let factor = level_difference_factor(quest_level, level);
            prop_assert!((1..=10).contains(&factor));
        }

        #[test]
        fn prop_rewards_are_zero_without_tables(
            level in 1u32..100,
            quest_level in 1u32..100,
            xp_difficulty in 0u32..12,
            money_difficulty in 0u32..12,
        ) {
            let tables = GameTables::new();
            let config = WorldConfig::default();
            let ctx = QuestContext::new(&tables, &config);
            let quest = quest(42, xp_difficulty, money_difficulty);
            let viewer = TestViewer::new(level, quest_level);

            prop_assert_eq!(quest.xp_value(Some(&viewer), ctx), 0);
            prop_assert_eq!(quest.money_value(&viewer, ctx), 0);
            prop_assert_eq!(quest.max_money_value(ctx), 0);
        }
    }
}
