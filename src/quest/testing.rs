//! Test fixtures shared by the quest modules.

use std::collections::HashSet;

use crate::data::{ContentTuningEntry, GameTables, QuestMoneyRewardEntry, QuestXpEntry};
use crate::player::QuestViewer;

pub fn row(content: &str) -> toml::Table {
    content.parse::<toml::Table>().unwrap()
}

/// Catalogs with a handful of known ids and a few reward table levels
pub fn sample_tables() -> GameTables {
    let mut tables = GameTables::new();
    tables
        .add_spell(133)
        .add_spell(8921)
        .add_spell(588)
        .add_emote(1)
        .add_emote(2)
        .add_emote(3)
        .add_player_condition(5000)
        .add_player_condition(5001)
        .add_condition_registration(90000)
        .add_script_name("npc_guard_quest", 12)
        .add_quest_xp(QuestXpEntry {
            level: 10,
            difficulty: [0, 90, 180, 270, 360, 450, 540, 630, 720, 810],
        })
        .add_quest_xp(QuestXpEntry {
            level: 70,
            difficulty: [0, 4500, 9000, 13500, 18000, 22500, 27000, 31500, 36000, 40500],
        })
        .add_quest_money_reward(QuestMoneyRewardEntry {
            level: 10,
            difficulty: [0, 100, 200, 300, 400, 500, 600, 700, 800, 900],
        })
        .add_quest_money_reward(QuestMoneyRewardEntry {
            level: 20,
            difficulty: [0, 1000, 2000, 3000, 4000, 5000, 6000, 7000, 8000, 9000],
        })
        .add_content_tuning(ContentTuningEntry {
            id: 42,
            min_level: 10,
            max_level: 20,
            quest_xp_multiplier: 1.0,
        })
        .add_content_tuning(ContentTuningEntry {
            id: 43,
            min_level: 10,
            max_level: 30,
            quest_xp_multiplier: 0.5,
        });
    tables
}

/// Scripted character: fixed level, fixed quest level, a set of met conditions
#[derive(Debug, Clone)]
pub struct TestViewer {
    pub level: u32,
    pub quest_level: u32,
    pub expansion: i32,
    pub met_conditions: HashSet<u32>,
}

impl TestViewer {
    pub fn new(level: u32, quest_level: u32) -> Self {
        Self {
            level,
            quest_level,
            expansion: 0,
            met_conditions: HashSet::new(),
        }
    }

    pub fn with_expansion(mut self, expansion: i32) -> Self {
        self.expansion = expansion;
        self
    }

    pub fn meeting(mut self, condition_id: u32) -> Self {
        self.met_conditions.insert(condition_id);
        self
    }
}

impl QuestViewer for TestViewer {
    fn level(&self) -> u32 {
        self.level
    }

    fn quest_level(&self, _content_tuning_id: u32) -> u32 {
        self.quest_level
    }

    fn session_expansion(&self) -> i32 {
        self.expansion
    }

    fn meets_player_condition(&self, condition_id: u32) -> bool {
        self.met_conditions.contains(&condition_id)
    }
}
