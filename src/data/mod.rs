pub mod quest_locale;
pub mod tables;

pub use quest_locale::{QuestObjectivesLocale, QuestTemplateLocale};
pub use tables::{
    ContentTuningEntry, GameTables, QuestInfoEntry, QuestMoneyRewardEntry, QuestXpEntry,
    CURRENT_EXPANSION, QUEST_DIFFICULTY_COUNT,
};
