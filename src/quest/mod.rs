//! Quest System Module
//!
//! Quest templates assembled from relational rows, the reward formulas that
//! price them for a character, and the localized snapshots sent to clients.
//! Catalogs are built from TOML row files and hot-reloadable.

pub mod assembler;
pub mod context;
pub mod definition;
pub mod query;
pub mod registry;
pub mod rewards;
pub mod rows;

#[cfg(test)]
pub(crate) mod testing;

pub use context::QuestContext;
pub use definition::{
    CompletionEffect, ConditionalText, Difficulty, QuestFlags, QuestObjective, QuestObjectiveType,
    QuestSpecialFlags, QuestTemplate, RewardDisplaySpell,
};
pub use query::{QueryQuestInfoResponse, QuestInfo, QuestRewards};
pub use registry::{HotReloadEvent, LoadSummary, QuestCatalog, QuestRegistry};
pub use rewards::round_xp_value;
pub use rows::QuestRowSet;
