use serde::Deserialize;

use crate::locale::LocalizedText;

/// Per-locale overrides of a quest's top-level text fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuestTemplateLocale {
    pub quest_id: u32,
    pub log_title: LocalizedText,
    pub log_description: LocalizedText,
    pub quest_description: LocalizedText,
    pub area_description: LocalizedText,
    pub quest_completion_log: LocalizedText,
    pub portrait_giver_text: LocalizedText,
    pub portrait_giver_name: LocalizedText,
    pub portrait_turn_in_text: LocalizedText,
    pub portrait_turn_in_name: LocalizedText,
}

/// Per-locale overrides of one objective's description
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuestObjectivesLocale {
    pub objective_id: u32,
    pub description: LocalizedText,
}
