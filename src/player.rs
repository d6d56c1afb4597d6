//! The character a quest is being evaluated for.
//!
//! Player state lives outside this crate; reward computation and snapshot
//! building only need the handful of facts below.

/// A character viewing or turning in a quest
pub trait QuestViewer {
    /// Current character level
    fn level(&self) -> u32;

    /// Quest level as perceived by this character for a content tuning band
    fn quest_level(&self, content_tuning_id: u32) -> u32;

    /// Expansion enabled on the character's session
    fn session_expansion(&self) -> i32;

    /// Whether the character meets a player condition. Id 0 is never asked.
    fn meets_player_condition(&self, condition_id: u32) -> bool;
}
