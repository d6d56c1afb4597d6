//! Error types for quest catalog loading.

use std::path::PathBuf;

/// Errors raised while loading quest data.
///
/// Only `MalformedRow` on the primary `quest_template` table and
/// `DuplicateQuest` abort a quest; every other content problem is logged and
/// recovered where it happens.
#[derive(Debug, thiserror::Error)]
pub enum QuestError {
    /// A row does not fit the column layout of its table.
    #[error("malformed `{table}` row (quest {quest_id:?}): {source}")]
    MalformedRow {
        table: &'static str,
        quest_id: Option<u32>,
        #[source]
        source: toml::de::Error,
    },

    /// A primary row repeats an id that is already loaded.
    #[error("duplicate quest id {0}")]
    DuplicateQuest(u32),

    /// A data or config file could not be read.
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data or config file is not valid TOML for its schema.
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The hot-reload watcher could not be started.
    #[error("file watcher error: {0}")]
    Watcher(String),
}

/// Convenience result type for quest loading.
pub type QuestResult<T> = Result<T, QuestError>;
