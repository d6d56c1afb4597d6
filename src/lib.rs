//! Quest catalog: template assembly, reward computation and localized
//! query snapshots for quest data loaded from TOML rows.

pub mod config;
pub mod data;
pub mod error;
pub mod locale;
pub mod player;
pub mod quest;

pub use config::WorldConfig;
pub use error::{QuestError, QuestResult};
pub use locale::Locale;
