//! Quest Context
//!
//! The catalogs and world configuration every assembler pass, reward formula
//! and snapshot build reads from. Passed explicitly so a generation is built
//! against one consistent view of both.

use crate::config::WorldConfig;
use crate::data::GameTables;

/// Read-only view of the collaborators a quest operation consults
#[derive(Debug, Clone, Copy)]
pub struct QuestContext<'a> {
    pub tables: &'a GameTables,
    pub config: &'a WorldConfig,
}

impl<'a> QuestContext<'a> {
    pub fn new(tables: &'a GameTables, config: &'a WorldConfig) -> Self {
        Self { tables, config }
    }
}
