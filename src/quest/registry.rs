//! Quest Registry
//!
//! Loads quest rows from TOML files, assembles them into a catalog
//! generation and swaps whole generations in on reload. Readers hold an
//! `Arc` to the generation they started with.
//! Supports hot-reloading during development.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use super::context::QuestContext;
use super::definition::QuestTemplate;
use super::query::{LocaleSnapshots, QueryQuestInfoResponse};
use super::rows::{
    self, parse_row, QuestRow, QuestRowSet, RawConditionalText, RawQuestDetails,
    RawQuestMailSender, RawQuestObjective, RawQuestOfferReward, RawQuestRequestItems,
    RawQuestTemplateAddon, RawQuestVisualEffect, RawRewardChoiceItems, RawRewardDisplaySpell,
    RawTreasurePicker,
};
use crate::config::WorldConfig;
use crate::data::GameTables;
use crate::error::{QuestError, QuestResult};
use crate::locale::{Locale, DEFAULT_LOCALE};

/// Counters reported after building a catalog generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub templates_loaded: usize,
    pub templates_rejected: usize,
    pub rows_applied: usize,
    pub rows_skipped: usize,
    pub broken_chain_links: usize,
}

// ============================================================================
// Catalog Generation
// ============================================================================

/// One immutable generation of loaded quests
#[derive(Debug)]
pub struct QuestCatalog {
    quests: HashMap<u32, Arc<QuestTemplate>>,
    snapshots: HashMap<u32, LocaleSnapshots>,
    generation: u64,
    loaded_at: DateTime<Utc>,
}

impl QuestCatalog {
    pub fn empty() -> Self {
        Self {
            quests: HashMap::new(),
            snapshots: HashMap::new(),
            generation: 0,
            loaded_at: Utc::now(),
        }
    }

    /// Assemble every quest in `rows` and pre-build its snapshots
    pub fn build(rows: QuestRowSet, ctx: QuestContext<'_>) -> (Self, LoadSummary) {
        let mut summary = LoadSummary::default();
        let mut quests: BTreeMap<u32, QuestTemplate> = BTreeMap::new();

        for raw in rows.quest_template {
            let result = QuestTemplate::parse(raw).and_then(|quest| {
                if quests.contains_key(&quest.id) {
                    Err(QuestError::DuplicateQuest(quest.id))
                } else {
                    Ok(quest)
                }
            });

            match result {
                Ok(quest) => {
                    quests.insert(quest.id, quest);
                }
                Err(e) => {
                    error!("Failed to load quest template: {}", e);
                    summary.templates_rejected += 1;
                }
            }
        }
        summary.templates_loaded = quests.len();

        apply_rows::<RawRewardDisplaySpell>(
            &mut quests,
            rows::QUEST_REWARD_DISPLAY_SPELL,
            rows.quest_reward_display_spell,
            &mut summary,
            |quest, row| quest.load_reward_display_spell(row, ctx),
        );
        apply_rows::<RawRewardChoiceItems>(
            &mut quests,
            rows::QUEST_REWARD_CHOICE_ITEMS,
            rows.quest_reward_choice_items,
            &mut summary,
            |quest, row| quest.load_reward_choice_items(row),
        );
        apply_rows::<RawQuestDetails>(
            &mut quests,
            rows::QUEST_DETAILS,
            rows.quest_details,
            &mut summary,
            |quest, row| quest.load_quest_details(row, ctx),
        );
        apply_rows::<RawQuestRequestItems>(
            &mut quests,
            rows::QUEST_REQUEST_ITEMS,
            rows.quest_request_items,
            &mut summary,
            |quest, row| quest.load_quest_request_items(row, ctx),
        );
        apply_rows::<RawQuestOfferReward>(
            &mut quests,
            rows::QUEST_OFFER_REWARD,
            rows.quest_offer_reward,
            &mut summary,
            |quest, row| quest.load_quest_offer_reward(row, ctx),
        );
        apply_rows::<RawQuestTemplateAddon>(
            &mut quests,
            rows::QUEST_TEMPLATE_ADDON,
            rows.quest_template_addon,
            &mut summary,
            |quest, row| quest.load_quest_template_addon(row, ctx),
        );
        apply_rows::<RawQuestMailSender>(
            &mut quests,
            rows::QUEST_MAIL_SENDER,
            rows.quest_mail_sender,
            &mut summary,
            |quest, row| quest.load_quest_mail_sender(row),
        );
        apply_rows::<RawQuestObjective>(
            &mut quests,
            rows::QUEST_OBJECTIVES,
            rows.quest_objectives,
            &mut summary,
            |quest, row| quest.load_quest_objective(row),
        );
        apply_rows::<RawQuestVisualEffect>(
            &mut quests,
            rows::QUEST_VISUAL_EFFECT,
            rows.quest_visual_effect,
            &mut summary,
            |quest, row| quest.load_quest_objective_visual_effect(row),
        );
        apply_rows::<RawConditionalText>(
            &mut quests,
            rows::QUEST_DESCRIPTION_CONDITIONAL,
            rows.quest_description_conditional,
            &mut summary,
            |quest, row| quest.load_conditional_quest_description(row, ctx),
        );
        apply_rows::<RawConditionalText>(
            &mut quests,
            rows::QUEST_REQUEST_ITEMS_CONDITIONAL,
            rows.quest_request_items_conditional,
            &mut summary,
            |quest, row| quest.load_conditional_request_items_text(row, ctx),
        );
        apply_rows::<RawConditionalText>(
            &mut quests,
            rows::QUEST_OFFER_REWARD_CONDITIONAL,
            rows.quest_offer_reward_conditional,
            &mut summary,
            |quest, row| quest.load_conditional_offer_reward_text(row, ctx),
        );
        apply_rows::<RawConditionalText>(
            &mut quests,
            rows::QUEST_COMPLETION_LOG_CONDITIONAL,
            rows.quest_completion_log_conditional,
            &mut summary,
            |quest, row| quest.load_conditional_quest_completion_log(row, ctx),
        );
        apply_rows::<RawTreasurePicker>(
            &mut quests,
            rows::QUEST_TREASURE_PICKERS,
            rows.quest_treasure_pickers,
            &mut summary,
            |quest, row| quest.load_treasure_picker(row),
        );

        summary.broken_chain_links = validate_quest_chains(&quests);

        let snapshots = quests
            .values()
            .map(|quest| (quest.id, quest.initialize_query_data(ctx)))
            .collect();

        let catalog = Self {
            quests: quests.into_iter().map(|(id, quest)| (id, Arc::new(quest))).collect(),
            snapshots,
            generation: 0,
            loaded_at: Utc::now(),
        };

        (catalog, summary)
    }

    /// Get a quest by ID
    pub fn get(&self, quest_id: u32) -> Option<Arc<QuestTemplate>> {
        self.quests.get(&quest_id).cloned()
    }

    /// Cached viewer-independent snapshot; locales that were not pre-built
    /// fall back to the default locale
    pub fn query_response(&self, quest_id: u32, locale: Locale) -> Option<Arc<QueryQuestInfoResponse>> {
        let snapshots = self.snapshots.get(&quest_id)?;
        snapshots.get(locale).or_else(|| snapshots.get(DEFAULT_LOCALE))
    }

    /// All quest IDs, ascending
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.quests.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

/// Bind each row of one side table and hand it to its quest
fn apply_rows<R: QuestRow>(
    quests: &mut BTreeMap<u32, QuestTemplate>,
    table: &'static str,
    rows: Vec<toml::Table>,
    summary: &mut LoadSummary,
    mut apply: impl FnMut(&mut QuestTemplate, &R),
) {
    for raw in rows {
        let row: R = match parse_row(table, raw) {
            Ok(row) => row,
            Err(e) => {
                warn!("{}. Skipped.", e);
                summary.rows_skipped += 1;
                continue;
            }
        };

        let quest_id = row.quest_id();
        let Some(quest) = quests.get_mut(&quest_id) else {
            warn!(
                "Table `{}` has data for quest {} but such quest does not exist. Skipped.",
                table, quest_id
            );
            summary.rows_skipped += 1;
            continue;
        };

        apply(quest, &row);
        summary.rows_applied += 1;
    }
}

/// Warn about chain links pointing at quests that were not loaded
fn validate_quest_chains(quests: &BTreeMap<u32, QuestTemplate>) -> usize {
    let mut broken = 0;

    for quest in quests.values() {
        let links = [
            ("previous", quest.addon.prev_quest_id.unsigned_abs()),
            ("next", quest.addon.next_quest_id),
            ("next in chain", quest.next_quest_in_chain),
            ("breadcrumb", quest.addon.breadcrumb_for_quest_id.unsigned_abs()),
        ];

        for (kind, linked_id) in links {
            if linked_id != 0 && !quests.contains_key(&linked_id) {
                warn!(
                    "Quest {} references non-existent {} quest {}",
                    quest.id, kind, linked_id
                );
                broken += 1;
            }
        }
    }

    broken
}

// ============================================================================
// Registry
// ============================================================================

/// Owner of the current catalog generation
pub struct QuestRegistry {
    current: RwLock<Arc<QuestCatalog>>,
    generation: AtomicU64,
    /// Held from reading rows until the new generation is current
    reload: Mutex<()>,
    tables: Arc<GameTables>,
    config: Arc<WorldConfig>,
    /// Base directory for quest row files
    data_dir: PathBuf,
}

impl QuestRegistry {
    pub fn new(data_dir: &Path, tables: Arc<GameTables>, config: Arc<WorldConfig>) -> Self {
        Self {
            current: RwLock::new(Arc::new(QuestCatalog::empty())),
            generation: AtomicU64::new(0),
            reload: Mutex::new(()),
            tables,
            config,
            data_dir: data_dir.join("quests"),
        }
    }

    pub fn context(&self) -> QuestContext<'_> {
        QuestContext::new(&self.tables, &self.config)
    }

    /// Load every quest row file under the data directory and swap in the result
    pub async fn load_all(&self) -> QuestResult<LoadSummary> {
        let _reload = self.reload.lock().await;
        info!("Loading quests from {:?}", self.data_dir);

        if !self.data_dir.exists() {
            warn!("Quest directory does not exist: {:?}", self.data_dir);
            return Ok(self.swap_in(QuestRowSet::default()).await);
        }

        // Collect all TOML files first, sorted so merge order is stable
        let mut paths = Vec::new();
        collect_row_files(&self.data_dir, &mut paths)?;
        paths.sort();

        let mut rows = QuestRowSet::default();
        for path in paths {
            match read_row_file(&path) {
                Ok(file_rows) => {
                    debug!("Read quest rows from {:?}", path);
                    rows.merge(file_rows);
                }
                Err(e) => warn!("Failed to load quest file {:?}: {}", path, e),
            }
        }

        Ok(self.swap_in(rows).await)
    }

    /// Build a generation from `rows` and make it current
    pub async fn load_rows(&self, rows: QuestRowSet) -> LoadSummary {
        let _reload = self.reload.lock().await;
        self.swap_in(rows).await
    }

    async fn swap_in(&self, rows: QuestRowSet) -> LoadSummary {
        let (mut catalog, summary) = QuestCatalog::build(rows, self.context());
        catalog.generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        info!(
            "Loaded {} quest templates (generation {}, {} rejected, {} side rows applied, {} skipped)",
            summary.templates_loaded,
            catalog.generation,
            summary.templates_rejected,
            summary.rows_applied,
            summary.rows_skipped
        );

        *self.current.write().await = Arc::new(catalog);
        summary
    }

    /// The current generation
    pub async fn catalog(&self) -> Arc<QuestCatalog> {
        Arc::clone(&*self.current.read().await)
    }

    /// Get a quest by ID
    pub async fn get(&self, quest_id: u32) -> Option<Arc<QuestTemplate>> {
        self.current.read().await.get(quest_id)
    }

    pub async fn query_response(&self, quest_id: u32, locale: Locale) -> Option<Arc<QueryQuestInfoResponse>> {
        self.current.read().await.query_response(quest_id, locale)
    }

    /// Get count of loaded quests
    pub async fn count(&self) -> usize {
        self.current.read().await.len()
    }

    /// Start file watcher for hot-reload
    /// Returns a channel receiver that signals when reloads occur
    pub fn start_file_watcher(
        self: &Arc<Self>,
    ) -> QuestResult<tokio::sync::mpsc::Receiver<HotReloadEvent>> {
        use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
        use std::time::Duration;

        let rt = tokio::runtime::Handle::try_current()
            .map_err(|e| QuestError::Watcher(e.to_string()))?;
        let (tx, rx) = tokio::sync::mpsc::channel(32);
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                if let Ok(event) = res {
                    let _ = notify_tx.send(event);
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )
        .map_err(|e| QuestError::Watcher(e.to_string()))?;

        watcher
            .watch(&self.data_dir, RecursiveMode::Recursive)
            .map_err(|e| QuestError::Watcher(e.to_string()))?;

        info!("Quest hot-reload watcher started for {:?}", self.data_dir);

        let registry = Arc::clone(self);

        // notify delivers events on a plain channel; drain it off the runtime
        std::thread::spawn(move || {
            let _watcher = watcher;

            while let Ok(event) = notify_rx.recv() {
                if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)) {
                    continue;
                }

                let Some(path) = event
                    .paths
                    .iter()
                    .find(|path| path.extension().is_some_and(|ext| ext == "toml"))
                else {
                    continue;
                };

                info!("Detected change in {:?}, triggering reload", path);

                let reg = Arc::clone(&registry);
                let tx = tx.clone();
                let path = path.to_string_lossy().to_string();

                rt.spawn(async move {
                    match reg.load_all().await {
                        Ok(summary) => {
                            info!("Hot-reload completed successfully");
                            let _ = tx.send(HotReloadEvent::Reloaded { path, summary }).await;
                        }
                        Err(e) => {
                            error!("Hot-reload failed: {}", e);
                            let _ = tx.send(HotReloadEvent::Error(e.to_string())).await;
                        }
                    }
                });
            }
        });

        Ok(rx)
    }
}

/// Events from the hot-reload watcher
#[derive(Debug, Clone)]
pub enum HotReloadEvent {
    /// Quest files were reloaded after a change to `path`
    Reloaded { path: String, summary: LoadSummary },
    /// An error occurred during reload
    Error(String),
}

fn collect_row_files(dir: &Path, paths: &mut Vec<PathBuf>) -> QuestResult<()> {
    let io_error = |source| QuestError::Io {
        path: dir.to_path_buf(),
        source,
    };

    for entry in std::fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();

        if path.is_dir() {
            collect_row_files(&path, paths)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            paths.push(path);
        }
    }

    Ok(())
}

fn read_row_file(path: &Path) -> QuestResult<QuestRowSet> {
    let content = std::fs::read_to_string(path).map_err(|source| QuestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    QuestRowSet::from_toml_str(&content).map_err(|source| QuestError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::testing::sample_tables;
    use tempfile::TempDir;

    fn create_test_quest_toml() -> &'static str {
        r#"
[[quest_template]]
id = 100
content_tuning_id = 42
reward_money_difficulty = 1
reward_money_multiplier = 1
log_title = "Wolves at the Gate"
reward_item_1 = 2000
reward_amount_1 = 1

[[quest_template]]
id = 101
reward_next_quest = 100
log_title = "Report Back"

[[quest_template_addon]]
quest_id = 101
prev_quest_id = 100
next_quest_id = 555

[[quest_objectives]]
quest_id = 100
id = 1000
type = 0
object_id = 299
amount = 8
description = "Wolves slain"

[[quest_description_conditional]]
quest_id = 100
player_condition_id = 5000
text = "The wolves are restless."
locale = "enUS"
"#
    }

    fn create_side_rows_toml() -> &'static str {
        r#"
[[quest_details]]
quest_id = 100
emote_1 = 1
emote_delay_1 = 500

[[quest_description_conditional]]
quest_id = 100
player_condition_id = 5000
text = "Les loups sont agités."
locale = "frFR"

[[quest_treasure_pickers]]
quest_id = 404
treasure_picker_id = 1
"#
    }

    fn registry(temp_dir: &TempDir, config: WorldConfig) -> QuestRegistry {
        QuestRegistry::new(temp_dir.path(), Arc::new(sample_tables()), Arc::new(config))
    }

    fn write_quest_files(temp_dir: &TempDir) {
        let quest_dir = temp_dir.path().join("quests");
        std::fs::create_dir_all(quest_dir.join("elwynn")).unwrap();
        std::fs::write(quest_dir.join("wolves.toml"), create_test_quest_toml()).unwrap();
        std::fs::write(quest_dir.join("elwynn").join("side.toml"), create_side_rows_toml()).unwrap();
        std::fs::write(quest_dir.join("notes.txt"), "not quest data").unwrap();
    }

    #[tokio::test]
    async fn test_load_quests_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        write_quest_files(&temp_dir);

        let registry = registry(&temp_dir, WorldConfig::default());
        let summary = registry.load_all().await.unwrap();

        assert_eq!(summary.templates_loaded, 2);
        assert_eq!(summary.templates_rejected, 0);
        assert_eq!(summary.rows_applied, 5);
        assert_eq!(summary.rows_skipped, 1);
        assert_eq!(summary.broken_chain_links, 1);
        assert_eq!(registry.count().await, 2);

        let quest = registry.get(100).await.unwrap();
        assert_eq!(quest.text.log_title, "Wolves at the Gate");
        assert_eq!(quest.objectives[0].amount, 8);
        assert_eq!(quest.details_emotes[0].delay, 500);
        assert_eq!(quest.conditional_quest_description.len(), 1);
        assert_eq!(
            quest.conditional_quest_description[0].text.get(Locale::FrFr),
            Some("Les loups sont agités.")
        );

        let catalog = registry.catalog().await;
        assert_eq!(catalog.ids(), vec![100, 101]);
        assert_eq!(catalog.generation(), 1);
    }

    #[tokio::test]
    async fn test_missing_directory_yields_empty_catalog() {
        let temp_dir = TempDir::new().unwrap();
        let registry = registry(&temp_dir, WorldConfig::default());

        let summary = registry.load_all().await.unwrap();
        assert_eq!(summary, LoadSummary::default());
        assert_eq!(registry.count().await, 0);
    }

    #[tokio::test]
    async fn test_unparseable_file_does_not_block_others() {
        let temp_dir = TempDir::new().unwrap();
        write_quest_files(&temp_dir);
        std::fs::write(temp_dir.path().join("quests").join("broken.toml"), "[[quest_template]\nid = ").unwrap();

        let registry = registry(&temp_dir, WorldConfig::default());
        registry.load_all().await.unwrap();

        assert_eq!(registry.count().await, 2);
    }

    #[test]
    fn test_bad_primary_rows_only_reject_themselves() {
        let tables = sample_tables();
        let config = WorldConfig::default();
        let rows = QuestRowSet::from_toml_str(
            r#"
[[quest_template]]
id = 1
log_title = "First"

[[quest_template]]
id = 1
log_title = "Second"

[[quest_template]]
id = 2
quest_type = "daily"

[[quest_template]]
id = 3

[[quest_objectives]]
quest_id = 3
id = "not a number"

[[quest_objectives]]
quest_id = 2
id = 20
"#,
        )
        .unwrap();

        let (catalog, summary) = QuestCatalog::build(rows, QuestContext::new(&tables, &config));

        assert_eq!(summary.templates_loaded, 2);
        assert_eq!(summary.templates_rejected, 2);
        assert_eq!(summary.rows_applied, 0);
        assert_eq!(summary.rows_skipped, 2);
        assert_eq!(catalog.get(1).unwrap().text.log_title, "First");
        assert!(catalog.get(2).is_none());
        assert!(catalog.get(3).is_some());
    }

    #[test]
    fn test_snapshot_cache() {
        let tables = sample_tables();
        let config = WorldConfig::default();
        let rows = QuestRowSet::from_toml_str(create_test_quest_toml()).unwrap();
        let (catalog, _) = QuestCatalog::build(rows, QuestContext::new(&tables, &config));

        let first = catalog.query_response(100, Locale::DeDe).unwrap();
        let second = catalog.query_response(100, Locale::DeDe).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.info.log_title, "Wolves at the Gate");
        // Band 42 tops out at level 20
        assert_eq!(first.info.reward_money, 1000);
        assert!(catalog.query_response(999, Locale::EnUs).is_none());
    }

    #[test]
    fn test_locales_disabled_serves_default_snapshot() {
        let tables = sample_tables();
        let config = WorldConfig {
            load_locales: false,
            ..Default::default()
        };
        let mut rows = QuestRowSet::from_toml_str(create_test_quest_toml()).unwrap();
        rows.merge(QuestRowSet::from_toml_str(create_side_rows_toml()).unwrap());
        let (catalog, _) = QuestCatalog::build(rows, QuestContext::new(&tables, &config));

        let default = catalog.query_response(100, Locale::EnUs).unwrap();
        let french = catalog.query_response(100, Locale::FrFr).unwrap();
        assert!(Arc::ptr_eq(&default, &french));
        assert_eq!(
            french.info.conditional_quest_description[0].text,
            "The wolves are restless."
        );
    }

    #[tokio::test]
    async fn test_reload_swaps_whole_generation() {
        let temp_dir = TempDir::new().unwrap();
        write_quest_files(&temp_dir);

        let registry = registry(&temp_dir, WorldConfig::default());
        registry.load_all().await.unwrap();
        let before = registry.catalog().await;

        std::fs::remove_file(temp_dir.path().join("quests").join("wolves.toml")).unwrap();
        let summary = registry.load_all().await.unwrap();
        assert_eq!(summary.templates_loaded, 0);

        // A reader holding the old generation still sees it intact
        assert_eq!(before.len(), 2);
        assert!(before.get(100).is_some());

        let after = registry.catalog().await;
        assert!(after.is_empty());
        assert_eq!(after.generation(), before.generation() + 1);
    }

    #[tokio::test]
    async fn test_queued_reload_reads_latest_files() {
        let temp_dir = TempDir::new().unwrap();
        let quest_dir = temp_dir.path().join("quests");
        std::fs::create_dir_all(&quest_dir).unwrap();
        std::fs::write(quest_dir.join("wolves.toml"), "").unwrap();

        let registry = Arc::new(registry(&temp_dir, WorldConfig::default()));

        // A reload in progress holds the lock while the file is rewritten
        let in_progress = registry.reload.lock().await;
        let queued = tokio::spawn({
            let registry = Arc::clone(&registry);
            async move { registry.load_all().await }
        });
        tokio::task::yield_now().await;

        std::fs::write(quest_dir.join("wolves.toml"), create_test_quest_toml()).unwrap();
        drop(in_progress);

        let summary = queued.await.unwrap().unwrap();
        assert_eq!(summary.templates_loaded, 2);

        let (first, second) = tokio::join!(registry.load_all(), registry.load_all());
        assert_eq!(first.unwrap().templates_loaded, 2);
        assert_eq!(second.unwrap().templates_loaded, 2);

        let catalog = registry.catalog().await;
        assert_eq!(catalog.ids(), vec![100, 101]);
        assert_eq!(catalog.generation(), 3);
    }

    #[tokio::test]
    async fn test_sample_data_loads_cleanly() {
        let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
        let tables = GameTables::load_from_file(&data_dir.join("tables.toml")).unwrap();
        assert!(tables.has_emote(0));

        let registry = QuestRegistry::new(&data_dir, Arc::new(tables), Arc::new(WorldConfig::default()));
        let summary = registry.load_all().await.unwrap();

        assert_eq!(summary.templates_loaded, 2);
        assert_eq!(summary.templates_rejected, 0);
        assert_eq!(summary.rows_applied, 10);
        assert_eq!(summary.rows_skipped, 0);
        assert_eq!(summary.broken_chain_links, 0);

        let quest = registry.get(7).await.unwrap();
        assert_eq!(quest.details_emotes[1].emote_id, 5);
        assert_eq!(quest.details_emotes[2].emote_id, 0);
    }
}
