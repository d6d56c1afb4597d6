use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info, warn};

use quest_catalog::data::GameTables;
use quest_catalog::quest::{HotReloadEvent, QuestRegistry};
use quest_catalog::{Locale, WorldConfig};

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "quest-catalog", about = "Load quest data and print localized quest snapshots")]
struct Args {
    /// Directory holding tables.toml and the quests/ row files
    #[arg(default_value = "data")]
    data_dir: PathBuf,

    /// Rebuild the catalog whenever a quest file changes
    #[arg(long)]
    watch: bool,

    /// Print the snapshot of this quest as JSON
    #[arg(long, value_name = "QUEST_ID")]
    dump: Option<u32>,

    /// Locale of the printed snapshot (defaults to enUS)
    #[arg(long, value_name = "LOCALE", requires = "dump", value_parser = parse_locale)]
    locale: Option<Locale>,
}

impl Args {
    fn dump_request(&self) -> Option<(u32, Locale)> {
        self.dump.map(|quest_id| (quest_id, self.locale.unwrap_or(Locale::EnUs)))
    }
}

fn parse_locale(name: &str) -> Result<Locale, String> {
    Locale::from_name(name).ok_or_else(|| format!("unknown locale '{}'", name))
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "quest_catalog=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let config = match WorldConfig::load(&PathBuf::from("config.toml")) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load world config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let tables = match GameTables::load_from_file(&args.data_dir.join("tables.toml")) {
        Ok(tables) => tables,
        Err(e) => {
            error!("Failed to load game tables: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let registry = Arc::new(QuestRegistry::new(&args.data_dir, Arc::new(tables), Arc::new(config)));
    match registry.load_all().await {
        Ok(summary) => info!(
            "Quest catalog ready: {} quests, {} rejected, {} broken chain links",
            summary.templates_loaded, summary.templates_rejected, summary.broken_chain_links
        ),
        Err(e) => {
            error!("Failed to load quest registry: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if let Some((quest_id, locale)) = args.dump_request() {
        let Some(response) = registry.query_response(quest_id, locale).await else {
            error!("Quest {} is not loaded", quest_id);
            return ExitCode::FAILURE;
        };

        match serde_json::to_string_pretty(&*response) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize quest {}: {}", quest_id, e);
                return ExitCode::FAILURE;
            }
        }
    }

    if args.watch {
        match registry.start_file_watcher() {
            Ok(mut rx) => {
                // Spawn task to log reload events
                tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        match event {
                            HotReloadEvent::Reloaded { path, summary } => {
                                info!("Quest hot-reload after change to {}: {} quests", path, summary.templates_loaded);
                            }
                            HotReloadEvent::Error(e) => {
                                error!("Quest hot-reload error: {}", e);
                            }
                        }
                    }
                });
                info!("Quest hot-reload enabled, press Ctrl-C to stop");
            }
            Err(e) => {
                warn!("Failed to start quest hot-reload: {}", e);
                return ExitCode::FAILURE;
            }
        }

        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            return ExitCode::FAILURE;
        }
        info!("Shutting down");
    }

    ExitCode::SUCCESS
}
