//! Steamshelf CLI - unified Steam and non-Steam game catalog.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use steamshelf::catalog::store::CatalogStore;
use steamshelf::catalog::tags::TagIndex;
use steamshelf::catalog::{CatalogKind, GameEntry};
use steamshelf::config::ShelfConfig;
use steamshelf::logging::init_logging;
use steamshelf::remote::fetch_owned_games;
use steamshelf::sync::{
    sync_remote_catalog, sync_shortcut_catalog, RemoteSyncRequest, ShortcutSyncRequest,
    SyncGuard, SyncObserver,
};
use steamshelf::views::{
    format_all_games, format_game_rows, format_last_play_time, format_tag_overview,
};

/// Steamshelf - unified Steam and non-Steam game catalog
#[derive(Parser)]
#[command(name = "steamshelf")]
#[command(about = "Unified Steam and non-Steam game catalog for media-center frontends")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for catalog documents (overrides configuration)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the steam catalog from the remote ownership API
    SyncSteam,
    /// Rebuild the non-steam catalog from the shortcuts container
    SyncShortcuts,
    /// List the catalog grouped by tag
    List {
        /// Show only the games carrying this tag
        #[arg(long)]
        tag: Option<String>,
        /// Show every game in one flat listing
        #[arg(long)]
        all: bool,
    },
    /// Show catalog locations, sizes, and last scan time
    Status,
}

/// Observer printing progress lines to stderr as percent advances.
struct ConsoleObserver {
    last_percent: std::cell::Cell<u8>,
}

impl ConsoleObserver {
    fn new() -> Self {
        ConsoleObserver {
            last_percent: std::cell::Cell::new(u8::MAX),
        }
    }
}

impl SyncObserver for ConsoleObserver {
    fn progress(&self, percent: u8, status: &str) {
        if self.last_percent.replace(percent) != percent {
            eprintln!("[{percent:>3}%] {status}");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ShelfConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(data_dir) = cli.data_dir {
        config.paths.data_dir = Some(data_dir);
    }
    init_logging(&config.logging)?;

    let store = CatalogStore::new(config.data_dir().context("no data directory available")?);
    let guard = SyncGuard::new();

    match cli.command {
        Commands::SyncSteam => {
            config.validate_remote()?;
            let _permit = guard.try_acquire(CatalogKind::Steam)?;

            let client = reqwest::Client::new();
            let raw_games = fetch_owned_games(
                &client,
                &config.steam.endpoint,
                &config.steam.owner_id,
                &config.steam.api_key,
            )
            .await?;

            let request = RemoteSyncRequest {
                library_cache: config.paths.library_cache.as_deref(),
                grid_dir: config.paths.steam_grid.as_deref(),
                nfo_dir: config.paths.nfo_files.as_deref(),
            };
            let count = sync_remote_catalog(&raw_games, &request, &store, &ConsoleObserver::new())?;
            println!("Steam catalog updated: {count} games.");
        }
        Commands::SyncShortcuts => {
            let shortcuts_path = config.validate_shortcuts()?.to_path_buf();
            let _permit = guard.try_acquire(CatalogKind::NonSteam)?;

            let request = ShortcutSyncRequest {
                shortcuts_path: &shortcuts_path,
                grid_dir: config.paths.steam_grid.as_deref(),
                url_shortcut_dir: config.paths.url_shortcuts.as_deref(),
            };
            let count = sync_shortcut_catalog(&request, &store, &ConsoleObserver::new())?;
            println!("Non-Steam catalog updated: {count} games.");
        }
        Commands::List { tag, all } => {
            let steam = load_or_empty(&store, CatalogKind::Steam)?;
            let non_steam = load_or_empty(&store, CatalogKind::NonSteam)?;

            if all {
                print!("{}", format_all_games(&steam, &non_steam));
            } else if let Some(tag) = tag {
                let index = TagIndex::build(&steam, &non_steam);
                match index.bucket(&tag) {
                    Some(entries) => print!("{}", format_game_rows(&tag, entries)),
                    None => println!("No games carry the tag {tag:?}."),
                }
            } else {
                let index = TagIndex::build(&steam, &non_steam);
                print!("{}", format_tag_overview(&index));
            }
        }
        Commands::Status => {
            println!("Data directory: {}", store.data_dir().display());
            for kind in [CatalogKind::Steam, CatalogKind::NonSteam] {
                match store.load(kind)? {
                    Some(entries) => {
                        println!("{} catalog: {} games", kind, entries.len())
                    }
                    None => println!("{kind} catalog: never synced"),
                }
            }
            match store.last_scan()? {
                Some(stamp) => println!(
                    "Last scan: {}",
                    format_last_play_time(Some(stamp as u64))
                ),
                None => println!("Last scan: never"),
            }
        }
    }

    Ok(())
}

/// A catalog that was never synced lists as empty, with a hint logged.
fn load_or_empty(store: &CatalogStore, kind: CatalogKind) -> Result<Vec<GameEntry>> {
    match store.load(kind)? {
        Some(entries) => Ok(entries),
        None => {
            tracing::info!(kind = %kind, "catalog never synced");
            Ok(Vec::new())
        }
    }
}
