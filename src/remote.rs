//! Remote Steam Library
//!
//! Fetches the owned-games list from the Steam ownership API and normalizes
//! its records into catalog entries. Artwork comes from two filesystem
//! sources with defined precedence: the user-curated grid directory beats
//! the library cache for capsule, hero, and logo, while icon and header are
//! library-cache only. An NFO side-file named after the game overlays
//! descriptive metadata.

use crate::artwork::{grid_artwork, library_cache_artwork, ArtworkPaths};
use crate::catalog::{CatalogSource, GameEntry};
use crate::error::SyncError;
use crate::nfo::{read_nfo, GameMetadata};
use crate::sync::SyncObserver;
use serde::Deserialize;
use std::path::Path;

/// Default owned-games endpoint of the Steam Web API.
pub const OWNED_GAMES_ENDPOINT: &str =
    "http://api.steampowered.com/IPlayerService/GetOwnedGames/v1/";

/// One raw game record as returned by the ownership API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawOwnedGame {
    pub appid: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rtime_last_played: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OwnedGamesEnvelope {
    response: OwnedGamesResponse,
}

#[derive(Debug, Deserialize)]
struct OwnedGamesResponse {
    games: Option<Vec<RawOwnedGame>>,
}

/// Extract the game list from a decoded API response body.
///
/// Absence of the `games` key is an upstream contract violation, not an
/// empty library.
pub fn parse_owned_games(body: serde_json::Value) -> Result<Vec<RawOwnedGame>, SyncError> {
    let envelope: OwnedGamesEnvelope = serde_json::from_value(body)
        .map_err(|e| SyncError::InvalidUpstreamResponse(e.to_string()))?;
    envelope.response.games.ok_or_else(|| {
        SyncError::InvalidUpstreamResponse("response contains no games list".to_string())
    })
}

/// Fetch the raw owned-games list for one account.
pub async fn fetch_owned_games(
    client: &reqwest::Client,
    endpoint: &str,
    owner_id: &str,
    api_key: &str,
) -> Result<Vec<RawOwnedGame>, SyncError> {
    tracing::info!(endpoint, "fetching owned games");
    let response = client
        .get(endpoint)
        .query(&[
            ("steamid", owner_id),
            ("key", api_key),
            ("format", "json"),
            ("include_appinfo", "true"),
        ])
        .send()
        .await?
        .error_for_status()?;
    let body: serde_json::Value = response.json().await?;
    parse_owned_games(body)
}

/// Artwork source directories for normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArtworkSources<'a> {
    /// Primary source: the Steam library cache.
    pub library_cache: Option<&'a Path>,
    /// Secondary source: the user-curated grid directory.
    pub grid: Option<&'a Path>,
}

/// Normalize raw API records into catalog entries.
///
/// The observer is polled for cancellation once per record; per-entry
/// enrichment failures (artwork probe, NFO parse) degrade that entry only.
pub fn normalize(
    raw_games: &[RawOwnedGame],
    sources: &ArtworkSources<'_>,
    nfo_dir: Option<&Path>,
    observer: &dyn SyncObserver,
) -> Result<Vec<GameEntry>, SyncError> {
    let total = raw_games.len();
    let mut entries = Vec::with_capacity(total);

    for (index, game) in raw_games.iter().enumerate() {
        if observer.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        let app_name = match &game.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => format!("Game_{}", game.appid),
        };
        let app_id = game.appid.to_string();

        let mut entry = GameEntry::new(app_id.clone(), app_name.clone(), CatalogSource::Steam);
        entry.last_play_time = game.rtime_last_played;

        let art = resolve_artwork(sources, &app_id);
        entry.capsule = art.capsule;
        entry.icon = art.icon;
        entry.logo = art.logo;
        entry.hero = art.hero;
        entry.header = art.header;

        entry.metadata = nfo_dir.and_then(|dir| metadata_overlay(dir, &app_name));

        observer.progress(
            percent(index + 1, total),
            &format!("Updating library: {} ({} of {})", app_name, index + 1, total),
        );
        entries.push(entry);
    }

    Ok(entries)
}

/// Merge the two artwork sources for one app.
///
/// Grid hits win for capsule, hero, and logo; a missing grid file keeps the
/// library-cache value. Icon and header never consult the grid.
fn resolve_artwork(sources: &ArtworkSources<'_>, app_id: &str) -> ArtworkPaths {
    let library = sources
        .library_cache
        .map(|dir| library_cache_artwork(dir, app_id))
        .unwrap_or_default();
    let grid = sources
        .grid
        .map(|dir| grid_artwork(dir, app_id))
        .unwrap_or_default();

    ArtworkPaths {
        capsule: grid.capsule.or(library.capsule),
        hero: grid.hero.or(library.hero),
        logo: grid.logo.or(library.logo),
        icon: library.icon,
        header: library.header,
    }
}

fn metadata_overlay(nfo_dir: &Path, app_name: &str) -> Option<GameMetadata> {
    let path = nfo_dir.join(format!("{app_name}.nfo"));
    if !path.is_file() {
        return None;
    }
    match read_nfo(&path) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            tracing::warn!(error = %e, "skipping metadata overlay");
            None
        }
    }
}

fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        100
    } else {
        ((done * 100) / total) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::NoopObserver;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_owned_games_happy_path() {
        let body = json!({
            "response": {
                "games": [
                    {"appid": 10, "name": "Counter-Strike", "rtime_last_played": 1700000000},
                    {"appid": 70}
                ]
            }
        });
        let games = parse_owned_games(body).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].appid, 10);
        assert_eq!(games[1].name, None);
    }

    #[test]
    fn test_parse_owned_games_missing_games_key() {
        let body = json!({"response": {}});
        let err = parse_owned_games(body).unwrap_err();
        assert!(matches!(err, SyncError::InvalidUpstreamResponse(_)));
    }

    #[test]
    fn test_name_fallback_and_last_play_time() {
        let raw = vec![RawOwnedGame {
            appid: 10,
            name: None,
            rtime_last_played: Some(1_700_000_000),
        }];
        let entries =
            normalize(&raw, &ArtworkSources::default(), None, &NoopObserver).unwrap();
        assert_eq!(entries[0].app_name, "Game_10");
        assert_eq!(entries[0].last_play_time, Some(1_700_000_000));
        assert_eq!(entries[0].source, CatalogSource::Steam);
    }

    #[test]
    fn test_grid_beats_library_cache_for_overridable_kinds() {
        let library = TempDir::new().unwrap();
        let grid = TempDir::new().unwrap();
        for name in [
            "10_header.jpg",
            "10_library_600x900.jpg",
            "10_library_hero.jpg",
            "10_logo.png",
            "10_icon.jpg",
        ] {
            fs::write(library.path().join(name), b"img").unwrap();
        }
        // Grid hit for hero only; logo falls back to the library cache.
        fs::write(grid.path().join("10_hero.png"), b"img").unwrap();

        let raw = vec![RawOwnedGame {
            appid: 10,
            name: Some("Game".into()),
            rtime_last_played: None,
        }];
        let sources = ArtworkSources {
            library_cache: Some(library.path()),
            grid: Some(grid.path()),
        };
        let entries = normalize(&raw, &sources, None, &NoopObserver).unwrap();

        assert_eq!(entries[0].hero, Some(grid.path().join("10_hero.png")));
        assert_eq!(entries[0].logo, Some(library.path().join("10_logo.png")));
        assert_eq!(
            entries[0].header,
            Some(library.path().join("10_header.jpg"))
        );
        assert_eq!(entries[0].icon, Some(library.path().join("10_icon.jpg")));
    }

    #[test]
    fn test_nfo_overlay_applied_when_present() {
        let nfo = TempDir::new().unwrap();
        fs::write(
            nfo.path().join("Portal.nfo"),
            "<game><title>Portal</title><year>2007</year></game>",
        )
        .unwrap();

        let raw = vec![RawOwnedGame {
            appid: 400,
            name: Some("Portal".into()),
            rtime_last_played: None,
        }];
        let entries = normalize(
            &raw,
            &ArtworkSources::default(),
            Some(nfo.path()),
            &NoopObserver,
        )
        .unwrap();
        let metadata = entries[0].metadata.as_ref().unwrap();
        assert_eq!(metadata.title, "Portal");
        assert_eq!(metadata.year, "2007");
    }

    #[test]
    fn test_malformed_nfo_degrades_entry_only() {
        let nfo = TempDir::new().unwrap();
        fs::write(nfo.path().join("Broken.nfo"), "<game><title>").unwrap();

        let raw = vec![RawOwnedGame {
            appid: 1,
            name: Some("Broken".into()),
            rtime_last_played: None,
        }];
        let entries = normalize(
            &raw,
            &ArtworkSources::default(),
            Some(nfo.path()),
            &NoopObserver,
        )
        .unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].metadata.is_none());
    }
}
