//! Catalog Synchronization
//!
//! Orchestrates the two full-rebuild pipelines: shortcuts container ->
//! non-steam catalog, and remote owned-games list -> steam catalog. Each
//! run reads its sources fresh, builds a complete entry sequence, and ends
//! with one whole-document save; a cancelled or failed run persists
//! nothing, leaving the previous catalog untouched.

use crate::catalog::store::CatalogStore;
use crate::catalog::CatalogKind;
use crate::error::SyncError;
use crate::remote::{normalize, ArtworkSources, RawOwnedGame};
use crate::shortcuts::{decode, extract, ExtractOptions};
use parking_lot::{Mutex, MutexGuard};
use std::io::BufReader;
use std::path::Path;

/// Progress and cancellation channel exposed to the caller.
///
/// Sync pipelines report a percentage plus a human-readable status line and
/// poll for cancellation at least once per processed entry.
pub trait SyncObserver {
    fn progress(&self, percent: u8, status: &str);

    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Observer that reports nowhere and never cancels.
pub struct NoopObserver;

impl SyncObserver for NoopObserver {
    fn progress(&self, _percent: u8, _status: &str) {}
}

/// Per-kind in-flight guard.
///
/// Concurrent syncs of the same catalog kind are not safe; callers funnel
/// every sync of a kind through one guard and get `AlreadyRunning` instead
/// of a second interleaved rebuild.
#[derive(Default)]
pub struct SyncGuard {
    steam: Mutex<()>,
    non_steam: Mutex<()>,
}

impl SyncGuard {
    pub fn new() -> Self {
        SyncGuard::default()
    }

    pub fn try_acquire(&self, kind: CatalogKind) -> Result<MutexGuard<'_, ()>, SyncError> {
        let lock = match kind {
            CatalogKind::Steam => &self.steam,
            CatalogKind::NonSteam => &self.non_steam,
        };
        lock.try_lock()
            .ok_or(SyncError::AlreadyRunning(kind.key()))
    }
}

/// Source paths for a shortcut catalog sync.
#[derive(Debug, Clone, Copy)]
pub struct ShortcutSyncRequest<'a> {
    /// The binary shortcuts container.
    pub shortcuts_path: &'a Path,
    /// Grid artwork directory, if configured.
    pub grid_dir: Option<&'a Path>,
    /// Directory of `{appName}.url` files, if configured.
    pub url_shortcut_dir: Option<&'a Path>,
}

/// Rebuild the non-steam catalog from the shortcuts container.
///
/// Returns the number of entries persisted.
pub fn sync_shortcut_catalog(
    request: &ShortcutSyncRequest<'_>,
    store: &CatalogStore,
    observer: &dyn SyncObserver,
) -> Result<usize, SyncError> {
    if !request.shortcuts_path.is_file() {
        return Err(SyncError::MissingFile(request.shortcuts_path.to_path_buf()));
    }

    observer.progress(0, "Reading shortcuts container");
    let file = std::fs::File::open(request.shortcuts_path)?;
    let root = decode(&mut BufReader::new(file))?;

    let options = ExtractOptions {
        grid_dir: available_dir(request.grid_dir, "steam grid"),
        url_shortcut_dir: available_dir(request.url_shortcut_dir, "url shortcuts"),
    };
    let entries = extract(&root, &options, observer)?;

    store.save(CatalogKind::NonSteam, &entries)?;
    store.record_scan_timestamp()?;
    Ok(entries.len())
}

/// Source directories for a remote catalog sync.
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoteSyncRequest<'a> {
    pub library_cache: Option<&'a Path>,
    pub grid_dir: Option<&'a Path>,
    pub nfo_dir: Option<&'a Path>,
}

/// Rebuild the steam catalog from an already-fetched owned-games list.
///
/// Returns the number of entries persisted.
pub fn sync_remote_catalog(
    raw_games: &[RawOwnedGame],
    request: &RemoteSyncRequest<'_>,
    store: &CatalogStore,
    observer: &dyn SyncObserver,
) -> Result<usize, SyncError> {
    let sources = ArtworkSources {
        library_cache: available_dir(request.library_cache, "library cache"),
        grid: available_dir(request.grid_dir, "steam grid"),
    };
    let nfo_dir = available_dir(request.nfo_dir, "nfo files");

    let entries = normalize(raw_games, &sources, nfo_dir, observer)?;

    store.save(CatalogKind::Steam, &entries)?;
    store.record_scan_timestamp()?;
    Ok(entries.len())
}

/// A configured directory that is missing degrades to "not configured",
/// with the condition reported once.
fn available_dir<'a>(dir: Option<&'a Path>, label: &str) -> Option<&'a Path> {
    match dir {
        Some(path) if path.is_dir() => Some(path),
        Some(path) => {
            tracing::warn!(label, path = %path.display(), "configured directory is missing, continuing without it");
            None
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn minimal_container() -> Vec<u8> {
        // { "shortcuts": { "0": { "appName": "MyGame", "appid": 7 } } }
        let mut inner = Vec::new();
        inner.push(0x01);
        inner.extend_from_slice(b"appName\x00MyGame\x00");
        inner.push(0x02);
        inner.extend_from_slice(b"appid\x00");
        inner.extend_from_slice(&7u32.to_le_bytes());
        inner.push(0x08);

        let mut shortcuts = Vec::new();
        shortcuts.push(0x00);
        shortcuts.extend_from_slice(b"0\x00");
        shortcuts.extend_from_slice(&inner);
        shortcuts.push(0x08);

        let mut root = Vec::new();
        root.push(0x00);
        root.extend_from_slice(b"shortcuts\x00");
        root.extend_from_slice(&shortcuts);
        root.push(0x08);
        root
    }

    #[test]
    fn test_missing_container_reports_missing_file() {
        let temp = TempDir::new().unwrap();
        let store = CatalogStore::new(temp.path().join("data"));
        let missing = temp.path().join("shortcuts.vdf");
        let request = ShortcutSyncRequest {
            shortcuts_path: &missing,
            grid_dir: None,
            url_shortcut_dir: None,
        };
        let err = sync_shortcut_catalog(&request, &store, &NoopObserver).unwrap_err();
        assert!(matches!(err, SyncError::MissingFile(_)));
        // Nothing persisted.
        assert!(store.load(CatalogKind::NonSteam).unwrap().is_none());
    }

    #[test]
    fn test_shortcut_sync_persists_complete_catalog() {
        let temp = TempDir::new().unwrap();
        let vdf = temp.path().join("shortcuts.vdf");
        fs::write(&vdf, minimal_container()).unwrap();
        let store = CatalogStore::new(temp.path().join("data"));

        let request = ShortcutSyncRequest {
            shortcuts_path: &vdf,
            grid_dir: None,
            url_shortcut_dir: None,
        };
        let count = sync_shortcut_catalog(&request, &store, &NoopObserver).unwrap();
        assert_eq!(count, 1);

        let entries = store.load(CatalogKind::NonSteam).unwrap().unwrap();
        assert_eq!(entries[0].app_name, "MyGame");
        assert_eq!(entries[0].app_id, "7");
        assert!(store.last_scan().unwrap().is_some());
    }

    #[test]
    fn test_truncated_container_persists_nothing() {
        let temp = TempDir::new().unwrap();
        let vdf = temp.path().join("shortcuts.vdf");
        let mut bytes = minimal_container();
        bytes.pop(); // drop the root end marker
        fs::write(&vdf, bytes).unwrap();
        let store = CatalogStore::new(temp.path().join("data"));

        let request = ShortcutSyncRequest {
            shortcuts_path: &vdf,
            grid_dir: None,
            url_shortcut_dir: None,
        };
        let err = sync_shortcut_catalog(&request, &store, &NoopObserver).unwrap_err();
        assert!(matches!(
            err,
            SyncError::Decode(crate::error::DecodeError::Truncated)
        ));
        assert!(store.load(CatalogKind::NonSteam).unwrap().is_none());
    }

    #[test]
    fn test_cancelled_sync_persists_nothing() {
        struct AlwaysCancelled;
        impl SyncObserver for AlwaysCancelled {
            fn progress(&self, _percent: u8, _status: &str) {}
            fn is_cancelled(&self) -> bool {
                true
            }
        }

        let temp = TempDir::new().unwrap();
        let vdf = temp.path().join("shortcuts.vdf");
        fs::write(&vdf, minimal_container()).unwrap();
        let store = CatalogStore::new(temp.path().join("data"));

        let request = ShortcutSyncRequest {
            shortcuts_path: &vdf,
            grid_dir: None,
            url_shortcut_dir: None,
        };
        let err = sync_shortcut_catalog(&request, &store, &AlwaysCancelled).unwrap_err();
        assert!(matches!(err, SyncError::Cancelled));
        assert!(store.load(CatalogKind::NonSteam).unwrap().is_none());
    }

    #[test]
    fn test_guard_rejects_second_sync_of_same_kind() {
        let guard = SyncGuard::new();
        let held = guard.try_acquire(CatalogKind::Steam).unwrap();
        let err = guard.try_acquire(CatalogKind::Steam).unwrap_err();
        assert!(matches!(err, SyncError::AlreadyRunning("steam")));
        // The other kind is independent.
        let _other = guard.try_acquire(CatalogKind::NonSteam).unwrap();
        drop(held);
        let _again = guard.try_acquire(CatalogKind::Steam).unwrap();
    }

    #[test]
    fn test_missing_configured_dir_degrades_to_none() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone");
        assert_eq!(available_dir(Some(&missing), "test"), None);
        assert_eq!(available_dir(Some(temp.path()), "test"), Some(temp.path()));
        assert_eq!(available_dir(None, "test"), None);
    }
}
