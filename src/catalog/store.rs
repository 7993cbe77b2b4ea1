//! Catalog Document Store
//!
//! Persists each catalog as a JSON document with one top-level key (the
//! catalog kind) mapping ordinal string keys to entries. The store owns the
//! on-disk documents; everything else works on transient in-memory copies.
//! Saves are whole-document rewrites, so a failed sync never leaves a
//! half-written catalog behind.

use crate::catalog::{CatalogKind, GameEntry};
use crate::error::CatalogError;
use chrono::Utc;
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Name of the side-file recording the last successful scan.
const SCAN_TIMESTAMP_FILE: &str = "_scan_timestamp.json";

#[derive(Debug, Serialize, Deserialize)]
struct ScanTimestamp {
    last_scan: i64,
}

/// Store for the two persisted catalog documents.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    data_dir: PathBuf,
}

impl CatalogStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        CatalogStore {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// On-disk path of one catalog document.
    pub fn document_path(&self, kind: CatalogKind) -> PathBuf {
        self.data_dir.join(kind.file_name())
    }

    /// Load a catalog in ordinal order.
    ///
    /// Returns `Ok(None)` when the document does not exist, which callers
    /// treat as "never synced". A document that exists but cannot be parsed
    /// is a corruption error, never silently empty.
    pub fn load(&self, kind: CatalogKind) -> Result<Option<Vec<GameEntry>>, CatalogError> {
        let path = self.document_path(kind);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CatalogError::Io {
                    path,
                    source: e,
                })
            }
        };

        let keyed = parse_document(kind, &text)
            .map_err(|source| CatalogError::Corrupt { path, source })?;
        Ok(Some(keyed))
    }

    /// Persist a catalog, assigning ordinal keys strictly by position.
    ///
    /// Overwrites any prior document for this kind; saving the same ordered
    /// input twice produces identical ordinal assignment.
    pub fn save(&self, kind: CatalogKind, entries: &[GameEntry]) -> Result<PathBuf, CatalogError> {
        let path = self.document_path(kind);
        std::fs::create_dir_all(&self.data_dir).map_err(|source| CatalogError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        let text = render_document(kind, entries).map_err(|source| CatalogError::Corrupt {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, text).map_err(|source| CatalogError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(kind = %kind, entries = entries.len(), path = %path.display(), "catalog saved");
        Ok(path)
    }

    /// Record the current time as the last successful scan.
    pub fn record_scan_timestamp(&self) -> Result<(), CatalogError> {
        let path = self.data_dir.join(SCAN_TIMESTAMP_FILE);
        let stamp = ScanTimestamp {
            last_scan: Utc::now().timestamp(),
        };
        let text = serde_json::to_string_pretty(&stamp).map_err(|source| CatalogError::Corrupt {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, text).map_err(|source| CatalogError::Io { path, source })
    }

    /// Unix timestamp of the last successful scan, if one was recorded.
    pub fn last_scan(&self) -> Result<Option<i64>, CatalogError> {
        let path = self.data_dir.join(SCAN_TIMESTAMP_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CatalogError::Io { path, source: e }),
        };
        let stamp: ScanTimestamp = serde_json::from_str(&text)
            .map_err(|source| CatalogError::Corrupt { path, source })?;
        Ok(Some(stamp.last_scan))
    }
}

// The wire shape is `{ "<kind>": { "0": entry, "1": entry, ... } }`. The two
// kinds get their own document structs so the top-level key is checked at
// parse time.
#[derive(Serialize, Deserialize)]
struct SteamDocument {
    #[serde(with = "crate::catalog::ordered_map")]
    steam: Vec<(String, GameEntry)>,
}

#[derive(Serialize, Deserialize)]
struct NonSteamDocument {
    #[serde(with = "crate::catalog::ordered_map")]
    non_steam: Vec<(String, GameEntry)>,
}

fn render_document(kind: CatalogKind, entries: &[GameEntry]) -> serde_json::Result<String> {
    let keyed: Vec<(String, GameEntry)> = entries
        .iter()
        .enumerate()
        .map(|(ordinal, entry)| (ordinal.to_string(), entry.clone()))
        .collect();
    match kind {
        CatalogKind::Steam => serde_json::to_string_pretty(&SteamDocument { steam: keyed }),
        CatalogKind::NonSteam => {
            serde_json::to_string_pretty(&NonSteamDocument { non_steam: keyed })
        }
    }
}

fn parse_document(kind: CatalogKind, text: &str) -> serde_json::Result<Vec<GameEntry>> {
    let mut keyed = match kind {
        CatalogKind::Steam => serde_json::from_str::<SteamDocument>(text)?.steam,
        CatalogKind::NonSteam => serde_json::from_str::<NonSteamDocument>(text)?.non_steam,
    };

    let mut ordered = Vec::with_capacity(keyed.len());
    for (key, entry) in keyed.drain(..) {
        let ordinal: u64 = key.parse().map_err(|_| {
            serde_json::Error::custom(format!("non-numeric ordinal key {key:?}"))
        })?;
        ordered.push((ordinal, entry));
    }
    ordered.sort_by_key(|(ordinal, _)| *ordinal);
    Ok(ordered.into_iter().map(|(_, entry)| entry).collect())
}
