//! NFO Metadata Side-Files
//!
//! A game may carry a `{appName}.nfo` next to the catalog: a flat XML
//! document whose child elements overlay user-curated descriptive fields
//! onto the entry. Every element is optional and defaults to an empty
//! string. A malformed file is reported and skipped; it never fails a sync.

use crate::error::MetadataError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Descriptive fields read from an NFO document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMetadata {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub genre: String,
    /// Raw comma-separated tag text as authored in the NFO. Distinct from
    /// the entry's tag mapping, which only the shortcut editor populates.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub developer: String,
    #[serde(default, rename = "nplayers")]
    pub player_count: String,
    #[serde(default, rename = "esrb")]
    pub esrb_rating: String,
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub plot: String,
}

impl GameMetadata {
    fn from_document(doc: &roxmltree::Document) -> Self {
        let root = doc.root_element();
        let field = |name: &str| -> String {
            root.children()
                .find(|node| node.is_element() && node.has_tag_name(name))
                .and_then(|node| node.text())
                .unwrap_or_default()
                .trim()
                .to_string()
        };
        GameMetadata {
            title: field("title"),
            year: field("year"),
            genre: field("genre"),
            tags: field("tags"),
            developer: field("developer"),
            player_count: field("nplayers"),
            esrb_rating: field("esrb"),
            rating: field("rating"),
            plot: field("plot"),
        }
    }
}

/// Read and parse one NFO file.
pub fn read_nfo(path: &Path) -> Result<GameMetadata, MetadataError> {
    let text = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = roxmltree::Document::parse(&text).map_err(|e| MetadataError::Malformed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(GameMetadata::from_document(&doc))
}
