//! Normalized Game Catalog
//!
//! One entry schema covers both catalog sources (remote Steam library and
//! local shortcuts), discriminated by [`CatalogSource`]. The store persists
//! each source as its own ordinal-keyed JSON document; the tag indexer folds
//! both back into one grouped view.

pub mod store;
pub mod tags;

use crate::nfo::GameMetadata;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which pipeline produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogSource {
    Steam,
    NonSteam,
}

/// The two persisted catalog documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Steam,
    NonSteam,
}

impl CatalogKind {
    /// Top-level key of the persisted document.
    pub fn key(self) -> &'static str {
        match self {
            CatalogKind::Steam => "steam",
            CatalogKind::NonSteam => "non_steam",
        }
    }

    /// File name of the persisted document.
    pub fn file_name(self) -> &'static str {
        match self {
            CatalogKind::Steam => "steam_games.json",
            CatalogKind::NonSteam => "non_steam_games.json",
        }
    }

    pub fn source(self) -> CatalogSource {
        match self {
            CatalogKind::Steam => CatalogSource::Steam,
            CatalogKind::NonSteam => CatalogSource::NonSteam,
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One normalized game entry.
///
/// Artwork fields are independent: any subset may be present depending on
/// what the artwork sources held at sync time. `tags` keeps the tag-id to
/// tag-name mapping in its original order; an empty mapping means the entry
/// is uncategorized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    #[serde(rename = "appid")]
    pub app_id: String,

    #[serde(rename = "appName")]
    pub app_name: String,

    /// Last played, seconds since the Unix epoch.
    #[serde(rename = "LastPlayTime", default)]
    pub last_play_time: Option<u64>,

    #[serde(default)]
    pub capsule: Option<PathBuf>,
    #[serde(default)]
    pub icon: Option<PathBuf>,
    #[serde(default)]
    pub logo: Option<PathBuf>,
    #[serde(default)]
    pub hero: Option<PathBuf>,
    #[serde(default)]
    pub header: Option<PathBuf>,

    #[serde(with = "ordered_map", default)]
    pub tags: Vec<(String, String)>,

    /// Descriptive fields overlaid from an NFO side-file, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<GameMetadata>,

    pub source: CatalogSource,
}

impl GameEntry {
    /// A bare entry with no playtime, artwork, tags, or metadata.
    pub fn new(app_id: impl Into<String>, app_name: impl Into<String>, source: CatalogSource) -> Self {
        GameEntry {
            app_id: app_id.into(),
            app_name: app_name.into(),
            last_play_time: None,
            capsule: None,
            icon: None,
            logo: None,
            hero: None,
            header: None,
            tags: Vec::new(),
            metadata: None,
            source,
        }
    }

    /// Tag names carried by this entry, in mapping order.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|(_, name)| name.as_str())
    }
}

/// Serialize a `Vec<(String, V)>` as a JSON object and read it back in
/// document order, so mappings with significant insertion order survive a
/// round trip through serde maps that would otherwise re-sort keys.
pub mod ordered_map {
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::fmt;
    use std::marker::PhantomData;

    pub fn serialize<S, V>(pairs: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        let mut map = serializer.serialize_map(Some(pairs.len()))?;
        for (key, value) in pairs {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        struct PairVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for PairVisitor<V> {
            type Value = Vec<(String, V)>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string-keyed map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, V>()? {
                    pairs.push(entry);
                }
                Ok(pairs)
            }
        }

        deserializer.deserialize_map(PairVisitor(PhantomData))
    }
}
