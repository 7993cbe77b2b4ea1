//! Shortcut entry extraction
//!
//! Walks a decoded shortcuts container into normalized catalog entries,
//! resolving grid artwork and `.url`-derived app ids along the way. The
//! per-shortcut dictionaries live one level under the root, beneath the
//! `shortcuts` key; ordinal output order follows enumeration order.

use crate::artwork::grid_artwork;
use crate::catalog::{CatalogSource, GameEntry};
use crate::error::SyncError;
use crate::shortcuts::codec::{BinaryNode, Dictionary};
use crate::sync::SyncObserver;
use std::path::Path;

/// Optional enrichment directories for extraction.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractOptions<'a> {
    /// Grid artwork directory; `None` skips artwork resolution.
    pub grid_dir: Option<&'a Path>,
    /// Directory of `{appName}.url` files; `None` skips app id overrides.
    pub url_shortcut_dir: Option<&'a Path>,
}

/// Build catalog entries from a decoded shortcuts container.
///
/// Enrichment failures degrade the affected entry only; the observer is
/// polled for cancellation once per shortcut.
pub fn extract(
    root: &Dictionary,
    options: &ExtractOptions<'_>,
    observer: &dyn SyncObserver,
) -> Result<Vec<GameEntry>, SyncError> {
    let shortcuts = match root.get("shortcuts").and_then(BinaryNode::as_dictionary) {
        Some(dict) => dict,
        None => {
            tracing::warn!("container has no shortcuts dictionary, catalog will be empty");
            return Ok(Vec::new());
        }
    };

    let total = shortcuts.len();
    let mut entries = Vec::with_capacity(total);

    for (index, (key, node)) in shortcuts.iter().enumerate() {
        if observer.is_cancelled() {
            return Err(SyncError::Cancelled);
        }

        let shortcut = match node.as_dictionary() {
            Some(dict) => dict,
            None => {
                tracing::warn!(key, "skipping shortcut record that is not a dictionary");
                continue;
            }
        };

        let mut entry = entry_from_shortcut(shortcut);

        if let Some(grid_dir) = options.grid_dir {
            if !entry.app_id.is_empty() {
                let art = grid_artwork(grid_dir, &entry.app_id);
                entry.capsule = art.capsule;
                entry.logo = art.logo;
                entry.hero = art.hero;
                entry.header = art.header;
                // The grid convention has no icon file; reuse the header.
                entry.icon = entry.header.clone();
            }
        }

        if let Some(url_dir) = options.url_shortcut_dir {
            apply_url_override(&mut entry, url_dir);
        }

        observer.progress(
            percent(index + 1, total),
            &format!("Processing: {}", entry.app_name),
        );
        entries.push(entry);
    }

    Ok(entries)
}

fn entry_from_shortcut(shortcut: &Dictionary) -> GameEntry {
    let app_name = shortcut
        .get("appName")
        .and_then(BinaryNode::as_str)
        .unwrap_or_default()
        .to_string();

    let app_id = match shortcut.get("appid") {
        Some(BinaryNode::UInt32(v)) => v.to_string(),
        Some(BinaryNode::UInt64(v)) => v.to_string(),
        Some(BinaryNode::String(s)) => s.clone(),
        _ => String::new(),
    };

    let mut entry = GameEntry::new(app_id, app_name, CatalogSource::NonSteam);

    entry.last_play_time = match shortcut.get("LastPlayTime") {
        Some(BinaryNode::UInt32(v)) => Some(u64::from(*v)),
        Some(BinaryNode::UInt64(v)) => Some(*v),
        _ => None,
    };

    if let Some(tags) = shortcut.get("tags").and_then(BinaryNode::as_dictionary) {
        entry.tags = tags
            .iter()
            .filter_map(|(id, value)| match value {
                BinaryNode::String(name) => Some((id.to_string(), name.clone())),
                BinaryNode::UInt32(v) => Some((id.to_string(), v.to_string())),
                BinaryNode::UInt64(v) => Some((id.to_string(), v.to_string())),
                BinaryNode::Dictionary(_) => {
                    tracing::warn!(id, "ignoring nested dictionary in tag mapping");
                    None
                }
            })
            .collect();
    }

    entry
}

/// Override the decoded app id from a sibling `{appName}.url` file.
///
/// The `.url` file is the more reliable source: shortcuts registered without
/// a numeric id still carry their launch URL.
fn apply_url_override(entry: &mut GameEntry, url_dir: &Path) {
    if entry.app_name.is_empty() {
        return;
    }
    let path = url_dir.join(format!("{}.url", entry.app_name));
    if !path.is_file() {
        return;
    }
    match read_url_from_shortcut(&path) {
        Ok(Some(url)) => {
            if let Some(id) = rungameid_app_id(&url) {
                entry.app_id = id.to_string();
            }
        }
        Ok(None) => {
            tracing::warn!(path = %path.display(), "url shortcut has no URL value");
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read url shortcut");
        }
    }
}

/// Read the `URL` value from the `[InternetShortcut]` section of a
/// Windows-style `.url` file.
fn read_url_from_shortcut(path: &Path) -> std::io::Result<Option<String>> {
    let text = std::fs::read_to_string(path)?;
    let mut in_section = false;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            in_section = line.eq_ignore_ascii_case("[InternetShortcut]");
            continue;
        }
        if in_section {
            if let Some((key, value)) = line.split_once('=') {
                if key.trim().eq_ignore_ascii_case("URL") {
                    return Ok(Some(value.trim().to_string()));
                }
            }
        }
    }
    Ok(None)
}

/// App id embedded in a `steam://rungameid/{id}` launch URL.
fn rungameid_app_id(url: &str) -> Option<&str> {
    let (_, id) = url.rsplit_once("steam://rungameid/")?;
    (!id.is_empty()).then_some(id)
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
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    fn dict(entries: Vec<(&str, BinaryNode)>) -> Dictionary {
        let mut bytes = Vec::new();
        encode_dict(&mut bytes, &entries);
        crate::shortcuts::decode(&mut &bytes[..]).unwrap()
    }

    // Test-only encoder mirroring the container grammar.
    fn encode_dict(out: &mut Vec<u8>, entries: &[(&str, BinaryNode)]) {
        for (key, value) in entries {
            match value {
                BinaryNode::Dictionary(inner) => {
                    out.push(0x00);
                    push_cstr(out, key);
                    let inner_entries: Vec<(&str, BinaryNode)> =
                        inner.iter().map(|(k, v)| (k, v.clone())).collect();
                    encode_dict(out, &inner_entries);
                }
                BinaryNode::String(s) => {
                    out.push(0x01);
                    push_cstr(out, key);
                    push_cstr(out, s);
                }
                BinaryNode::UInt32(v) => {
                    out.push(0x02);
                    push_cstr(out, key);
                    out.extend_from_slice(&v.to_le_bytes());
                }
                BinaryNode::UInt64(v) => {
                    out.push(0x07);
                    push_cstr(out, key);
                    out.extend_from_slice(&v.to_le_bytes());
                }
            }
        }
        out.push(0x08);
    }

    fn push_cstr(out: &mut Vec<u8>, s: &str) {
        out.extend_from_slice(s.as_bytes());
        out.push(0);
    }

    fn shortcut(name: &str, appid: Option<u32>, tags: Vec<(&str, &str)>) -> BinaryNode {
        let mut fields: Vec<(&str, BinaryNode)> =
            vec![("appName", BinaryNode::String(name.to_string()))];
        if let Some(id) = appid {
            fields.push(("appid", BinaryNode::UInt32(id)));
        }
        let tag_nodes: Vec<(&str, BinaryNode)> = tags
            .iter()
            .map(|(id, tag)| (*id, BinaryNode::String(tag.to_string())))
            .collect();
        fields.push(("tags", BinaryNode::Dictionary(dict(tag_nodes))));
        BinaryNode::Dictionary(dict(fields))
    }

    fn container(shortcuts: Vec<(&str, BinaryNode)>) -> Dictionary {
        dict(vec![("shortcuts", BinaryNode::Dictionary(dict(shortcuts)))])
    }

    #[test]
    fn test_extracts_fields_and_tags() {
        let root = container(vec![
            ("0", shortcut("MyGame", Some(123), vec![("0", "RPG")])),
            ("1", shortcut("Other", None, vec![])),
        ]);

        let entries = extract(&root, &ExtractOptions::default(), &NoopObserver).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].app_name, "MyGame");
        assert_eq!(entries[0].app_id, "123");
        assert_eq!(entries[0].tags, vec![("0".to_string(), "RPG".to_string())]);
        assert_eq!(entries[0].source, CatalogSource::NonSteam);
        assert_eq!(entries[1].app_id, "");
        assert!(entries[1].tags.is_empty());
    }

    #[test]
    fn test_missing_shortcuts_key_yields_empty_catalog() {
        let root = dict(vec![]);
        let entries = extract(&root, &ExtractOptions::default(), &NoopObserver).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_url_file_overrides_decoded_appid() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("MyGame.url"),
            "[InternetShortcut]\r\nURL=steam://rungameid/4242\r\n",
        )
        .unwrap();

        let root = container(vec![("0", shortcut("MyGame", None, vec![]))]);
        let options = ExtractOptions {
            url_shortcut_dir: Some(temp.path()),
            ..Default::default()
        };
        let entries = extract(&root, &options, &NoopObserver).unwrap();
        assert_eq!(entries[0].app_id, "4242");
    }

    #[test]
    fn test_non_steam_url_is_ignored() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("MyGame.url"),
            "[InternetShortcut]\nURL=https://example.com/game\n",
        )
        .unwrap();

        let root = container(vec![("0", shortcut("MyGame", Some(9), vec![]))]);
        let options = ExtractOptions {
            url_shortcut_dir: Some(temp.path()),
            ..Default::default()
        };
        let entries = extract(&root, &options, &NoopObserver).unwrap();
        assert_eq!(entries[0].app_id, "9");
    }

    #[test]
    fn test_grid_artwork_resolution_and_icon_alias() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("123p.jpg"), b"img").unwrap();
        fs::write(temp.path().join("123.png"), b"img").unwrap();

        let root = container(vec![("0", shortcut("MyGame", Some(123), vec![]))]);
        let options = ExtractOptions {
            grid_dir: Some(temp.path()),
            ..Default::default()
        };
        let entries = extract(&root, &options, &NoopObserver).unwrap();
        assert_eq!(entries[0].capsule, Some(temp.path().join("123p.jpg")));
        assert_eq!(entries[0].header, Some(temp.path().join("123.png")));
        assert_eq!(entries[0].icon, entries[0].header);
        assert_eq!(entries[0].logo, None);
    }

    #[test]
    fn test_cancellation_aborts_without_entries() {
        struct CancelAfterFirst(Cell<bool>);
        impl SyncObserver for CancelAfterFirst {
            fn progress(&self, _percent: u8, _status: &str) {}
            fn is_cancelled(&self) -> bool {
                self.0.replace(true)
            }
        }

        let root = container(vec![
            ("0", shortcut("A", Some(1), vec![])),
            ("1", shortcut("B", Some(2), vec![])),
        ]);
        let observer = CancelAfterFirst(Cell::new(false));
        let err = extract(&root, &ExtractOptions::default(), &observer).unwrap_err();
        assert!(matches!(err, SyncError::Cancelled));
    }

    #[test]
    fn test_rungameid_parse() {
        assert_eq!(rungameid_app_id("steam://rungameid/4242"), Some("4242"));
        assert_eq!(rungameid_app_id("https://example.com"), None);
        assert_eq!(rungameid_app_id("steam://rungameid/"), None);
    }
}
