//! Catalog Views
//!
//! Formats the tag-grouped and flat catalog views as text for the terminal.
//! Sorting by display name happens here, not in the indexer.

use crate::catalog::tags::TagIndex;
use crate::catalog::{CatalogSource, GameEntry};
use chrono::DateTime;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

/// Format a section heading with bold/underline.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

/// Render epoch seconds as a `YYYY-MM-DD` date, empty when absent or out of
/// range.
pub fn format_last_play_time(seconds: Option<u64>) -> String {
    seconds
        .and_then(|s| DateTime::from_timestamp(s as i64, 0))
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn source_label(source: CatalogSource) -> &'static str {
    match source {
        CatalogSource::Steam => "Steam",
        CatalogSource::NonSteam => "Non-Steam",
    }
}

/// One-line-per-bucket overview of the tag index.
pub fn format_tag_overview(index: &TagIndex) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Tags")));
    if index.is_empty() {
        out.push_str("No games in the catalog. Run a sync first.\n");
        return out;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Tag", "Games"]);
    for (name, entries) in index.buckets() {
        table.add_row(vec![name.to_string(), entries.len().to_string()]);
    }
    out.push_str(&format!("{table}\n"));
    out
}

/// Game listing under a heading, sorted case-insensitively by display name.
pub fn format_game_rows(title: &str, entries: &[GameEntry]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading(title)));
    if entries.is_empty() {
        out.push_str("No games.\n");
        return out;
    }

    let mut sorted: Vec<&GameEntry> = entries.iter().collect();
    sorted.sort_by_key(|entry| entry.app_name.to_lowercase());

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Name", "AppId", "Source", "Last played"]);
    for entry in sorted {
        table.add_row(vec![
            entry.app_name.clone(),
            entry.app_id.clone(),
            source_label(entry.source).to_string(),
            format_last_play_time(entry.last_play_time),
        ]);
    }
    out.push_str(&format!("{table}\n\nTotal: {} games.\n", entries.len()));
    out
}

/// Flat view over both catalogs.
pub fn format_all_games(steam: &[GameEntry], non_steam: &[GameEntry]) -> String {
    let combined: Vec<GameEntry> = steam.iter().chain(non_steam).cloned().collect();
    format_game_rows("All Games", &combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSource;

    fn entry(name: &str, source: CatalogSource) -> GameEntry {
        GameEntry::new("1", name, source)
    }

    #[test]
    fn test_format_last_play_time() {
        assert_eq!(format_last_play_time(Some(1_700_000_000)), "2023-11-14");
        assert_eq!(format_last_play_time(None), "");
    }

    #[test]
    fn test_rows_sorted_case_insensitively() {
        let entries = vec![
            entry("zebra", CatalogSource::Steam),
            entry("Apple", CatalogSource::NonSteam),
        ];
        let text = format_game_rows("All Games", &entries);
        let apple = text.find("Apple").unwrap();
        let zebra = text.find("zebra").unwrap();
        assert!(apple < zebra);
        assert!(text.contains("Total: 2 games."));
    }

    #[test]
    fn test_empty_listing_has_hint() {
        let index = TagIndex::build(&[], &[]);
        let text = format_tag_overview(&index);
        assert!(text.contains("Run a sync first"));
    }
}
