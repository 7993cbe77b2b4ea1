//! Artwork Resolution
//!
//! Games are imaged from two filesystem conventions: the Steam library
//! cache (`{appid}_header.*`, `{appid}_library_600x900.*`, ...) and the
//! user-curated grid directory (`{appid}p.*`, `{appid}_logo.*`,
//! `{appid}_hero.*`, `{appid}.*`). Each artwork kind is probed against a
//! fixed extension list; the first existing file wins.

use std::path::{Path, PathBuf};

/// Probe order for artwork files.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "gif"];

/// Resolved artwork paths for one game. Every field is independently
/// optional; absence means no file matched the probe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtworkPaths {
    pub capsule: Option<PathBuf>,
    pub icon: Option<PathBuf>,
    pub logo: Option<PathBuf>,
    pub hero: Option<PathBuf>,
    pub header: Option<PathBuf>,
}

/// First `dir/{stem}.{ext}` that exists, trying extensions in probe order.
///
/// An unreadable candidate behaves like an absent one; no per-file error is
/// raised.
pub fn first_existing_path(dir: &Path, stem: &str) -> Option<PathBuf> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|candidate| candidate.is_file())
}

/// Probe the user-curated grid directory for one app.
///
/// Kinds and their filename stems: capsule `{appid}p`, logo `{appid}_logo`,
/// hero `{appid}_hero`, header `{appid}`. The grid convention has no icon
/// file; callers derive icon from header where they need one.
pub fn grid_artwork(dir: &Path, app_id: &str) -> ArtworkPaths {
    ArtworkPaths {
        capsule: first_existing_path(dir, &format!("{app_id}p")),
        icon: None,
        logo: first_existing_path(dir, &format!("{app_id}_logo")),
        hero: first_existing_path(dir, &format!("{app_id}_hero")),
        header: first_existing_path(dir, app_id),
    }
}

/// Probe the Steam library cache directory for one app.
pub fn library_cache_artwork(dir: &Path, app_id: &str) -> ArtworkPaths {
    ArtworkPaths {
        capsule: first_existing_path(dir, &format!("{app_id}_library_600x900")),
        icon: first_existing_path(dir, &format!("{app_id}_icon")),
        logo: first_existing_path(dir, &format!("{app_id}_logo")),
        hero: first_existing_path(dir, &format!("{app_id}_library_hero")),
        header: first_existing_path(dir, &format!("{app_id}_header")),
    }
}
