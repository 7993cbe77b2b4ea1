//! Configuration
//!
//! Layered configuration in the usual precedence order: built-in defaults,
//! then the global config file under the platform config directory, then an
//! explicit `--config` file, then `STEAMSHELF_*` environment variables.

use crate::error::SyncError;
use crate::logging::LoggingConfig;
use crate::remote::OWNED_GAMES_ENDPOINT;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Filesystem locations the sync pipelines read from and write to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// The binary shortcuts container (usually `shortcuts.vdf`).
    #[serde(default)]
    pub shortcuts_vdf: Option<PathBuf>,

    /// Directory of `{appName}.url` launch shortcuts.
    #[serde(default)]
    pub url_shortcuts: Option<PathBuf>,

    /// User-curated grid artwork directory.
    #[serde(default)]
    pub steam_grid: Option<PathBuf>,

    /// Steam library cache artwork directory.
    #[serde(default)]
    pub library_cache: Option<PathBuf>,

    /// Directory of `{appName}.nfo` metadata side-files.
    #[serde(default)]
    pub nfo_files: Option<PathBuf>,

    /// Where catalog documents are persisted; defaults to the platform
    /// data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Remote ownership API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SteamConfig {
    #[serde(default)]
    pub owner_id: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_endpoint() -> String {
    OWNED_GAMES_ENDPOINT.to_string()
}

impl Default for SteamConfig {
    fn default() -> Self {
        SteamConfig {
            owner_id: String::new(),
            api_key: String::new(),
            endpoint: default_endpoint(),
        }
    }
}

/// Complete steamshelf configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShelfConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub steam: SteamConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ShelfConfig {
    /// Load configuration from the standard sources.
    pub fn load(explicit_file: Option<&Path>) -> Result<ShelfConfig, ConfigError> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&ShelfConfig::default())?);

        if let Some(global) = Self::global_config_path() {
            builder = builder.add_source(File::from(global).required(false));
        }
        if let Some(path) = explicit_file {
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }
        builder = builder.add_source(
            Environment::with_prefix("STEAMSHELF")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Path of the global config file (`<config dir>/config.toml`).
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "steamshelf", "steamshelf")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Directory for catalog documents: configured, or the platform data
    /// directory.
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.paths.data_dir {
            return Ok(dir.clone());
        }
        directories::ProjectDirs::from("", "steamshelf", "steamshelf")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                ConfigError::Message("could not determine platform data directory".to_string())
            })
    }

    /// Validate the settings a remote sync depends on.
    pub fn validate_remote(&self) -> Result<(), SyncError> {
        if self.steam.owner_id.is_empty() || self.steam.api_key.is_empty() {
            return Err(SyncError::Config(
                "steam owner id or API key not configured".to_string(),
            ));
        }
        match &self.paths.library_cache {
            None => Err(SyncError::Config(
                "library cache path not configured".to_string(),
            )),
            Some(dir) if !dir.is_dir() => {
                Err(SyncError::MissingDirectory(dir.clone()))
            }
            Some(_) => Ok(()),
        }
    }

    /// Validate the settings a shortcut sync depends on.
    pub fn validate_shortcuts(&self) -> Result<&Path, SyncError> {
        self.paths
            .shortcuts_vdf
            .as_deref()
            .ok_or_else(|| SyncError::Config("shortcuts container path not configured".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ShelfConfig::default();
        assert_eq!(config.steam.endpoint, OWNED_GAMES_ENDPOINT);
        assert!(config.paths.shortcuts_vdf.is_none());
        assert!(config.steam.owner_id.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
            [paths]
            shortcuts_vdf = "/steam/userdata/1/config/shortcuts.vdf"
            steam_grid = "/steam/userdata/1/config/grid"

            [steam]
            owner_id = "76561198000000000"
            api_key = "XYZ"
            "#,
        )
        .unwrap();

        let config = ShelfConfig::load(Some(&path)).unwrap();
        assert_eq!(
            config.paths.shortcuts_vdf.as_deref(),
            Some(Path::new("/steam/userdata/1/config/shortcuts.vdf"))
        );
        assert_eq!(config.steam.owner_id, "76561198000000000");
        // Unset values keep their defaults.
        assert_eq!(config.steam.endpoint, OWNED_GAMES_ENDPOINT);
        assert!(config.paths.nfo_files.is_none());
    }

    #[test]
    fn test_validate_remote_requires_credentials() {
        let config = ShelfConfig::default();
        let err = config.validate_remote().unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn test_validate_remote_requires_existing_library_cache() {
        let temp = TempDir::new().unwrap();
        let mut config = ShelfConfig::default();
        config.steam.owner_id = "1".to_string();
        config.steam.api_key = "k".to_string();
        config.paths.library_cache = Some(temp.path().join("missing"));
        assert!(matches!(
            config.validate_remote().unwrap_err(),
            SyncError::MissingDirectory(_)
        ));

        config.paths.library_cache = Some(temp.path().to_path_buf());
        config.validate_remote().unwrap();
    }

    #[test]
    fn test_validate_shortcuts_requires_path() {
        let config = ShelfConfig::default();
        assert!(matches!(
            config.validate_shortcuts().unwrap_err(),
            SyncError::Config(_)
        ));
    }
}
