/// Application configuration
///
/// Read-only: the app never writes it. Stored as JSON in the user's config directory:
/// - Linux: ~/.config/story-grid/config.json
/// - macOS: ~/Library/Application Support/story-grid/config.json
/// - Windows: %APPDATA%\story-grid\config.json

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::state::data::ImageRef;

/// Placeholder image shown in the source tray by default
const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/150";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Image references offered in the source tray
    pub sources: Vec<String>,
    /// Fixed filename of the exported artifact
    pub export_filename: String,
    /// Output pixels per logical grid pixel (3 = 1080x1920)
    pub export_scale: u32,
    /// Where exports are saved (defaults to the download directory)
    pub download_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sources: vec![PLACEHOLDER_IMAGE.to_string(), PLACEHOLDER_IMAGE.to_string()],
            export_filename: "story.png".to_string(),
            export_scale: 3,
            download_dir: None,
        }
    }
}

impl AppConfig {
    /// Default location of the config file
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push("story-grid");
        path.push("config.json");
        Ok(path)
    }

    /// Load from the default location, falling back to defaults
    ///
    /// A missing file is normal; a broken one is logged and ignored.
    pub fn load_or_default() -> Self {
        let loaded = Self::default_path().and_then(|path| Self::load_from(&path));
        match loaded {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("⚠️  Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Load from `path`; `Ok(None)` when the file does not exist
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(Self::from_json(&json)?))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn source_refs(&self) -> Vec<ImageRef> {
        self.sources.iter().map(ImageRef::new).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.export_filename, "story.png");
        assert_eq!(config.export_scale, 3);
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = AppConfig::from_json(r#"{ "export_scale": 1 }"#).unwrap();
        assert_eq!(config.export_scale, 1);
        assert_eq!(config.export_filename, "story.png");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "sources": ["/photos/a.png"], "export_filename": "out.png" }"#)
            .unwrap();

        let loaded = AppConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(loaded.export_filename, "out.png");
        assert_eq!(loaded.export_scale, 3);
        assert_eq!(loaded.source_refs(), vec![ImageRef::new("/photos/a.png")]);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load_from(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::load_from(&path), Err(ConfigError::Parse(_))));
    }
}
