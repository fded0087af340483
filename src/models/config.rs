use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::path::{get_data_dir, get_database_path, get_settings_path};

/// Main window geometry, kept for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: u32,
    pub height: u32,
    pub maximized: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            maximized: false,
        }
    }
}

/// User settings stored as `settings.toml`.
///
/// Keys missing from the file take their default value, so files written by
/// older versions keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the artifact library (`paintings/`, `exhibitions/`)
    pub library_path: PathBuf,
    pub database_path: PathBuf,
    pub backup_directory: PathBuf,
    pub backup_enabled: bool,
    /// Provision folders when paintings and exhibitions are created
    pub auto_create_folders: bool,
    pub window: WindowSettings,
    pub theme: String,
    pub language: String,
}

impl Default for Settings {
    fn default() -> Self {
        let data_dir = get_data_dir();

        Self {
            library_path: data_dir.join("library"),
            database_path: get_database_path(),
            backup_directory: data_dir.join("backups"),
            backup_enabled: true,
            auto_create_folders: true,
            window: WindowSettings::default(),
            theme: "default".to_string(),
            language: "pt_BR".to_string(),
        }
    }
}

impl Settings {
    /// Load from the platform config directory, falling back to defaults
    pub fn load() -> Self {
        let path = get_settings_path();
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                if path.exists() {
                    tracing::warn!("Could not read settings from {:?}: {}", path, e);
                }
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = toml::from_str(&content)?;
        Ok(settings)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&get_settings_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    pub fn reset_to_defaults(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_settings_toml_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("conf/settings.toml");

        let mut settings = Settings::default();
        settings.library_path = PathBuf::from("/srv/library");
        settings.auto_create_folders = false;
        settings.window.maximized = true;

        settings.save_to(&path).unwrap();
        let loaded = Settings::load_from(&path).unwrap();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let partial = r#"
library_path = "/data/library"
backup_enabled = false

[window]
width = 1024
"#;
        let loaded: Settings = toml::from_str(partial).unwrap();
        assert_eq!(loaded.library_path, PathBuf::from("/data/library"));
        assert!(!loaded.backup_enabled);
        assert!(loaded.auto_create_folders);
        assert_eq!(loaded.window.width, 1024);
        assert_eq!(loaded.window.height, 800);
        assert_eq!(loaded.theme, "default");
    }

    #[test]
    fn test_reset_to_defaults() {
        let mut settings = Settings::default();
        settings.theme = "dark".into();
        settings.reset_to_defaults();
        assert_eq!(settings, Settings::default());
    }
}
