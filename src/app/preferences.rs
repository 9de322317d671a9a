use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::common::Colormap;
use crate::error::AppError;
use crate::i18n::Locale;

const APP_DIR: &str = "depth-studio";
const FILE_NAME: &str = "preferences.json";

/// The two settings that survive a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub locale: Locale,
    pub colormap: Colormap,
}

// Stored as plain strings so that one bad value does not discard the other.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    colormap: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/depth-studio/preferences.json`, or the working directory
    /// when the platform has no config dir.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .unwrap_or_default()
            .join(FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing files and unreadable values fall back to `defaults`.
    pub fn load(&self, defaults: Preferences) -> Preferences {
        let stored = match std::fs::read_to_string(&self.path) {
            Ok(contents) => match serde_json::from_str::<StoredPreferences>(&contents) {
                Ok(stored) => stored,
                Err(e) => {
                    warn!("Ignoring malformed {}: {}", self.path.display(), e);
                    StoredPreferences::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoredPreferences::default(),
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                StoredPreferences::default()
            }
        };

        let locale = stored
            .lang
            .and_then(|lang| lang.parse::<Locale>().ok())
            .unwrap_or(defaults.locale);
        let colormap = stored
            .colormap
            .and_then(|colormap| colormap.parse::<Colormap>().ok())
            .unwrap_or(defaults.colormap);

        debug!("Loaded preferences: lang={} colormap={}", locale, colormap);
        Preferences { locale, colormap }
    }

    pub fn save(&self, preferences: &Preferences) -> Result<(), AppError> {
        let stored = StoredPreferences {
            lang: Some(preferences.locale.code().to_string()),
            colormap: Some(preferences.colormap.as_str().to_string()),
        };
        let contents = serde_json::to_string_pretty(&stored)
            .map_err(|e| AppError::Preferences(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use uuid::Uuid;

    pub(crate) fn scratch_store() -> PreferenceStore {
        let dir = std::env::temp_dir().join(format!("depth-studio-{}", Uuid::new_v4()));
        PreferenceStore::new(dir.join(FILE_NAME))
    }

    const DEFAULTS: Preferences = Preferences {
        locale: Locale::ZhCn,
        colormap: Colormap::Turbo,
    };

    #[test]
    fn test_missing_file_uses_defaults() {
        let store = scratch_store();
        assert_eq!(store.load(DEFAULTS), DEFAULTS);
    }

    #[test]
    fn test_save_then_load() {
        let store = scratch_store();
        let preferences = Preferences {
            locale: Locale::En,
            colormap: Colormap::Inferno,
        };
        store.save(&preferences).unwrap();
        assert_eq!(store.load(DEFAULTS), preferences);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["lang"], "en");
        assert_eq!(value["colormap"], "inferno");
    }

    #[test]
    fn test_unknown_values_fall_back_individually() {
        let store = scratch_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{"lang": "fr", "colormap": "gray"}"#).unwrap();

        let loaded = store.load(DEFAULTS);
        assert_eq!(loaded.locale, Locale::ZhCn);
        assert_eq!(loaded.colormap, Colormap::Gray);
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let store = scratch_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();
        assert_eq!(store.load(DEFAULTS), DEFAULTS);
    }
}
