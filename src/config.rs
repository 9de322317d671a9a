use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::common::Colormap;
use crate::error::AppError;
use crate::i18n::Locale;

const CONFIG_FILE: &str = "depth-studio";
const ENV_PREFIX: &str = "DEPTH_STUDIO";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub ui: UiSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UiSettings {
    pub poll_interval_secs: u64,
    pub window_width: f32,
    pub window_height: f32,
    pub default_locale: Locale,
    pub default_colormap: Colormap,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageSettings {
    /// Overrides `<config dir>/depth-studio/preferences.json`.
    pub preferences_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
}

impl Settings {
    /// Defaults, then `depth-studio.{toml,json,yaml}` if present, then
    /// `DEPTH_STUDIO__SECTION__KEY` environment variables.
    pub fn load() -> Result<Self, AppError> {
        let settings = Self::builder()?
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, AppError> {
        let builder = Config::builder()
            .set_default("server.base_url", "http://127.0.0.1:8500")?
            .set_default("ui.poll_interval_secs", 5)?
            .set_default("ui.window_width", 1280.0)?
            .set_default("ui.window_height", 820.0)?
            .set_default("ui.default_locale", Locale::default().code())?
            .set_default("ui.default_colormap", Colormap::default().as_str())?
            .set_default("logging.level", "info")?;
        Ok(builder)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.ui.poll_interval_secs.max(1))
    }

    pub fn log_level(&self) -> tracing::Level {
        self.logging.level.parse().unwrap_or(tracing::Level::INFO)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                base_url: "http://127.0.0.1:8500".to_string(),
            },
            ui: UiSettings {
                poll_interval_secs: 5,
                window_width: 1280.0,
                window_height: 820.0,
                default_locale: Locale::default(),
                default_colormap: Colormap::default(),
            },
            storage: StorageSettings::default(),
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_builder_defaults_deserialize() {
        let settings: Settings = Settings::builder()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.server.base_url, "http://127.0.0.1:8500");
        assert_eq!(settings.ui.poll_interval_secs, 5);
        assert_eq!(settings.ui.default_locale, Locale::ZhCn);
        assert_eq!(settings.ui.default_colormap, Colormap::Turbo);
        assert!(settings.storage.preferences_path.is_none());
        assert_eq!(settings.log_level(), tracing::Level::INFO);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let toml = r#"
            [server]
            base_url = "http://gpu-box:9000"

            [ui]
            poll_interval_secs = 10
            default_locale = "en"
            default_colormap = "magma"

            [logging]
            level = "debug"
        "#;
        let settings: Settings = Settings::builder()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.server.base_url, "http://gpu-box:9000");
        assert_eq!(settings.poll_interval(), std::time::Duration::from_secs(10));
        assert_eq!(settings.ui.default_locale, Locale::En);
        assert_eq!(settings.ui.default_colormap, Colormap::Magma);
        assert_eq!(settings.log_level(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let env = config::Map::from([
            (
                "DEPTH_STUDIO__SERVER__BASE_URL".to_string(),
                "http://10.0.0.7:8500".to_string(),
            ),
            ("DEPTH_STUDIO__UI__POLL_INTERVAL_SECS".to_string(), "20".to_string()),
            ("DEPTH_STUDIO__UI__DEFAULT_LOCALE".to_string(), "en".to_string()),
            (
                "DEPTH_STUDIO__STORAGE__PREFERENCES_PATH".to_string(),
                "/tmp/depth-prefs.json".to_string(),
            ),
            ("UNRELATED__UI__WINDOW_WIDTH".to_string(), "10".to_string()),
        ]);
        let settings: Settings = Settings::builder()
            .unwrap()
            .add_source(Settings::environment().source(Some(env)))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(settings.server.base_url, "http://10.0.0.7:8500");
        assert_eq!(settings.poll_interval(), std::time::Duration::from_secs(20));
        assert_eq!(settings.ui.default_locale, Locale::En);
        assert_eq!(settings.ui.window_width, 1280.0);
        assert_eq!(
            settings.storage.preferences_path,
            Some(PathBuf::from("/tmp/depth-prefs.json"))
        );
    }

    #[test]
    fn test_unknown_log_level_falls_back_to_info() {
        let mut settings = Settings::default();
        settings.logging.level = "chatty".to_string();
        assert_eq!(settings.log_level(), tracing::Level::INFO);
    }
}
