use serde::{Deserialize, Serialize};
use tokio::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use directories::ProjectDirs;
use isolang::Language;
use tracing::{info, warn};

use crate::core::features::translator::scheduler::DEFAULT_DEBOUNCE;
use crate::shared::error::{AppError, AppResult};

const SETTINGS_FILE: &str = "settings.json";
const FALLBACK_FILE: &str = "translations.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub preferences: UserPreferences,
    pub translator: TranslatorSettings,
    /// ISO 639-1 codes appended to the built-in language directory
    pub extra_languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    pub default_source_lang: String,
    pub default_target_lang: String,
    pub auto_translate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Google,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorSettings {
    pub provider: ProviderKind,
    pub endpoint: String,
    pub request_timeout_ms: u64,
    pub debounce_ms: u64,
    /// Code used whenever a display name cannot be resolved
    pub default_language_code: String,
    pub fallback_path: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            preferences: UserPreferences::default(),
            translator: TranslatorSettings::default(),
            extra_languages: Vec::new(),
        }
    }
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            default_source_lang: "English".to_string(),
            default_target_lang: "Urdu".to_string(),
            auto_translate: true,
        }
    }
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Google,
            endpoint: "https://translate.googleapis.com/translate_a/single".to_string(),
            request_timeout_ms: 5_000,
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            default_language_code: "en".to_string(),
            fallback_path: None,
        }
    }
}

impl TranslatorSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl AppSettings {
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "antigravity", "translator-session")
            .ok_or_else(|| AppError::System("Failed to determine config directory".to_string()))
    }

    pub fn get_settings_path() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join(SETTINGS_FILE))
    }

    /// Where the fallback dictionary lives unless the settings point elsewhere
    pub fn fallback_path(&self) -> AppResult<PathBuf> {
        match &self.translator.fallback_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::project_dirs()?.config_dir().join(FALLBACK_FILE)),
        }
    }

    /// Load settings from the platform config directory, writing defaults on first run.
    pub async fn load() -> AppResult<Self> {
        let path = Self::get_settings_path()?;
        Self::load_from(&path).await
    }

    pub async fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            let settings = Self::default();
            settings.save_to(path).await?;
            info!(path = %path.display(), "Wrote default settings");
            return Ok(settings);
        }

        let content = fs::read_to_string(path).await
            .map_err(|e| AppError::Io(format!("Failed to read settings file: {}", e)))?;

        let settings: Self = serde_json::from_str(&content)
            .map_err(|e| AppError::Validation(format!("Failed to parse settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Like `load`, but never fails: any problem is logged and defaults are used.
    pub async fn load_or_default() -> Self {
        match Self::load().await {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "Failed to load settings, using defaults");
                Self::default()
            }
        }
    }

    pub async fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await
                .map_err(|e| AppError::Io(format!("Failed to create config directory: {}", e)))?;
        }

        let content = serde_json::to_string_pretty(self)?;

        fs::write(path, content).await
            .map_err(|e| AppError::Io(format!("Failed to write settings file: {}", e)))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.translator.request_timeout_ms == 0 {
            return Err(AppError::Validation("request_timeout_ms must be greater than zero".to_string()));
        }
        if self.translator.debounce_ms == 0 {
            return Err(AppError::Validation("debounce_ms must be greater than zero".to_string()));
        }
        let code = self.translator.default_language_code.as_str();
        if Language::from_639_1(code).is_none() {
            return Err(AppError::Validation(format!("Invalid default language code: {}", code)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = AppSettings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.translator.debounce(), DEFAULT_DEBOUNCE);
        assert_eq!(settings.preferences.default_target_lang, "Urdu");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut settings = AppSettings::default();
        settings.translator.debounce_ms = 0;
        assert!(matches!(settings.validate(), Err(AppError::Validation(_))));

        let mut settings = AppSettings::default();
        settings.translator.default_language_code = "english".to_string();
        assert!(matches!(settings.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "translator": { "provider": "offline", "debounce_ms": 250 } }"#;
        let settings: AppSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.translator.provider, ProviderKind::Offline);
        assert_eq!(settings.translator.debounce_ms, 250);
        assert_eq!(settings.translator.request_timeout_ms, 5_000);
        assert!(settings.preferences.auto_translate);
    }

    #[tokio::test]
    async fn test_load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(SETTINGS_FILE);

        let settings = AppSettings::load_from(&path).await.unwrap();
        assert_eq!(settings, AppSettings::default());
        assert!(path.exists());

        // Second load reads the file we just wrote
        let reloaded = AppSettings::load_from(&path).await.unwrap();
        assert_eq!(reloaded, settings);
    }

    #[tokio::test]
    async fn test_load_from_rejects_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, "{ not json").unwrap();

        let result = AppSettings::load_from(&path).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_explicit_fallback_path_wins() {
        let mut settings = AppSettings::default();
        settings.translator.fallback_path = Some(PathBuf::from("/tmp/dict.json"));
        assert_eq!(settings.fallback_path().unwrap(), PathBuf::from("/tmp/dict.json"));
    }
}
