//! # Settings
//!
//! Configuration for hosts that keep carts on disk.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     BASKET_STORAGE_KEY=session-42                                      │
//! │     BASKET_AUTO_SAVE=true                                              │
//! │     BASKET_STORE_DIR=/var/lib/basket                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/basket/basket.toml (Linux)                               │
//! │     ~/Library/Application Support/org.basket.basket/basket.toml       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     storage_key = "basket", auto_save = false, platform data dir      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # basket.toml
//! [cart]
//! storage_key = "basket"
//! auto_save = true
//!
//! [storage]
//! dir = "/var/lib/basket"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use basket_core::CartConfig;

use crate::error::{SettingsError, SettingsResult};

/// Settings file name inside the platform config dir.
pub const SETTINGS_FILE: &str = "basket.toml";

// =============================================================================
// Storage Settings
// =============================================================================

/// Where cart files live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Store directory. Falls back to the platform data dir when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub cart: CartConfig,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl Settings {
    /// Loads settings from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Settings file (`config_path`, or `basket.toml` in the config dir)
    /// 3. Environment variables
    ///
    /// A missing file is not an error.
    pub fn load(config_path: Option<PathBuf>) -> SettingsResult<Self> {
        let mut settings = Self::default();

        // Try to load from config file
        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading settings from file");
                let contents = std::fs::read_to_string(&path)?;
                settings = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Settings file not found, using defaults");
            }
        }

        // Override with environment variables
        settings.apply_env_overrides();
        settings.validate()?;

        Ok(settings)
    }

    /// Loads settings or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load settings: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Writes the settings as TOML, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> SettingsResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(SettingsError::NoPlatformDir("config"))?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Settings saved");
        Ok(())
    }

    pub fn validate(&self) -> SettingsResult<()> {
        self.cart.validate()?;
        Ok(())
    }

    /// Directory for cart files: the configured one, else the platform data dir.
    pub fn store_dir(&self) -> SettingsResult<PathBuf> {
        if let Some(dir) = &self.storage.dir {
            return Ok(dir.clone());
        }

        // Fall back to platform data dir
        project_dirs()
            .map(|dirs| dirs.data_dir().join("carts"))
            .ok_or(SettingsError::NoPlatformDir("data"))
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Storage key
        if let Some(key) = var("BASKET_STORAGE_KEY") {
            debug!(key = %key, "Overriding storage key from environment");
            self.cart.storage_key = key;
        }

        // Auto-save flag; unrecognized values keep the current setting
        if let Some(flag) = var("BASKET_AUTO_SAVE") {
            match parse_flag(&flag) {
                Some(auto_save) => {
                    debug!(auto_save, "Overriding auto-save from environment");
                    self.cart.auto_save = auto_save;
                }
                None => warn!(value = %flag, "Ignoring unrecognized BASKET_AUTO_SAVE"),
            }
        }

        // Store directory
        if let Some(dir) = var("BASKET_STORE_DIR") {
            debug!(dir = %dir, "Overriding store dir from environment");
            self.storage.dir = Some(PathBuf::from(dir));
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "basket", "basket")
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.cart.storage_key, "basket");
        assert!(!settings.cart.auto_save);
        assert!(settings.storage.dir.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basket.toml");
        std::fs::write(
            &path,
            "[cart]\nstorageKey = \"shop\"\nautoSave = true\n\n[storage]\ndir = \"/tmp/carts\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(path)).unwrap();
        assert_eq!(settings.cart, CartConfig::new("shop", true));
        assert_eq!(settings.store_dir().unwrap(), PathBuf::from("/tmp/carts"));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert_eq!(settings.cart.storage_key, "basket");
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basket.toml");
        std::fs::write(&path, "[cart\nstorage_key = ").unwrap();

        assert!(matches!(
            Settings::load(Some(path.clone())).unwrap_err(),
            SettingsError::Parse(_)
        ));
        assert_eq!(Settings::load_or_default(Some(path)), Settings::default());
    }

    #[test]
    fn test_empty_storage_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basket.toml");
        std::fs::write(&path, "[cart]\nstorage_key = \"\"\n").unwrap();

        assert!(matches!(
            Settings::load(Some(path)).unwrap_err(),
            SettingsError::Validation(_)
        ));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("basket.toml");

        let settings = Settings {
            cart: CartConfig::new("saved", true),
            storage: StorageSettings {
                dir: Some(dir.path().join("carts")),
            },
        };
        settings.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[cart]"));
        assert_eq!(Settings::load(Some(path)).unwrap(), settings);
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.apply_overrides(env(&[
            ("BASKET_STORAGE_KEY", "from-env"),
            ("BASKET_AUTO_SAVE", "yes"),
            ("BASKET_STORE_DIR", "/srv/carts"),
        ]));

        assert_eq!(settings.cart.storage_key, "from-env");
        assert!(settings.cart.auto_save);
        assert_eq!(settings.storage.dir, Some(PathBuf::from("/srv/carts")));
    }

    #[test]
    fn test_unrecognized_auto_save_is_ignored() {
        let mut settings = Settings::default();
        settings.cart.auto_save = true;
        settings.apply_overrides(env(&[("BASKET_AUTO_SAVE", "maybe")]));
        assert!(settings.cart.auto_save);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("TRUE"), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("sometimes"), None);
    }
}
