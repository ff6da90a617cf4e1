//! Startup defaults and persisted application settings.
//!
//! [`EnvDefaults`] is read once from the process environment. [`AppSettings`]
//! holds the user-editable values, stored one key each, and falls back to
//! the environment defaults for anything not stored.

use std::path::PathBuf;

use crate::constants::{defaults, env, keys};
use crate::storage::KeyValueStore;
use crate::{Result, StoreError};

/// Values taken from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvDefaults {
    pub api_url: String,
    /// Model override; `None` keeps the client's built-in default
    pub model: Option<String>,
    pub app_name: String,
    pub version: String,
    pub environment: String,
    /// Explicit state directory, if set
    pub data_dir: Option<PathBuf>,
}

impl Default for EnvDefaults {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl EnvDefaults {
    /// Read from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read through `lookup`. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            api_url: get(env::API_URL).unwrap_or_else(|| defaults::API_URL.to_string()),
            model: get(env::MODEL),
            app_name: get(env::APP_NAME).unwrap_or_else(|| defaults::APP_NAME.to_string()),
            version: get(env::VERSION).unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
            environment: get(env::ENVIRONMENT)
                .unwrap_or_else(|| defaults::ENVIRONMENT.to_string()),
            data_dir: get(env::DATA_DIR).map(PathBuf::from),
        }
    }

    /// Directory for the on-disk key-value store.
    ///
    /// The explicit setting wins, then the platform data directory, then
    /// `./data`.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join(defaults::DATA_DIR_NAME))
            .unwrap_or_else(|| PathBuf::from(defaults::FALLBACK_DATA_DIR))
    }
}

/// User-editable application settings.
///
/// The API credential is not stored here; it is held in memory only.
#[derive(Debug, Clone, PartialEq)]
pub struct AppSettings {
    pub api_url: String,
    pub app_name: String,
    pub version: String,
    pub environment: String,
}

impl AppSettings {
    /// Settings taken entirely from `defaults`
    pub fn from_defaults(defaults: &EnvDefaults) -> Self {
        Self {
            api_url: defaults.api_url.clone(),
            app_name: defaults.app_name.clone(),
            version: defaults.version.clone(),
            environment: defaults.environment.clone(),
        }
    }

    /// Load stored settings, filling gaps from `defaults`.
    ///
    /// A credential left behind by an older build is removed from storage.
    pub async fn load(store: &dyn KeyValueStore, defaults: &EnvDefaults) -> Result<Self> {
        if store.get(keys::API_KEY).await?.is_some() {
            log::warn!("Removing stored API key; credentials are no longer persisted");
            store.remove(keys::API_KEY).await?;
        }

        let mut settings = Self::from_defaults(defaults);
        for (key, field) in [
            (keys::API_URL, &mut settings.api_url),
            (keys::APP_NAME, &mut settings.app_name),
            (keys::VERSION, &mut settings.version),
            (keys::ENVIRONMENT, &mut settings.environment),
        ] {
            if let Some(value) = read_string(store, key).await? {
                *field = value;
            }
        }

        Ok(settings)
    }

    /// Check the settings can be saved
    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(StoreError::Validation("API URL is required.".to_string()));
        }
        Ok(())
    }

    /// Persist every field
    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        self.validate()?;
        for (key, value) in [
            (keys::API_URL, &self.api_url),
            (keys::APP_NAME, &self.app_name),
            (keys::VERSION, &self.version),
            (keys::ENVIRONMENT, &self.environment),
        ] {
            store.set(key, &serde_json::to_string(value.trim())?).await?;
        }
        log::info!("Settings saved");
        Ok(())
    }

    /// Wipe all persisted state, projects and profile included, and return
    /// the environment defaults.
    pub async fn reset(store: &dyn KeyValueStore, defaults: &EnvDefaults) -> Result<Self> {
        store.clear().await?;
        log::info!("All stored data cleared");
        Ok(Self::from_defaults(defaults))
    }
}

/// Non-empty string stored under `key`.
///
/// Values are JSON strings; a bare unquoted value is accepted as-is.
async fn read_string(store: &dyn KeyValueStore, key: &str) -> Result<Option<String>> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    let value = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Null) => return Ok(None),
        Ok(other) => other.to_string(),
        Err(_) => raw,
    };
    let value = value.trim();
    Ok((!value.is_empty()).then(|| value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStore, MemoryStore};
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_defaults() {
        let defaults = EnvDefaults::default();
        assert_eq!(defaults.api_url, "https://api.cerebras.ai/v1");
        assert_eq!(defaults.app_name, "Creative Studio");
        assert_eq!(defaults.environment, "development");
        assert_eq!(defaults.version, env!("CARGO_PKG_VERSION"));
        assert!(defaults.model.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let defaults = EnvDefaults::from_lookup(lookup(&[
            ("STUDIO_API_URL", "http://localhost:8080/v1"),
            ("STUDIO_MODEL", "llama3.1-8b"),
            ("STUDIO_ENVIRONMENT", "  "),
            ("STUDIO_DATA_DIR", "/tmp/studio"),
        ]));
        assert_eq!(defaults.api_url, "http://localhost:8080/v1");
        assert_eq!(defaults.model.as_deref(), Some("llama3.1-8b"));
        assert_eq!(defaults.environment, "development");
        assert_eq!(defaults.data_dir(), PathBuf::from("/tmp/studio"));
    }

    #[tokio::test]
    async fn test_load_falls_back_to_defaults() {
        let store = MemoryStore::new();
        let defaults = EnvDefaults::default();
        let settings = AppSettings::load(&store, &defaults).await.unwrap();
        assert_eq!(settings, AppSettings::from_defaults(&defaults));
    }

    #[tokio::test]
    async fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path());
        let defaults = EnvDefaults::default();

        let settings = AppSettings {
            api_url: "http://localhost:8080/v1".to_string(),
            app_name: "My Studio".to_string(),
            version: "2.0.0".to_string(),
            environment: "production".to_string(),
        };
        settings.save(&store).await.unwrap();

        let reloaded = AppSettings::load(&JsonFileStore::new(temp_dir.path()), &defaults)
            .await
            .unwrap();
        assert_eq!(reloaded, settings);
    }

    #[tokio::test]
    async fn test_save_requires_api_url() {
        let store = MemoryStore::new();
        let settings = AppSettings {
            api_url: " ".to_string(),
            ..AppSettings::from_defaults(&EnvDefaults::default())
        };
        assert!(matches!(
            settings.save(&store).await,
            Err(StoreError::Validation(_))
        ));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_load_accepts_bare_strings() {
        let store = MemoryStore::new();
        store.set(keys::APP_NAME, "Plain Name").await.unwrap();
        store.set(keys::ENVIRONMENT, "\"\"").await.unwrap();

        let settings = AppSettings::load(&store, &EnvDefaults::default()).await.unwrap();
        assert_eq!(settings.app_name, "Plain Name");
        assert_eq!(settings.environment, "development");
    }

    #[tokio::test]
    async fn test_load_purges_stored_credential() {
        let store = MemoryStore::new();
        store.set(keys::API_KEY, "\"sk-old\"").await.unwrap();

        AppSettings::load(&store, &EnvDefaults::default()).await.unwrap();
        assert!(store.get(keys::API_KEY).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let store = MemoryStore::new();
        store.set(keys::PROJECTS, "[]").await.unwrap();
        store.set(keys::APP_NAME, "\"Custom\"").await.unwrap();

        let defaults = EnvDefaults::default();
        let settings = AppSettings::reset(&store, &defaults).await.unwrap();
        assert_eq!(settings.app_name, "Creative Studio");
        assert!(store.is_empty());
    }
}
