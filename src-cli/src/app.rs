//! Shared application state for the terminal front-end.

use std::sync::Arc;

use studio_engine::{EventBus, StudioSession};
use studio_inference::{ApiConfig, CredentialStore, LlmClient};
use studio_store::{
    AppSettings, EnvDefaults, JsonFileStore, KeyValueStore, ProjectRepository, StudioKind,
    UserRepository,
};

use crate::error::CliError;

/// Everything a studio session needs, built once at startup.
pub struct App {
    pub defaults: EnvDefaults,
    pub store: Arc<dyn KeyValueStore>,
    pub settings: AppSettings,
    pub credentials: CredentialStore,
    pub projects: Arc<ProjectRepository>,
    pub users: UserRepository,
    pub events: EventBus,
}

impl App {
    /// Open the on-disk store and load settings
    pub async fn open(defaults: EnvDefaults) -> Result<Self, CliError> {
        let data_dir = defaults.data_dir();
        log::info!("Using data directory {:?}", data_dir);
        Self::with_store(defaults, Arc::new(JsonFileStore::new(data_dir))).await
    }

    pub async fn with_store(
        defaults: EnvDefaults,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self, CliError> {
        let settings = AppSettings::load(store.as_ref(), &defaults).await?;
        Ok(Self {
            projects: Arc::new(ProjectRepository::new(store.clone())),
            users: UserRepository::new(store.clone()),
            credentials: CredentialStore::new(),
            events: EventBus::new(),
            defaults,
            store,
            settings,
        })
    }

    /// API configuration from the current settings
    pub fn api_config(&self) -> ApiConfig {
        let config = ApiConfig::new(self.settings.api_url.clone());
        match &self.defaults.model {
            Some(model) => config.with_model(model.clone()),
            None => config,
        }
    }

    /// A fresh session for `studio`, attributed to the current user
    pub async fn session(&self, studio: StudioKind) -> Result<StudioSession, CliError> {
        let user = self.users.me().await?;
        let client = Arc::new(LlmClient::new(self.api_config(), self.credentials.clone()));

        Ok(
            StudioSession::new(studio, client, self.credentials.clone(), self.projects.clone())
                .with_events(Arc::new(self.events.clone()))
                .with_created_by(user.email),
        )
    }

    /// Studio to open when none is named
    pub async fn default_studio(&self) -> Result<StudioKind, CliError> {
        Ok(self.users.me().await?.preferences.default_studio)
    }

    pub async fn save_settings(&self) -> Result<(), CliError> {
        self.settings.save(self.store.as_ref()).await?;
        Ok(())
    }

    /// Delete all stored data and return to default settings
    pub async fn clear_data(&mut self) -> Result<(), CliError> {
        self.settings = AppSettings::reset(self.store.as_ref(), &self.defaults).await?;
        self.credentials.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_store::MemoryStore;

    #[tokio::test]
    async fn test_api_config_uses_settings_and_model_override() {
        let defaults = EnvDefaults::from_lookup(|name| match name {
            "STUDIO_MODEL" => Some("llama3.1-8b".to_string()),
            _ => None,
        });
        let mut app = App::with_store(defaults, Arc::new(MemoryStore::new()))
            .await
            .unwrap();
        app.settings.api_url = "http://localhost:8080/v1/".to_string();

        let config = app.api_config();
        assert_eq!(config.completions_url(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(config.model, "llama3.1-8b");
    }

    #[tokio::test]
    async fn test_session_is_attributed_to_user() {
        let app = App::with_store(EnvDefaults::default(), Arc::new(MemoryStore::new()))
            .await
            .unwrap();
        app.users.login("ada@example.com").await.unwrap();

        let session = app.session(StudioKind::Code).await.unwrap();
        assert_eq!(session.studio(), StudioKind::Code);
        assert_eq!(session.created_by(), "ada@example.com");

        app.users.logout().await.unwrap();
        let session = app.session(StudioKind::Code).await.unwrap();
        assert_eq!(session.created_by(), "demo@cerebras.studio");
    }

    #[tokio::test]
    async fn test_open_persists_settings_in_data_dir() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let defaults = EnvDefaults {
            data_dir: Some(temp_dir.path().to_path_buf()),
            ..EnvDefaults::default()
        };

        let mut app = App::open(defaults.clone()).await.unwrap();
        app.settings.app_name = "My Studio".to_string();
        app.save_settings().await.unwrap();

        let reopened = App::open(defaults).await.unwrap();
        assert_eq!(reopened.settings.app_name, "My Studio");
    }

    #[tokio::test]
    async fn test_clear_data_forgets_credential() {
        let mut app = App::with_store(EnvDefaults::default(), Arc::new(MemoryStore::new()))
            .await
            .unwrap();
        app.credentials.set("sk-test");
        app.users.login("ada@example.com").await.unwrap();

        app.clear_data().await.unwrap();
        assert!(app.credentials.is_required());
        assert_eq!(app.users.me().await.unwrap().id, "demo-user");
    }
}
