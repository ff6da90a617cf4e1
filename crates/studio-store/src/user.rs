//! The single local user profile.
//!
//! There is no real authentication. A demo profile is handed out until
//! someone logs in with an email address, and logging out removes the
//! stored record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{demo_user, keys};
use crate::models::{generate_id, now, StudioKind};
use crate::storage::{read_json, write_json, KeyValueStore};
use crate::{Result, StoreError};

/// Colour scheme preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    pub theme: Theme,
    pub default_studio: StudioKind,
    pub notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            default_studio: StudioKind::Text,
            notifications: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default = "now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub preferences: Preferences,
}

impl User {
    /// Profile used before anyone has logged in
    pub fn demo() -> Self {
        Self {
            id: demo_user::ID.to_string(),
            email: demo_user::EMAIL.to_string(),
            name: demo_user::NAME.to_string(),
            avatar: None,
            created_at: now(),
            preferences: Preferences::default(),
        }
    }
}

/// Partial profile update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub preferences: Option<Preferences>,
}

pub struct UserRepository {
    store: Arc<dyn KeyValueStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored profile, or the demo profile when there is none.
    pub async fn me(&self) -> Result<User> {
        match read_json::<User>(self.store.as_ref(), keys::USER).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Ok(User::demo()),
            Err(StoreError::Serialization(e)) => {
                log::warn!("Stored user profile is unreadable, using demo profile: {}", e);
                Ok(User::demo())
            }
            Err(e) => Err(e),
        }
    }

    /// Store a profile for `email`, named after the part before the `@`.
    pub async fn login(&self, email: &str) -> Result<User> {
        let email = email.trim();
        if email.is_empty() {
            return Err(StoreError::Validation("Email is required".to_string()));
        }

        let name = email.split('@').next().unwrap_or(email).to_string();
        let user = User {
            id: generate_id(),
            email: email.to_string(),
            name,
            avatar: None,
            created_at: now(),
            preferences: Preferences::default(),
        };

        write_json(self.store.as_ref(), keys::USER, &user).await?;
        log::info!("Logged in as {}", user.email);
        Ok(user)
    }

    pub async fn logout(&self) -> Result<()> {
        self.store.remove(keys::USER).await?;
        log::info!("Logged out");
        Ok(())
    }

    /// Merge `patch` into the current profile and store the result.
    pub async fn update(&self, patch: UserPatch) -> Result<User> {
        let mut user = self.me().await?;
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(avatar) = patch.avatar {
            user.avatar = Some(avatar).filter(|a| !a.is_empty());
        }
        if let Some(preferences) = patch.preferences {
            user.preferences = preferences;
        }

        write_json(self.store.as_ref(), keys::USER, &user).await?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn repository() -> (UserRepository, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (UserRepository::new(store.clone()), store)
    }

    #[tokio::test]
    async fn test_demo_profile_before_login() {
        let (users, store) = repository();
        let user = users.me().await.unwrap();

        assert_eq!(user.id, "demo-user");
        assert_eq!(user.email, "demo@cerebras.studio");
        assert_eq!(user.name, "Demo User");
        assert_eq!(user.preferences, Preferences::default());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let (users, _) = repository();
        let user = users.login("  ada@example.com ").await.unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.name, "ada");
        assert_eq!(users.me().await.unwrap(), user);

        users.logout().await.unwrap();
        assert_eq!(users.me().await.unwrap().id, "demo-user");
    }

    #[tokio::test]
    async fn test_login_requires_email() {
        let (users, _) = repository();
        assert!(matches!(
            users.login("   ").await,
            Err(StoreError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_preferences() {
        let (users, _) = repository();
        users.login("grace@example.com").await.unwrap();

        let updated = users
            .update(UserPatch {
                preferences: Some(Preferences {
                    theme: Theme::Dark,
                    default_studio: StudioKind::Code,
                    notifications: false,
                }),
                ..UserPatch::default()
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "grace");
        assert_eq!(users.me().await.unwrap().preferences.default_studio, StudioKind::Code);
    }

    #[tokio::test]
    async fn test_stored_profile_is_camel_case() {
        let (users, store) = repository();
        users.login("lin@example.com").await.unwrap();

        let raw = store.get(keys::USER).await.unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["preferences"]["defaultStudio"], json!("text"));
        assert_eq!(value["preferences"]["theme"], json!("light"));
    }

    #[tokio::test]
    async fn test_unreadable_profile_falls_back_to_demo() {
        let (users, store) = repository();
        store.set(keys::USER, "[1, 2").await.unwrap();
        assert_eq!(users.me().await.unwrap().id, "demo-user");
    }
}
