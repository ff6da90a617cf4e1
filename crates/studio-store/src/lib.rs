//! Local persistence for Creative Studio
//!
//! Everything the studio remembers between runs is a set of
//! `key -> JSON` pairs behind the [`KeyValueStore`] trait:
//!
//! - **ProjectRepository**: saved generations under `projects`
//! - **UserRepository**: the single local profile under `user`
//! - **AppSettings**: API URL and app metadata, one key each
//!
//! The API credential is never written here.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use studio_store::{EnvDefaults, JsonFileStore, NewProject, ProjectRepository};
//!
//! let defaults = EnvDefaults::from_env();
//! let store = Arc::new(JsonFileStore::new(defaults.data_dir()));
//! let projects = ProjectRepository::new(store);
//! let saved = projects.create(NewProject { title: "Haiku".into(), ..Default::default() }).await?;
//! ```

pub mod constants;
pub mod error;
pub mod models;
pub mod projects;
pub mod settings;
pub mod storage;
pub mod user;

pub use error::{Result, StoreError};
pub use models::{NewProject, Project, ProjectFilter, ProjectPatch, StudioKind, UnknownStudio};
pub use projects::ProjectRepository;
pub use settings::{AppSettings, EnvDefaults};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use user::{Preferences, Theme, User, UserPatch, UserRepository};
