//! Storage keys and defaults

/// Keys of the persisted key-value pairs
pub mod keys {
    /// Array of projects
    pub const PROJECTS: &str = "projects";
    /// Single user record
    pub const USER: &str = "user";
    /// Credential slot written by older builds. Never written now; purged on load.
    pub const API_KEY: &str = "apiKey";
    pub const API_URL: &str = "apiUrl";
    pub const APP_NAME: &str = "appName";
    pub const VERSION: &str = "version";
    pub const ENVIRONMENT: &str = "environment";
}

/// Environment variables read once at startup
pub mod env {
    pub const API_URL: &str = "STUDIO_API_URL";
    pub const MODEL: &str = "STUDIO_MODEL";
    pub const APP_NAME: &str = "STUDIO_APP_NAME";
    pub const VERSION: &str = "STUDIO_VERSION";
    pub const ENVIRONMENT: &str = "STUDIO_ENVIRONMENT";
    pub const DATA_DIR: &str = "STUDIO_DATA_DIR";
}

/// Fallback values
pub mod defaults {
    pub const API_URL: &str = "https://api.cerebras.ai/v1";
    pub const APP_NAME: &str = "Creative Studio";
    pub const ENVIRONMENT: &str = "development";
    /// Status given to new projects
    pub const PROJECT_STATUS: &str = "draft";
    /// Directory name under the platform data dir
    pub const DATA_DIR_NAME: &str = "creative-studio";
    /// Used when the platform has no data dir
    pub const FALLBACK_DATA_DIR: &str = "data";
}

/// Demo profile returned when nobody has logged in
pub mod demo_user {
    pub const ID: &str = "demo-user";
    pub const EMAIL: &str = "demo@cerebras.studio";
    pub const NAME: &str = "Demo User";
}
