//! Session constants

/// Default values
pub mod defaults {
    pub const TEMPERATURE: f32 = 0.7;
    pub const MAX_TOKENS: u32 = 1000;
    pub const TOP_P: f32 = 1.0;

    /// Pending attachments per request
    pub const MAX_FILES: usize = 5;
    /// Per-file size limit in megabytes
    pub const MAX_SIZE_MB: u64 = 10;
    /// Advisory list of extensions shown when picking files
    pub const ACCEPTED_TYPES: &str =
        ".txt,.md,.js,.jsx,.ts,.tsx,.py,.java,.cpp,.c,.html,.css,.json,.xml,.csv,.pdf,.doc,.docx";

    /// How long notifications stay visible
    pub const NOTIFICATION_DURATION_MS: u64 = 3000;
    pub const EVENT_BUS_CAPACITY: usize = 64;
}

/// Accepted ranges for generation settings
pub mod limits {
    pub const TEMPERATURE: (f32, f32) = (0.0, 1.0);
    pub const MAX_TOKENS: (u32, u32) = (100, 2000);
    pub const TOP_P: (f32, f32) = (0.0, 1.0);
}

/// Prompt assembly
pub mod prompt {
    /// Between the file context and the user's prompt
    pub const SEPARATOR: &str = "\n---\n";
    pub const FILE_LABEL_PREFIX: &str = "[File: ";
    /// Stands in for content that could not be read as text
    pub const CONTENT_UNAVAILABLE: &str = "File content not available";
    /// Extensions read as text regardless of MIME type
    pub const TEXT_EXTENSIONS: &[&str] = &["txt", "md", "markdown", "json", "xml", "csv"];
}

/// User-facing messages
pub mod messages {
    pub const PROMPT_REQUIRED: &str = "Please enter a prompt.";
    pub const TITLE_REQUIRED: &str = "Please enter a title.";
    pub const NOTHING_TO_SAVE: &str = "Generate some content before saving.";
    pub const GENERATED: &str = "Content generated successfully!";
    pub const GENERATION_FAILED: &str = "Failed to generate content. Please try again.";
    /// Shown in place of generated content after a failure
    pub const GENERATION_FAILED_CONTENT: &str =
        "Sorry, something went wrong while generating content. Please check your API key and try again.";
    pub const SAVED: &str = "Project saved successfully!";
    pub const SAVE_FAILED: &str = "Failed to save project. Please try again.";
    pub const CREDENTIAL_SET: &str = "API key set for this session.";
}
