//! Creative Studio engine
//!
//! Ties the credential store, completion backend and project repository
//! together into one generation workflow per studio:
//!
//! - `StudioSession`: the Idle → Generating → Idle state machine, the
//!   credential prompt and the save path
//! - `AttachmentSet`: size/count validated files whose text is spliced into
//!   the prompt
//! - `EventBus`: notifications and lifecycle events for front-ends
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use studio_engine::{EventBus, StudioSession};
//! use studio_inference::{ApiConfig, CredentialStore, LlmClient};
//! use studio_store::{MemoryStore, ProjectRepository, StudioKind};
//!
//! let credentials = CredentialStore::new();
//! let client = Arc::new(LlmClient::new(ApiConfig::default(), credentials.clone()));
//! let projects = Arc::new(ProjectRepository::new(Arc::new(MemoryStore::new())));
//!
//! let mut session = StudioSession::new(StudioKind::Creative, client, credentials, projects)
//!     .with_events(Arc::new(EventBus::new()));
//! session.set_prompt("Write a haiku");
//! session.generate().await?;
//! ```

pub mod attachments;
pub mod constants;
pub mod error;
pub mod events;
pub mod prompt;
pub mod session;
pub mod settings;
pub mod studio;

pub use attachments::{
    Attachment, AttachmentContent, AttachmentPolicy, AttachmentSet, FileData, SelectedFile,
    SelectionOutcome,
};
pub use error::{Result, StudioError};
pub use events::{EventBus, EventSink, NotificationLevel, NullEventSink, StudioEvent, VecEventSink};
pub use prompt::{enhance_prompt, strip_file_context};
pub use session::{GenerateOutcome, GenerationState, StudioSession};
pub use settings::GenerationSettings;
pub use studio::{descriptor, StudioDescriptor, STUDIOS};
