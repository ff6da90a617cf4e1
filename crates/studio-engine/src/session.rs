//! Studio session state machine
//!
//! A [`StudioSession`] owns one studio's form (title, prompt, attachments,
//! settings) and drives a generation through these states:
//!
//! ```text
//! Idle -> Validating -> [AwaitingCredential] -> Generating -> Succeeded -> Idle
//!                                                          \-> Failed    -> Idle
//! ```
//!
//! The session takes `&mut self` for anything that changes state, so one
//! session never runs two generations at once. Front-ends watch the state
//! through [`StudioSession::subscribe_state`] and render the events the
//! session publishes.

use std::path::Path;
use std::sync::Arc;

use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use studio_inference::{CompletionBackend, CredentialStore, InvokeOptions, LlmError};
use studio_store::{NewProject, Project, ProjectRepository, StudioKind};
use tokio::sync::watch;

use crate::attachments::{self, AttachmentPolicy, AttachmentSet, SelectedFile, SelectionOutcome};
use crate::constants::messages;
use crate::error::{Result, StudioError};
use crate::events::{EventSink, NotificationLevel, NullEventSink, StudioEvent};
use crate::prompt::enhance_prompt;
use crate::settings::GenerationSettings;
use crate::studio::{descriptor, StudioDescriptor};

/// Where a session is in the generation workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GenerationState {
    #[default]
    Idle,
    Validating,
    AwaitingCredential,
    Generating,
    Succeeded,
    Failed,
}

/// How a generate or credential submission ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// New content is available
    Generated,
    /// The request is held until a credential is submitted
    AwaitingCredential,
    /// The call failed; the content shows a failure message
    Failed,
}

/// What the output pane currently shows
#[derive(Debug, Clone, PartialEq)]
enum Output {
    Empty,
    Generated(String),
    Failed,
}

/// A request held while waiting for a credential
#[derive(Debug, Clone)]
struct PendingRequest {
    prompt: String,
    options: InvokeOptions,
    files: Vec<SelectedFile>,
}

/// One studio's generation workflow.
pub struct StudioSession {
    studio: StudioKind,
    backend: Arc<dyn CompletionBackend>,
    credentials: CredentialStore,
    projects: Arc<ProjectRepository>,
    events: Arc<dyn EventSink>,
    state_tx: watch::Sender<GenerationState>,
    created_by: String,

    title: String,
    prompt: String,
    output: Output,
    attachments: AttachmentSet,
    settings: GenerationSettings,
    pending: Option<PendingRequest>,
}

impl StudioSession {
    pub fn new(
        studio: StudioKind,
        backend: Arc<dyn CompletionBackend>,
        credentials: CredentialStore,
        projects: Arc<ProjectRepository>,
    ) -> Self {
        let (state_tx, _) = watch::channel(GenerationState::Idle);
        Self {
            studio,
            backend,
            credentials,
            projects,
            events: Arc::new(NullEventSink),
            state_tx,
            created_by: String::new(),
            title: String::new(),
            prompt: String::new(),
            output: Output::Empty,
            attachments: AttachmentSet::default(),
            settings: GenerationSettings::default(),
            pending: None,
        }
    }

    /// Publish events to `events` instead of discarding them
    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Author recorded on saved projects
    pub fn with_created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }

    pub fn with_attachment_policy(mut self, policy: AttachmentPolicy) -> Self {
        self.attachments = AttachmentSet::new(policy);
        self
    }

    pub fn studio(&self) -> StudioKind {
        self.studio
    }

    /// Author recorded on saved projects
    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn descriptor(&self) -> &'static StudioDescriptor {
        descriptor(self.studio)
    }

    pub fn state(&self) -> GenerationState {
        *self.state_tx.borrow()
    }

    /// Watch state transitions
    pub fn subscribe_state(&self) -> watch::Receiver<GenerationState> {
        self.state_tx.subscribe()
    }

    pub fn is_generating(&self) -> bool {
        self.state() == GenerationState::Generating
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// Text for the output pane: the generated content, the failure
    /// message after a failed call, or empty.
    pub fn content(&self) -> &str {
        match &self.output {
            Output::Empty => "",
            Output::Generated(text) => text,
            Output::Failed => messages::GENERATION_FAILED_CONTENT,
        }
    }

    /// Content from the last successful generation
    pub fn generated(&self) -> Option<&str> {
        match &self.output {
            Output::Generated(text) => Some(text),
            _ => None,
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut GenerationSettings {
        &mut self.settings
    }

    pub fn attachments(&self) -> &AttachmentSet {
        &self.attachments
    }

    /// Add files to the pending attachments.
    ///
    /// Size rejections are also published as an error notification.
    pub fn attach(&mut self, files: Vec<SelectedFile>) -> Result<SelectionOutcome> {
        let outcome = self.attachments.handle_selection(files);
        match &outcome {
            Ok(SelectionOutcome {
                rejected: Some(err), ..
            }) => self.emit(StudioEvent::error(err.to_string())),
            Err(err) => self.emit(StudioEvent::error(err.to_string())),
            Ok(_) => {}
        }
        outcome
    }

    /// Drop the pending attachment at `index`
    pub fn detach(&mut self, index: usize) -> Option<SelectedFile> {
        self.attachments.remove(index)
    }

    /// Whether the generate action should be enabled
    pub fn can_generate(&self) -> bool {
        !self.prompt.trim().is_empty() && !self.is_generating()
    }

    /// Whether the save action should be enabled
    pub fn can_save(&self) -> bool {
        !self.title.trim().is_empty()
            && !self.prompt.trim().is_empty()
            && self.generated().map_or(false, |text| !text.trim().is_empty())
    }

    /// Fill the prompt from the studio's example at `index`
    pub fn use_example(&mut self, index: usize) -> Result<&str> {
        let examples = self.descriptor().examples;
        let example = examples.get(index).ok_or_else(|| {
            StudioError::validation(
                "example",
                format!("No example {} (this studio has {})", index + 1, examples.len()),
            )
        })?;
        self.prompt = example.to_string();
        Ok(&self.prompt)
    }

    /// Run a generation for the current prompt.
    ///
    /// An empty prompt is rejected without side effects. Without a
    /// credential the request is held and the session waits for
    /// [`submit_credential`](Self::submit_credential). API failures do not
    /// return an error: they end in [`GenerateOutcome::Failed`].
    pub async fn generate(&mut self) -> Result<GenerateOutcome> {
        if self.is_generating() {
            return Err(StudioError::Busy);
        }

        self.set_state(GenerationState::Validating);
        if self.prompt.trim().is_empty() {
            self.set_state(GenerationState::Idle);
            return Err(StudioError::validation("prompt", messages::PROMPT_REQUIRED));
        }

        let request = PendingRequest {
            prompt: self.prompt.clone(),
            options: self.settings.to_invoke_options(),
            files: self.attachments.files().to_vec(),
        };

        if self.credentials.is_required() {
            return Ok(self.hold(request));
        }
        Ok(self.run(request).await)
    }

    /// Store `key` for the session and resume a held request, if any.
    ///
    /// Returns `None` when nothing was waiting.
    pub async fn submit_credential(&mut self, key: &str) -> Result<Option<GenerateOutcome>> {
        if key.trim().is_empty() {
            return Err(StudioError::validation("apiKey", "API key is required."));
        }
        self.credentials.set(key);
        self.emit(StudioEvent::notify(NotificationLevel::Info, messages::CREDENTIAL_SET));

        match self.pending.take() {
            Some(request) => Ok(Some(self.run(request).await)),
            None => Ok(None),
        }
    }

    /// Close the credential prompt without a key, discarding a held request
    pub fn dismiss_credential_prompt(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("Discarded held {} request", self.studio);
        }
        if self.state() == GenerationState::AwaitingCredential {
            self.set_state(GenerationState::Idle);
        }
    }

    /// Save the current generation as a project.
    ///
    /// Refused with a validation error, before the repository is touched,
    /// unless [`can_save`](Self::can_save) holds.
    pub async fn save(&self) -> Result<Project> {
        if self.title.trim().is_empty() {
            return Err(StudioError::validation("title", messages::TITLE_REQUIRED));
        }
        if self.prompt.trim().is_empty() {
            return Err(StudioError::validation("prompt", messages::PROMPT_REQUIRED));
        }
        let Some(generated) = self.generated().filter(|text| !text.trim().is_empty()) else {
            return Err(StudioError::validation("content", messages::NOTHING_TO_SAVE));
        };

        let data = NewProject {
            title: self.title.trim().to_string(),
            studio: self.studio,
            content: self.prompt.clone(),
            generated_text: generated.to_string(),
            created_by: self.created_by.clone(),
            ..NewProject::default()
        };

        match self.projects.create(data).await {
            Ok(project) => {
                self.emit(StudioEvent::ProjectSaved {
                    project_id: project.id.clone(),
                    title: project.title.clone(),
                });
                self.emit(StudioEvent::success(messages::SAVED));
                Ok(project)
            }
            Err(e) => {
                log::error!("Failed to save {} project: {}", self.studio, e);
                self.emit(StudioEvent::error(messages::SAVE_FAILED));
                Err(e.into())
            }
        }
    }

    /// Write the generated content to `path`
    pub async fn export_generated(&self, path: impl AsRef<Path>) -> Result<()> {
        let Some(generated) = self.generated() else {
            return Err(StudioError::validation("content", messages::NOTHING_TO_SAVE));
        };
        let path = path.as_ref();
        tokio::fs::write(path, generated).await?;
        log::info!("Exported {} bytes to {:?}", generated.len(), path);
        Ok(())
    }

    /// Clear the form. Settings are kept.
    pub fn reset(&mut self) {
        self.title.clear();
        self.prompt.clear();
        self.output = Output::Empty;
        self.attachments.clear();
        self.pending = None;
        self.set_state(GenerationState::Idle);
    }

    fn hold(&mut self, request: PendingRequest) -> GenerateOutcome {
        log::debug!("No API key; holding {} request", self.studio);
        self.pending = Some(request);
        self.set_state(GenerationState::AwaitingCredential);
        self.emit(StudioEvent::CredentialRequested {
            studio: self.studio.to_string(),
        });
        GenerateOutcome::AwaitingCredential
    }

    async fn run(&mut self, request: PendingRequest) -> GenerateOutcome {
        // A request that reaches the backend supersedes any held one.
        if self.pending.take().is_some() {
            log::debug!("Discarded superseded {} request", self.studio);
        }
        self.set_state(GenerationState::Generating);
        self.output = Output::Empty;

        let read = join_all(request.files.iter().map(attachments::read)).await;
        let enhanced = enhance_prompt(&request.prompt, &read);

        self.emit(StudioEvent::GenerationStarted {
            studio: self.studio.to_string(),
            attachment_count: request.files.len(),
        });
        log::debug!(
            "Generating in {} studio ({} chars, {} attachments) via {}",
            self.studio,
            enhanced.len(),
            request.files.len(),
            self.backend.name()
        );

        match self.backend.invoke(&enhanced, &request.options).await {
            Ok(text) => {
                self.emit(StudioEvent::GenerationCompleted {
                    studio: self.studio.to_string(),
                    length: text.len(),
                });
                self.output = Output::Generated(text);
                self.set_state(GenerationState::Succeeded);
                self.emit(StudioEvent::success(messages::GENERATED));
                self.set_state(GenerationState::Idle);
                GenerateOutcome::Generated
            }
            Err(LlmError::CredentialMissing) => {
                // Cleared while the request was being prepared.
                self.hold(request)
            }
            Err(e) => {
                log::error!("Generation failed in {} studio: {}", self.studio, e);
                self.emit(StudioEvent::GenerationFailed {
                    studio: self.studio.to_string(),
                    status: e.status(),
                });
                self.output = Output::Failed;
                self.set_state(GenerationState::Failed);
                self.emit(StudioEvent::error(messages::GENERATION_FAILED));
                self.set_state(GenerationState::Idle);
                GenerateOutcome::Failed
            }
        }
    }

    fn set_state(&self, state: GenerationState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            log::trace!("{} studio: {:?} -> {:?}", self.studio, previous, state);
            self.emit(StudioEvent::StateChanged { state });
        }
    }

    fn emit(&self, event: StudioEvent) {
        if let Err(e) = self.events.send(event) {
            log::warn!("Failed to publish studio event: {}", e);
        }
    }
}
