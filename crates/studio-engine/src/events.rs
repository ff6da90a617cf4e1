//! Event types for observing a studio session
//!
//! Sessions publish notifications and lifecycle events through an
//! [`EventSink`]. Front-ends subscribe to an [`EventBus`] to render them;
//! tests collect them with [`VecEventSink`].

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::constants::defaults;
use crate::session::GenerationState;

/// Trait for publishing session events
///
/// This abstracts over the transport (broadcast channel, test collector,
/// nothing at all) so sessions can run in different contexts.
pub trait EventSink: Send + Sync {
    /// Send an event
    ///
    /// Returns an error if the event could not be delivered.
    fn send(&self, event: StudioEvent) -> Result<(), EventError>;
}

/// Error when sending events fails
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Event error: {message}")]
pub struct EventError {
    pub message: String,
}

/// Severity of a user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// Events emitted by a studio session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StudioEvent {
    /// Transient message for the user
    #[serde(rename_all = "camelCase")]
    Notification {
        level: NotificationLevel,
        message: String,
        /// How long a front-end should keep it on screen
        duration_ms: u64,
    },

    /// The session moved to a new state
    #[serde(rename_all = "camelCase")]
    StateChanged { state: GenerationState },

    /// A generation needs a credential before it can start
    #[serde(rename_all = "camelCase")]
    CredentialRequested { studio: String },

    /// The completion call was issued
    #[serde(rename_all = "camelCase")]
    GenerationStarted {
        studio: String,
        attachment_count: usize,
    },

    /// The completion call returned text
    #[serde(rename_all = "camelCase")]
    GenerationCompleted { studio: String, length: usize },

    /// The completion call failed
    #[serde(rename_all = "camelCase")]
    GenerationFailed {
        studio: String,
        status: Option<u16>,
    },

    /// A generation was saved as a project
    #[serde(rename_all = "camelCase")]
    ProjectSaved { project_id: String, title: String },
}

impl StudioEvent {
    /// Create a notification with the default display duration
    pub fn notify(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self::Notification {
            level,
            message: message.into(),
            duration_ms: defaults::NOTIFICATION_DURATION_MS,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::notify(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::notify(NotificationLevel::Error, message)
    }
}

/// In-process publish/subscribe channel for session events.
///
/// Cloning shares the same channel. Events published while nobody is
/// subscribed are dropped.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StudioEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(defaults::EVENT_BUS_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Receive every event published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<StudioEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for EventBus {
    fn send(&self, event: StudioEvent) -> Result<(), EventError> {
        if self.sender.send(event).is_err() {
            log::trace!("No event subscribers; event dropped");
        }
        Ok(())
    }
}

/// A no-op event sink that discards all events
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn send(&self, _event: StudioEvent) -> Result<(), EventError> {
        Ok(())
    }
}

/// A vector-based event sink that collects events
///
/// Useful for testing to verify events were emitted correctly.
#[derive(Default)]
pub struct VecEventSink {
    events: Mutex<Vec<StudioEvent>>,
}

impl VecEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all collected events
    pub fn events(&self) -> Vec<StudioEvent> {
        self.events.lock().clone()
    }

    /// Messages of collected notifications, in order
    pub fn notifications(&self) -> Vec<(NotificationLevel, String)> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                StudioEvent::Notification { level, message, .. } => Some((*level, message.clone())),
                _ => None,
            })
            .collect()
    }

    /// Clear all collected events
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for VecEventSink {
    fn send(&self, event: StudioEvent) -> Result<(), EventError> {
        self.events.lock().push(event);
        Ok(())
    }
}
