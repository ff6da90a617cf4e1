//! Session-scoped API credential
//!
//! The key lives only in memory for the lifetime of the process. It is never
//! written to disk, and consumers observe whether one is present through a
//! `watch` channel so they can block or resume work.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;

/// The bearer secret used to call the completions endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Expose the raw secret for the `Authorization` header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

struct Inner {
    key: RwLock<Option<ApiKey>>,
    required_tx: watch::Sender<bool>,
}

/// Process-wide holder of the API credential.
///
/// Cloning is cheap and every clone shares the same slot, so one store can be
/// handed to the client, the orchestrator and the front-end alike.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<Inner>,
}

impl CredentialStore {
    /// Create an empty store; a credential is required until one is set
    pub fn new() -> Self {
        let (required_tx, _) = watch::channel(true);
        Self {
            inner: Arc::new(Inner {
                key: RwLock::new(None),
                required_tx,
            }),
        }
    }

    /// Current credential, if any
    pub fn get(&self) -> Option<ApiKey> {
        self.inner.key.read().clone()
    }

    /// Replace the stored credential.
    ///
    /// A blank value is treated the same as [`clear`](Self::clear).
    pub fn set(&self, value: impl Into<String>) {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.clear();
            return;
        }

        *self.inner.key.write() = Some(ApiKey(trimmed.to_string()));
        self.inner.required_tx.send_replace(false);
        log::info!("API credential set for this session");
    }

    /// Remove the credential, returning consumers to the blocked state
    pub fn clear(&self) {
        *self.inner.key.write() = None;
        self.inner.required_tx.send_replace(true);
        log::info!("API credential cleared");
    }

    /// Whether a credential still has to be supplied
    pub fn is_required(&self) -> bool {
        self.inner.key.read().is_none()
    }

    /// Watch the `is_required` flag
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.required_tx.subscribe()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("is_required", &self.is_required())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_until_set() {
        let store = CredentialStore::new();
        assert!(store.get().is_none());
        assert!(store.is_required());
    }

    #[test]
    fn test_set_and_clear() {
        let store = CredentialStore::new();
        store.set("sk-test");
        assert_eq!(store.get().unwrap().expose(), "sk-test");
        assert!(!store.is_required());

        store.clear();
        assert!(store.get().is_none());
        assert!(store.is_required());
    }

    #[test]
    fn test_blank_value_clears() {
        let store = CredentialStore::new();
        store.set("sk-test");
        store.set("   ");
        assert!(store.is_required());
    }

    #[test]
    fn test_clones_share_slot() {
        let store = CredentialStore::new();
        let consumer = store.clone();
        store.set("sk-shared");
        assert_eq!(consumer.get().unwrap().expose(), "sk-shared");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let store = CredentialStore::new();
        store.set("sk-secret");
        let key = store.get().unwrap();
        assert!(!format!("{:?}", key).contains("sk-secret"));
        assert!(!format!("{:?}", store).contains("sk-secret"));
    }

    #[tokio::test]
    async fn test_subscribers_observe_transitions() {
        let store = CredentialStore::new();
        let mut rx = store.subscribe();
        assert!(*rx.borrow());

        store.set("sk-test");
        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());

        store.clear();
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
    }
}
