//! Session provider seam: sign-in, sign-out and identity change notifications.

use async_trait::async_trait;
use shared::domain::Identity;
use tokio::sync::{watch, Mutex};
use tracing::info;

use crate::error::SessionError;

#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// Receiver holding the identity current at subscription time; it observes
    /// every later sign-in and sign-out. Dropping it unsubscribes.
    fn subscribe(&self) -> watch::Receiver<Option<Identity>>;
    async fn sign_in(&self) -> Result<(), SessionError>;
    async fn sign_out(&self) -> Result<(), SessionError>;
}

/// In-process provider that signs in a fixed identity.
pub struct LocalSessionProvider {
    identity: Identity,
    current: watch::Sender<Option<Identity>>,
    injected_failures: Mutex<InjectedFailures>,
}

#[derive(Default)]
struct InjectedFailures {
    sign_in: Option<SessionError>,
    sign_out: Option<SessionError>,
}

impl LocalSessionProvider {
    pub fn new(identity: Identity) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            identity,
            current,
            injected_failures: Mutex::new(InjectedFailures::default()),
        }
    }

    /// Provider that starts with `identity` already signed in.
    pub fn signed_in(identity: Identity) -> Self {
        let provider = Self::new(identity.clone());
        provider.current.send_replace(Some(identity));
        provider
    }

    pub fn current(&self) -> Option<Identity> {
        self.current.borrow().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.current.receiver_count()
    }

    pub async fn fail_next_sign_in(&self, error: SessionError) {
        self.injected_failures.lock().await.sign_in = Some(error);
    }

    pub async fn fail_next_sign_out(&self, error: SessionError) {
        self.injected_failures.lock().await.sign_out = Some(error);
    }
}

#[async_trait]
impl SessionProvider for LocalSessionProvider {
    fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.current.subscribe()
    }

    async fn sign_in(&self) -> Result<(), SessionError> {
        if let Some(error) = self.injected_failures.lock().await.sign_in.take() {
            return Err(error);
        }
        info!(uid = %self.identity.uid, "session: signed in");
        self.current.send_replace(Some(self.identity.clone()));
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), SessionError> {
        if let Some(error) = self.injected_failures.lock().await.sign_out.take() {
            return Err(error);
        }
        info!(uid = %self.identity.uid, "session: signed out");
        self.current.send_replace(None);
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
