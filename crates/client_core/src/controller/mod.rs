//! View controller: a single task owns [`ViewState`] and applies events one at a time.
//!
//! Intents from the presentation layer, identity notifications from the
//! session provider, and completions of spawned effects all arrive on the same
//! queue, so state is only ever written by the controller task. Every applied
//! event publishes a fresh snapshot on a `watch` channel.

pub mod state;

use std::sync::Arc;

use shared::{domain::Identity, protocol::EnrichedResult};
use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{
    enrichment::Enricher,
    error::{ControllerError, EnrichError},
    session::SessionProvider,
};
use state::{Effect, Event, FormInput, ViewState};

/// Cloneable handle the presentation layer uses to drive the controller.
#[derive(Clone)]
pub struct ControllerHandle {
    events: mpsc::UnboundedSender<Event>,
    state: watch::Receiver<ViewState>,
}

impl ControllerHandle {
    pub fn login(&self) -> Result<(), ControllerError> {
        self.dispatch(Event::LoginRequested)
    }

    pub fn logout(&self) -> Result<(), ControllerError> {
        self.dispatch(Event::LogoutRequested)
    }

    pub fn edit_company_name(&self, value: impl Into<String>) -> Result<(), ControllerError> {
        self.dispatch(Event::CompanyNameEdited(value.into()))
    }

    pub fn edit_website_url(&self, value: impl Into<String>) -> Result<(), ControllerError> {
        self.dispatch(Event::WebsiteUrlEdited(value.into()))
    }

    /// Callers must only submit while signed in; the controller does not re-check.
    pub fn submit(
        &self,
        company_name: impl Into<String>,
        website_url: impl Into<String>,
    ) -> Result<(), ControllerError> {
        self.dispatch(Event::SubmitRequested(FormInput::new(
            company_name,
            website_url,
        )))
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<ViewState> {
        self.state.clone()
    }

    /// Waits until a published snapshot satisfies `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&ViewState) -> bool,
    ) -> Result<ViewState, ControllerError> {
        let mut state = self.state.clone();
        let snapshot = state
            .wait_for(predicate)
            .await
            .map_err(|_| ControllerError::Closed)?;
        Ok(snapshot.clone())
    }

    fn dispatch(&self, event: Event) -> Result<(), ControllerError> {
        self.events.send(event).map_err(|_| ControllerError::Closed)
    }
}

/// Starts the controller task. It runs until every [`ControllerHandle`] is
/// dropped and all in-flight effects have reported back.
pub fn spawn(
    session: Arc<dyn SessionProvider>,
    enricher: Arc<dyn Enricher>,
) -> (ControllerHandle, JoinHandle<()>) {
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (snapshots, state) = watch::channel(ViewState::default());
    let controller = ViewController {
        state: ViewState::default(),
        session,
        enricher,
        feedback: events_tx.downgrade(),
        events: events_rx,
        snapshots,
    };
    let task = tokio::spawn(controller.run());
    (
        ControllerHandle {
            events: events_tx,
            state,
        },
        task,
    )
}

struct ViewController {
    state: ViewState,
    session: Arc<dyn SessionProvider>,
    enricher: Arc<dyn Enricher>,
    feedback: mpsc::WeakUnboundedSender<Event>,
    events: mpsc::UnboundedReceiver<Event>,
    snapshots: watch::Sender<ViewState>,
}

impl ViewController {
    async fn run(mut self) {
        let _subscription = IdentitySubscription::start(
            self.session.subscribe(),
            self.feedback.clone(),
        );
        info!("view controller started");

        while let Some(event) = self.events.recv().await {
            let effect = self.state.apply(event);
            self.snapshots.send_replace(self.state.clone());
            if let Some(effect) = effect {
                self.execute(effect);
            }
        }

        info!("view controller stopped");
    }

    fn execute(&self, effect: Effect) {
        let Some(feedback) = self.feedback.upgrade() else {
            return;
        };

        match effect {
            Effect::SignIn => {
                let session = Arc::clone(&self.session);
                tokio::spawn(async move {
                    let outcome = session.sign_in().await;
                    let _ = feedback.send(Event::LoginSettled(outcome));
                });
            }
            Effect::SignOut => {
                let session = Arc::clone(&self.session);
                tokio::spawn(async move {
                    let outcome = session.sign_out().await;
                    let _ = feedback.send(Event::LogoutSettled(outcome));
                });
            }
            Effect::Enrich {
                generation,
                request,
            } => {
                let enricher = Arc::clone(&self.enricher);
                tokio::spawn(async move {
                    let guard = SettleGuard {
                        feedback: Some(feedback),
                        generation,
                    };
                    let outcome = enricher.enrich(&request).await;
                    guard.settle(outcome);
                });
            }
        }
    }
}

/// Reports a submission outcome exactly once, including when the enrichment
/// task panics or is aborted before it finishes, so loading always ends.
struct SettleGuard {
    feedback: Option<mpsc::UnboundedSender<Event>>,
    generation: u64,
}

impl SettleGuard {
    fn settle(mut self, outcome: Result<EnrichedResult, EnrichError>) {
        if let Some(feedback) = self.feedback.take() {
            let _ = feedback.send(Event::SubmitSettled {
                generation: self.generation,
                outcome,
            });
        }
    }
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        if let Some(feedback) = self.feedback.take() {
            let _ = feedback.send(Event::SubmitSettled {
                generation: self.generation,
                outcome: Err(EnrichError::Interrupted),
            });
        }
    }
}

/// Forwards identity changes into the controller queue until dropped.
struct IdentitySubscription {
    task: JoinHandle<()>,
}

impl IdentitySubscription {
    fn start(
        mut identities: watch::Receiver<Option<Identity>>,
        feedback: mpsc::WeakUnboundedSender<Event>,
    ) -> Self {
        let task = tokio::spawn(async move {
            loop {
                let identity = identities.borrow_and_update().clone();
                let Some(sender) = feedback.upgrade() else {
                    break;
                };
                if sender.send(Event::IdentityChanged(identity)).is_err() {
                    break;
                }
                drop(sender);
                if identities.changed().await.is_err() {
                    debug!("session provider dropped its identity channel");
                    break;
                }
            }
        });
        Self { task }
    }
}

impl Drop for IdentitySubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
