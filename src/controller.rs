use crate::auth::AuthProvider;
use crate::errors::ControllerClosed;
use crate::models::Identity;
use crate::store::{EntryStore, StoreEvent};
use crate::subscription::Subscription;
use crate::view_model::{Command, Effect, Event, ViewState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

pub const DEFAULT_SUGGESTION_WINDOW: Duration = Duration::from_secs(10);

const COMMAND_BUFFER: usize = 64;

struct Envelope {
    command: Command,
    applied: oneshot::Sender<ViewState>,
}

/// Cloneable front door to a running [`Controller`].
#[derive(Clone)]
pub struct ControllerHandle {
    commands: mpsc::Sender<Envelope>,
    state: watch::Receiver<ViewState>,
}

impl ControllerHandle {
    /// Applies `command` and returns the state right after it. Collaborator
    /// calls the command starts finish later and show up in later states.
    pub async fn dispatch(&self, command: Command) -> Result<ViewState, ControllerClosed> {
        let (applied, rx) = oneshot::channel();
        self.commands
            .send(Envelope { command, applied })
            .await
            .map_err(|_| ControllerClosed)?;
        rx.await.map_err(|_| ControllerClosed)
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Waits until the published state satisfies `ready`.
    pub async fn wait_for(
        &self,
        ready: impl FnMut(&ViewState) -> bool,
    ) -> Result<ViewState, ControllerClosed> {
        let mut state = self.state.clone();
        let found = state.wait_for(ready).await.map_err(|_| ControllerClosed)?;
        Ok(found.clone())
    }
}

/// Owns the view state and runs every transition on one task.
pub struct Controller {
    state: ViewState,
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn EntryStore>,
    identity: Subscription<Option<Identity>>,
    entries: Option<Subscription<StoreEvent>>,
    commands: mpsc::Receiver<Envelope>,
    results_tx: mpsc::UnboundedSender<Event>,
    results: mpsc::UnboundedReceiver<Event>,
    published: watch::Sender<ViewState>,
    suggestion_window: Duration,
}

impl Controller {
    /// Subscribes to identity changes and starts the update loop.
    pub async fn spawn(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn EntryStore>,
        suggestion_window: Duration,
    ) -> ControllerHandle {
        let identity = auth.subscribe().await;
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (results_tx, results) = mpsc::unbounded_channel();
        let state = ViewState::new();
        let (published, state_rx) = watch::channel(state.clone());

        let controller = Controller {
            state,
            auth,
            store,
            identity,
            entries: None,
            commands,
            results_tx,
            results,
            published,
            suggestion_window,
        };
        tokio::spawn(controller.run());

        ControllerHandle {
            commands: commands_tx,
            state: state_rx,
        }
    }

    async fn run(mut self) {
        info!("view controller started");
        loop {
            tokio::select! {
                Some(identity) = self.identity.recv() => {
                    self.handle(Event::IdentityChanged(identity)).await;
                }
                Some(event) = next_entry_event(&mut self.entries) => {
                    self.handle(Event::Entries(event)).await;
                }
                Some(event) = self.results.recv() => {
                    self.handle(event).await;
                }
                envelope = self.commands.recv() => {
                    let Some(Envelope { command, applied }) = envelope else {
                        break;
                    };
                    debug!(?command, "command received");
                    self.handle(Event::Command(command)).await;
                    let _ = applied.send(self.state.clone());
                }
            }
        }

        if let Some(entries) = self.entries.take() {
            entries.cancel();
        }
        info!("view controller stopped");
    }

    async fn handle(&mut self, event: Event) {
        let effects = self.state.update(event);
        for effect in effects {
            self.run_effect(effect).await;
        }
        self.published.send_replace(self.state.clone());
    }

    async fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Subscribe { owner_id } => {
                if let Some(previous) = self.entries.take() {
                    previous.cancel();
                }
                self.entries = Some(self.store.subscribe(&owner_id).await);
            }
            Effect::Unsubscribe => {
                if let Some(entries) = self.entries.take() {
                    entries.cancel();
                }
            }
            Effect::Create(entry) => {
                let store = Arc::clone(&self.store);
                let results = self.results_tx.clone();
                tokio::spawn(async move {
                    let owner_id = entry.owner_id.clone();
                    let mood = entry.mood;
                    let result = store.add(entry).await;
                    let _ = results.send(Event::Submitted {
                        owner_id,
                        mood,
                        result,
                    });
                });
            }
            Effect::Delete { id, owner_id } => {
                let store = Arc::clone(&self.store);
                let results = self.results_tx.clone();
                tokio::spawn(async move {
                    let result = store.delete(&id, &owner_id).await;
                    let _ = results.send(Event::Deleted { id, result });
                });
            }
            Effect::SignIn { display_name } => {
                let auth = Arc::clone(&self.auth);
                let results = self.results_tx.clone();
                tokio::spawn(async move {
                    let result = auth.sign_in(&display_name).await;
                    let _ = results.send(Event::SignedIn(result));
                });
            }
            Effect::SignOut => {
                let auth = Arc::clone(&self.auth);
                let results = self.results_tx.clone();
                tokio::spawn(async move {
                    let result = auth.sign_out().await;
                    let _ = results.send(Event::SignedOut(result));
                });
            }
            Effect::ExpireSuggestion { generation } => {
                let window = self.suggestion_window;
                let results = self.results_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(window).await;
                    let _ = results.send(Event::SuggestionExpired { generation });
                });
            }
        }
    }
}

async fn next_entry_event(entries: &mut Option<Subscription<StoreEvent>>) -> Option<StoreEvent> {
    match entries {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}
