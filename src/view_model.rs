//! View state and its transitions.
//!
//! [`ViewState::update`] is a pure function of the current state and one
//! [`Event`]. Anything that has to reach a collaborator (the auth provider,
//! the entry store, the suggestion timer) comes back as an [`Effect`] for
//! the controller to run; the outcome is fed back in as another event.

use crate::errors::{AuthError, StoreError};
use crate::insights::{Insight, build_insights};
use crate::models::{Identity, Mood, MoodEntry, NewEntry, ViewResponse};
use crate::stats::{MoodStats, build_stats, sort_entries};
use crate::store::StoreEvent;
use chrono::Local;
use serde::Deserialize;
use tracing::{debug, info, warn};

pub const SAVE_FAILED: &str = "Failed to save mood. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete entry. Please try again.";
pub const SIGN_IN_FAILED: &str = "Sign-in failed. Please try again.";
pub const SIGN_OUT_FAILED: &str = "Sign-out failed. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Resolving,
    Unauthenticated,
    Authenticated(Identity),
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            SessionState::Resolving => "resolving",
            SessionState::Unauthenticated => "unauthenticated",
            SessionState::Authenticated(_) => "authenticated",
        }
    }
}

/// Things the user can do from the page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    SignIn { display_name: String },
    SignOut,
    SelectMood { mood: Mood },
    EditNote { note: String },
    Submit,
    /// Replaces the whole draft and submits it in one step.
    CheckIn { mood: Option<Mood>, note: String },
    RequestDelete { id: String },
    ConfirmDelete { confirmed: bool },
    DismissNotice,
}

#[derive(Debug)]
pub enum Event {
    IdentityChanged(Option<Identity>),
    Entries(StoreEvent),
    Command(Command),
    SignedIn(Result<Identity, AuthError>),
    SignedOut(Result<(), AuthError>),
    Submitted {
        owner_id: String,
        mood: Mood,
        result: Result<String, StoreError>,
    },
    Deleted { id: String, result: Result<(), StoreError> },
    SuggestionExpired { generation: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Replace any entry subscription with one for this owner.
    Subscribe { owner_id: String },
    Unsubscribe,
    Create(NewEntry),
    Delete { id: String, owner_id: String },
    SignIn { display_name: String },
    SignOut,
    ExpireSuggestion { generation: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub mood: Mood,
    pub generation: u64,
}

impl Suggestion {
    pub fn text(&self) -> &'static str {
        self.mood.suggestion()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub session: SessionState,
    pub entries: Vec<MoodEntry>,
    pub stats: Option<MoodStats>,
    pub insights: Vec<Insight>,
    pub loading_entries: bool,
    pub draft_mood: Option<Mood>,
    pub draft_note: String,
    pub is_submitting: bool,
    pub signing_in: bool,
    pub suggestion: Option<Suggestion>,
    /// Persistent banner; cleared by the next good snapshot.
    pub sync_error: Option<String>,
    /// Blocking alert; cleared when the user dismisses it.
    pub notice: Option<String>,
    /// Entry waiting for a yes/no answer before it is deleted.
    pub pending_delete: Option<String>,
    suggestion_generation: u64,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.session.identity()
    }

    pub fn can_submit(&self) -> bool {
        self.draft_mood.is_some() && self.identity().is_some() && !self.is_submitting
    }

    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::IdentityChanged(identity) => self.on_identity(identity),
            Event::Entries(StoreEvent::Snapshot(entries)) => {
                self.on_snapshot(entries);
                Vec::new()
            }
            Event::Entries(StoreEvent::Error(message)) => {
                warn!(error = %message, "entry subscription failed");
                self.loading_entries = false;
                self.sync_error = Some(message);
                Vec::new()
            }
            Event::Command(command) => self.on_command(command),
            Event::SignedIn(result) => {
                self.signing_in = false;
                if let Err(err) = result {
                    warn!(error = %err, "sign-in failed");
                    self.notice = Some(SIGN_IN_FAILED.to_string());
                }
                Vec::new()
            }
            Event::SignedOut(result) => {
                if let Err(err) = result {
                    warn!(error = %err, "sign-out failed");
                    self.notice = Some(SIGN_OUT_FAILED.to_string());
                }
                Vec::new()
            }
            Event::Submitted {
                owner_id,
                mood,
                result,
            } => self.on_submitted(&owner_id, mood, result),
            Event::Deleted { id, result } => {
                if let Err(err) = result {
                    warn!(%id, error = %err, "failed to delete entry");
                    self.notice = Some(DELETE_FAILED.to_string());
                }
                Vec::new()
            }
            Event::SuggestionExpired { generation } => {
                if self
                    .suggestion
                    .as_ref()
                    .is_some_and(|s| s.generation == generation)
                {
                    self.suggestion = None;
                }
                Vec::new()
            }
        }
    }

    fn on_identity(&mut self, identity: Option<Identity>) -> Vec<Effect> {
        let previous = std::mem::take(&mut self.session);
        match (previous, identity) {
            (SessionState::Authenticated(current), Some(next)) if current.uid == next.uid => {
                self.session = SessionState::Authenticated(next);
                Vec::new()
            }
            (previous, Some(next)) => {
                let mut effects = Vec::new();
                if matches!(previous, SessionState::Authenticated(_)) {
                    self.end_session();
                    effects.push(Effect::Unsubscribe);
                }
                info!(uid = %next.uid, "session started");
                self.loading_entries = true;
                effects.push(Effect::Subscribe {
                    owner_id: next.uid.clone(),
                });
                self.session = SessionState::Authenticated(next);
                effects
            }
            (SessionState::Authenticated(current), None) => {
                info!(uid = %current.uid, "session ended");
                self.end_session();
                self.session = SessionState::Unauthenticated;
                vec![Effect::Unsubscribe]
            }
            (_, None) => {
                self.session = SessionState::Unauthenticated;
                Vec::new()
            }
        }
    }

    fn end_session(&mut self) {
        self.set_entries(Vec::new());
        self.loading_entries = false;
        self.is_submitting = false;
        self.sync_error = None;
        self.pending_delete = None;
        self.suggestion = None;
        self.clear_draft();
    }

    fn clear_draft(&mut self) {
        self.draft_mood = None;
        self.draft_note.clear();
    }

    fn on_snapshot(&mut self, mut entries: Vec<MoodEntry>) {
        let Some(identity) = self.identity() else {
            debug!("snapshot outside a session ignored");
            return;
        };
        let uid = identity.uid.clone();
        entries.retain(|entry| entry.owner_id == uid);
        sort_entries(&mut entries);
        self.set_entries(entries);
        self.loading_entries = false;
        self.sync_error = None;
    }

    fn set_entries(&mut self, entries: Vec<MoodEntry>) {
        self.stats = build_stats(&entries);
        self.insights = build_insights(&entries, &Local).collect();
        self.entries = entries;
    }

    fn on_command(&mut self, command: Command) -> Vec<Effect> {
        match command {
            Command::SignIn { display_name } => {
                if self.session != SessionState::Unauthenticated || self.signing_in {
                    return Vec::new();
                }
                self.signing_in = true;
                vec![Effect::SignIn { display_name }]
            }
            Command::SignOut => match self.session {
                SessionState::Authenticated(_) => vec![Effect::SignOut],
                _ => Vec::new(),
            },
            Command::SelectMood { mood } => {
                self.draft_mood = Some(mood);
                Vec::new()
            }
            Command::EditNote { note } => {
                self.draft_note = note;
                Vec::new()
            }
            Command::Submit => self.submit(),
            Command::CheckIn { mood, note } => {
                self.draft_mood = mood;
                self.draft_note = note;
                self.submit()
            }
            Command::RequestDelete { id } => {
                if self.entries.iter().any(|entry| entry.id == id) {
                    self.pending_delete = Some(id);
                } else {
                    debug!(%id, "delete requested for an entry not in view");
                }
                Vec::new()
            }
            Command::ConfirmDelete { confirmed } => {
                match (self.pending_delete.take(), self.identity()) {
                    (Some(id), Some(identity)) if confirmed => vec![Effect::Delete {
                        id,
                        owner_id: identity.uid.clone(),
                    }],
                    _ => Vec::new(),
                }
            }
            Command::DismissNotice => {
                self.notice = None;
                Vec::new()
            }
        }
    }

    fn submit(&mut self) -> Vec<Effect> {
        if !self.can_submit() {
            return Vec::new();
        }
        let (Some(mood), Some(identity)) = (self.draft_mood, self.identity()) else {
            return Vec::new();
        };
        let entry = NewEntry {
            mood,
            note: self.draft_note.trim().to_string(),
            owner_id: identity.uid.clone(),
        };
        self.is_submitting = true;
        vec![Effect::Create(entry)]
    }

    fn on_submitted(
        &mut self,
        owner_id: &str,
        mood: Mood,
        result: Result<String, StoreError>,
    ) -> Vec<Effect> {
        if self.identity().is_none_or(|identity| identity.uid != owner_id) {
            debug!(
                owner = %owner_id,
                ok = result.is_ok(),
                "check-in result from an ended session"
            );
            return Vec::new();
        }
        self.is_submitting = false;
        match result {
            Ok(id) => {
                debug!(%id, "check-in saved");
                self.clear_draft();
                self.suggestion_generation += 1;
                let generation = self.suggestion_generation;
                self.suggestion = Some(Suggestion { mood, generation });
                vec![Effect::ExpireSuggestion { generation }]
            }
            Err(err) => {
                warn!(error = %err, "failed to save check-in");
                self.notice = Some(SAVE_FAILED.to_string());
                Vec::new()
            }
        }
    }

    pub fn to_response(&self) -> ViewResponse {
        ViewResponse {
            session: self.session.label(),
            user: self.identity().cloned(),
            loading_entries: self.loading_entries,
            entries: self.entries.clone(),
            draft_mood: self.draft_mood,
            draft_note: self.draft_note.clone(),
            is_submitting: self.is_submitting,
            suggestion: self.suggestion.as_ref().map(Suggestion::text),
            sync_error: self.sync_error.clone(),
            notice: self.notice.clone(),
            pending_delete: self.pending_delete.clone(),
            stats: self.stats.as_ref().map(MoodStats::to_response),
            insights: self.insights.iter().map(|insight| insight.message()).collect(),
        }
    }
}
