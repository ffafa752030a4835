use async_trait::async_trait;
use mood_check::auth::{AuthProvider, LocalAuth};
use mood_check::errors::StoreError;
use mood_check::models::{Mood, MoodEntry, NewEntry};
use mood_check::store::{EntryStore, LocalStore, StoreEvent};
use mood_check::subscription::{Subscription, Watchers};
use mood_check::view_model::{Command, DELETE_FAILED, SAVE_FAILED, SessionState, ViewState};
use mood_check::{Controller, ControllerHandle};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, timeout};

const WINDOW: Duration = Duration::from_secs(10);

/// Delegates reads to a real store but fails every write.
struct FailingWrites {
    inner: LocalStore,
}

#[async_trait]
impl EntryStore for FailingWrites {
    async fn subscribe(&self, owner_id: &str) -> Subscription<StoreEvent> {
        self.inner.subscribe(owner_id).await
    }

    async fn add(&self, _entry: NewEntry) -> Result<String, StoreError> {
        Err(StoreError::Transport("network unreachable".into()))
    }

    async fn delete(&self, _id: &str, _owner_id: &str) -> Result<(), StoreError> {
        Err(StoreError::PermissionDenied)
    }
}

/// Store whose subscribers only see what the test pushes.
#[derive(Default)]
struct ScriptedStore {
    watchers: Mutex<Watchers<StoreEvent>>,
}

impl ScriptedStore {
    async fn push(&self, owner_id: &str, event: StoreEvent) {
        self.watchers.lock().await.publish(owner_id, event);
    }
}

#[async_trait]
impl EntryStore for ScriptedStore {
    async fn subscribe(&self, owner_id: &str) -> Subscription<StoreEvent> {
        self.watchers.lock().await.register(owner_id, "scripted")
    }

    async fn add(&self, _entry: NewEntry) -> Result<String, StoreError> {
        Err(StoreError::Transport("read only".into()))
    }

    async fn delete(&self, _id: &str, _owner_id: &str) -> Result<(), StoreError> {
        Err(StoreError::Transport("read only".into()))
    }
}

async fn signed_in(store: Arc<dyn EntryStore>) -> (ControllerHandle, LocalAuth) {
    let auth = LocalAuth::new();
    let view = Controller::spawn(Arc::new(auth.clone()), store, WINDOW).await;
    view.wait_for(|s| s.session == SessionState::Unauthenticated)
        .await
        .unwrap();
    view.dispatch(Command::SignIn {
        display_name: "Ada".into(),
    })
    .await
    .unwrap();
    view.wait_for(|s| s.identity().is_some()).await.unwrap();
    (view, auth)
}

async fn check_in(view: &ControllerHandle, mood: Mood, note: &str) -> ViewState {
    view.dispatch(Command::SelectMood { mood }).await.unwrap();
    view.dispatch(Command::EditNote { note: note.into() })
        .await
        .unwrap();
    view.dispatch(Command::Submit).await.unwrap()
}

fn stored(id: &str, mood: Mood) -> MoodEntry {
    MoodEntry {
        id: id.into(),
        mood,
        note: String::new(),
        timestamp: None,
        owner_id: "local:ada".into(),
    }
}

#[tokio::test]
async fn check_in_round_trips_through_store() {
    let store = LocalStore::in_memory();
    let (view, _auth) = signed_in(Arc::new(store.clone())).await;
    assert_eq!(store.active_subscriptions("local:ada").await, 1);

    let applied = check_in(&view, Mood::Good, "  sunny walk  ").await;
    assert!(applied.is_submitting);

    let state = view
        .wait_for(|s| s.entries.len() == 1 && s.suggestion.is_some())
        .await
        .unwrap();
    assert_eq!(state.entries[0].note, "sunny walk");
    assert_eq!(state.entries[0].owner_id, "local:ada");
    assert_eq!(state.draft_mood, None);
    assert!(state.draft_note.is_empty());
    assert!(!state.is_submitting);
    assert_eq!(state.stats.as_ref().unwrap().average_label(), "4.0");
}

#[tokio::test]
async fn submit_without_mood_never_reaches_store() {
    let store = LocalStore::in_memory();
    let (view, _auth) = signed_in(Arc::new(store.clone())).await;

    view.dispatch(Command::EditNote { note: "just a note".into() })
        .await
        .unwrap();
    let state = view.dispatch(Command::Submit).await.unwrap();
    assert!(!state.is_submitting);
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn failed_write_keeps_draft() {
    let store = FailingWrites {
        inner: LocalStore::in_memory(),
    };
    let (view, _auth) = signed_in(Arc::new(store)).await;

    check_in(&view, Mood::Sad, "rough morning").await;
    let state = view.wait_for(|s| s.notice.is_some()).await.unwrap();
    assert_eq!(state.notice.as_deref(), Some(SAVE_FAILED));
    assert_eq!(state.draft_mood, Some(Mood::Sad));
    assert_eq!(state.draft_note, "rough morning");
    assert!(!state.is_submitting);
    assert!(state.suggestion.is_none());
}

#[tokio::test]
async fn delete_waits_for_confirmation() {
    let store = LocalStore::in_memory();
    let (view, _auth) = signed_in(Arc::new(store.clone())).await;
    check_in(&view, Mood::Neutral, "").await;
    let state = view.wait_for(|s| s.entries.len() == 1).await.unwrap();
    let id = state.entries[0].id.clone();

    view.dispatch(Command::RequestDelete { id: id.clone() })
        .await
        .unwrap();
    let state = view
        .dispatch(Command::ConfirmDelete { confirmed: false })
        .await
        .unwrap();
    assert!(state.pending_delete.is_none());
    assert_eq!(store.len().await, 1);

    view.dispatch(Command::RequestDelete { id }).await.unwrap();
    view.dispatch(Command::ConfirmDelete { confirmed: true })
        .await
        .unwrap();
    view.wait_for(|s| s.entries.is_empty()).await.unwrap();
    assert_eq!(store.len().await, 0);
}

#[tokio::test]
async fn entries_of_another_user_cannot_be_deleted() {
    let store = LocalStore::in_memory();
    let ada_entry = store
        .add(NewEntry {
            mood: Mood::Good,
            note: String::new(),
            owner_id: "local:ada".into(),
        })
        .await
        .unwrap();
    let (view, auth) = signed_in(Arc::new(store.clone())).await;
    view.wait_for(|s| s.entries.len() == 1).await.unwrap();

    auth.sign_in("Grace").await.unwrap();
    view.wait_for(|s| {
        s.identity().is_some_and(|id| id.uid == "local:grace") && !s.loading_entries
    })
    .await
    .unwrap();

    let state = view
        .dispatch(Command::RequestDelete {
            id: ada_entry.clone(),
        })
        .await
        .unwrap();
    assert!(state.pending_delete.is_none());
    view.dispatch(Command::ConfirmDelete { confirmed: true })
        .await
        .unwrap();
    assert_eq!(store.len().await, 1);

    let refused = store.delete(&ada_entry, "local:grace").await;
    assert!(matches!(refused, Err(StoreError::PermissionDenied)));
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn failed_delete_leaves_entry_until_next_snapshot() {
    let inner = LocalStore::in_memory();
    inner
        .add(NewEntry {
            mood: Mood::Great,
            note: String::new(),
            owner_id: "local:ada".into(),
        })
        .await
        .unwrap();
    let (view, _auth) = signed_in(Arc::new(FailingWrites { inner })).await;
    let state = view.wait_for(|s| s.entries.len() == 1).await.unwrap();

    view.dispatch(Command::RequestDelete {
        id: state.entries[0].id.clone(),
    })
    .await
    .unwrap();
    view.dispatch(Command::ConfirmDelete { confirmed: true })
        .await
        .unwrap();
    let state = view.wait_for(|s| s.notice.is_some()).await.unwrap();
    assert_eq!(state.notice.as_deref(), Some(DELETE_FAILED));
    assert_eq!(state.entries.len(), 1);
}

#[tokio::test]
async fn subscription_error_is_persistent_until_next_snapshot() {
    let store = Arc::new(ScriptedStore::default());
    let (view, _auth) = signed_in(store.clone()).await;

    store
        .push(
            "local:ada",
            StoreEvent::Snapshot(vec![stored("a", Mood::Good), stored("b", Mood::Sad)]),
        )
        .await;
    view.wait_for(|s| s.entries.len() == 2).await.unwrap();

    store
        .push("local:ada", StoreEvent::Error("missing index".into()))
        .await;
    let state = view.wait_for(|s| s.sync_error.is_some()).await.unwrap();
    assert_eq!(state.entries.len(), 2);

    store
        .push("local:ada", StoreEvent::Snapshot(vec![stored("a", Mood::Good)]))
        .await;
    let state = view
        .wait_for(|s| s.sync_error.is_none() && s.entries.len() == 1)
        .await
        .unwrap();
    assert_eq!(state.entries[0].id, "a");
}

#[tokio::test]
async fn sign_out_cancels_entry_subscription() {
    let store = LocalStore::in_memory();
    let (view, _auth) = signed_in(Arc::new(store.clone())).await;
    check_in(&view, Mood::Great, "").await;
    view.wait_for(|s| s.entries.len() == 1).await.unwrap();
    view.dispatch(Command::SelectMood { mood: Mood::Sad })
        .await
        .unwrap();

    view.dispatch(Command::SignOut).await.unwrap();
    let state = view
        .wait_for(|s| s.session == SessionState::Unauthenticated)
        .await
        .unwrap();
    assert!(state.entries.is_empty());
    assert_eq!(state.draft_mood, None);
    assert_eq!(store.active_subscriptions("local:ada").await, 0);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn identity_switch_moves_subscription() {
    let store = LocalStore::in_memory();
    let (view, auth) = signed_in(Arc::new(store.clone())).await;

    auth.sign_in("Grace").await.unwrap();
    view.wait_for(|s| s.identity().is_some_and(|id| id.uid == "local:grace"))
        .await
        .unwrap();
    assert_eq!(store.active_subscriptions("local:ada").await, 0);
    assert_eq!(store.active_subscriptions("local:grace").await, 1);
}

#[tokio::test]
async fn dropping_every_handle_tears_down_subscription() {
    let store = LocalStore::in_memory();
    let (view, _auth) = signed_in(Arc::new(store.clone())).await;
    assert_eq!(store.active_subscriptions("local:ada").await, 1);

    drop(view);
    timeout(Duration::from_secs(2), async {
        while store.active_subscriptions("local:ada").await > 0 {
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("entry subscription was not cancelled");
}

#[tokio::test(start_paused = true)]
async fn suggestion_clears_after_window() {
    let (view, _auth) = signed_in(Arc::new(LocalStore::in_memory())).await;

    check_in(&view, Mood::Sad, "").await;
    let state = view.wait_for(|s| s.suggestion.is_some()).await.unwrap();
    assert_eq!(state.suggestion.unwrap().text(), Mood::Sad.suggestion());
    let shown = Instant::now();

    view.wait_for(|s| s.suggestion.is_none()).await.unwrap();
    assert!(shown.elapsed() >= WINDOW);
}

#[tokio::test(start_paused = true)]
async fn second_check_in_restarts_suggestion_window() {
    let (view, _auth) = signed_in(Arc::new(LocalStore::in_memory())).await;

    check_in(&view, Mood::Angry, "").await;
    view.wait_for(|s| s.suggestion.is_some()).await.unwrap();
    tokio::time::sleep(Duration::from_secs(6)).await;

    check_in(&view, Mood::Great, "").await;
    let state = view
        .wait_for(|s| s.suggestion.as_ref().is_some_and(|x| x.mood == Mood::Great))
        .await
        .unwrap();
    assert_eq!(state.entries.len(), 2);
    let restarted = Instant::now();

    view.wait_for(|s| s.suggestion.is_none()).await.unwrap();
    assert!(restarted.elapsed() >= WINDOW);
}
