use crate::errors::StoreError;
use crate::models::{MoodEntry, NewEntry};
use crate::storage::{StoreData, persist_data};
use crate::subscription::{Subscription, Watchers};
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// Every entry owned by the subscriber, in no particular order.
    Snapshot(Vec<MoodEntry>),
    Error(String),
}

/// The remote per-user entry collection.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Live query over `owner_id`'s entries. The current snapshot is
    /// delivered immediately, then again after every write touching it.
    async fn subscribe(&self, owner_id: &str) -> Subscription<StoreEvent>;

    /// Creates an entry stamped with the server time and returns its id.
    async fn add(&self, entry: NewEntry) -> Result<String, StoreError>;

    /// Removes `id` on behalf of `owner_id`. Entries owned by anyone else
    /// are refused with [`StoreError::PermissionDenied`].
    async fn delete(&self, id: &str, owner_id: &str) -> Result<(), StoreError>;
}

struct StoreInner {
    data: StoreData,
    watchers: Watchers<StoreEvent>,
}

/// In-process entry collection, optionally backed by a JSON file.
#[derive(Clone)]
pub struct LocalStore {
    data_path: Option<PathBuf>,
    inner: Arc<Mutex<StoreInner>>,
}

impl LocalStore {
    pub fn in_memory() -> Self {
        Self::with_data(None, StoreData::default())
    }

    pub fn with_data(data_path: Option<PathBuf>, data: StoreData) -> Self {
        Self {
            data_path,
            inner: Arc::new(Mutex::new(StoreInner {
                data,
                watchers: Watchers::default(),
            })),
        }
    }

    /// Number of live entry subscriptions for `owner_id`.
    pub async fn active_subscriptions(&self, owner_id: &str) -> usize {
        self.inner.lock().await.watchers.active(owner_id)
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.data.entries.len()
    }

    async fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        match &self.data_path {
            Some(path) => persist_data(path, data).await,
            None => Ok(()),
        }
    }
}

fn snapshot(data: &StoreData, owner_id: &str) -> Vec<MoodEntry> {
    data.entries
        .values()
        .filter(|entry| entry.owner_id == owner_id)
        .cloned()
        .collect()
}

#[async_trait]
impl EntryStore for LocalStore {
    async fn subscribe(&self, owner_id: &str) -> Subscription<StoreEvent> {
        let mut inner = self.inner.lock().await;
        let initial = StoreEvent::Snapshot(snapshot(&inner.data, owner_id));
        inner
            .watchers
            .register_with(owner_id, format!("entries:{owner_id}"), initial)
    }

    async fn add(&self, entry: NewEntry) -> Result<String, StoreError> {
        if entry.owner_id.is_empty() {
            return Err(StoreError::PermissionDenied);
        }

        let id = Uuid::new_v4().to_string();
        let owner_id = entry.owner_id.clone();
        let mut inner = self.inner.lock().await;
        inner.data.entries.insert(
            id.clone(),
            MoodEntry {
                id: id.clone(),
                mood: entry.mood,
                note: entry.note,
                timestamp: Some(Utc::now()),
                owner_id: entry.owner_id,
            },
        );

        if let Err(err) = self.persist(&inner.data).await {
            error!(error = %err, "failed to persist new entry");
            inner.data.entries.remove(&id);
            return Err(err);
        }

        info!(%id, owner = %owner_id, "entry created");
        let current = snapshot(&inner.data, &owner_id);
        inner.watchers.publish(&owner_id, StoreEvent::Snapshot(current));
        Ok(id)
    }

    async fn delete(&self, id: &str, owner_id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.data.entries.get(id) {
            None => {
                debug!(%id, "delete of unknown entry ignored");
                return Ok(());
            }
            Some(entry) if entry.owner_id != owner_id => {
                warn!(
                    %id,
                    owner = %entry.owner_id,
                    caller = %owner_id,
                    "delete of foreign entry refused"
                );
                return Err(StoreError::PermissionDenied);
            }
            Some(_) => {}
        }
        let Some(removed) = inner.data.entries.remove(id) else {
            return Ok(());
        };

        if let Err(err) = self.persist(&inner.data).await {
            error!(error = %err, "failed to persist deletion");
            inner.data.entries.insert(removed.id.clone(), removed);
            return Err(err);
        }

        info!(%id, owner = %removed.owner_id, "entry deleted");
        let current = snapshot(&inner.data, &removed.owner_id);
        inner.watchers.publish(&removed.owner_id, StoreEvent::Snapshot(current));
        Ok(())
    }
}
