use crate::errors::StoreError;
use crate::models::{Mood, MoodEntry};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tokio::fs;
use tracing::warn;

/// Every document in the collection, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct StoreData {
    pub entries: BTreeMap<String, MoodEntry>,
}

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    id: String,
    mood: String,
    #[serde(default)]
    note: String,
    timestamp: Option<DateTime<Utc>>,
    owner_id: String,
}

#[derive(Serialize, Deserialize, Default)]
struct StoredFile {
    entries: Vec<StoredEntry>,
}

/// Reads the data file. A missing file is an empty collection; a file that
/// cannot be read or parsed is an error so it is never overwritten.
/// Documents with an unrecognized mood token are skipped.
pub async fn load_data(path: &Path) -> Result<StoreData, StoreError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(StoreData::default()),
        Err(err) => return Err(err.into()),
    };

    let file: StoredFile = serde_json::from_slice(&bytes)?;
    let mut data = StoreData::default();
    for stored in file.entries {
        let Some(mood) = Mood::from_token(&stored.mood) else {
            warn!(id = %stored.id, token = %stored.mood, "skipping entry with unrecognized mood");
            continue;
        };
        data.entries.insert(
            stored.id.clone(),
            MoodEntry {
                id: stored.id,
                mood,
                note: stored.note,
                timestamp: stored.timestamp,
                owner_id: stored.owner_id,
            },
        );
    }
    Ok(data)
}

pub async fn persist_data(path: &Path, data: &StoreData) -> Result<(), StoreError> {
    let file = StoredFile {
        entries: data
            .entries
            .values()
            .map(|entry| StoredEntry {
                id: entry.id.clone(),
                mood: entry.mood.into(),
                note: entry.note.clone(),
                timestamp: entry.timestamp,
                owner_id: entry.owner_id.clone(),
            })
            .collect(),
    };
    let payload = serde_json::to_vec_pretty(&file)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("mood_check_storage_{}_{}_{}", name, std::process::id(), nanos));
        path.push("moods.json");
        path
    }

    #[tokio::test]
    async fn missing_file_is_empty() {
        let data = load_data(&temp_path("missing")).await.unwrap();
        assert!(data.entries.is_empty());
    }

    #[tokio::test]
    async fn persisted_entries_load_back() {
        let path = temp_path("persist");
        let mut data = StoreData::default();
        data.entries.insert(
            "one".into(),
            MoodEntry {
                id: "one".into(),
                mood: Mood::Sad,
                note: "rainy".into(),
                timestamp: None,
                owner_id: "u1".into(),
            },
        );
        persist_data(&path, &data).await.unwrap();

        let loaded = load_data(&path).await.unwrap();
        assert_eq!(loaded.entries.get("one"), data.entries.get("one"));
    }

    #[tokio::test]
    async fn unknown_mood_tokens_are_skipped() {
        let path = temp_path("unknown");
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        let raw = serde_json::json!({
            "entries": [
                { "id": "a", "mood": "🥳", "note": "", "timestamp": null, "owner_id": "u" },
                { "id": "b", "mood": "🙂", "note": "ok", "timestamp": "2026-03-01T08:00:00Z", "owner_id": "u" }
            ]
        });
        fs::write(&path, serde_json::to_vec(&raw).unwrap()).await.unwrap();

        let loaded = load_data(&path).await.unwrap();
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries["b"].mood, Mood::Good);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let path = temp_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, b"{ not json").await.unwrap();

        assert!(matches!(load_data(&path).await, Err(StoreError::Encode(_))));
    }
}
