//! Durable key-value storage for tracker state.

use chrono::NaiveDate;
use parking_lot::Mutex;
use std::{
    collections::{BTreeMap, HashMap},
    fs,
    io::ErrorKind,
    path::PathBuf,
    sync::Arc,
};

use crate::{error::StorageError, state::RainDayState};

/// Standalone key some older records kept `lastCheckedDate` under.
pub const LEGACY_LAST_CHECKED_KEY: &str = "lastCheckedDate";

/// Narrow get/set port over a string key-value medium.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key` in one step.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON document on disk holding every key. Each `set` rewrites the file via
/// a temporary sibling and a rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // Unreadable documents are set aside and storage restarts empty.
                let aside = self.path.with_extension("json.corrupt");
                tracing::warn!(
                    error = %e,
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    "State file is not a valid key-value document, starting fresh"
                );
                fs::rename(&self.path, &aside).map_err(|e| self.io_error(e))?;
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let body = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");

        fs::write(&tmp, body).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }
}

/// The rain-day record of one location, on top of a [`KeyValueStore`].
#[derive(Clone)]
pub struct RainDayStore {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl std::fmt::Debug for RainDayStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RainDayStore").field("key", &self.key).finish()
    }
}

impl RainDayStore {
    pub fn new(store: Arc<dyn KeyValueStore>, location_id: &str) -> Self {
        Self {
            store,
            key: format!("rain-data:{location_id}"),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Absent, undecodable or inconsistent records load as the default state.
    ///
    /// The legacy check marker is only merged into a record that exists for
    /// this location, and only when the result is still consistent.
    pub fn load(&self) -> Result<RainDayState, StorageError> {
        let Some(state) = self
            .store
            .get(&self.key)?
            .and_then(|raw| RainDayState::from_json(&raw))
        else {
            return Ok(RainDayState::default());
        };

        if state.last_checked_date.is_some() {
            return Ok(state);
        }

        let legacy = self
            .store
            .get(LEGACY_LAST_CHECKED_KEY)?
            .and_then(|raw| raw.trim().parse::<NaiveDate>().ok());
        let merged = RainDayState {
            last_checked_date: legacy,
            ..state
        };

        Ok(if merged.is_consistent() { merged } else { state })
    }

    /// Writes the whole record under one key.
    pub fn save(&self, state: &RainDayState) -> Result<(), StorageError> {
        self.store.set(&self.key, &state.to_json()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("valid date")
    }

    #[test]
    fn memory_store_get_set() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").expect("get"), None);

        store.set("k", "v1").expect("set");
        store.set("k", "v2").expect("set");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("v2"));
    }

    #[test]
    fn missing_record_loads_default() {
        let repo = RainDayStore::new(Arc::new(MemoryStore::new()), "armonk");
        assert_eq!(repo.load().expect("load"), RainDayState::default());
    }

    #[test]
    fn save_then_load() {
        let repo = RainDayStore::new(Arc::new(MemoryStore::new()), "armonk");
        let state = RainDayState {
            last_rain_date: Some(date("2023-01-01")),
            days_since_rain: 5,
            last_checked_date: Some(date("2023-01-05")),
        };

        repo.save(&state).expect("save");
        assert_eq!(repo.load().expect("load"), state);
    }

    #[test]
    fn records_are_keyed_by_location() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let armonk = RainDayStore::new(Arc::clone(&store), "armonk");
        let seattle = RainDayStore::new(Arc::clone(&store), "seattle");

        armonk
            .save(&RainDayState {
                days_since_rain: 3,
                ..RainDayState::default()
            })
            .expect("save");

        assert_eq!(seattle.load().expect("load"), RainDayState::default());
        assert_eq!(armonk.load().expect("load").days_since_rain, 3);
    }

    #[test]
    fn malformed_record_resets_to_default() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let repo = RainDayStore::new(Arc::clone(&store), "armonk");
        store
            .set(repo.key(), r#"{"lastRainDate":"not-a-date","daysSinceRain":9}"#)
            .expect("set");

        assert_eq!(repo.load().expect("load"), RainDayState::default());
    }

    #[test]
    fn legacy_last_checked_key_is_merged() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let repo = RainDayStore::new(Arc::clone(&store), "armonk");
        store
            .set(repo.key(), r#"{"lastRainDate":"2023-01-01","daysSinceRain":5}"#)
            .expect("set");
        store.set(LEGACY_LAST_CHECKED_KEY, "2023-01-05").expect("set");

        let state = repo.load().expect("load");
        assert_eq!(state.last_checked_date, Some(date("2023-01-05")));
        assert_eq!(state.days_since_rain, 5);
    }

    #[test]
    fn embedded_last_checked_wins_over_legacy_key() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let repo = RainDayStore::new(Arc::clone(&store), "armonk");
        store.set(LEGACY_LAST_CHECKED_KEY, "2023-01-05").expect("set");
        repo.save(&RainDayState {
            last_checked_date: Some(date("2023-01-07")),
            ..RainDayState::default()
        })
        .expect("save");

        assert_eq!(repo.load().expect("load").last_checked_date, Some(date("2023-01-07")));
    }

    #[test]
    fn garbage_legacy_key_is_ignored() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let repo = RainDayStore::new(Arc::clone(&store), "armonk");
        store
            .set(repo.key(), r#"{"lastRainDate":null,"daysSinceRain":2}"#)
            .expect("set");
        store.set(LEGACY_LAST_CHECKED_KEY, "Tuesday").expect("set");

        assert_eq!(repo.load().expect("load").last_checked_date, None);
    }

    #[test]
    fn legacy_key_not_applied_to_new_location() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        store.set(LEGACY_LAST_CHECKED_KEY, "2023-03-01").expect("set");

        let seattle = RainDayStore::new(Arc::clone(&store), "seattle");
        assert_eq!(seattle.load().expect("load"), RainDayState::default());
    }

    #[test]
    fn legacy_key_not_applied_to_discarded_record() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let repo = RainDayStore::new(Arc::clone(&store), "armonk");
        store.set(repo.key(), r#"{"daysSinceRain":"many"}"#).expect("set");
        store.set(LEGACY_LAST_CHECKED_KEY, "2023-03-01").expect("set");

        assert_eq!(repo.load().expect("load"), RainDayState::default());
    }

    #[test]
    fn legacy_key_older_than_rain_is_ignored() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let repo = RainDayStore::new(Arc::clone(&store), "armonk");
        store
            .set(repo.key(), r#"{"lastRainDate":"2023-01-10","daysSinceRain":0}"#)
            .expect("set");
        store.set(LEGACY_LAST_CHECKED_KEY, "2023-01-05").expect("set");

        let state = repo.load().expect("load");
        assert_eq!(state.last_rain_date, Some(date("2023-01-10")));
        assert_eq!(state.last_checked_date, None);
    }

    #[test]
    fn inconsistent_record_resets_to_default() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let repo = RainDayStore::new(Arc::clone(&store), "armonk");
        store
            .set(
                repo.key(),
                r#"{"lastRainDate":"2023-01-10","daysSinceRain":5,"lastCheckedDate":"2023-01-10"}"#,
            )
            .expect("set");

        assert_eq!(repo.load().expect("load"), RainDayState::default());
    }
}
