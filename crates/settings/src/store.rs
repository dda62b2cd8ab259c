use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

/// Logical area of a settings store. Change notifications are scoped to one area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreArea {
    #[default]
    Sync,
    Local,
}

impl StoreArea {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sync" => Some(StoreArea::Sync),
            "local" => Some(StoreArea::Local),
            _ => None,
        }
    }
}

impl fmt::Display for StoreArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreArea::Sync => "sync",
            StoreArea::Local => "local",
        })
    }
}

/// Change notification: which area, which keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreChange {
    pub area: StoreArea,
    #[serde(default)]
    pub keys: Vec<String>,
}

pub type ChangeListener = Box<dyn Fn(&StoreChange) + Send>;

/// Flat key-value settings store shared by independent front-ends.
///
/// `get` merges stored values over `defaults`. `set` writes the given keys and notifies every
/// subscriber, including the writer's own subscriptions, once per write that changed a value.
pub trait SettingsStore: Send + Sync {
    fn area(&self) -> StoreArea;

    fn get(&self, defaults: &Map<String, Value>) -> Result<Map<String, Value>, StoreError>;

    fn set(&self, values: Map<String, Value>) -> Result<(), StoreError>;

    fn subscribe(&self, listener: ChangeListener);
}

fn merge_over(defaults: &Map<String, Value>, stored: &Map<String, Value>) -> Map<String, Value> {
    let mut out = defaults.clone();
    for (k, v) in stored {
        out.insert(k.clone(), v.clone());
    }
    out
}

// Writes `values` into `data`, returning the keys whose value changed.
fn apply_values(data: &mut Map<String, Value>, values: Map<String, Value>) -> Vec<String> {
    let mut changed = Vec::new();
    for (k, v) in values {
        if data.get(&k) != Some(&v) {
            changed.push(k.clone());
            data.insert(k, v);
        }
    }
    changed
}

#[derive(Default)]
struct Listeners {
    inner: Mutex<Vec<ChangeListener>>,
}

impl Listeners {
    fn lock(&self) -> MutexGuard<'_, Vec<ChangeListener>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, listener: ChangeListener) {
        self.lock().push(listener);
    }

    fn notify(&self, change: &StoreChange) {
        for listener in self.lock().iter() {
            listener(change);
        }
    }
}

#[derive(Default)]
struct MemoryInner {
    data: Mutex<Map<String, Value>>,
    listeners: Listeners,
    fail_reads: Mutex<bool>,
}

/// In-memory store. Clones share data and subscribers, so two handles behave like two
/// front-ends talking to one store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    area: StoreArea,
    inner: Arc<MemoryInner>,
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore").field("area", &self.area).finish()
    }
}

impl MemoryStore {
    pub fn new(area: StoreArea) -> Self {
        Self {
            area,
            inner: Arc::default(),
        }
    }

    pub fn with_values(area: StoreArea, values: Map<String, Value>) -> Self {
        let store = Self::new(area);
        *store.data() = values;
        store
    }

    fn data(&self) -> MutexGuard<'_, Map<String, Value>> {
        self.inner
            .data
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Make subsequent reads fail, to exercise the fallback path.
    pub fn set_fail_reads(&self, fail: bool) {
        *self
            .inner
            .fail_reads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = fail;
    }

    fn reads_fail(&self) -> bool {
        *self
            .inner
            .fail_reads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SettingsStore for MemoryStore {
    fn area(&self) -> StoreArea {
        self.area
    }

    fn get(&self, defaults: &Map<String, Value>) -> Result<Map<String, Value>, StoreError> {
        if self.reads_fail() {
            return Err(StoreError::Unavailable);
        }
        Ok(merge_over(defaults, &self.data()))
    }

    fn set(&self, values: Map<String, Value>) -> Result<(), StoreError> {
        let keys = apply_values(&mut self.data(), values);
        if !keys.is_empty() {
            self.inner.listeners.notify(&StoreChange {
                area: self.area,
                keys,
            });
        }
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) {
        self.inner.listeners.push(listener);
    }
}

/// Store backed by one JSON object file. A missing file reads as empty.
pub struct JsonFileStore {
    area: StoreArea,
    path: PathBuf,
    listeners: Listeners,
    lock: Mutex<()>,
}

impl fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("area", &self.area)
            .field("path", &self.path)
            .finish()
    }
}

impl JsonFileStore {
    pub fn new(area: StoreArea, path: impl Into<PathBuf>) -> Self {
        Self {
            area,
            path: path.into(),
            listeners: Listeners::default(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Map<String, Value>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(error) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    error,
                });
            }
        };
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::NotAnObject(self.path.clone())),
            Err(error) => Err(StoreError::Json {
                path: self.path.clone(),
                error,
            }),
        }
    }

    fn write(&self, data: &Map<String, Value>) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(data).map_err(|error| StoreError::Json {
            path: self.path.clone(),
            error,
        })?;
        fs::write(&self.path, text).map_err(|error| StoreError::Io {
            path: self.path.clone(),
            error,
        })
    }
}

impl SettingsStore for JsonFileStore {
    fn area(&self) -> StoreArea {
        self.area
    }

    fn get(&self, defaults: &Map<String, Value>) -> Result<Map<String, Value>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
        Ok(merge_over(defaults, &self.read()?))
    }

    fn set(&self, values: Map<String, Value>) -> Result<(), StoreError> {
        let keys = {
            let _guard = self.lock.lock().unwrap_or_else(|p| p.into_inner());
            let mut data = self.read()?;
            let keys = apply_values(&mut data, values);
            if !keys.is_empty() {
                self.write(&data)?;
            }
            keys
        };
        if !keys.is_empty() {
            log::debug!(target: "settings", "wrote {} key(s) to {}", keys.len(), self.path.display());
            self.listeners.notify(&StoreChange {
                area: self.area,
                keys,
            });
        }
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) {
        self.listeners.push(listener);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn memory_store_merges_over_defaults() {
        let store = MemoryStore::with_values(StoreArea::Sync, obj(json!({ "mergeResults": false })));
        let got = store
            .get(&obj(json!({ "mergeResults": true, "showToggles": true })))
            .unwrap();
        assert_eq!(got.get("mergeResults"), Some(&json!(false)));
        assert_eq!(got.get("showToggles"), Some(&json!(true)));
    }

    #[test]
    fn memory_store_clones_share_data_and_notify_once_per_change() {
        let a = MemoryStore::new(StoreArea::Sync);
        let b = a.clone();
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        a.subscribe(Box::new(move |change| {
            assert_eq!(change.area, StoreArea::Sync);
            counter.fetch_add(change.keys.len(), Ordering::SeqCst);
        }));

        b.set(obj(json!({ "mergeResults": false }))).unwrap();
        b.set(obj(json!({ "mergeResults": false }))).unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(
            a.get(&Map::new()).unwrap().get("mergeResults"),
            Some(&json!(false))
        );
    }

    #[test]
    fn memory_store_read_failure_surfaces_as_error() {
        let store = MemoryStore::new(StoreArea::Local);
        store.set_fail_reads(true);
        assert!(matches!(store.get(&Map::new()), Err(StoreError::Unavailable)));
    }

    #[test]
    fn json_file_store_round_trips_and_tolerates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(StoreArea::Sync, dir.path().join("prefs.json"));
        assert!(store.get(&Map::new()).unwrap().is_empty());

        store
            .set(obj(json!({ "dictionaryOrder": ["mw", "ap90"] })))
            .unwrap();
        let again = JsonFileStore::new(StoreArea::Sync, store.path());
        assert_eq!(
            again.get(&Map::new()).unwrap().get("dictionaryOrder"),
            Some(&json!(["mw", "ap90"]))
        );
    }

    #[test]
    fn json_file_store_rejects_non_objects() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        let store = JsonFileStore::new(StoreArea::Sync, &path);
        assert!(matches!(store.get(&Map::new()), Err(StoreError::NotAnObject(_))));

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(store.get(&Map::new()), Err(StoreError::Json { .. })));
    }

    #[test]
    fn store_area_parses_names() {
        assert_eq!(StoreArea::parse(" Sync "), Some(StoreArea::Sync));
        assert_eq!(StoreArea::parse("local"), Some(StoreArea::Local));
        assert_eq!(StoreArea::parse("managed"), None);
    }
}
