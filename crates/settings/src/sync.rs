use crate::prefs::Preferences;
use crate::registry::Registry;
use crate::store::{SettingsStore, StoreArea, StoreChange};
use core_types::Generation;
use serde_json::{Map, Value};
use std::sync::Arc;

type ChangeCallback = Box<dyn FnMut(&Preferences, Generation)>;

/// Keeps the process-wide preference snapshot in step with a settings store.
///
/// The snapshot is an `Arc` replaced wholesale; readers holding an older `Arc` keep a consistent
/// view. The generation moves forward exactly when a sanitized snapshot differs field-wise from
/// the current one.
pub struct SettingsSync {
    registry: Registry,
    store: Option<Arc<dyn SettingsStore>>,
    current: Arc<Preferences>,
    generation: Generation,
    ready: bool,
    callbacks: Vec<ChangeCallback>,
}

impl std::fmt::Debug for SettingsSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsSync")
            .field("generation", &self.generation)
            .field("ready", &self.ready)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl SettingsSync {
    /// Starts from computed defaults, not ready. Without a store, `load` only marks ready.
    pub fn new(registry: Registry, store: Option<Arc<dyn SettingsStore>>) -> Self {
        Self {
            current: Arc::new(Preferences::defaults(&registry)),
            registry,
            store,
            generation: Generation::INITIAL,
            ready: false,
            callbacks: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn store_area(&self) -> Option<StoreArea> {
        self.store.as_ref().map(|s| s.area())
    }

    pub fn defaults_raw(&self) -> Map<String, Value> {
        Preferences::defaults(&self.registry).to_raw()
    }

    pub fn sanitize(&self, raw: &Map<String, Value>) -> Preferences {
        Preferences::sanitize(raw, &self.registry)
    }

    pub fn current(&self) -> Arc<Preferences> {
        Arc::clone(&self.current)
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn on_change(&mut self, callback: impl FnMut(&Preferences, Generation) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Initial read. Any store failure falls back to defaults; the synchronizer is ready
    /// afterwards either way.
    pub fn load(&mut self) -> Arc<Preferences> {
        let next = self.read_store();
        self.update(next);
        self.ready = true;
        log::debug!(target: "settings", "settings ready at generation {}", self.generation);
        self.current()
    }

    /// Store-change path. Changes in other areas are ignored. Returns whether the snapshot
    /// changed.
    pub fn reload(&mut self, change: &StoreChange) -> bool {
        if self.store_area() != Some(change.area) {
            log::trace!(target: "settings", "ignoring change in area {}", change.area);
            return false;
        }
        let next = self.read_store();
        self.update(next)
    }

    /// Install `next` if it differs from the current snapshot.
    pub fn update(&mut self, next: Preferences) -> bool {
        if *self.current == next {
            return false;
        }
        self.current = Arc::new(next);
        self.generation = self.generation.next();
        log::debug!(target: "settings", "preferences changed; generation {}", self.generation);
        for callback in &mut self.callbacks {
            callback(&self.current, self.generation);
        }
        true
    }

    fn read_store(&self) -> Preferences {
        let defaults = self.defaults_raw();
        let Some(store) = &self.store else {
            return self.sanitize(&defaults);
        };
        match store.get(&defaults) {
            Ok(raw) => self.sanitize(&raw),
            Err(err) => {
                log::debug!(target: "settings", "store read failed, using defaults: {err}");
                self.sanitize(&defaults)
            }
        }
    }
}
