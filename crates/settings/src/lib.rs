//! Dictionary registry, user preferences and the settings synchronizer.

mod error;
mod prefs;
mod registry;
mod store;
mod sync;

pub use crate::error::StoreError;
pub use crate::prefs::{
    ALL_KEYS, KEY_DICTIONARY_ORDER, KEY_DISABLE_AUTOSEARCH, KEY_MERGE_RESULTS, KEY_MINIMIZE_LONG,
    KEY_PRESELECTED, KEY_SHOW_TOGGLES, Preferences,
};
pub use crate::registry::{DictionaryEntry, Registry};
pub use crate::store::{
    ChangeListener, JsonFileStore, MemoryStore, SettingsStore, StoreArea, StoreChange,
};
pub use crate::sync::SettingsSync;
