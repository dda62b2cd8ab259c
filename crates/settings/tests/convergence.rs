use serde_json::json;
use settings::{
    JsonFileStore, MemoryStore, Preferences, Registry, SettingsStore, SettingsSync, StoreArea,
};
use std::sync::Arc;
use std::sync::mpsc;

#[test]
fn two_front_ends_converge_after_a_write() {
    let store = MemoryStore::new(StoreArea::Sync);
    let (tx, rx) = mpsc::channel();
    store.subscribe(Box::new(move |change| {
        let _ = tx.send(change.clone());
    }));

    let mut engine_side = SettingsSync::new(Registry::builtin(), Some(Arc::new(store.clone())));
    let mut options_side = SettingsSync::new(Registry::builtin(), Some(Arc::new(store.clone())));
    engine_side.load();
    options_side.load();

    // The options surface writes a full snapshot, like its save button does.
    let mut edited = (*options_side.current()).clone();
    edited.minimize_long_articles = false;
    edited.dictionary_order.rotate_left(3);
    store.set(edited.to_raw()).unwrap();

    for change in rx.try_iter() {
        engine_side.reload(&change);
        options_side.reload(&change);
    }

    assert_eq!(*engine_side.current(), edited);
    assert_eq!(engine_side.current(), options_side.current());
    assert_eq!(engine_side.generation(), options_side.generation());
}

#[test]
fn file_store_feeds_the_synchronizer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(
        &path,
        serde_json::to_string(&json!({
            "dictionaryOrder": ["cae", "MW"],
            "disableAutosearch": false,
        }))
        .unwrap(),
    )
    .unwrap();

    let store = JsonFileStore::new(StoreArea::Sync, &path);
    let mut sync = SettingsSync::new(Registry::builtin(), Some(Arc::new(store)));
    let prefs = sync.load();

    assert!(!prefs.disable_autosearch);
    assert_eq!(prefs.dictionary_order[0].as_str(), "cae");
    assert_eq!(prefs.dictionary_order[1].as_str(), "mw");
    assert_eq!(
        prefs.dictionary_order.len(),
        Registry::builtin().entries().len()
    );
}

#[test]
fn corrupt_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prefs.json");
    std::fs::write(&path, "{ truncated").unwrap();

    let mut sync = SettingsSync::new(
        Registry::builtin(),
        Some(Arc::new(JsonFileStore::new(StoreArea::Sync, &path))),
    );
    let prefs = sync.load();
    assert!(sync.is_ready());
    assert_eq!(*prefs, Preferences::defaults(&Registry::builtin()));
}
