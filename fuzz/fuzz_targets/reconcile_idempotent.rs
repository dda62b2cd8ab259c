#![no_main]

use core_types::Generation;
use engine::{Engine, Scope};
use html::Document;
use libfuzzer_sys::fuzz_target;
use settings::{Preferences, Registry};

// Results markup under arbitrary flags: a second pass must not mutate anything.
fuzz_target!(|data: &[u8]| {
    let Some((&flags, body)) = data.split_first() else {
        return;
    };
    let registry = Registry::builtin();
    let prefs = Preferences {
        disable_autosearch: flags & 1 != 0,
        merge_results: flags & 2 != 0,
        minimize_long_articles: flags & 4 != 0,
        show_toggles: flags & 8 != 0,
        ..Preferences::defaults(&registry)
    };
    let markup = format!(
        r#"<html><head></head><body><div id="theform"><form><input name="q" up-autosubmit></form></div><div id="results">{}</div></body></html>"#,
        String::from_utf8_lossy(body)
    );
    let mut doc = Document::parse(&markup);
    let mut engine = Engine::default();
    engine.run(&mut doc, Scope::Document, &prefs, Generation(1));
    doc.take_journal();
    engine.run(&mut doc, Scope::Document, &prefs, Generation(1));
    assert!(doc.journal().is_empty(), "second pass mutated the document");
});
