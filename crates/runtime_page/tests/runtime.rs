use bus::{Bus, HostEvent, PageEvent, Target};
use engine::contract::{
    CLASS_COLLAPSED, CLASS_TOGGLE, ENTER_ONLY_MARKER, child_with_class, direct_articles,
};
use engine::{Engine, EngineConfig};
use html::{Document, Effect, SubmitVia};
use page_test_support::{ArticleFixture, PageFixture, raw_prefs, result_container_html};
use runtime_page::{PageRuntime, forward_store_changes};
use serde_json::json;
use settings::{MemoryStore, Registry, SettingsStore, SettingsSync, StoreArea};
use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_millis(120);

fn page() -> String {
    PageFixture::new()
        .query("agni")
        .result(
            "mw",
            vec![
                ArticleFixture::with_line_count(60).footer("mw"),
                ArticleFixture::new(&["second"]),
            ],
        )
        .to_html()
}

fn runtime_with(store: &MemoryStore, html: &str) -> PageRuntime {
    let settings = SettingsSync::new(Registry::builtin(), Some(Arc::new(store.clone())));
    PageRuntime::new(Document::parse(html), Engine::default(), settings)
}

fn article_count(rt: &PageRuntime) -> usize {
    let doc = rt.document();
    let container = doc.element_by_id("result-:mw").unwrap();
    direct_articles(doc, container).len()
}

fn drain(rx: &Receiver<HostEvent>, rt: &mut PageRuntime, now: Instant) {
    while let Ok(event) = rx.try_recv() {
        rt.handle(event, now);
    }
}

#[test]
fn burst_of_mutations_runs_once() {
    let store = MemoryStore::new(StoreArea::Sync);
    let mut rt = runtime_with(&store, &page());
    let t0 = Instant::now();
    rt.handle(HostEvent::Load, t0);
    let after_load = rt.runs();

    for i in 0..10 {
        rt.handle(HostEvent::Mutation, t0 + Duration::from_millis(i * 10));
        assert!(!rt.tick(t0 + Duration::from_millis(i * 10)));
    }
    assert!(rt.tick(t0 + WINDOW));
    assert!(!rt.tick(t0 + WINDOW * 3));
    assert_eq!(rt.runs(), after_load + 1);
}

#[test]
fn host_render_is_observed_and_reconciled() {
    let store = MemoryStore::new(StoreArea::Sync);
    let mut rt = runtime_with(&store, &PageFixture::new().to_html());
    let t0 = Instant::now();
    rt.handle(HostEvent::Load, t0);

    let markup = result_container_html(
        "mw",
        &[ArticleFixture::new(&["one"]), ArticleFixture::new(&["two"])],
    );
    rt.handle(
        HostEvent::Render {
            target: Target::Id("results".into()),
            markup,
        },
        t0,
    );
    assert!(rt.scheduler().is_pending());
    assert!(rt.tick(t0 + WINDOW));
    assert_eq!(article_count(&rt), 1);
    // The run's own mutations do not schedule another run.
    assert!(!rt.scheduler().is_pending());
}

#[test]
fn settings_change_flows_from_store_to_page() {
    let store = MemoryStore::new(StoreArea::Sync);
    let bus = Bus::new();
    forward_store_changes(&store, bus.host_tx.clone());
    let mut rt = runtime_with(&store, &page()).with_outbox(bus.page_tx.clone());
    let t0 = Instant::now();
    rt.handle(HostEvent::Load, t0);
    assert_eq!(article_count(&rt), 1);

    store
        .set(raw_prefs(json!({"mergeResults": false, "disableAutosearch": true})))
        .unwrap();
    drain(&bus.host_rx, &mut rt, t0);
    let field = rt
        .document()
        .find_first(rt.document().root(), |d, k| d.attr(k, "name") == Some("q"))
        .unwrap();
    assert_eq!(rt.document().attr(field, ENTER_ONLY_MARKER), Some("1"));

    assert!(rt.tick(t0 + WINDOW));
    assert_eq!(article_count(&rt), 2);

    let events: Vec<PageEvent> = bus.page_rx.try_iter().collect();
    assert!(events.iter().any(|e| matches!(
        e,
        PageEvent::SettingsChanged { generation } if generation.0 == 1
    )));
    assert!(
        events
            .iter()
            .filter(|e| matches!(e, PageEvent::Reconciled { .. }))
            .count()
            >= 2
    );
}

#[test]
fn other_store_area_is_ignored() {
    let store = MemoryStore::new(StoreArea::Sync);
    let other = MemoryStore::new(StoreArea::Local);
    let bus = Bus::new();
    forward_store_changes(&other, bus.host_tx.clone());
    let mut rt = runtime_with(&store, &page());
    let t0 = Instant::now();
    rt.handle(HostEvent::Load, t0);
    let generation = rt.settings().generation();

    other
        .set(raw_prefs(json!({"mergeResults": false})))
        .unwrap();
    drain(&bus.host_rx, &mut rt, t0);
    assert_eq!(rt.settings().generation(), generation);
}

#[test]
fn toggle_click_and_enter_submit() {
    let store = MemoryStore::with_values(
        StoreArea::Sync,
        raw_prefs(json!({"disableAutosearch": true})),
    );
    let mut rt = runtime_with(&store, &page());
    let t0 = Instant::now();
    rt.handle(HostEvent::Load, t0);

    let doc = rt.document();
    let container = doc.element_by_id("result-:mw").unwrap();
    let article = direct_articles(doc, container)[0];
    assert!(doc.has_class(article, CLASS_COLLAPSED));
    let toggle = child_with_class(doc, article, CLASS_TOGGLE).unwrap();
    rt.handle(
        HostEvent::Click {
            target: Target::Node(toggle),
        },
        t0,
    );
    assert!(!rt.document().has_class(article, CLASS_COLLAPSED));
    assert!(!rt.scheduler().is_pending());

    let field = rt
        .document()
        .find_first(rt.document().root(), |d, k| d.attr(k, "name") == Some("q"))
        .unwrap();
    rt.handle(
        HostEvent::Input {
            target: Target::Node(field),
            value: "agnim".into(),
        },
        t0,
    );
    assert!(rt.take_effects().is_empty());
    rt.handle(
        HostEvent::KeyDown {
            target: Target::Node(field),
            key: "Enter".into(),
        },
        t0,
    );
    assert!(matches!(
        rt.take_effects().as_slice(),
        [Effect::Submit {
            via: SubmitVia::Programmatic,
            ..
        }]
    ));
}

#[test]
fn fragment_insert_switches_input_mode_right_away() {
    let store = MemoryStore::with_values(
        StoreArea::Sync,
        raw_prefs(json!({"disableAutosearch": true})),
    );
    let mut rt = runtime_with(&store, &PageFixture::new().without_form().to_html());
    let t0 = Instant::now();
    rt.handle(HostEvent::Load, t0);

    let form = r#"<form action="/search"><input type="text" name="q" up-autosubmit></form>"#;
    rt.handle(
        HostEvent::Render {
            target: Target::Id("theform".into()),
            markup: form.into(),
        },
        t0,
    );
    rt.handle(
        HostEvent::FragmentInserted {
            target: Target::Id("theform".into()),
        },
        t0,
    );
    let field = rt
        .document()
        .find_first(rt.document().root(), |d, k| d.attr(k, "name") == Some("q"))
        .unwrap();
    assert_eq!(rt.document().attr(field, ENTER_ONLY_MARKER), Some("1"));
    assert!(rt.scheduler().is_pending());
}

#[test]
fn run_loop_drains_channel_and_flushes() {
    let store = MemoryStore::new(StoreArea::Sync);
    let config = EngineConfig {
        debounce_ms: 500,
        ..EngineConfig::default()
    };
    let settings = SettingsSync::new(Registry::builtin(), Some(Arc::new(store.clone())));
    let mut rt = PageRuntime::new(Document::parse(&page()), Engine::new(config), settings);
    let bus = Bus::new();
    let tx = bus.host_tx.clone();
    let sender = thread::spawn(move || {
        let _ = tx.send(HostEvent::Load);
        for _ in 0..5 {
            let _ = tx.send(HostEvent::Mutation);
        }
    });
    sender.join().unwrap();
    drop(bus.host_tx);

    rt.run(&bus.host_rx);
    assert_eq!(rt.runs(), 2);
    assert_eq!(article_count(&rt), 1);
}
