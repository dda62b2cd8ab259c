use core_types::{DictCode, Generation};
use engine::contract::{
    CLASS_BODY, CLASS_COLLAPSED, CLASS_MERGE_GAP, CLASS_TOGGLE, child_with_class, dict_checkboxes,
    dict_panel, direct_articles, is_footer, result_code, result_containers,
};
use engine::{Engine, EngineConfig, Request, Scheduler, Scope};
use html::Document;
use page_test_support::{ArticleFixture, PageFixture, assert_markup_eq, raw_prefs};
use serde_json::json;
use settings::{Preferences, Registry};
use std::time::{Duration, Instant};

fn registry() -> Registry {
    Registry::builtin()
}

fn defaults() -> Preferences {
    Preferences::defaults(&registry())
}

fn prefs_from(value: serde_json::Value) -> Preferences {
    Preferences::sanitize(&raw_prefs(value), &registry())
}

fn busy_page() -> Document {
    Document::parse(
        &PageFixture::new()
            .query("dharma")
            .checkbox("mw", false)
            .checkbox("ap90", false)
            .result(
                "pwg",
                vec![
                    ArticleFixture::with_line_count(70).footer("pwg 1"),
                    ArticleFixture::new(&["second"]).footer("pwg 2"),
                ],
            )
            .result("mw", vec![ArticleFixture::new(&["short"]).footer("mw")])
            .result("ap90", vec![ArticleFixture::with_line_count(51)])
            .to_html(),
    )
}

fn codes(doc: &Document) -> Vec<String> {
    result_containers(doc)
        .into_iter()
        .filter_map(|c| doc.attr(c, "id").and_then(result_code))
        .map(|c| c.as_str().to_string())
        .collect()
}

#[test]
fn reconciled_page_is_a_fixed_point() {
    for prefs in [
        defaults(),
        prefs_from(json!({"mergeResults": false, "disableAutosearch": true})),
        prefs_from(json!({"minimizeLongArticles": false, "showToggles": false})),
    ] {
        let mut doc = busy_page();
        let mut engine = Engine::default();
        engine.run(&mut doc, Scope::Document, &prefs, Generation(1));
        let settled = doc.inner_html(doc.root()).unwrap();
        doc.take_journal();
        doc.take_effects();

        let report = engine.run(&mut doc, Scope::Document, &prefs, Generation(1));
        assert!(doc.journal().is_empty(), "second pass mutated: {:?}", doc.journal());
        assert_eq!((report.input_mode, report.preselected, report.reordered), (0, 0, 0));
        assert_markup_eq(&settled, &doc.inner_html(doc.root()).unwrap());
        assert!(doc.take_effects().is_empty());
    }
}

#[test]
fn containers_follow_preferred_order_with_unmapped_last() {
    let mut doc = Document::parse(
        &PageFixture::new()
            .result("zz", vec![ArticleFixture::new(&["?"])])
            .result("c", vec![ArticleFixture::new(&["c"])])
            .result("a", vec![ArticleFixture::new(&["a"])])
            .result("b", vec![ArticleFixture::new(&["b"])])
            .to_html(),
    );
    let mut prefs = defaults();
    prefs.dictionary_order = ["a", "b", "c"].iter().filter_map(|c| DictCode::parse(c)).collect();
    Engine::default().run(&mut doc, Scope::Document, &prefs, Generation(1));
    assert_eq!(codes(&doc), vec!["a", "b", "c", "zz"]);
}

#[test]
fn merge_then_unmerge_restores_original_markup() {
    let mut doc = busy_page();
    let pwg = result_containers(&doc)[0];
    let original = doc.inner_html(pwg).unwrap();
    let mut engine = Engine::default();

    engine.run(&mut doc, Scope::Document, &defaults(), Generation(1));
    let merged = direct_articles(&doc, pwg);
    assert_eq!(merged.len(), 1);
    assert_eq!(
        doc.find_all(pwg, |d, k| d.has_class(k, CLASS_MERGE_GAP)).len(),
        1
    );
    assert_eq!(doc.find_all(pwg, is_footer).len(), 1);

    let unmerged = Preferences {
        merge_results: false,
        ..defaults()
    };
    engine.run(&mut doc, Scope::Document, &unmerged, Generation(2));
    let restored = direct_articles(&doc, pwg);
    assert_eq!(restored.len(), 2);

    assert_eq!(doc.find_all(pwg, is_footer).len(), 2);

    // The articles come back with their original content under the presentation scaffold.
    let raw = Document::parse(&original);
    let paragraphs = |d: &Document, root| -> Vec<String> {
        d.elements_by_tag(root, "p")
            .into_iter()
            .map(|p| d.text_content(p))
            .collect()
    };
    assert_eq!(paragraphs(&doc, pwg), paragraphs(&raw, raw.root()));
}

#[test]
fn preselection_never_touches_a_user_choice() {
    let html = PageFixture::new()
        .checkbox("mw", false)
        .checkbox("ap90", true)
        .checkbox("pwg", false)
        .to_html();
    let mut doc = Document::parse(&html);
    let report = Engine::default().run(&mut doc, Scope::Document, &defaults(), Generation(1));
    assert_eq!(report.preselected, 0);
    let panel = dict_panel(&doc);
    let checked: Vec<bool> = dict_checkboxes(&doc, panel)
        .into_iter()
        .map(|cb| doc.is_checked(cb))
        .collect();
    assert_eq!(checked, vec![false, true, false]);
    assert!(doc.take_effects().is_empty());
}

#[test]
fn long_articles_collapse_past_the_threshold() {
    let mut doc = busy_page();
    let unmerged = Preferences {
        merge_results: false,
        ..defaults()
    };
    Engine::default().run(&mut doc, Scope::Document, &unmerged, Generation(1));
    let by_code = |code: &str| {
        let container = doc.element_by_id(&format!("result-:{code}")).unwrap();
        direct_articles(&doc, container)
    };
    assert!(doc.has_class(by_code("ap90")[0], CLASS_COLLAPSED));
    assert!(doc.has_class(by_code("pwg")[0], CLASS_COLLAPSED));
    assert!(!doc.has_class(by_code("pwg")[1], CLASS_COLLAPSED));
    assert!(!doc.has_class(by_code("mw")[0], CLASS_COLLAPSED));
}

#[test]
fn threshold_comes_from_config() {
    let mut doc = busy_page();
    let config = EngineConfig {
        long_article_threshold: 100,
        ..EngineConfig::default()
    };
    Engine::new(config).run(&mut doc, Scope::Document, &defaults(), Generation(1));
    let ap90 = doc.element_by_id("result-:ap90").unwrap();
    assert!(!doc.has_class(direct_articles(&doc, ap90)[0], CLASS_COLLAPSED));
}

#[test]
fn user_override_lasts_until_settings_change() {
    let mut doc = busy_page();
    let mut engine = Engine::default();
    let prefs = defaults();
    engine.run(&mut doc, Scope::Document, &prefs, Generation(1));
    let ap90 = doc.element_by_id("result-:ap90").unwrap();
    let article = direct_articles(&doc, ap90)[0];
    assert!(doc.has_class(article, CLASS_COLLAPSED));

    let toggle = child_with_class(&doc, article, CLASS_TOGGLE).unwrap();
    assert_eq!(engine.toggle(&mut doc, toggle, Generation(1)).unwrap(), Some(false));
    engine.run(&mut doc, Scope::Document, &prefs, Generation(1));
    assert!(!doc.has_class(article, CLASS_COLLAPSED));

    let changed = Preferences {
        disable_autosearch: true,
        ..prefs
    };
    engine.run(&mut doc, Scope::Document, &changed, Generation(2));
    assert!(doc.has_class(article, CLASS_COLLAPSED));
    let body = child_with_class(&doc, article, CLASS_BODY).unwrap();
    assert_eq!(
        doc.style_property(body, "display"),
        Some(("none".to_string(), true))
    );
}

#[test]
fn rapid_requests_coalesce_into_one_run() {
    let t0 = Instant::now();
    let mut scheduler = Scheduler::new(Duration::from_millis(120));
    let mut runs = 0;
    for i in 0..25u64 {
        let now = t0 + Duration::from_millis(i * 4);
        let scope = if i % 2 == 0 {
            Scope::Document
        } else {
            Scope::Node(html::NodeKey(5))
        };
        let outcome = scheduler.request(scope, now, true);
        assert_ne!(outcome, Request::Dropped);
        if scheduler.poll(now).is_some() {
            runs += 1;
        }
    }
    if scheduler.poll(t0 + Duration::from_millis(200)).is_some() {
        runs += 1;
    }
    assert_eq!(runs, 1);
}
