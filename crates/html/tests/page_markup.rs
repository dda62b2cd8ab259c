use html::{Document, looks_like_markup};
use page_test_support::{ArticleFixture, PageFixture, assert_markup_eq};

fn search_page() -> String {
    PageFixture::new()
        .query("dharma")
        .checkbox("mw", true)
        .disabled_checkbox("ap90")
        .result(
            "mw",
            vec![
                ArticleFixture::new(&["dharma m. that which is established", "law, duty"])
                    .footer("MW p. 510"),
                ArticleFixture::with_line_count(3),
            ],
        )
        .result("pwg", vec![ArticleFixture::new(&["Satzung, Gesetz"])])
        .to_html()
}

#[test]
fn search_page_serializes_back_to_its_source() {
    let source = search_page();
    let doc = Document::parse(&source);
    assert_markup_eq(&source, &doc.inner_html(doc.root()).unwrap());
}

#[test]
fn controls_reflect_their_markup() {
    let doc = Document::parse(&search_page());
    let root = doc.root();
    let boxes: Vec<_> = doc
        .find_all(root, |d, k| d.attr(k, "type") == Some("checkbox"))
        .into_iter()
        .map(|k| (doc.value(k).map(str::to_string), doc.is_checked(k), doc.is_disabled(k)))
        .collect();
    assert_eq!(
        boxes,
        vec![
            (Some("mw".to_string()), true, false),
            (Some("ap90".to_string()), false, true),
        ]
    );
    let q = doc
        .find_first(root, |d, k| d.attr(k, "name") == Some("q"))
        .unwrap();
    assert_eq!(doc.value(q), Some("dharma"));
    assert_eq!(doc.attr(q, "up-autosubmit"), Some(""));
}

#[test]
fn article_text_breaks_per_paragraph() {
    let doc = Document::parse(&search_page());
    let mw = doc.element_by_id("result-:mw").unwrap();
    let first = doc.elements_by_tag(mw, "article")[0];
    assert_eq!(
        doc.inner_text(first),
        "dharma m. that which is established\n\nlaw, duty\n\nMW p. 510"
    );
}

#[test]
fn inner_html_edits_are_journaled_and_round_trip() {
    let mut doc = Document::parse(&search_page());
    doc.take_journal();
    let pwg = doc.element_by_id("result-:pwg").unwrap();
    let fresh = ArticleFixture::new(&["neu"]).to_html();
    doc.set_inner_html(pwg, &fresh).unwrap();
    assert!(doc.journal().child_list > 0);
    assert_eq!(doc.inner_html(pwg).unwrap(), fresh);
}

#[test]
fn sniffs_markup() {
    assert!(looks_like_markup("<html></html>"));
    assert!(!looks_like_markup("plain text"));
}
