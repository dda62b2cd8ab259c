//! Structural contract of the host search page, plus the names this engine writes into it.
use core_types::DictCode;
use html::{Document, NodeKey};

pub const FORM_CONTAINER_ID: &str = "theform";
pub const QUERY_FIELD_NAME: &str = "q";
pub const DICT_PANEL_ID: &str = "dict-select";
pub const DICT_CHECKBOX_NAME: &str = "s";
pub const RESULT_ID_PREFIX: &str = "result-:";

/// Host attributes that make the query field submit while typing.
pub const AUTOSUBMIT_ATTRS: [&str; 5] = [
    "up-autosubmit",
    "up-watch",
    "up-watch-delay",
    "up-validate",
    "up-validate-delay",
];
pub const BASELINE_AUTOSUBMIT: (&str, &str) = ("up-autosubmit", "true");
pub const BASELINE_WATCH_DELAY: (&str, &str) = ("up-watch-delay", "500");

pub const ENTER_ONLY_MARKER: &str = "data-enter-only";
pub const ENTER_ONLY_ATTRS_MARKER: &str = "data-enter-only-attrs";

pub const CLASS_ARTICLE: &str = "sd-ext-article";
pub const CLASS_BODY: &str = "sd-ext-article-body";
pub const CLASS_TOGGLE: &str = "sd-ext-article-toggle";
pub const CLASS_COLLAPSED: &str = "sd-ext-article-collapsed";
pub const CLASS_MERGE_GAP: &str = "sd-ext-merge-gap";

pub const DATA_MERGED: &str = "data-sd-merged";
pub const DATA_INIT_GEN: &str = "data-sd-init-gen";
pub const DATA_SETUP: &str = "data-sd-setup";
pub const DATA_COLLAPSED: &str = "data-sd-collapsed";
pub const DATA_USER_OVERRIDE: &str = "data-sd-user-override";
pub const DATA_LINE_COUNT: &str = "data-sd-line-count";

pub const LABEL_COLLAPSE: &str = "Collapse dictionary entry";
pub const LABEL_EXPAND: &str = "Expand dictionary entry";

pub const STYLE_MARKER_ATTR: &str = "data-sd-extension";
pub const STYLE_MARKER_VALUE: &str = "result-styles";

pub const RESULT_CSS: &str = concat!(
    ".sd-ext-article { position: relative; padding-left: 2.25rem; }",
    ".sd-ext-article .sd-ext-article-toggle { position: absolute; left: 0.6rem; top: 0.6rem; ",
    "width: 1.5rem; height: 1.5rem; border-radius: 999px; border: 1px solid rgba(0,0,0,0.15); ",
    "background: #f5f5f5; color: #333; font-size: 1rem; line-height: 1.3rem; padding: 0; ",
    "text-align: center; cursor: pointer; }",
    ".sd-ext-article .sd-ext-article-toggle:focus { outline: 2px solid #4a90e2; outline-offset: 2px; }",
    ".sd-ext-article .sd-ext-article-body { margin-top: 0.25rem; }",
    ".sd-ext-article.sd-ext-article-collapsed .sd-ext-article-body { display: none !important; }",
    ".sd-ext-merge-gap { margin: 1em 0; }",
);

/// Listener tags the engine registers. The runtime maps them back to engine calls.
pub const HANDLER_SUBMIT_ON_ENTER: &str = "sdlens:submit-on-enter";
pub const HANDLER_TOGGLE_ARTICLE: &str = "sdlens:toggle-article";

/// `#theform form`, searched under `root` first, then in the whole document.
pub fn find_form(doc: &Document, root: NodeKey) -> Option<NodeKey> {
    let in_scope = |scope: NodeKey| {
        let holder = if doc.attr(scope, "id") == Some(FORM_CONTAINER_ID) {
            Some(scope)
        } else {
            doc.find_first(scope, |d, k| d.attr(k, "id") == Some(FORM_CONTAINER_ID))
        }?;
        doc.find_first(holder, |d, k| d.is_element_named(k, "form"))
    };
    in_scope(root).or_else(|| in_scope(doc.root()))
}

/// `input[name="q"]` inside the form.
pub fn find_query_field(doc: &Document, form: NodeKey) -> Option<NodeKey> {
    doc.find_first(form, |d, k| {
        d.is_element_named(k, "input") && d.attr(k, "name") == Some(QUERY_FIELD_NAME)
    })
}

/// The dictionary-selection panel, or the document when the panel is missing.
pub fn dict_panel(doc: &Document) -> NodeKey {
    doc.element_by_id(DICT_PANEL_ID).unwrap_or_else(|| doc.root())
}

/// `input[type=checkbox][name=s]` under `panel`.
pub fn dict_checkboxes(doc: &Document, panel: NodeKey) -> Vec<NodeKey> {
    doc.find_all(panel, |d, k| {
        d.is_element_named(k, "input")
            && d.attr(k, "type").is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
            && d.attr(k, "name") == Some(DICT_CHECKBOX_NAME)
    })
}

/// Code of a result container id: the text after the first `:`, or the id without its
/// `result-` prefix.
pub fn result_code(id: &str) -> Option<DictCode> {
    match id.split_once(':') {
        Some((_, code)) => DictCode::parse(code),
        None => DictCode::parse(id.strip_prefix("result-").unwrap_or(id)),
    }
}

/// `div[id^="result-:"]` in document order.
pub fn result_containers(doc: &Document) -> Vec<NodeKey> {
    doc.find_all(doc.root(), |d, k| {
        d.is_element_named(k, "div")
            && d.attr(k, "id").is_some_and(|id| id.starts_with(RESULT_ID_PREFIX))
    })
}

/// Direct `article` children of a result container.
pub fn direct_articles(doc: &Document, container: NodeKey) -> Vec<NodeKey> {
    doc.element_children(container)
        .into_iter()
        .filter(|&k| doc.is_element_named(k, "article"))
        .collect()
}

pub fn is_footer(doc: &Document, key: NodeKey) -> bool {
    doc.is_element_named(key, "footer")
}

/// Direct child of `parent` carrying `class`.
pub fn child_with_class(doc: &Document, parent: NodeKey, class: &str) -> Option<NodeKey> {
    doc.element_children(parent)
        .into_iter()
        .find(|&k| doc.has_class(k, class))
}
