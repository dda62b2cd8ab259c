//! Presentation of result containers: optional merging of a container's articles into one, and
//! per-article collapse controls.
//!
//! Every pass is idempotent. Elements already set up for the current settings generation are
//! skipped, and every attribute write reports whether it changed anything.
mod snapshot;
mod state;

pub use snapshot::ContainerSnapshots;
pub use state::{ArticleState, ArticleStates};

use crate::contract::{
    CLASS_ARTICLE, CLASS_BODY, CLASS_COLLAPSED, CLASS_MERGE_GAP, CLASS_TOGGLE, DATA_COLLAPSED,
    DATA_INIT_GEN, DATA_LINE_COUNT, DATA_MERGED, DATA_SETUP, DATA_USER_OVERRIDE,
    HANDLER_TOGGLE_ARTICLE, LABEL_COLLAPSE, LABEL_EXPAND, child_with_class, direct_articles,
    is_footer, result_containers,
};
use crate::styles;
use core_types::Generation;
use html::{Document, DomError, EventType, Listener, Node, NodeKey, to_html};
use settings::Preferences;

pub const DEFAULT_LONG_ARTICLE_THRESHOLD: usize = 50;

#[derive(Debug)]
pub struct Presenter {
    states: ArticleStates,
    snapshots: ContainerSnapshots,
    long_article_threshold: usize,
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new(DEFAULT_LONG_ARTICLE_THRESHOLD)
    }
}

impl Presenter {
    pub fn new(long_article_threshold: usize) -> Self {
        Self {
            states: ArticleStates::default(),
            snapshots: ContainerSnapshots::default(),
            long_article_threshold,
        }
    }

    pub fn long_article_threshold(&self) -> usize {
        self.long_article_threshold
    }

    pub fn states(&self) -> &ArticleStates {
        &self.states
    }

    pub fn article_state(&self, article: NodeKey) -> Option<&ArticleState> {
        self.states.get(article)
    }

    /// Reconcile every result container in the document. Returns the number of containers seen.
    pub fn apply(
        &mut self,
        doc: &mut Document,
        prefs: &Preferences,
        generation: Generation,
    ) -> Result<usize, DomError> {
        let containers = result_containers(doc);
        if containers.is_empty() {
            return Ok(0);
        }
        styles::ensure(doc)?;
        let swept = self.states.sweep(doc);
        self.snapshots.sweep(doc);
        if swept > 0 {
            log::trace!(target: "present", "dropped state of {swept} removed article(s)");
        }
        for &container in &containers {
            self.reconcile_container(doc, container, prefs, generation)?;
        }
        Ok(containers.len())
    }

    fn reconcile_container(
        &mut self,
        doc: &mut Document,
        container: NodeKey,
        prefs: &Preferences,
        generation: Generation,
    ) -> Result<(), DomError> {
        let processed = doc
            .find_first(container, |d, k| d.has_class(k, CLASS_ARTICLE))
            .is_some();
        let mut fresh = false;
        if !processed || !self.snapshots.contains(container) {
            self.snapshots.capture(doc, container)?;
            doc.set_attr(container, DATA_MERGED, "0")?;
            fresh = true;
        }

        let merged = doc.attr(container, DATA_MERGED) == Some("1");
        if prefs.merge_results {
            if !merged || !processed {
                if !fresh {
                    self.restore(doc, container)?;
                }
                self.merge(doc, container)?;
            }
        } else if merged {
            self.restore(doc, container)?;
        }

        for article in direct_articles(doc, container) {
            self.setup_article(doc, article, prefs, generation)?;
        }
        Ok(())
    }

    /// Rebuild the container from its snapshot, discarding the state of every article in it.
    fn restore(&mut self, doc: &mut Document, container: NodeKey) -> Result<(), DomError> {
        for article in doc.find_all(container, |d, k| d.has_class(k, CLASS_ARTICLE)) {
            self.states.remove(article);
        }
        if self.snapshots.restore(doc, container)? {
            log::debug!(target: "present", "restored container {}", container.0);
        }
        doc.set_attr(container, DATA_MERGED, "0")?;
        Ok(())
    }

    /// Fold every direct article into the first one. Bodies are joined with a gap paragraph and
    /// the first article's footers follow them.
    fn merge(&mut self, doc: &mut Document, container: NodeKey) -> Result<(), DomError> {
        let articles = direct_articles(doc, container);
        let Some((&primary, rest)) = articles.split_first() else {
            return Ok(());
        };
        if rest.is_empty() {
            doc.set_attr(container, DATA_MERGED, "1")?;
            return Ok(());
        }

        let mut parts = Vec::with_capacity(articles.len());
        for &article in &articles {
            let body = body_markup(doc, article)?;
            if !body.is_empty() {
                parts.push(body);
            }
        }
        let gap = format!(r#"<p class="{CLASS_MERGE_GAP}"></p>"#);
        let mut combined = parts.join(&gap);
        for footer in doc.find_all(primary, is_footer) {
            combined.push_str(&doc.outer_html(footer)?);
        }

        self.states.remove(primary);
        doc.set_inner_html(primary, &combined)?;
        for name in [DATA_SETUP, DATA_COLLAPSED, DATA_USER_OVERRIDE] {
            doc.remove_attr(primary, name)?;
        }
        for &article in rest {
            self.states.remove(article);
            doc.remove(article)?;
        }
        doc.set_attr(container, DATA_MERGED, "1")?;
        log::debug!(target: "present", "merged {} articles in container {}", articles.len(), container.0);
        Ok(())
    }

    fn setup_article(
        &mut self,
        doc: &mut Document,
        article: NodeKey,
        prefs: &Preferences,
        generation: Generation,
    ) -> Result<(), DomError> {
        let stamp = generation.to_string();
        if doc.attr(article, DATA_INIT_GEN) == Some(stamp.as_str()) && self.states.contains(article)
        {
            return Ok(());
        }
        doc.set_attr(article, DATA_INIT_GEN, &stamp)?;
        doc.add_class(article, CLASS_ARTICLE)?;

        let show_toggles = prefs.toggles_visible();
        let body = match child_with_class(doc, article, CLASS_BODY) {
            Some(body) => {
                let toggle = child_with_class(doc, article, CLASS_TOGGLE);
                match (show_toggles, toggle) {
                    (true, None) => {
                        let toggle = create_toggle(doc)?;
                        doc.insert_before(article, toggle, body)?;
                    }
                    (false, Some(toggle)) => doc.remove(toggle)?,
                    _ => {}
                }
                body
            }
            None => scaffold(doc, article, show_toggles)?,
        };

        let lines = match self.states.entry(article, generation).lines {
            Some(lines) => lines,
            None => {
                let lines = count_lines(doc, body);
                self.states.entry(article, generation).lines = Some(lines);
                lines
            }
        };
        let collapse_by_default = prefs.minimize_long_articles && lines > self.long_article_threshold;
        let state = self.states.entry(article, generation);
        let desired = match (state.user_override, state.collapsed) {
            (true, Some(collapsed)) => collapsed,
            _ => collapse_by_default,
        };
        if !state.user_override {
            state.collapsed = Some(desired);
        }
        self.set_collapsed(doc, article, desired, false, generation)?;

        doc.set_attr(article, DATA_LINE_COUNT, &lines.to_string())?;
        doc.set_attr(article, DATA_SETUP, "1")?;
        Ok(())
    }

    fn set_collapsed(
        &mut self,
        doc: &mut Document,
        article: NodeKey,
        collapsed: bool,
        user_action: bool,
        generation: Generation,
    ) -> Result<(), DomError> {
        let Some(body) = child_with_class(doc, article, CLASS_BODY) else {
            return Ok(());
        };
        let state = self.states.entry(article, generation);
        let shown_collapsed = doc.has_class(article, CLASS_COLLAPSED);
        if !user_action && state.collapsed == Some(collapsed) && shown_collapsed == collapsed {
            let user_override = state.user_override;
            if doc.has_attr(article, DATA_USER_OVERRIDE) {
                doc.set_attr(
                    article,
                    DATA_USER_OVERRIDE,
                    if user_override { "1" } else { "0" },
                )?;
            }
            return update_toggle(doc, article, collapsed);
        }

        state.collapsed = Some(collapsed);
        if user_action {
            state.user_override = true;
        }
        let user_override = state.user_override;

        if collapsed {
            doc.add_class(article, CLASS_COLLAPSED)?;
            doc.set_style_property(body, "display", "none", true)?;
        } else {
            doc.remove_class(article, CLASS_COLLAPSED)?;
            doc.remove_style_property(body, "display")?;
        }
        doc.set_attr(article, DATA_COLLAPSED, if collapsed { "1" } else { "0" })?;
        doc.set_attr(
            article,
            DATA_USER_OVERRIDE,
            if user_override { "1" } else { "0" },
        )?;
        update_toggle(doc, article, collapsed)
    }

    /// Flip the article owning `toggle` and record the choice as a user override for the
    /// current generation. Returns the new collapsed state.
    pub fn toggle(
        &mut self,
        doc: &mut Document,
        toggle: NodeKey,
        generation: Generation,
    ) -> Result<Option<bool>, DomError> {
        let Some(article) = doc.closest(toggle, |d, k| d.has_class(k, CLASS_ARTICLE)) else {
            return Ok(None);
        };
        let shown = doc.has_class(article, CLASS_COLLAPSED);
        let current = self
            .states
            .entry(article, generation)
            .collapsed
            .unwrap_or(shown);
        self.set_collapsed(doc, article, !current, true, generation)?;
        log::debug!(target: "present", "article {} collapsed={}", article.0, !current);
        Ok(Some(!current))
    }
}

/// Wrap the article's non-footer children in a body element and put the toggle in front:
/// `toggle?, body, footers...`.
fn scaffold(doc: &mut Document, article: NodeKey, with_toggle: bool) -> Result<NodeKey, DomError> {
    let children = doc.children(article).to_vec();
    let body = doc.create_element("div")?;
    doc.add_class(body, CLASS_BODY)?;
    let mut footers = Vec::new();
    for child in children {
        if is_footer(doc, child) {
            footers.push(child);
        } else {
            doc.append_child(body, child)?;
        }
    }
    if with_toggle {
        let toggle = create_toggle(doc)?;
        doc.append_child(article, toggle)?;
    }
    doc.append_child(article, body)?;
    for footer in footers {
        doc.append_child(article, footer)?;
    }
    Ok(body)
}

fn create_toggle(doc: &mut Document) -> Result<NodeKey, DomError> {
    let toggle = doc.create_element("button")?;
    doc.set_attr(toggle, "type", "button")?;
    doc.add_class(toggle, CLASS_TOGGLE)?;
    doc.set_text_content(toggle, "-")?;
    doc.set_attr(toggle, "aria-label", LABEL_COLLAPSE)?;
    doc.set_attr(toggle, "aria-expanded", "true")?;
    doc.add_listener(toggle, Listener::new(EventType::Click, HANDLER_TOGGLE_ARTICLE))?;
    Ok(toggle)
}

fn update_toggle(doc: &mut Document, article: NodeKey, collapsed: bool) -> Result<(), DomError> {
    let Some(toggle) = child_with_class(doc, article, CLASS_TOGGLE) else {
        return Ok(());
    };
    let (text, expanded, label) = if collapsed {
        ("+", "false", LABEL_EXPAND)
    } else {
        ("-", "true", LABEL_COLLAPSE)
    };
    doc.set_text_content(toggle, text)?;
    doc.set_attr(toggle, "aria-expanded", expanded)?;
    doc.set_attr(toggle, "aria-label", label)?;
    Ok(())
}

/// Lines of rendered text in `body`, counting the blank lines between paragraphs.
pub fn count_lines(doc: &Document, body: NodeKey) -> usize {
    let text = doc.inner_text(body);
    if text.is_empty() {
        0
    } else {
        text.split('\n').count()
    }
}

/// Serialized children of `article` with every footer removed, trimmed.
fn body_markup(doc: &Document, article: NodeKey) -> Result<String, DomError> {
    let node = doc.materialize(article)?;
    let markup: String = node
        .into_children()
        .into_iter()
        .filter_map(strip_footers)
        .map(|child| to_html(&child))
        .collect();
    Ok(markup.trim().to_string())
}

fn strip_footers(node: Node) -> Option<Node> {
    if node.is_element_named("footer") {
        return None;
    }
    match node {
        Node::Element {
            name,
            attributes,
            children,
        } => Some(Node::Element {
            name,
            attributes,
            children: children.into_iter().filter_map(strip_footers).collect(),
        }),
        other => Some(other),
    }
}
