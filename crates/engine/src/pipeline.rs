use crate::config::EngineConfig;
use crate::contract::{HANDLER_SUBMIT_ON_ENTER, HANDLER_TOGGLE_ARTICLE};
use crate::input_mode;
use crate::order;
use crate::preselect::Preselector;
use crate::present::Presenter;
use crate::scheduler::Scope;
use core_types::Generation;
use html::{Document, DomError, EventType, NodeKey, SubmitVia};
use serde::Serialize;
use settings::Preferences;

/// What one reconciliation pass changed, per stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub input_mode: usize,
    pub preselected: usize,
    pub reordered: usize,
    pub presented: usize,
}

/// Outcome of routing a user event through the listeners the engine installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Ignored,
    Submitted(SubmitVia),
    Toggled { article_collapsed: bool },
}

/// The reconciliation pipeline: input mode, preselection, ordering, presentation.
///
/// Stages run in that order on every pass. A stage that fails is logged and skipped; the
/// others still run.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    preselector: Preselector,
    presenter: Presenter,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

fn stage(name: &str, result: Result<usize, DomError>) -> usize {
    match result {
        Ok(count) => count,
        Err(err) => {
            log::warn!(target: "engine", "{name} stage failed: {err}");
            0
        }
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let presenter = Presenter::new(config.long_article_threshold);
        Self {
            config,
            preselector: Preselector::new(),
            presenter,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn presenter(&self) -> &Presenter {
        &self.presenter
    }

    pub fn page_loaded(&mut self) {
        self.preselector.page_loaded();
    }

    pub fn run(
        &mut self,
        doc: &mut Document,
        scope: Scope,
        prefs: &Preferences,
        generation: Generation,
    ) -> RunReport {
        let root = scope.resolve(doc);
        let report = RunReport {
            input_mode: stage(
                "input mode",
                input_mode::apply(doc, root, prefs.disable_autosearch),
            ),
            preselected: stage("preselection", self.preselector.apply(doc, prefs)),
            reordered: stage("ordering", order::apply(doc, &prefs.dictionary_order)),
            presented: stage(
                "presentation",
                self.presenter.apply(doc, prefs, generation),
            ),
        };
        log::debug!(target: "engine", "pass over {scope:?} (generation {generation}): {report:?}");
        report
    }

    /// Apply only the input mode under `scope`, as done for inserted fragments and right after
    /// a settings change.
    pub fn apply_input_mode(&mut self, doc: &mut Document, scope: Scope, prefs: &Preferences) -> usize {
        let root = scope.resolve(doc);
        stage(
            "input mode",
            input_mode::apply(doc, root, prefs.disable_autosearch),
        )
    }

    pub fn toggle(
        &mut self,
        doc: &mut Document,
        toggle: NodeKey,
        generation: Generation,
    ) -> Result<Option<bool>, DomError> {
        self.presenter.toggle(doc, toggle, generation)
    }

    /// Route a click to the article toggle it landed on, if any.
    pub fn click(
        &mut self,
        doc: &mut Document,
        target: NodeKey,
        generation: Generation,
    ) -> Result<Handled, DomError> {
        let path = doc.dispatch_path(target, EventType::Click);
        let Some((toggle, _)) = path
            .into_iter()
            .find(|(_, l)| l.handler == HANDLER_TOGGLE_ARTICLE)
        else {
            return Ok(Handled::Ignored);
        };
        Ok(match self.presenter.toggle(doc, toggle, generation)? {
            Some(collapsed) => Handled::Toggled {
                article_collapsed: collapsed,
            },
            None => Handled::Ignored,
        })
    }

    /// Route a key press. Enter on a submit-on-Enter field submits its form.
    pub fn key_down(&mut self, doc: &mut Document, target: NodeKey, key: &str) -> Handled {
        if key != "Enter" {
            return Handled::Ignored;
        }
        let path = doc.dispatch_path(target, EventType::KeyDown);
        let Some((field, _)) = path
            .into_iter()
            .find(|(_, l)| l.handler == HANDLER_SUBMIT_ON_ENTER)
        else {
            return Handled::Ignored;
        };
        match input_mode::submit_on_enter(doc, field) {
            Some(via) => Handled::Submitted(via),
            None => Handled::Ignored,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{CLASS_TOGGLE, child_with_class, direct_articles, result_containers};
    use page_test_support::{ArticleFixture, PageFixture};
    use settings::Registry;

    fn prefs() -> Preferences {
        Preferences::defaults(&Registry::builtin())
    }

    #[test]
    fn enter_on_plain_field_is_ignored() {
        let mut doc = Document::parse(&PageFixture::new().to_html());
        let mut engine = Engine::default();
        let field = doc.elements_by_tag(doc.root(), "input")[0];
        assert_eq!(engine.key_down(&mut doc, field, "Enter"), Handled::Ignored);
    }

    #[test]
    fn enter_submits_once_autosearch_is_disabled() {
        let mut doc = Document::parse(&PageFixture::new().to_html());
        let mut engine = Engine::default();
        let prefs = Preferences {
            disable_autosearch: true,
            ..prefs()
        };
        engine.run(&mut doc, Scope::Document, &prefs, Generation(1));
        let field = doc.elements_by_tag(doc.root(), "input")[0];
        assert_eq!(engine.key_down(&mut doc, field, "a"), Handled::Ignored);
        assert_eq!(
            engine.key_down(&mut doc, field, "Enter"),
            Handled::Submitted(SubmitVia::Programmatic)
        );
    }

    #[test]
    fn click_inside_toggle_flips_article() {
        let mut doc = Document::parse(
            &PageFixture::new()
                .result("mw", vec![ArticleFixture::with_line_count(2)])
                .to_html(),
        );
        let mut engine = Engine::default();
        engine.run(&mut doc, Scope::Document, &prefs(), Generation(1));
        let container = result_containers(&doc)[0];
        let article = direct_articles(&doc, container)[0];
        let toggle = child_with_class(&doc, article, CLASS_TOGGLE).unwrap();
        let label = doc.children(toggle)[0];

        assert_eq!(
            engine.click(&mut doc, label, Generation(1)).unwrap(),
            Handled::Toggled {
                article_collapsed: true
            }
        );
        let body_text = doc.children(article)[1];
        assert_eq!(
            engine.click(&mut doc, body_text, Generation(1)).unwrap(),
            Handled::Ignored
        );
    }

    #[test]
    fn failing_stage_does_not_stop_the_others() {
        assert_eq!(stage("test", Err(DomError::UnknownKey(NodeKey(9)))), 0);
        assert_eq!(stage("test", Ok(3)), 3);
    }
}
