use crate::contract::{dict_checkboxes, dict_panel, find_form};
use core_types::DictCode;
use html::{Document, DomError, Effect, EventType};
use settings::Preferences;
use std::collections::HashSet;

/// Checks the preferred dictionaries on a cold page, once per page load.
///
/// A page where any dictionary is already checked belongs to the user and is left alone.
#[derive(Debug, Default)]
pub struct Preselector {
    latched: bool,
}

impl Preselector {
    pub fn new() -> Self {
        Self::default()
    }

    /// A new page load re-arms the preselector.
    pub fn page_loaded(&mut self) {
        self.latched = false;
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Returns the number of checkboxes that changed.
    pub fn apply(&mut self, doc: &mut Document, prefs: &Preferences) -> Result<usize, DomError> {
        if self.latched {
            return Ok(0);
        }
        let panel = dict_panel(doc);
        let checkboxes = dict_checkboxes(doc, panel);
        if checkboxes.is_empty() || checkboxes.iter().any(|&cb| doc.is_checked(cb)) {
            return Ok(0);
        }
        let desired: HashSet<&DictCode> = prefs.preselected_dictionaries.iter().collect();
        if desired.is_empty() {
            return Ok(0);
        }

        let mut changed = Vec::new();
        for cb in checkboxes {
            if doc.is_disabled(cb) {
                continue;
            }
            let Some(code) = doc.value(cb).and_then(DictCode::parse) else {
                continue;
            };
            if desired.contains(&code) && doc.set_checked(cb, true)? {
                changed.push(cb);
            }
        }
        let Some(&first) = changed.first() else {
            return Ok(0);
        };

        let form = doc
            .closest(panel, |d, k| d.is_element_named(k, "form"))
            .or_else(|| find_form(doc, doc.root()));
        match form {
            Some(form) => {
                let via = doc.submit_form(form, false);
                log::debug!(target: "preselect", "checked {} dictionaries; submitting via {via:?}", changed.len());
            }
            None => {
                doc.push_effect(Effect::Dispatch {
                    target: first,
                    event: EventType::Change,
                });
                log::debug!(target: "preselect", "checked {} dictionaries; no form, dispatched change", changed.len());
            }
        }
        self.latched = true;
        Ok(changed.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::SubmitVia;
    use page_test_support::PageFixture;
    use settings::Registry;

    fn prefs_with(codes: &[&str]) -> Preferences {
        let mut prefs = Preferences::defaults(&Registry::builtin());
        prefs.preselected_dictionaries = codes.iter().filter_map(|c| DictCode::parse(c)).collect();
        prefs
    }

    fn checked_codes(doc: &Document) -> Vec<String> {
        let panel = dict_panel(doc);
        dict_checkboxes(doc, panel)
            .into_iter()
            .filter(|&cb| doc.is_checked(cb))
            .filter_map(|cb| doc.value(cb).map(str::to_string))
            .collect()
    }

    #[test]
    fn cold_page_gets_preferred_codes_and_one_submit() {
        let mut doc = Document::parse(
            &PageFixture::new()
                .checkbox("mw", false)
                .checkbox("ap90", false)
                .checkbox("acc", false)
                .to_html(),
        );
        let mut pre = Preselector::new();
        assert_eq!(pre.apply(&mut doc, &prefs_with(&["MW", "ap90"])).unwrap(), 2);
        assert_eq!(checked_codes(&doc), vec!["mw", "ap90"]);
        let effects = doc.take_effects();
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            effects[0],
            Effect::Submit {
                via: SubmitVia::RequestSubmit,
                ..
            }
        ));
    }

    #[test]
    fn any_prechecked_box_blocks_preselection() {
        let mut doc = Document::parse(
            &PageFixture::new()
                .checkbox("mw", false)
                .checkbox("acc", true)
                .to_html(),
        );
        let mut pre = Preselector::new();
        assert_eq!(pre.apply(&mut doc, &prefs_with(&["mw"])).unwrap(), 0);
        assert_eq!(checked_codes(&doc), vec!["acc"]);
        assert!(doc.take_effects().is_empty());
    }

    #[test]
    fn disabled_and_unknown_boxes_are_skipped() {
        let mut doc = Document::parse(
            &PageFixture::new()
                .disabled_checkbox("mw")
                .checkbox("acc", false)
                .to_html(),
        );
        let mut pre = Preselector::new();
        assert_eq!(pre.apply(&mut doc, &prefs_with(&["mw", "zz"])).unwrap(), 0);
        assert!(doc.take_effects().is_empty());
        assert!(!pre.is_latched());
    }

    #[test]
    fn without_form_dispatches_change_on_first_changed_box() {
        let mut doc = Document::parse(
            &PageFixture::new()
                .without_form()
                .checkbox("acc", false)
                .checkbox("mw", false)
                .to_html(),
        );
        let mut pre = Preselector::new();
        assert_eq!(pre.apply(&mut doc, &prefs_with(&["mw"])).unwrap(), 1);
        let panel = dict_panel(&doc);
        let mw = dict_checkboxes(&doc, panel)[1];
        assert_eq!(
            doc.take_effects(),
            vec![Effect::Dispatch {
                target: mw,
                event: EventType::Change
            }]
        );
    }

    #[test]
    fn latch_holds_until_next_page_load() {
        let html = PageFixture::new().checkbox("mw", false).to_html();
        let mut pre = Preselector::new();
        let mut doc = Document::parse(&html);
        assert_eq!(pre.apply(&mut doc, &prefs_with(&["mw"])).unwrap(), 1);

        let mut reloaded = Document::parse(&html);
        assert_eq!(pre.apply(&mut reloaded, &prefs_with(&["mw"])).unwrap(), 0);
        pre.page_loaded();
        assert_eq!(pre.apply(&mut reloaded, &prefs_with(&["mw"])).unwrap(), 1);
    }
}
