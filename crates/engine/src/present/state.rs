use core_types::Generation;
use html::{Document, NodeKey};
use std::collections::HashMap;

/// UI state of one article element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArticleState {
    /// Approximate rendered line count of the body; computed once.
    pub lines: Option<usize>,
    pub collapsed: Option<bool>,
    pub user_override: bool,
    pub generation: Generation,
}

impl ArticleState {
    fn new(generation: Generation) -> Self {
        Self {
            lines: None,
            collapsed: None,
            user_override: false,
            generation,
        }
    }
}

/// Side table keyed by node identity.
///
/// Node keys are never reused, so an entry can only ever describe the element it was created
/// for; `sweep` drops entries whose element is no longer attached to the document root, whether
/// it was removed from the arena or only detached.
#[derive(Debug, Default)]
pub struct ArticleStates {
    entries: HashMap<NodeKey, ArticleState>,
}

impl ArticleStates {
    pub fn contains(&self, article: NodeKey) -> bool {
        self.entries.contains_key(&article)
    }

    pub fn get(&self, article: NodeKey) -> Option<&ArticleState> {
        self.entries.get(&article)
    }

    /// State for `article` under `generation`. A state recorded under another generation loses
    /// its override and collapsed flag; the cached line count survives.
    pub fn entry(&mut self, article: NodeKey, generation: Generation) -> &mut ArticleState {
        let state = self
            .entries
            .entry(article)
            .or_insert_with(|| ArticleState::new(generation));
        if state.generation != generation {
            state.generation = generation;
            state.user_override = false;
            state.collapsed = None;
        }
        state
    }

    pub fn remove(&mut self, article: NodeKey) {
        self.entries.remove(&article);
    }

    pub fn sweep(&mut self, doc: &Document) -> usize {
        let before = self.entries.len();
        self.entries.retain(|&key, _| doc.is_connected(key));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_change_resets_override_but_keeps_lines() {
        let mut states = ArticleStates::default();
        let key = NodeKey(7);
        {
            let s = states.entry(key, Generation(1));
            s.lines = Some(12);
            s.collapsed = Some(true);
            s.user_override = true;
        }
        let same = *states.entry(key, Generation(1));
        assert!(same.user_override);

        let next = *states.entry(key, Generation(2));
        assert!(!next.user_override);
        assert_eq!(next.collapsed, None);
        assert_eq!(next.lines, Some(12));
    }

    #[test]
    fn sweep_drops_removed_elements() {
        let mut doc = Document::parse("<article></article><article></article>");
        let articles = doc.elements_by_tag(doc.root(), "article");
        let mut states = ArticleStates::default();
        for &a in &articles {
            states.entry(a, Generation(1));
        }
        doc.remove(articles[0]).unwrap();
        assert_eq!(states.sweep(&doc), 1);
        assert!(!states.contains(articles[0]));
        assert!(states.contains(articles[1]));
    }

    #[test]
    fn sweep_drops_detached_elements_still_in_the_arena() {
        let mut doc = Document::parse("<div><article></article></div><article></article>");
        let articles = doc.elements_by_tag(doc.root(), "article");
        let wrapper = doc.elements_by_tag(doc.root(), "div")[0];
        let mut states = ArticleStates::default();
        for &a in &articles {
            states.entry(a, Generation(1));
        }
        doc.detach(wrapper).unwrap();
        assert!(doc.contains(articles[0]));
        assert_eq!(states.sweep(&doc), 1);
        assert!(!states.contains(articles[0]));
        assert!(states.contains(articles[1]));
    }
}
