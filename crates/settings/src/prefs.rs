use crate::registry::Registry;
use core_types::DictCode;
use serde_json::{Map, Value};
use std::collections::HashSet;

pub const KEY_DICTIONARY_ORDER: &str = "dictionaryOrder";
pub const KEY_PRESELECTED: &str = "preselectedDictionaries";
pub const KEY_DISABLE_AUTOSEARCH: &str = "disableAutosearch";
pub const KEY_MERGE_RESULTS: &str = "mergeResults";
pub const KEY_MINIMIZE_LONG: &str = "minimizeLongArticles";
pub const KEY_SHOW_TOGGLES: &str = "showToggles";

pub const ALL_KEYS: [&str; 6] = [
    KEY_DICTIONARY_ORDER,
    KEY_PRESELECTED,
    KEY_DISABLE_AUTOSEARCH,
    KEY_MERGE_RESULTS,
    KEY_MINIMIZE_LONG,
    KEY_SHOW_TOGGLES,
];

/// Sanitized preference snapshot.
///
/// `dictionary_order` always contains every registry code; both code lists are normalized and
/// free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub dictionary_order: Vec<DictCode>,
    pub preselected_dictionaries: Vec<DictCode>,
    pub disable_autosearch: bool,
    pub merge_results: bool,
    pub minimize_long_articles: bool,
    pub show_toggles: bool,
}

impl Preferences {
    pub fn defaults(registry: &Registry) -> Self {
        Self {
            dictionary_order: registry.codes(),
            preselected_dictionaries: registry.default_preselection(),
            disable_autosearch: true,
            merge_results: true,
            minimize_long_articles: true,
            show_toggles: true,
        }
    }

    /// Toggle controls are forced on while long articles are minimized.
    pub fn toggles_visible(&self) -> bool {
        self.show_toggles || self.minimize_long_articles
    }

    /// Fill every missing or invalid field from the defaults. Never fails.
    pub fn sanitize(raw: &Map<String, Value>, registry: &Registry) -> Self {
        let defaults = Self::defaults(registry);

        let mut dictionary_order = dedup_codes(as_list(raw.get(KEY_DICTIONARY_ORDER)));
        let mut seen: HashSet<DictCode> = dictionary_order.iter().cloned().collect();
        for code in registry.codes() {
            if seen.insert(code.clone()) {
                dictionary_order.push(code);
            }
        }

        let mut preselected_dictionaries = dedup_codes(as_list(raw.get(KEY_PRESELECTED)));
        if preselected_dictionaries.is_empty() {
            preselected_dictionaries = defaults.preselected_dictionaries.clone();
        }

        Self {
            dictionary_order,
            preselected_dictionaries,
            disable_autosearch: as_bool(raw.get(KEY_DISABLE_AUTOSEARCH))
                .unwrap_or(defaults.disable_autosearch),
            merge_results: as_bool(raw.get(KEY_MERGE_RESULTS)).unwrap_or(defaults.merge_results),
            minimize_long_articles: as_bool(raw.get(KEY_MINIMIZE_LONG))
                .unwrap_or(defaults.minimize_long_articles),
            show_toggles: as_bool(raw.get(KEY_SHOW_TOGGLES)).unwrap_or(defaults.show_toggles),
        }
    }

    /// Stored representation.
    pub fn to_raw(&self) -> Map<String, Value> {
        let codes = |list: &[DictCode]| {
            Value::Array(
                list.iter()
                    .map(|c| Value::String(c.as_str().to_string()))
                    .collect(),
            )
        };
        let mut map = Map::new();
        map.insert(KEY_DICTIONARY_ORDER.into(), codes(&self.dictionary_order));
        map.insert(KEY_PRESELECTED.into(), codes(&self.preselected_dictionaries));
        map.insert(KEY_DISABLE_AUTOSEARCH.into(), Value::Bool(self.disable_autosearch));
        map.insert(KEY_MERGE_RESULTS.into(), Value::Bool(self.merge_results));
        map.insert(KEY_MINIMIZE_LONG.into(), Value::Bool(self.minimize_long_articles));
        map.insert(KEY_SHOW_TOGGLES.into(), Value::Bool(self.show_toggles));
        map
    }
}

fn as_bool(value: Option<&Value>) -> Option<bool> {
    value.and_then(Value::as_bool)
}

// Scalars count as one-element lists. Falsy scalars (null, false, 0, "") count as nothing; inside a
// list a number is still a code.
fn as_list(value: Option<&Value>) -> Vec<&Value> {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Vec::new(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Vec::new(),
        Some(Value::String(s)) if s.is_empty() => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(other) => vec![other],
    }
}

fn code_of(value: &Value) -> Option<DictCode> {
    match value {
        Value::String(s) => DictCode::parse(s),
        Value::Number(n) => DictCode::parse(&n.to_string()),
        _ => None,
    }
}

fn dedup_codes(values: Vec<&Value>) -> Vec<DictCode> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter_map(code_of)
        .filter(|code| seen.insert(code.clone()))
        .collect()
}
