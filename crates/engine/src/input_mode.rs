//! Switches the query field between the host's submit-while-typing mode and submit-on-Enter.
//!
//! Both directions swap the field for a fresh clone instead of patching it in place: a clone
//! carries attributes, value and checked state but none of the old node's listeners. The
//! `data-enter-only` marker makes each direction idempotent.
use crate::contract::{
    AUTOSUBMIT_ATTRS, BASELINE_AUTOSUBMIT, BASELINE_WATCH_DELAY, ENTER_ONLY_ATTRS_MARKER,
    ENTER_ONLY_MARKER, HANDLER_SUBMIT_ON_ENTER, find_form, find_query_field,
};
use html::{Document, DomError, EventType, Listener, NodeKey, SubmitVia};
use serde_json::{Map, Value};

pub fn apply(doc: &mut Document, root: NodeKey, disable_autosearch: bool) -> Result<usize, DomError> {
    if disable_autosearch {
        enable(doc, root)
    } else {
        disable(doc, root)
    }
}

fn query_field(doc: &Document, root: NodeKey) -> Option<NodeKey> {
    let form = find_form(doc, root)?;
    find_query_field(doc, form)
}

pub fn is_enter_only(doc: &Document, field: NodeKey) -> bool {
    doc.attr(field, ENTER_ONLY_MARKER) == Some("1")
}

/// Swap `field` for `fresh`, carrying focus and selection over.
fn swap_field(doc: &mut Document, field: NodeKey, fresh: NodeKey) -> Result<(), DomError> {
    let had_focus = doc.focused() == Some(field);
    let selection = doc.selection(field);
    doc.replace_child(field, fresh)?;
    if had_focus {
        doc.focus(fresh)?;
    }
    if let Some(range) = selection {
        doc.set_selection_range(fresh, range.start, range.end)?;
    }
    Ok(())
}

/// Switch to submit-on-Enter. Returns 1 if the field was swapped.
pub fn enable(doc: &mut Document, root: NodeKey) -> Result<usize, DomError> {
    let Some(field) = query_field(doc, root) else {
        return Ok(0);
    };
    if is_enter_only(doc, field) {
        return Ok(0);
    }

    let fresh = doc.clone_node(field, true)?;
    let mut recorded = Map::new();
    for name in AUTOSUBMIT_ATTRS {
        if let Some(value) = doc.remove_attr(fresh, name)? {
            recorded.insert(name.to_string(), Value::String(value));
        }
    }
    doc.set_attr(fresh, ENTER_ONLY_MARKER, "1")?;
    doc.set_attr(
        fresh,
        ENTER_ONLY_ATTRS_MARKER,
        &Value::Object(recorded).to_string(),
    )?;
    doc.add_listener(
        fresh,
        Listener::new(EventType::KeyDown, HANDLER_SUBMIT_ON_ENTER),
    )?;

    swap_field(doc, field, fresh)?;
    log::debug!(target: "input_mode", "auto-search disabled; Enter submits");
    Ok(1)
}

/// Restore submit-while-typing. Returns 1 if the field was swapped.
///
/// A field that was never switched only gets the baseline attributes added when missing.
pub fn disable(doc: &mut Document, root: NodeKey) -> Result<usize, DomError> {
    let Some(field) = query_field(doc, root) else {
        return Ok(0);
    };
    if !is_enter_only(doc, field) {
        ensure_baseline(doc, field)?;
        return Ok(0);
    }

    let recorded = doc
        .attr(field, ENTER_ONLY_ATTRS_MARKER)
        .map(parse_recorded)
        .unwrap_or_default();

    let fresh = doc.clone_node(field, true)?;
    doc.remove_attr(fresh, ENTER_ONLY_MARKER)?;
    doc.remove_attr(fresh, ENTER_ONLY_ATTRS_MARKER)?;
    if recorded.is_empty() {
        doc.set_attr(fresh, BASELINE_AUTOSUBMIT.0, BASELINE_AUTOSUBMIT.1)?;
        if !doc.has_attr(fresh, BASELINE_WATCH_DELAY.0) {
            doc.set_attr(fresh, BASELINE_WATCH_DELAY.0, BASELINE_WATCH_DELAY.1)?;
        }
    } else {
        for (name, value) in &recorded {
            match value {
                Value::Null => {}
                Value::String(s) => {
                    doc.set_attr(fresh, name, s)?;
                }
                other => {
                    doc.set_attr(fresh, name, &other.to_string())?;
                }
            }
        }
    }

    swap_field(doc, field, fresh)?;
    log::debug!(target: "input_mode", "auto-search restored");
    Ok(1)
}

fn ensure_baseline(doc: &mut Document, field: NodeKey) -> Result<(), DomError> {
    for (name, value) in [BASELINE_AUTOSUBMIT, BASELINE_WATCH_DELAY] {
        if !doc.has_attr(field, name) {
            doc.set_attr(field, name, value)?;
        }
    }
    Ok(())
}

// A corrupt record reads as empty; the caller then falls back to the baseline attributes.
fn parse_recorded(raw: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => Map::new(),
        Err(err) => {
            log::debug!(target: "input_mode", "unreadable attribute record: {err}");
            Map::new()
        }
    }
}

/// Enter on a submit-on-Enter field: submit the enclosing form, preferring the host's
/// programmatic API.
pub fn submit_on_enter(doc: &mut Document, field: NodeKey) -> Option<SubmitVia> {
    let form = doc
        .closest(field, |d, k| d.is_element_named(k, "form"))
        .or_else(|| find_form(doc, doc.root()))?;
    Some(doc.submit_form(form, true))
}
