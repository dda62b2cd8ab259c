use crate::builder::{build_document, build_fragment};
use crate::tokenizer::tokenize;
use crate::types::{
    DomError, Effect, EventType, HostFeatures, Listener, MutationJournal, Node, NodeKey,
    SelectionRange, SubmitVia,
};
use std::collections::HashMap;

/// Live, mutable document.
///
/// Nodes live in an arena keyed by [`NodeKey`]. Keys are never reused; removing a subtree drops
/// its records, listeners and control state, so `contains` doubles as a liveness check for
/// identity-keyed side tables.
#[derive(Debug)]
pub struct Document {
    nodes: HashMap<NodeKey, NodeRecord>,
    next_key: u32,
    root: NodeKey,
    focused: Option<NodeKey>,
    listeners: HashMap<NodeKey, Vec<Listener>>,
    effects: Vec<Effect>,
    journal: MutationJournal,
    features: HostFeatures,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Document {
        doctype: Option<String>,
    },
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

#[derive(Debug, Clone, Default)]
struct ControlState {
    value: Option<String>,
    checked: bool,
    selection: Option<SelectionRange>,
}

#[derive(Debug)]
pub(crate) struct NodeRecord {
    pub(crate) kind: NodeKind,
    parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
    control: ControlState,
}

impl NodeRecord {
    /// Detached record; form-control state is seeded from the `value`/`checked` attributes.
    fn new(kind: NodeKind) -> Self {
        let control = match &kind {
            NodeKind::Element { attributes, .. } => ControlState {
                value: attributes
                    .iter()
                    .find(|(k, _)| k == "value")
                    .and_then(|(_, v)| v.clone()),
                checked: attributes.iter().any(|(k, _)| k == "checked"),
                selection: None,
            },
            _ => ControlState::default(),
        };
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            control,
        }
    }

    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document { .. } | NodeKind::Element { .. })
    }
}

impl Document {
    pub fn new() -> Self {
        let root = NodeKey(1);
        let mut doc = Self {
            nodes: HashMap::new(),
            next_key: root.0 + 1,
            root,
            focused: None,
            listeners: HashMap::new(),
            effects: Vec::new(),
            journal: MutationJournal::default(),
            features: HostFeatures::default(),
        };
        doc.nodes
            .insert(root, NodeRecord::new(NodeKind::Document { doctype: None }));
        doc
    }

    pub fn parse(markup: &str) -> Self {
        Self::from_node(&build_document(&tokenize(markup)))
    }

    pub fn from_node(node: &Node) -> Self {
        let mut doc = Self::new();
        let children = match node {
            Node::Document { doctype, children } => {
                if let Some(record) = doc.nodes.get_mut(&doc.root) {
                    record.kind = NodeKind::Document {
                        doctype: doctype.clone(),
                    };
                }
                children.as_slice()
            }
            other => std::slice::from_ref(other),
        };
        for child in children {
            match doc.instantiate(child) {
                Ok(key) => doc.link(doc.root, key),
                Err(err) => {
                    log::warn!("from_node stopped early: {err}");
                    break;
                }
            }
        }
        doc.journal = MutationJournal::default();
        doc
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn features(&self) -> HostFeatures {
        self.features
    }

    pub fn set_features(&mut self, features: HostFeatures) {
        self.features = features;
    }

    /// `true` while the node exists in the arena (attached or detached).
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(&key)
    }

    /// `true` if the node is reachable from the document root.
    pub fn is_connected(&self, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(k) = current {
            if k == self.root {
                return true;
            }
            current = self.nodes.get(&k).and_then(|r| r.parent);
        }
        false
    }

    pub(crate) fn record(&self, key: NodeKey) -> Result<&NodeRecord, DomError> {
        self.nodes.get(&key).ok_or(DomError::UnknownKey(key))
    }

    fn record_mut(&mut self, key: NodeKey) -> Result<&mut NodeRecord, DomError> {
        self.nodes.get_mut(&key).ok_or(DomError::UnknownKey(key))
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.nodes.get(&key).and_then(|r| r.parent)
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.nodes.get(&key).map_or(&[], |r| r.children.as_slice())
    }

    pub fn element_children(&self, key: NodeKey) -> Vec<NodeKey> {
        self.children(key)
            .iter()
            .copied()
            .filter(|&c| self.is_element(c))
            .collect()
    }

    pub fn is_element(&self, key: NodeKey) -> bool {
        matches!(
            self.nodes.get(&key).map(|r| &r.kind),
            Some(NodeKind::Element { .. })
        )
    }

    pub fn is_text(&self, key: NodeKey) -> bool {
        matches!(
            self.nodes.get(&key).map(|r| &r.kind),
            Some(NodeKind::Text { .. })
        )
    }

    pub fn tag_name(&self, key: NodeKey) -> Option<&str> {
        match self.nodes.get(&key).map(|r| &r.kind) {
            Some(NodeKind::Element { name, .. }) => Some(name),
            _ => None,
        }
    }

    pub fn is_element_named(&self, key: NodeKey, target: &str) -> bool {
        self.tag_name(key)
            .is_some_and(|name| name.eq_ignore_ascii_case(target))
    }

    pub fn text(&self, key: NodeKey) -> Option<&str> {
        match self.nodes.get(&key).map(|r| &r.kind) {
            Some(NodeKind::Text { text }) => Some(text),
            _ => None,
        }
    }

    // ---- attributes ----

    pub fn attributes(&self, key: NodeKey) -> &[(String, Option<String>)] {
        match self.nodes.get(&key).map(|r| &r.kind) {
            Some(NodeKind::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    /// Attribute value; a bare attribute (`hidden`) reads as `""`.
    pub fn attr(&self, key: NodeKey, name: &str) -> Option<&str> {
        self.attributes(key)
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn has_attr(&self, key: NodeKey, name: &str) -> bool {
        self.attributes(key)
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    /// Returns `true` if the attribute changed.
    pub fn set_attr(&mut self, key: NodeKey, name: &str, value: &str) -> Result<bool, DomError> {
        let record = self.record_mut(key)?;
        let NodeKind::Element { attributes, .. } = &mut record.kind else {
            return Err(DomError::WrongNodeKind(key));
        };
        match attributes.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, existing)) if existing.as_deref() == Some(value) => return Ok(false),
            Some((_, existing)) => *existing = Some(value.to_string()),
            None => attributes.push((name.to_ascii_lowercase(), Some(value.to_string()))),
        }
        self.journal.attributes += 1;
        Ok(true)
    }

    /// Removes the attribute, returning its previous value (`""` for a bare attribute).
    pub fn remove_attr(&mut self, key: NodeKey, name: &str) -> Result<Option<String>, DomError> {
        let record = self.record_mut(key)?;
        let NodeKind::Element { attributes, .. } = &mut record.kind else {
            return Err(DomError::WrongNodeKind(key));
        };
        let Some(pos) = attributes.iter().position(|(k, _)| k.eq_ignore_ascii_case(name)) else {
            return Ok(None);
        };
        let (_, value) = attributes.remove(pos);
        self.journal.attributes += 1;
        Ok(Some(value.unwrap_or_default()))
    }

    pub fn has_class(&self, key: NodeKey, class: &str) -> bool {
        self.attr(key, "class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, key: NodeKey, class: &str) -> Result<bool, DomError> {
        if self.has_class(key, class) {
            return Ok(false);
        }
        let next = match self.attr(key, "class").map(str::trim) {
            Some(list) if !list.is_empty() => format!("{list} {class}"),
            _ => class.to_string(),
        };
        self.set_attr(key, "class", &next)
    }

    pub fn remove_class(&mut self, key: NodeKey, class: &str) -> Result<bool, DomError> {
        if !self.has_class(key, class) {
            return Ok(false);
        }
        let next = self
            .attr(key, "class")
            .unwrap_or("")
            .split_ascii_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(key, "class", &next)
    }

    // ---- construction ----

    fn insert_record(&mut self, kind: NodeKind) -> Result<NodeKey, DomError> {
        let key = NodeKey(self.next_key);
        self.next_key = self
            .next_key
            .checked_add(1)
            .ok_or(DomError::KeysExhausted)?;
        self.nodes.insert(key, NodeRecord::new(kind));
        Ok(key)
    }

    pub fn create_element(&mut self, name: &str) -> Result<NodeKey, DomError> {
        self.insert_record(NodeKind::Element {
            name: name.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> Result<NodeKey, DomError> {
        self.insert_record(NodeKind::Text {
            text: text.to_string(),
        })
    }

    /// Build detached nodes for an owned tree. A `Node::Document` becomes its children's
    /// first node; callers pass element/text/comment trees.
    pub fn instantiate(&mut self, node: &Node) -> Result<NodeKey, DomError> {
        let kind = match node {
            Node::Document { .. } => NodeKind::Element {
                name: "template".to_string(),
                attributes: Vec::new(),
            },
            Node::Element {
                name, attributes, ..
            } => NodeKind::Element {
                name: name.clone(),
                attributes: attributes.clone(),
            },
            Node::Text { text } => NodeKind::Text { text: text.clone() },
            Node::Comment { text } => NodeKind::Comment { text: text.clone() },
        };
        let key = self.insert_record(kind)?;
        let mut stack: Vec<(NodeKey, &Node)> = vec![(key, node)];
        while let Some((parent, owned)) = stack.pop() {
            for child in owned.children() {
                let child_key = self.insert_record(match child {
                    Node::Element {
                        name, attributes, ..
                    } => NodeKind::Element {
                        name: name.clone(),
                        attributes: attributes.clone(),
                    },
                    Node::Text { text } => NodeKind::Text { text: text.clone() },
                    Node::Comment { text } => NodeKind::Comment { text: text.clone() },
                    Node::Document { .. } => NodeKind::Comment {
                        text: String::new(),
                    },
                })?;
                self.link(parent, child_key);
                stack.push((child_key, child));
            }
        }
        Ok(key)
    }

    // Attach without journaling; only used while building detached subtrees.
    fn link(&mut self, parent: NodeKey, child: NodeKey) {
        if let Some(record) = self.nodes.get_mut(&parent) {
            record.children.push(child);
        }
        if let Some(record) = self.nodes.get_mut(&child) {
            record.parent = Some(parent);
        }
    }

    /// Deep or shallow copy with fresh keys. Attributes and control value/checked state are
    /// copied; listeners and selection are not. The copy is detached.
    pub fn clone_node(&mut self, key: NodeKey, deep: bool) -> Result<NodeKey, DomError> {
        let record = self.record(key)?;
        let kind = record.kind.clone();
        let control = ControlState {
            value: record.control.value.clone(),
            checked: record.control.checked,
            selection: None,
        };
        let children = if deep {
            record.children.clone()
        } else {
            Vec::new()
        };
        let copy = self.insert_record(kind)?;
        if let Some(r) = self.nodes.get_mut(&copy) {
            r.control = control;
        }
        for child in children {
            let child_copy = self.clone_node(child, true)?;
            self.link(copy, child_copy);
        }
        Ok(copy)
    }

    // ---- tree mutation ----

    fn is_inclusive_ancestor(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.nodes.get(&k).and_then(|r| r.parent);
        }
        false
    }

    fn check_insert(&self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        if !self.record(parent)?.allows_children() {
            return Err(DomError::WrongNodeKind(parent));
        }
        self.record(child)?;
        if child == self.root {
            return Err(DomError::DocumentRoot(child));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        Ok(())
    }

    /// Detach from the current parent, keeping the subtree alive.
    pub fn detach(&mut self, key: NodeKey) -> Result<(), DomError> {
        let parent = self.record_mut(key)?.parent.take();
        if let Some(parent) = parent {
            if let Some(record) = self.nodes.get_mut(&parent) {
                record.children.retain(|&c| c != key);
            }
            self.journal.child_list += 1;
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`. An attached child is moved; its key and
    /// everything attached to it survive.
    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.detach(child)?;
        self.link(parent, child);
        self.journal.child_list += 1;
        Ok(())
    }

    pub fn insert_before(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        before: NodeKey,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        if self.parent(before) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: before,
            });
        }
        if child == before {
            return Ok(());
        }
        self.detach(child)?;
        let record = self.record_mut(parent)?;
        let pos = record
            .children
            .iter()
            .position(|&c| c == before)
            .ok_or(DomError::NotAChild {
                parent,
                child: before,
            })?;
        record.children.insert(pos, child);
        self.record_mut(child)?.parent = Some(parent);
        self.journal.child_list += 1;
        Ok(())
    }

    /// Put `new` where `old` is and drop `old`'s subtree.
    pub fn replace_child(&mut self, old: NodeKey, new: NodeKey) -> Result<(), DomError> {
        let parent = self.parent(old).ok_or(DomError::NotAChild {
            parent: NodeKey::INVALID,
            child: old,
        })?;
        if self.focused == Some(old) {
            self.focused = None;
        }
        self.insert_before(parent, new, old)?;
        self.remove(old)
    }

    /// Detach and drop the subtree: records, listeners, control state.
    pub fn remove(&mut self, key: NodeKey) -> Result<(), DomError> {
        if key == self.root {
            return Err(DomError::DocumentRoot(key));
        }
        self.detach(key)?;
        let mut stack = vec![key];
        while let Some(k) = stack.pop() {
            if let Some(record) = self.nodes.remove(&k) {
                stack.extend(record.children);
            }
            self.listeners.remove(&k);
            if self.focused == Some(k) {
                self.focused = None;
            }
        }
        Ok(())
    }

    pub fn remove_children(&mut self, key: NodeKey) -> Result<(), DomError> {
        for child in self.record(key)?.children.clone() {
            self.remove(child)?;
        }
        Ok(())
    }

    /// Replace all children of `key` with fresh nodes built from `nodes`.
    pub fn replace_children(&mut self, key: NodeKey, nodes: &[Node]) -> Result<(), DomError> {
        if !self.record(key)?.allows_children() {
            return Err(DomError::WrongNodeKind(key));
        }
        log::trace!("replace_children key={} nodes={}", key.0, nodes.len());
        self.remove_children(key)?;
        for node in nodes {
            let child = self.instantiate(node)?;
            self.append_child(key, child)?;
        }
        Ok(())
    }

    pub fn set_inner_html(&mut self, key: NodeKey, markup: &str) -> Result<(), DomError> {
        let nodes = build_fragment(&tokenize(markup));
        self.replace_children(key, &nodes)
    }

    /// Replace the children with one text node unless the text content already matches.
    pub fn set_text_content(&mut self, key: NodeKey, text: &str) -> Result<bool, DomError> {
        let children = self.record(key)?.children.clone();
        if let [only] = children.as_slice()
            && let Some(NodeKind::Text { text: existing }) = self.nodes.get(only).map(|r| &r.kind)
        {
            if existing == text {
                return Ok(false);
            }
            let only = *only;
            if let Some(NodeKind::Text { text: existing }) =
                self.nodes.get_mut(&only).map(|r| &mut r.kind)
            {
                existing.clear();
                existing.push_str(text);
            }
            self.journal.character_data += 1;
            return Ok(true);
        }
        if children.is_empty() && text.is_empty() {
            return Ok(false);
        }
        self.remove_children(key)?;
        if !text.is_empty() {
            let child = self.create_text(text)?;
            self.append_child(key, child)?;
        }
        Ok(true)
    }

    /// Owned copy of the subtree rooted at `key`.
    pub fn materialize(&self, key: NodeKey) -> Result<Node, DomError> {
        let record = self.record(key)?;
        let children = record
            .children
            .iter()
            .map(|&c| self.materialize(c))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match &record.kind {
            NodeKind::Document { doctype } => Node::Document {
                doctype: doctype.clone(),
                children,
            },
            NodeKind::Element { name, attributes } => Node::Element {
                name: name.clone(),
                attributes: attributes.clone(),
                children,
            },
            NodeKind::Text { text } => Node::Text { text: text.clone() },
            NodeKind::Comment { text } => Node::Comment { text: text.clone() },
        })
    }

    // ---- form controls ----

    pub fn value(&self, key: NodeKey) -> Option<&str> {
        self.nodes.get(&key).and_then(|r| r.control.value.as_deref())
    }

    pub fn set_value(&mut self, key: NodeKey, value: &str) -> Result<(), DomError> {
        let record = self.record_mut(key)?;
        record.control.value = Some(value.to_string());
        record.control.selection = None;
        Ok(())
    }

    pub fn is_checked(&self, key: NodeKey) -> bool {
        self.nodes.get(&key).is_some_and(|r| r.control.checked)
    }

    /// Returns `true` if the checked state changed.
    pub fn set_checked(&mut self, key: NodeKey, checked: bool) -> Result<bool, DomError> {
        let record = self.record_mut(key)?;
        let changed = record.control.checked != checked;
        record.control.checked = checked;
        Ok(changed)
    }

    pub fn is_disabled(&self, key: NodeKey) -> bool {
        self.has_attr(key, "disabled")
    }

    pub fn focused(&self) -> Option<NodeKey> {
        self.focused
    }

    pub fn focus(&mut self, key: NodeKey) -> Result<(), DomError> {
        self.record(key)?;
        self.focused = Some(key);
        Ok(())
    }

    pub fn selection(&self, key: NodeKey) -> Option<SelectionRange> {
        self.nodes.get(&key).and_then(|r| r.control.selection)
    }

    /// Offsets are clamped to the value length and snapped down to char boundaries.
    pub fn set_selection_range(
        &mut self,
        key: NodeKey,
        start: usize,
        end: usize,
    ) -> Result<(), DomError> {
        let record = self.record_mut(key)?;
        let value = record.control.value.as_deref().unwrap_or("");
        let clamp = |mut i: usize| {
            i = i.min(value.len());
            while !value.is_char_boundary(i) {
                i -= 1;
            }
            i
        };
        record.control.selection = Some(SelectionRange::new(clamp(start), clamp(end)));
        Ok(())
    }

    // ---- listeners and effects ----

    pub fn add_listener(&mut self, key: NodeKey, listener: Listener) -> Result<(), DomError> {
        self.record(key)?;
        self.listeners.entry(key).or_default().push(listener);
        Ok(())
    }

    pub fn listeners(&self, key: NodeKey) -> &[Listener] {
        self.listeners.get(&key).map_or(&[], Vec::as_slice)
    }

    /// Handler tags registered for `event` on `key` and its ancestors, innermost first.
    pub fn dispatch_path(&self, key: NodeKey, event: EventType) -> Vec<(NodeKey, Listener)> {
        let mut out = Vec::new();
        let mut current = Some(key);
        while let Some(k) = current {
            for listener in self.listeners(k) {
                if listener.event == event {
                    out.push((k, listener.clone()));
                }
            }
            current = self.parent(k);
        }
        out
    }

    pub fn push_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Request submission of `form` through the best entry point the host exposes.
    pub fn submit_form(&mut self, form: NodeKey, allow_programmatic: bool) -> SubmitVia {
        let via = if allow_programmatic && self.features.programmatic_submit {
            SubmitVia::Programmatic
        } else if self.features.request_submit {
            SubmitVia::RequestSubmit
        } else {
            SubmitVia::Native
        };
        self.effects.push(Effect::Submit { form, via });
        via
    }

    // ---- journal ----

    pub fn journal(&self) -> MutationJournal {
        self.journal
    }

    pub fn take_journal(&mut self) -> MutationJournal {
        std::mem::take(&mut self.journal)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
