use std::borrow::Cow;

/// Stable identity of a node inside a [`Document`](crate::Document).
///
/// Keys are allocated monotonically and never reused, so a key that is no longer live can
/// never start referring to a different node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeKey(pub u32);

impl NodeKey {
    pub const INVALID: NodeKey = NodeKey(0);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

/// Owned, detached tree. Produced by the fragment builder and by
/// [`Document::materialize`](crate::Document::materialize).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Document {
        doctype: Option<String>,
        children: Vec<Node>,
    },
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<Node>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

impl Node {
    pub fn element(name: &str, attributes: Vec<(String, Option<String>)>, children: Vec<Node>) -> Node {
        Node::Element {
            name: name.to_string(),
            attributes,
            children,
        }
    }

    pub fn text(text: &str) -> Node {
        Node::Text {
            text: text.to_string(),
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => children,
            Node::Text { .. } | Node::Comment { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    pub fn into_children(self) -> Vec<Node> {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => children,
            Node::Text { .. } | Node::Comment { .. } => Vec::new(),
        }
    }

    pub fn is_element_named(&self, target: &str) -> bool {
        matches!(self, Node::Element { name, .. } if name.eq_ignore_ascii_case(target))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventType {
    Click,
    KeyDown,
    Input,
    Change,
}

/// An event listener registration. The handler is identified by a tag; whoever registered
/// it interprets the tag when the event is dispatched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Listener {
    pub event: EventType,
    pub handler: Cow<'static, str>,
}

impl Listener {
    pub fn new(event: EventType, handler: impl Into<Cow<'static, str>>) -> Self {
        Self {
            event,
            handler: handler.into(),
        }
    }
}

/// How a form submission reached the host page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubmitVia {
    /// The host page's own programmatic submit API.
    Programmatic,
    /// `requestSubmit`-style submission (runs the host's submit handlers).
    RequestSubmit,
    /// Plain native submission.
    Native,
    /// The host's own auto-submit behavior.
    Host,
}

/// Which submission entry points the host page exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostFeatures {
    pub programmatic_submit: bool,
    pub request_submit: bool,
}

impl Default for HostFeatures {
    fn default() -> Self {
        Self {
            programmatic_submit: true,
            request_submit: true,
        }
    }
}

/// Side effect requested of the host page. Collected in the document outbox.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Submit { form: NodeKey, via: SubmitVia },
    Dispatch { target: NodeKey, event: EventType },
}

/// Counts of mutation records since the journal was last taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MutationJournal {
    pub child_list: u64,
    pub attributes: u64,
    pub character_data: u64,
}

impl MutationJournal {
    pub fn total(&self) -> u64 {
        self.child_list + self.attributes + self.character_data
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Byte range of a text selection, normalized so `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: usize,
    pub end: usize,
}

impl SelectionRange {
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    UnknownKey(NodeKey),
    WrongNodeKind(NodeKey),
    CycleDetected { parent: NodeKey, child: NodeKey },
    NotAChild { parent: NodeKey, child: NodeKey },
    DocumentRoot(NodeKey),
    /// Every node key has been handed out; keys are never reused.
    KeysExhausted,
}

impl std::fmt::Display for DomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomError::UnknownKey(k) => write!(f, "unknown node key {}", k.0),
            DomError::WrongNodeKind(k) => write!(f, "node {} has the wrong kind", k.0),
            DomError::CycleDetected { parent, child } => {
                write!(f, "inserting {} under {} would create a cycle", child.0, parent.0)
            }
            DomError::NotAChild { parent, child } => {
                write!(f, "node {} is not a child of {}", child.0, parent.0)
            }
            DomError::DocumentRoot(k) => write!(f, "node {} is the document root", k.0),
            DomError::KeysExhausted => f.write_str("node keys exhausted"),
        }
    }
}

impl std::error::Error for DomError {}
