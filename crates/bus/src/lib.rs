use core_types::Generation;
use engine::{RunReport, Scope};
use html::{Document, Effect, NodeKey};
use serde::Deserialize;
use settings::StoreChange;
use std::sync::mpsc::{Receiver, Sender, channel};

/// Element an event is aimed at.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Document,
    /// Live key; only meaningful inside one process.
    #[serde(skip)]
    Node(NodeKey),
    /// Element id, resolved when the event is handled.
    Id(String),
}

impl Target {
    pub fn resolve(&self, doc: &Document) -> Option<NodeKey> {
        match self {
            Target::Document => Some(doc.root()),
            Target::Node(key) => doc.is_connected(*key).then_some(*key),
            Target::Id(id) => doc.element_by_id(id),
        }
    }

    pub fn scope(&self, doc: &Document) -> Scope {
        match self.resolve(doc) {
            Some(key) if key != doc.root() => Scope::Node(key),
            _ => Scope::Document,
        }
    }
}

/// Host page -> runtime.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// Page finished loading.
    Load,
    /// The host's fragment-inserted application event.
    FragmentInserted { target: Target },
    /// Generic "the document changed" observation.
    Mutation,
    /// Settings store change notification.
    Store(StoreChange),
    Click { target: Target },
    KeyDown { target: Target, key: String },
    /// The user typed into a field.
    Input { target: Target, value: String },
    /// The host replaces the target's children with new markup.
    Render { target: Target, markup: String },
    Shutdown,
}

/// Runtime -> embedder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Reconciled {
        scope: Scope,
        generation: Generation,
        report: RunReport,
    },
    SettingsChanged {
        generation: Generation,
    },
    Effect(Effect),
}

pub struct Bus {
    pub host_tx: Sender<HostEvent>,
    pub host_rx: Receiver<HostEvent>,
    pub page_tx: Sender<PageEvent>, // shareable for runtimes
    pub page_rx: Receiver<PageEvent>,
}

impl Bus {
    pub fn new() -> Self {
        let (host_tx, host_rx) = channel();
        let (page_tx, page_rx) = channel();
        Self {
            host_tx,
            host_rx,
            page_tx,
            page_rx,
        }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
