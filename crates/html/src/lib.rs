//! Markup tokenizer, tree builder and the live [`Document`] the reconciliation engine mutates.

mod builder;
mod document;
mod entities;
mod query;
mod serialize;
mod style;
mod text;
mod tokenizer;
mod types;

use memchr::memchr;

/// Cheap sniff used by the CLI before parsing a file as a page.
pub fn looks_like_markup(input: &str) -> bool {
    memchr(b'<', input.as_bytes()).is_some()
}

pub use crate::builder::{build_document, build_fragment};
pub use crate::document::Document;
pub use crate::serialize::to_html;
pub use crate::tokenizer::tokenize;
pub use crate::types::{
    DomError, Effect, EventType, HostFeatures, Listener, MutationJournal, Node, NodeKey,
    SelectionRange, SubmitVia, Token,
};
