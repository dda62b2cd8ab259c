use crate::document::{Document, NodeKind};
use crate::entities::{escape_attr, escape_text};
use crate::tokenizer::{is_raw_text_element, is_void_element};
use crate::types::{DomError, Node, NodeKey};

impl Document {
    /// Markup of the children of `key`. The document's doctype counts as its first child.
    pub fn inner_html(&self, key: NodeKey) -> Result<String, DomError> {
        let mut out = String::new();
        let record = self.record(key)?;
        if let NodeKind::Document { doctype } = &record.kind {
            write_doctype(doctype.as_deref(), &mut out);
        }
        let raw = self.tag_name(key).is_some_and(is_raw_text_element);
        for &child in &record.children {
            self.write_node(child, raw, &mut out)?;
        }
        Ok(out)
    }

    /// Markup of `key` itself, including its children.
    pub fn outer_html(&self, key: NodeKey) -> Result<String, DomError> {
        let mut out = String::new();
        self.write_node(key, false, &mut out)?;
        Ok(out)
    }

    fn write_node(&self, key: NodeKey, raw_parent: bool, out: &mut String) -> Result<(), DomError> {
        let record = self.record(key)?;
        match &record.kind {
            NodeKind::Document { doctype } => {
                write_doctype(doctype.as_deref(), out);
                for &child in &record.children {
                    self.write_node(child, false, out)?;
                }
            }
            NodeKind::Element { name, attributes } => {
                write_start_tag(name, attributes, out);
                if is_void_element(name) {
                    return Ok(());
                }
                let raw = is_raw_text_element(name);
                for &child in &record.children {
                    self.write_node(child, raw, out)?;
                }
                write_end_tag(name, out);
            }
            NodeKind::Text { text } => write_text(text, raw_parent, out),
            NodeKind::Comment { text } => write_comment(text, out),
        }
        Ok(())
    }
}

/// Serialize an owned tree the same way [`Document::outer_html`] does.
pub fn to_html(node: &Node) -> String {
    fn walk(node: &Node, raw_parent: bool, out: &mut String) {
        match node {
            Node::Document { doctype, children } => {
                write_doctype(doctype.as_deref(), out);
                for child in children {
                    walk(child, false, out);
                }
            }
            Node::Element {
                name,
                attributes,
                children,
            } => {
                write_start_tag(name, attributes, out);
                if is_void_element(name) {
                    return;
                }
                let raw = is_raw_text_element(name);
                for child in children {
                    walk(child, raw, out);
                }
                write_end_tag(name, out);
            }
            Node::Text { text } => write_text(text, raw_parent, out),
            Node::Comment { text } => write_comment(text, out),
        }
    }
    let mut out = String::new();
    walk(node, false, &mut out);
    out
}

fn write_doctype(doctype: Option<&str>, out: &mut String) {
    if let Some(doctype) = doctype {
        out.push_str("<!");
        out.push_str(doctype);
        out.push('>');
    }
}

fn write_start_tag(name: &str, attributes: &[(String, Option<String>)], out: &mut String) {
    out.push('<');
    out.push_str(name);
    for (k, v) in attributes {
        out.push(' ');
        out.push_str(k);
        if let Some(v) = v {
            out.push_str("=\"");
            escape_attr(v, out);
            out.push('"');
        }
    }
    out.push('>');
}

fn write_end_tag(name: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn write_text(text: &str, raw: bool, out: &mut String) {
    if raw {
        out.push_str(text);
    } else {
        escape_text(text, out);
    }
}

fn write_comment(text: &str, out: &mut String) {
    out.push_str("<!--");
    out.push_str(text);
    out.push_str("-->");
}
