//! Inline `style` attribute editing.
//!
//! Declarations are kept in source order; setting an existing property replaces it in place.
use crate::document::Document;
use crate::types::{DomError, NodeKey};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Declaration {
    property: String,
    value: String,
    important: bool,
}

fn parse_declarations(style: &str) -> Vec<Declaration> {
    style
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            if property.is_empty() {
                return None;
            }
            let mut value = value.trim();
            let mut important = false;
            if let Some(pos) = value.to_ascii_lowercase().rfind("!important") {
                important = true;
                value = value[..pos].trim_end();
            }
            Some(Declaration {
                property,
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

fn write_declarations(decls: &[Declaration]) -> String {
    decls
        .iter()
        .map(|d| {
            if d.important {
                format!("{}: {} !important;", d.property, d.value)
            } else {
                format!("{}: {};", d.property, d.value)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl Document {
    /// Value and priority of an inline style property.
    pub fn style_property(&self, key: NodeKey, property: &str) -> Option<(String, bool)> {
        let style = self.attr(key, "style")?;
        parse_declarations(style)
            .into_iter()
            .find(|d| d.property.eq_ignore_ascii_case(property))
            .map(|d| (d.value, d.important))
    }

    /// Returns `true` if the `style` attribute changed.
    pub fn set_style_property(
        &mut self,
        key: NodeKey,
        property: &str,
        value: &str,
        important: bool,
    ) -> Result<bool, DomError> {
        let mut decls = parse_declarations(self.attr(key, "style").unwrap_or(""));
        let next = Declaration {
            property: property.to_ascii_lowercase(),
            value: value.to_string(),
            important,
        };
        match decls.iter_mut().find(|d| d.property == next.property) {
            Some(existing) if *existing == next => return Ok(false),
            Some(existing) => *existing = next,
            None => decls.push(next),
        }
        self.set_attr(key, "style", &write_declarations(&decls))
    }

    /// Returns `true` if a declaration was removed. An emptied `style` attribute is dropped.
    pub fn remove_style_property(&mut self, key: NodeKey, property: &str) -> Result<bool, DomError> {
        let Some(style) = self.attr(key, "style") else {
            return Ok(false);
        };
        let mut decls = parse_declarations(style);
        let before = decls.len();
        decls.retain(|d| !d.property.eq_ignore_ascii_case(property));
        if decls.len() == before {
            return Ok(false);
        }
        if decls.is_empty() {
            self.remove_attr(key, "style")?;
        } else {
            self.set_attr(key, "style", &write_declarations(&decls))?;
        }
        Ok(true)
    }
}
