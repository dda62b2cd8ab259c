use html::{Document, DomError, NodeKey};
use std::collections::HashMap;

/// Original markup of each result container, captured before the first merge.
#[derive(Debug, Default)]
pub struct ContainerSnapshots {
    markup: HashMap<NodeKey, String>,
}

impl ContainerSnapshots {
    pub fn contains(&self, container: NodeKey) -> bool {
        self.markup.contains_key(&container)
    }

    pub fn capture(&mut self, doc: &Document, container: NodeKey) -> Result<(), DomError> {
        let markup = doc.inner_html(container)?;
        log::trace!(target: "present", "captured {} bytes for container {}", markup.len(), container.0);
        self.markup.insert(container, markup);
        Ok(())
    }

    /// Rebuild the container's children from its snapshot. Returns `false` without a snapshot.
    pub fn restore(&self, doc: &mut Document, container: NodeKey) -> Result<bool, DomError> {
        let Some(markup) = self.markup.get(&container) else {
            return Ok(false);
        };
        doc.set_inner_html(container, markup)?;
        Ok(true)
    }

    /// Drop snapshots of containers no longer attached to the document root.
    pub fn sweep(&mut self, doc: &Document) {
        self.markup.retain(|&key, _| doc.is_connected(key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweep_forgets_detached_containers() {
        let mut doc = Document::parse(r#"<div id="a"><p>x</p></div><div id="b"><p>y</p></div>"#);
        let a = doc.element_by_id("a").unwrap();
        let b = doc.element_by_id("b").unwrap();
        let mut snapshots = ContainerSnapshots::default();
        snapshots.capture(&doc, a).unwrap();
        snapshots.capture(&doc, b).unwrap();
        doc.detach(a).unwrap();
        snapshots.sweep(&doc);
        assert!(!snapshots.contains(a));
        assert!(snapshots.contains(b));
    }
}
