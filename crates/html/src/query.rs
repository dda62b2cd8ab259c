use crate::document::Document;
use crate::types::NodeKey;

impl Document {
    /// Descendants of `root` in document order, excluding `root` itself.
    pub fn descendants(&self, root: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = self.children(root).iter().rev().copied().collect();
        while let Some(key) = stack.pop() {
            out.push(key);
            stack.extend(self.children(key).iter().rev().copied());
        }
        out
    }

    /// Descendant elements of `root` matching `pred`, in document order.
    pub fn find_all(&self, root: NodeKey, pred: impl Fn(&Document, NodeKey) -> bool) -> Vec<NodeKey> {
        self.descendants(root)
            .into_iter()
            .filter(|&k| self.is_element(k) && pred(self, k))
            .collect()
    }

    pub fn find_first(
        &self,
        root: NodeKey,
        pred: impl Fn(&Document, NodeKey) -> bool,
    ) -> Option<NodeKey> {
        let mut stack: Vec<NodeKey> = self.children(root).iter().rev().copied().collect();
        while let Some(key) = stack.pop() {
            if self.is_element(key) && pred(self, key) {
                return Some(key);
            }
            stack.extend(self.children(key).iter().rev().copied());
        }
        None
    }

    /// First connected element with the given `id` attribute.
    pub fn element_by_id(&self, id: &str) -> Option<NodeKey> {
        self.find_first(self.root(), |doc, k| doc.attr(k, "id") == Some(id))
    }

    pub fn elements_by_tag(&self, root: NodeKey, tag: &str) -> Vec<NodeKey> {
        self.find_all(root, |doc, k| doc.is_element_named(k, tag))
    }

    /// Nearest inclusive ancestor element matching `pred`.
    pub fn closest(&self, key: NodeKey, pred: impl Fn(&Document, NodeKey) -> bool) -> Option<NodeKey> {
        let mut current = Some(key);
        while let Some(k) = current {
            if self.is_element(k) && pred(self, k) {
                return Some(k);
            }
            current = self.parent(k);
        }
        None
    }

    /// `true` if `ancestor` is `node` or one of its ancestors.
    pub fn contains_node(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(k) = current {
            if k == ancestor {
                return true;
            }
            current = self.parent(k);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::Document;

    #[test]
    fn find_all_walks_in_document_order() {
        let doc = Document::parse(
            r#"<div id="a"><p class="x">1</p><div id="b"><p class="x">2</p></div></div><p class="x">3</p>"#,
        );
        let found = doc.find_all(doc.root(), |d, k| d.has_class(k, "x"));
        let texts: Vec<String> = found.iter().map(|&k| doc.text_content(k)).collect();
        assert_eq!(texts, vec!["1", "2", "3"]);
    }

    #[test]
    fn element_by_id_and_closest() {
        let doc = Document::parse(r#"<form id="f"><span><input name="q"></span></form>"#);
        let input = doc
            .find_first(doc.root(), |d, k| d.attr(k, "name") == Some("q"))
            .expect("input");
        let form = doc.element_by_id("f").expect("form");
        assert_eq!(doc.closest(input, |d, k| d.is_element_named(k, "form")), Some(form));
        assert!(doc.contains_node(form, input));
        assert!(!doc.contains_node(input, form));
    }

    #[test]
    fn descendants_skips_root() {
        let doc = Document::parse("<ul><li>a</li><li>b</li></ul>");
        let ul = doc.elements_by_tag(doc.root(), "ul")[0];
        assert_eq!(doc.descendants(ul).len(), 4);
        assert_eq!(doc.elements_by_tag(ul, "li").len(), 2);
    }
}
