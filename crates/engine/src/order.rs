use crate::contract::{result_code, result_containers};
use core_types::DictCode;
use html::{Document, DomError, NodeKey};
use std::collections::HashMap;

/// Sort key of a result container: its position in the preferred order (unmapped codes last),
/// then its code.
fn sort_key(index: &HashMap<&DictCode, usize>, code: Option<&DictCode>) -> (usize, String) {
    let position = code
        .and_then(|c| index.get(c).copied())
        .unwrap_or(usize::MAX);
    (position, code.map(|c| c.as_str().to_string()).unwrap_or_default())
}

/// Reorder result containers under their shared parent to follow `order`.
///
/// Containers are moved by re-appending them, which keeps their keys and everything attached to
/// them. A document already in order is left untouched. Returns the number of containers moved.
pub fn apply(doc: &mut Document, order: &[DictCode]) -> Result<usize, DomError> {
    if order.is_empty() {
        return Ok(0);
    }
    let mut index: HashMap<&DictCode, usize> = HashMap::new();
    for (i, code) in order.iter().enumerate() {
        index.entry(code).or_insert(i);
    }

    let containers = result_containers(doc);
    let Some(&first) = containers.first() else {
        return Ok(0);
    };
    let Some(parent) = doc.parent(first) else {
        return Ok(0);
    };
    let siblings: Vec<NodeKey> = containers
        .into_iter()
        .filter(|&c| doc.parent(c) == Some(parent))
        .collect();

    let mut sorted: Vec<(NodeKey, (usize, String))> = siblings
        .iter()
        .map(|&c| {
            let code = doc.attr(c, "id").and_then(result_code);
            (c, sort_key(&index, code.as_ref()))
        })
        .collect();
    sorted.sort_by(|a, b| a.1.cmp(&b.1));
    let target: Vec<NodeKey> = sorted.into_iter().map(|(c, _)| c).collect();

    if target == siblings {
        return Ok(0);
    }

    // Keep the longest prefix that is already in place; re-append the rest in order.
    let keep = target
        .iter()
        .zip(&siblings)
        .take_while(|(a, b)| a == b)
        .count();
    let mut moved = 0;
    for &container in &target[keep..] {
        doc.append_child(parent, container)?;
        moved += 1;
    }
    log::debug!(target: "order", "reordered {moved} result container(s)");
    Ok(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_test_support::{ArticleFixture, PageFixture};

    fn codes(list: &[&str]) -> Vec<DictCode> {
        list.iter().filter_map(|c| DictCode::parse(c)).collect()
    }

    fn page(order: &[&str]) -> Document {
        let mut fixture = PageFixture::new();
        for code in order {
            fixture = fixture.result(code, vec![ArticleFixture::new(&[code])]);
        }
        Document::parse(&fixture.to_html())
    }

    fn container_codes(doc: &Document) -> Vec<String> {
        result_containers(doc)
            .into_iter()
            .filter_map(|c| doc.attr(c, "id").and_then(result_code))
            .map(|c| c.as_str().to_string())
            .collect()
    }

    #[test]
    fn follows_preferred_order() {
        let mut doc = page(&["c", "a", "b"]);
        let moved = apply(&mut doc, &codes(&["a", "b", "c"])).unwrap();
        assert_eq!(container_codes(&doc), vec!["a", "b", "c"]);
        assert!(moved > 0);
    }

    #[test]
    fn unmapped_codes_sort_last_lexicographically() {
        let mut doc = page(&["y", "b", "x", "a", "c"]);
        apply(&mut doc, &codes(&["a", "b", "c"])).unwrap();
        assert_eq!(container_codes(&doc), vec!["a", "b", "c", "x", "y"]);
    }

    #[test]
    fn duplicate_codes_keep_first_position() {
        let mut doc = page(&["a", "b"]);
        apply(&mut doc, &codes(&["b", "a", "b"])).unwrap();
        assert_eq!(container_codes(&doc), vec!["b", "a"]);
    }

    #[test]
    fn ordered_document_is_untouched() {
        let mut doc = page(&["a", "b", "c"]);
        doc.take_journal();
        assert_eq!(apply(&mut doc, &codes(&["a", "b", "c"])).unwrap(), 0);
        assert!(doc.journal().is_empty());
    }

    #[test]
    fn moves_preserve_container_identity() {
        let mut doc = page(&["b", "a"]);
        let before = result_containers(&doc);
        apply(&mut doc, &codes(&["a", "b"])).unwrap();
        let after = result_containers(&doc);
        assert_eq!(after, vec![before[1], before[0]]);
    }
}
