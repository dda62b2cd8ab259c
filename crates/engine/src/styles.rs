use crate::contract::{RESULT_CSS, STYLE_MARKER_ATTR, STYLE_MARKER_VALUE};
use html::{Document, DomError};

/// Install the result stylesheet unless a marked `<style>` is already present. It goes into
/// `<head>`, else the `<html>` element, else the document itself. Returns `true` if inserted.
pub fn ensure(doc: &mut Document) -> Result<bool, DomError> {
    let root = doc.root();
    let present = doc
        .find_first(root, |d, k| {
            d.is_element_named(k, "style") && d.attr(k, STYLE_MARKER_ATTR) == Some(STYLE_MARKER_VALUE)
        })
        .is_some();
    if present {
        return Ok(false);
    }

    let host = doc
        .find_first(root, |d, k| d.is_element_named(k, "head"))
        .or_else(|| doc.find_first(root, |d, k| d.is_element_named(k, "html")))
        .unwrap_or(root);
    let style = doc.create_element("style")?;
    doc.set_attr(style, STYLE_MARKER_ATTR, STYLE_MARKER_VALUE)?;
    doc.set_text_content(style, RESULT_CSS)?;
    doc.append_child(host, style)?;
    log::trace!(target: "styles", "installed result styles");
    Ok(true)
}
