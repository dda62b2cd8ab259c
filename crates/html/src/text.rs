use crate::document::{Document, NodeKind};
use crate::types::NodeKey;

fn is_block_element(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "dd"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "tr"
            | "ul"
    )
}

fn is_hidden_element(name: &str) -> bool {
    matches!(name, "script" | "style" | "template" | "head" | "title")
}

impl Document {
    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, key: NodeKey) -> String {
        let mut out = String::new();
        if let Some(text) = self.text(key) {
            out.push_str(text);
            return out;
        }
        for k in self.descendants(key) {
            if let Some(text) = self.text(k) {
                out.push_str(text);
            }
        }
        out
    }

    /// Rendered-text approximation in the manner of `innerText`. Whitespace runs collapse to one
    /// space and script/style content is skipped. `<p>` is set off by a blank line, other block
    /// elements by a single line break, and adjacent block boundaries collapse to the larger
    /// break. `<br>` always adds a line break. Blank lines between paragraphs are kept.
    pub fn inner_text(&self, key: NodeKey) -> String {
        let mut text = InnerText::default();
        self.collect_inner_text(key, &mut text);
        text.finish()
    }

    fn collect_inner_text(&self, key: NodeKey, text: &mut InnerText) {
        let Ok(record) = self.record(key) else {
            return;
        };
        match &record.kind {
            NodeKind::Text { text: data } => text.push_text(data),
            NodeKind::Comment { .. } => {}
            NodeKind::Element { name, .. } if is_hidden_element(name) => {}
            NodeKind::Element { name, .. } if name == "br" => text.push_line_break(),
            NodeKind::Element { name, .. } => {
                let breaks = required_line_breaks(name);
                text.request_breaks(breaks);
                for &child in &record.children {
                    self.collect_inner_text(child, text);
                }
                text.request_breaks(breaks);
            }
            NodeKind::Document { .. } => {
                for &child in &record.children {
                    self.collect_inner_text(child, text);
                }
            }
        }
    }
}

fn required_line_breaks(name: &str) -> usize {
    match name {
        "p" => 2,
        _ if is_block_element(name) => 1,
        _ => 0,
    }
}

/// Output buffer for [`Document::inner_text`]. Requested breaks are held back until more text
/// arrives, so breaks at the very start or end are dropped.
#[derive(Default)]
struct InnerText {
    out: String,
    pending_breaks: usize,
}

impl InnerText {
    fn request_breaks(&mut self, count: usize) {
        if !self.out.is_empty() {
            self.pending_breaks = self.pending_breaks.max(count);
        }
    }

    fn flush_breaks(&mut self) {
        for _ in 0..self.pending_breaks {
            self.out.push('\n');
        }
        self.pending_breaks = 0;
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n')
    }

    fn push_space(&mut self) {
        if !self.at_line_start() && !self.out.ends_with(' ') {
            self.out.push(' ');
        }
    }

    fn push_text(&mut self, data: &str) {
        let leading = data.starts_with(|c: char| c.is_ascii_whitespace());
        let trailing = data.ends_with(|c: char| c.is_ascii_whitespace());
        let mut words = data.split_ascii_whitespace().peekable();
        if words.peek().is_none() {
            if leading && self.pending_breaks == 0 {
                self.push_space();
            }
            return;
        }
        self.flush_breaks();
        if leading {
            self.push_space();
        }
        for (i, word) in words.enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            self.out.push_str(word);
        }
        if trailing {
            self.out.push(' ');
        }
    }

    fn push_line_break(&mut self) {
        self.flush_breaks();
        self.out.push('\n');
    }

    fn finish(self) -> String {
        self.out
            .split('\n')
            .map(|line| line.trim_matches(' '))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
