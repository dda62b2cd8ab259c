//! Builders for search-result pages shaped like the host site.
//!
//! ```text
//! <div id="theform"><form action="/search">
//!   <input name="q" up-autosubmit up-watch-delay="500">
//!   <div id="dict-select"><label><input type="checkbox" name="s" value="mw"> ...</label></div>
//! </form></div>
//! <div id="results">
//!   <div id="result-:mw"><article>...<footer>...</footer></article></div>
//! </div>
//! ```
use std::fmt::Write;

#[derive(Debug, Clone, Default)]
pub struct ArticleFixture {
    paragraphs: Vec<String>,
    footer: Option<String>,
}

impl ArticleFixture {
    /// One `<p>` per entry. Rendered text separates paragraphs with a blank line.
    pub fn new(paragraphs: &[&str]) -> Self {
        Self {
            paragraphs: paragraphs.iter().map(|l| l.to_string()).collect(),
            footer: None,
        }
    }

    /// A single paragraph of `count` lines joined by `<br>`, rendering as exactly `count` lines.
    pub fn with_line_count(count: usize) -> Self {
        let lines: Vec<String> = (1..=count).map(|i| format!("line {i}")).collect();
        Self {
            paragraphs: vec![lines.join("<br>")],
            footer: None,
        }
    }

    pub fn footer(mut self, text: &str) -> Self {
        self.footer = Some(text.to_string());
        self
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<article>");
        for paragraph in &self.paragraphs {
            let _ = write!(out, "<p>{paragraph}</p>");
        }
        if let Some(footer) = &self.footer {
            let _ = write!(out, "<footer>{footer}</footer>");
        }
        out.push_str("</article>");
        out
    }
}

#[derive(Debug, Clone)]
struct Checkbox {
    code: String,
    checked: bool,
    disabled: bool,
}

#[derive(Debug, Clone)]
pub struct PageFixture {
    query: String,
    autosubmit: bool,
    with_form: bool,
    checkboxes: Vec<Checkbox>,
    results: Vec<(String, Vec<ArticleFixture>)>,
}

impl Default for PageFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl PageFixture {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            autosubmit: true,
            with_form: true,
            checkboxes: Vec::new(),
            results: Vec::new(),
        }
    }

    pub fn query(mut self, query: &str) -> Self {
        self.query = query.to_string();
        self
    }

    /// Render the query field without the host's auto-submit attributes.
    pub fn without_autosubmit(mut self) -> Self {
        self.autosubmit = false;
        self
    }

    /// Render the dictionary panel outside any form.
    pub fn without_form(mut self) -> Self {
        self.with_form = false;
        self
    }

    pub fn checkbox(mut self, code: &str, checked: bool) -> Self {
        self.checkboxes.push(Checkbox {
            code: code.to_string(),
            checked,
            disabled: false,
        });
        self
    }

    pub fn disabled_checkbox(mut self, code: &str) -> Self {
        self.checkboxes.push(Checkbox {
            code: code.to_string(),
            checked: false,
            disabled: true,
        });
        self
    }

    pub fn result(mut self, code: &str, articles: Vec<ArticleFixture>) -> Self {
        self.results.push((code.to_string(), articles));
        self
    }

    pub fn results_html(&self) -> String {
        let mut out = String::new();
        for (code, articles) in &self.results {
            out.push_str(&result_container_html(code, articles));
        }
        out
    }

    fn panel_html(&self) -> String {
        let mut out = String::from(r#"<div id="dict-select">"#);
        for cb in &self.checkboxes {
            let _ = write!(
                out,
                r#"<label><input type="checkbox" name="s" value="{}"{}{}> {}</label>"#,
                cb.code,
                if cb.checked { " checked" } else { "" },
                if cb.disabled { " disabled" } else { "" },
                cb.code
            );
        }
        out.push_str("</div>");
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<!doctype html><html><head><title>Sanskrit Dictionary</title></head><body>");
        let attrs = if self.autosubmit {
            r#" up-autosubmit up-watch-delay="500""#
        } else {
            ""
        };
        let input = format!(r#"<input type="text" name="q" value="{}"{attrs}>"#, self.query);
        if self.with_form {
            let _ = write!(
                out,
                r#"<div id="theform"><form action="/search" method="get">{input}{}</form></div>"#,
                self.panel_html()
            );
        } else {
            let _ = write!(
                out,
                r#"<div id="theform"><div class="search">{input}</div></div>{}"#,
                self.panel_html()
            );
        }
        let _ = write!(out, r#"<div id="results">{}</div>"#, self.results_html());
        out.push_str("</body></html>");
        out
    }
}

pub fn result_container_html(code: &str, articles: &[ArticleFixture]) -> String {
    let mut out = format!(r#"<div id="result-:{code}">"#);
    for article in articles {
        out.push_str(&article.to_html());
    }
    out.push_str("</div>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_contains_contract_elements() {
        let html = PageFixture::new()
            .query("yoga")
            .checkbox("mw", false)
            .result("mw", vec![ArticleFixture::new(&["a"]).footer("src")])
            .to_html();
        assert!(html.contains(r#"<div id="theform"><form"#));
        assert!(html.contains(r#"name="q" value="yoga" up-autosubmit"#));
        assert!(html.contains(r#"<div id="result-:mw"><article><p>a</p><footer>src</footer></article></div>"#));
    }
}
