pub mod page;

pub use page::{ArticleFixture, PageFixture, result_container_html};

use serde_json::{Map, Value};

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            ch if ch < ' ' => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\u{{{:02X}}}", ch as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Split markup into one line per tag boundary so `diff_lines` can point at the first
/// structural difference.
pub fn markup_lines(markup: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for ch in markup.chars() {
        if ch == '<' && !current.is_empty() {
            lines.push(escape_text(&current));
            current.clear();
        }
        current.push(ch);
        if ch == '>' {
            lines.push(escape_text(&current));
            current.clear();
        }
    }
    if !current.is_empty() {
        lines.push(escape_text(&current));
    }
    lines
}

pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    let max = expected.len().max(actual.len());
    let mut out = String::new();
    use std::fmt::Write;
    let missing = "<missing>";
    let mismatch = (0..max).find(|&i| {
        expected.get(i).map(String::as_str).unwrap_or(missing)
            != actual.get(i).map(String::as_str).unwrap_or(missing)
    });
    if let Some(i) = mismatch {
        let start = i.saturating_sub(2);
        let end = (i + 3).min(max);
        let _ = writeln!(
            &mut out,
            "first mismatch at line {} (showing {}..={}):",
            i + 1,
            start + 1,
            end
        );
        for line_idx in start..end {
            let left = expected
                .get(line_idx)
                .map(String::as_str)
                .unwrap_or(missing);
            let right = actual.get(line_idx).map(String::as_str).unwrap_or(missing);
            let marker = if line_idx == i { ">" } else { " " };
            let _ = writeln!(&mut out, "{marker} {:>4}  expected: {left}", line_idx + 1);
            let _ = writeln!(&mut out, "{marker} {:>4}    actual: {right}", line_idx + 1);
        }
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}

/// Panics with a line diff when two markup strings differ.
#[track_caller]
pub fn assert_markup_eq(expected: &str, actual: &str) {
    if expected != actual {
        let diff = diff_lines(&markup_lines(expected), &markup_lines(actual));
        panic!("markup mismatch\n{diff}");
    }
}

/// Raw stored preferences, as a settings store would hand them over.
pub fn raw_prefs(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("raw_prefs expects a JSON object, got {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_lines_splits_on_tags() {
        assert_eq!(
            markup_lines("<p>a\nb</p>"),
            vec!["<p>", "a\\nb", "</p>"]
        );
    }

    #[test]
    fn diff_lines_points_at_first_mismatch() {
        let expected = markup_lines("<div><p>a</p></div>");
        let actual = markup_lines("<div><p>b</p></div>");
        let diff = diff_lines(&expected, &actual);
        assert!(diff.starts_with("first mismatch at line 3"), "{diff}");
    }
}
