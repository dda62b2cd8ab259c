#![no_main]

use html::Document;
use libfuzzer_sys::fuzz_target;

// Serializing a parsed document and parsing that again must be stable.
fuzz_target!(|data: &[u8]| {
    let input = String::from_utf8_lossy(data);
    let first = Document::parse(&input);
    let once = first.inner_html(first.root()).unwrap_or_default();
    let second = Document::parse(&once);
    let twice = second.inner_html(second.root()).unwrap_or_default();
    assert_eq!(once, twice);
});
