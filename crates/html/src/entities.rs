/// Decode a small, fixed subset of HTML character references.
///
/// Contract:
/// - Named references decoded: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`.
/// - Numeric references decode only when semicolon-terminated and a valid scalar value:
///   `&#123;` and `&#x1F4A9;`.
/// - Anything else (unknown names, missing `;`, overlong digit runs) is copied through.
///
/// `escape_text`/`escape_attr` are the inverse used by serialization; decoding their output
/// yields the original string.
pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    const NAMED: &[(&str, char)] = &[
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&apos;", '\''),
        ("&nbsp;", '\u{00A0}'),
    ];
    const MAX_HEX_DIGITS: usize = 6;
    const MAX_DEC_DIGITS: usize = 7;

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        if let Some((name, ch)) = NAMED.iter().find(|(name, _)| rest.starts_with(name)) {
            out.push(*ch);
            rest = &rest[name.len()..];
            continue;
        }

        if let Some((ch, consumed)) = decode_numeric(rest, MAX_HEX_DIGITS, MAX_DEC_DIGITS) {
            out.push(ch);
            rest = &rest[consumed..];
            continue;
        }

        out.push('&');
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

fn decode_numeric(s: &str, max_hex: usize, max_dec: usize) -> Option<(char, usize)> {
    let bytes = s.as_bytes();
    if bytes.get(1) != Some(&b'#') {
        return None;
    }
    let (is_hex, digits_start) = match bytes.get(2) {
        Some(b'x') | Some(b'X') => (true, 3),
        _ => (false, 2),
    };
    let max_digits = if is_hex { max_hex } else { max_dec };
    let digits = bytes[digits_start..]
        .iter()
        .take_while(|b| {
            if is_hex {
                b.is_ascii_hexdigit()
            } else {
                b.is_ascii_digit()
            }
        })
        .count();
    if digits == 0 || digits > max_digits {
        return None;
    }
    let end = digits_start + digits;
    if bytes.get(end) != Some(&b';') {
        return None;
    }
    let raw = &s[digits_start..end];
    let value = if is_hex {
        u32::from_str_radix(raw, 16).ok()?
    } else {
        raw.parse::<u32>().ok()?
    };
    char::from_u32(value).map(|ch| (ch, end + 1))
}

pub(crate) fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
}

pub(crate) fn escape_attr(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}
