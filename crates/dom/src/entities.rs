use memchr::memchr;

const NAMED: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&apos;", '\''),
    ("&nbsp;", '\u{00A0}'),
];

const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111

/// Decode the small entity subset markup in this workspace relies on.
///
/// Named: `&amp; &lt; &gt; &quot; &apos; &nbsp;`. Numeric entities decode only when
/// semicolon-terminated and naming a valid scalar value. Anything else is kept verbatim.
pub(crate) fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    let Some(first) = memchr(b'&', bytes) else {
        return s.to_string();
    };

    let mut out = String::with_capacity(s.len());
    out.push_str(&s[..first]);
    let mut i = first;

    while i < bytes.len() {
        let Some(rel) = memchr(b'&', &bytes[i..]) else {
            out.push_str(&s[i..]);
            break;
        };
        out.push_str(&s[i..i + rel]);
        i += rel;

        let rest = &s[i..];
        if let Some((entity, ch)) = NAMED.iter().find(|(entity, _)| rest.starts_with(entity)) {
            out.push(*ch);
            i += entity.len();
            continue;
        }
        if let Some((ch, consumed)) = decode_numeric(rest) {
            out.push(ch);
            i += consumed;
            continue;
        }
        out.push('&');
        i += 1;
    }

    out
}

fn decode_numeric(rest: &str) -> Option<(char, usize)> {
    let body = rest.strip_prefix("&#")?;
    let (digits, radix, max, lead) = match body.strip_prefix(['x', 'X']) {
        Some(hex) => (hex, 16, MAX_HEX_DIGITS, 3),
        None => (body, 10, MAX_DEC_DIGITS, 2),
    };
    let end = digits.find(';')?;
    let run = &digits[..end];
    if run.is_empty() || run.len() > max || !run.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let value = u32::from_str_radix(run, radix).ok()?;
    let ch = char::from_u32(value)?;
    Some((ch, lead + end + 1))
}

pub(crate) fn escape_text(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{00A0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

pub(crate) fn escape_attr(s: &str, out: &mut String) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
}
