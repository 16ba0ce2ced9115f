//! Output Escaping
//!
//! Appends escaped text into caller-owned buffers so the transcoders can
//! reuse one `String` across many messages:
//! - JSON string escaping: `"` `\` and control characters
//! - XML minimal escaping: `&` `<` `>` `"` `'`
//!
//! Both take a fast path (single `push_str`) when nothing needs escaping.

use memchr::memchr3;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Append `input` as the body of a JSON string literal (no surrounding quotes)
pub fn push_json_escaped(out: &mut String, input: &str) {
    let bytes = input.as_bytes();
    let mut start = 0;

    for (i, &b) in bytes.iter().enumerate() {
        let escape: &str = match b {
            b'"' => "\\\"",
            b'\\' => "\\\\",
            b'\n' => "\\n",
            b'\r' => "\\r",
            b'\t' => "\\t",
            0x08 => "\\b",
            0x0C => "\\f",
            0x00..=0x1F => {
                out.push_str(&input[start..i]);
                out.push_str("\\u00");
                out.push(HEX[(b >> 4) as usize] as char);
                out.push(HEX[(b & 0xF) as usize] as char);
                start = i + 1;
                continue;
            }
            _ => continue,
        };
        out.push_str(&input[start..i]);
        out.push_str(escape);
        start = i + 1;
    }

    out.push_str(&input[start..]);
}

/// Append `input` with XML special characters replaced by entity references
pub fn push_xml_escaped(out: &mut String, input: &str) {
    let bytes = input.as_bytes();

    // Fast path: no markup-significant bytes at all
    if memchr3(b'&', b'<', b'>', bytes).is_none() && memchr::memchr2(b'"', b'\'', bytes).is_none() {
        out.push_str(input);
        return;
    }

    let mut start = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let escape = match b {
            b'&' => "&amp;",
            b'<' => "&lt;",
            b'>' => "&gt;",
            b'"' => "&quot;",
            b'\'' => "&apos;",
            _ => continue,
        };
        out.push_str(&input[start..i]);
        out.push_str(escape);
        start = i + 1;
    }

    out.push_str(&input[start..]);
}
