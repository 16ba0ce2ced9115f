//! XML Entity Decoding
//!
//! Handles decoding of XML entities:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//! - A handful of common HTML named entities
//!
//! Unknown or malformed references are kept literally, never rejected.
//! Uses Cow for zero-copy when no entities are present.

use memchr::{memchr, memrchr};
use std::borrow::Cow;

/// Longest reference body we look for a ';' in before treating '&' as literal
const MAX_ENTITY_LEN: usize = 32;

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities present (zero-copy),
/// returns Owned if entities were decoded.
#[inline]
pub fn decode_text(input: &[u8]) -> Cow<'_, [u8]> {
    // Fast path: check if there are any entities using SIMD
    if memchr(b'&', input).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

/// Length of the prefix of `input` that decodes the same whatever follows
///
/// Only the last '&' can still change meaning: if its ';' is not in sight
/// and the lookup window runs past the end, it is left out.
pub fn settled_prefix_len(input: &[u8]) -> usize {
    match memrchr(b'&', input) {
        Some(amp) if amp + 1 + MAX_ENTITY_LEN > input.len() && memchr(b';', &input[amp + 1..]).is_none() => amp,
        _ => input.len(),
    }
}

/// Decode all entity references in the input
pub fn decode_entities(input: &[u8]) -> Vec<u8> {
    let mut result = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        let Some(amp_pos) = memchr(b'&', &input[pos..]) else {
            result.extend_from_slice(&input[pos..]);
            break;
        };

        result.extend_from_slice(&input[pos..pos + amp_pos]);
        pos += amp_pos;

        let window_end = input.len().min(pos + 1 + MAX_ENTITY_LEN);
        let decoded = memchr(b';', &input[pos + 1..window_end]).and_then(|semi| {
            decode_entity(&input[pos + 1..pos + 1 + semi]).map(|c| (c, semi))
        });

        match decoded {
            Some((c, semi)) => {
                let mut utf8 = [0u8; 4];
                result.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                pos += semi + 2;
            }
            None => {
                // Unknown entity or bare '&', keep as-is
                result.push(b'&');
                pos += 1;
            }
        }
    }

    result
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &[u8]) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix(b"#") {
        return decode_numeric_entity(numeric);
    }

    match entity {
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"amp" => Some('&'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        // HTML5 named entities (common ones)
        b"nbsp" => Some('\u{00A0}'),
        b"copy" => Some('\u{00A9}'),
        b"reg" => Some('\u{00AE}'),
        b"deg" => Some('\u{00B0}'),
        b"trade" => Some('\u{2122}'),
        b"mdash" => Some('\u{2014}'),
        b"ndash" => Some('\u{2013}'),
        b"hellip" => Some('\u{2026}'),
        _ => None,
    }
}

/// Decode a numeric character reference
fn decode_numeric_entity(entity: &[u8]) -> Option<char> {
    let codepoint = match entity.first()? {
        b'x' | b'X' => {
            let hex = std::str::from_utf8(&entity[1..]).ok()?;
            u32::from_str_radix(hex, 16).ok()?
        }
        _ => std::str::from_utf8(entity).ok()?.parse::<u32>().ok()?,
    };

    if codepoint == 0 {
        return None;
    }
    char::from_u32(codepoint)
}
