//! XML Attribute Parsing
//!
//! Parses XML attributes from tag content. Parsing is always lenient:
//! problems are repaired and the first one is reported alongside the
//! attributes that were recovered.

use super::entities::decode_text;
use super::scanner::{is_name_char, is_name_start_char};
use std::borrow::Cow;

/// A parsed XML attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name, verbatim (no namespace processing)
    pub name: &'a [u8],
    /// Attribute value (entities decoded)
    pub value: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    /// Create a new attribute
    pub fn new(name: &'a [u8], value: Cow<'a, [u8]>) -> Self {
        Attribute { name, value }
    }

    /// Get the name as a string, replacing invalid UTF-8
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.name)
    }

    /// Get the value as a string, replacing invalid UTF-8
    pub fn value_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.value.as_ref())
    }
}

/// Attributes in source order plus the first repair made, if any
pub type ParsedAttributes<'a> = (Vec<Attribute<'a>>, Option<&'static str>);

/// Parse attributes from raw tag content (after the element name)
///
/// Input should be the content between element name and '>' or '/>'
pub fn parse_attributes(input: &[u8]) -> ParsedAttributes<'_> {
    let mut attrs = Vec::new();
    let mut issue: Option<&'static str> = None;
    let mut note = |msg: &'static str| {
        if issue.is_none() {
            issue = Some(msg);
        }
    };
    let mut pos = 0;

    while pos < input.len() {
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        if pos >= input.len() {
            break;
        }

        if !is_name_start_char(input[pos]) {
            note("unexpected character between attributes");
            pos += 1;
            continue;
        }

        let name_start = pos;
        while pos < input.len() && is_name_char(input[pos]) {
            pos += 1;
        }
        let name = &input[name_start..pos];

        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        if pos >= input.len() || input[pos] != b'=' {
            // Attribute without value (like HTML boolean attributes)
            note("attribute without value");
            attrs.push(Attribute::new(name, Cow::Borrowed(b"")));
            continue;
        }

        pos += 1; // Skip '='

        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        if pos >= input.len() {
            note("attribute without value");
            attrs.push(Attribute::new(name, Cow::Borrowed(b"")));
            break;
        }

        let quote = input[pos];
        if quote != b'"' && quote != b'\'' {
            note("unquoted attribute value");
            let value_start = pos;
            while pos < input.len() && !is_whitespace(input[pos]) {
                pos += 1;
            }
            attrs.push(Attribute::new(name, decode_text(&input[value_start..pos])));
            continue;
        }

        pos += 1; // Skip opening quote
        let value_start = pos;
        while pos < input.len() && input[pos] != quote {
            pos += 1;
        }

        if pos >= input.len() {
            note("unterminated attribute value");
        }

        attrs.push(Attribute::new(name, decode_text(&input[value_start..pos])));

        if pos < input.len() {
            pos += 1; // Skip closing quote
        }
    }

    (attrs, issue)
}

/// Check if byte is whitespace
#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}
