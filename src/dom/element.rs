//! Element View
//!
//! Splits one JSON element object into its reserved parts in a single
//! pass over its keys:
//! - `"<>"` tag name
//! - `"@name"` attributes, in key order
//! - `"$"` text
//! - `"children"` child elements
//!
//! Other keys are ignored. When a key occurs twice the parser keeps the
//! last value.

use crate::config::TranscoderConfig;
use crate::core::escape::push_xml_escaped;
use crate::core::scanner::is_xml_name;
use crate::error::{Result, TranscodeError};
use serde_json::Value;
use std::borrow::Cow;
use tracing::debug;

/// Borrowed view of one JSON element object
#[derive(Debug)]
pub struct ElementView<'a> {
    /// Tag name, as written in the output
    pub tag: Cow<'a, str>,
    /// `(name, value)` pairs with the `@` stripped
    pub attributes: Vec<(&'a str, &'a Value)>,
    pub text: Option<&'a Value>,
    pub children: Option<&'a [Value]>,
}

impl<'a> ElementView<'a> {
    /// Read an element object
    ///
    /// Fails when `value` is not an object or has no usable tag. With
    /// `validate_names` set, tag and attribute names must be XML names.
    /// A non-array `"children"` is an error in strict mode and is
    /// ignored otherwise.
    pub fn parse(value: &'a Value, config: &TranscoderConfig) -> Result<Self> {
        let map = value.as_object().ok_or(TranscodeError::NotAnObject)?;

        let mut tag = None;
        let mut text = None;
        let mut children = None;
        let mut attributes = Vec::new();

        for (key, value) in map {
            match key.as_str() {
                "<>" => tag = Some(value),
                "$" => text = Some(value),
                "children" => children = Some(value),
                other => {
                    if let Some(name) = other.strip_prefix('@') {
                        if !name.is_empty() {
                            attributes.push((name, value));
                        }
                    }
                }
            }
        }

        let tag = tag.and_then(tag_name).ok_or(TranscodeError::MissingTag)?;

        if config.validate_names {
            if !is_xml_name(&tag) {
                return Err(TranscodeError::InvalidName(tag.into_owned()));
            }
            if let Some((name, _)) = attributes.iter().find(|(name, _)| !is_xml_name(name)) {
                return Err(TranscodeError::InvalidName((*name).to_string()));
            }
        }

        let children = match children {
            None => None,
            Some(Value::Array(items)) => Some(items.as_slice()),
            Some(_) if config.strict => return Err(TranscodeError::ChildrenNotArray(tag.into_owned())),
            Some(_) => {
                debug!(tag = %tag, "ignoring non-array children");
                None
            }
        };

        Ok(ElementView {
            tag,
            attributes,
            text,
            children,
        })
    }

    /// True when the element is written as `<tag .../>`
    pub fn is_self_closing(&self) -> bool {
        self.text.is_none() && self.children.is_none()
    }
}

/// Tag text: a non-empty string, or a number, boolean or null token
fn tag_name(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) if !s.is_empty() => Some(Cow::Borrowed(s)),
        Value::String(_) | Value::Object(_) | Value::Array(_) => None,
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Null => Some(Cow::Borrowed("null")),
    }
}

/// Append a JSON value as XML text or attribute content
///
/// Strings are XML-escaped. Numbers, booleans and null are written as
/// their JSON token. Objects and arrays are written as compact JSON,
/// XML-escaped.
pub fn write_scalar(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => push_xml_escaped(out, s),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Null => out.push_str("null"),
        Value::Object(_) | Value::Array(_) => push_xml_escaped(out, &value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lenient() -> TranscoderConfig {
        TranscoderConfig::default()
    }

    fn scalar(value: &Value) -> String {
        let mut out = String::new();
        write_scalar(&mut out, value);
        out
    }

    #[test]
    fn test_parts_extracted() {
        let value = json!({"<>": "a", "@x": "1", "$": "t", "children": [{"<>": "b"}], "other": 5, "@": "z"});
        let view = ElementView::parse(&value, &lenient()).unwrap();
        assert_eq!(view.tag, "a");
        assert_eq!(view.attributes, vec![("x", &json!("1"))]);
        assert_eq!(view.text, Some(&json!("t")));
        assert_eq!(view.children.map(|c| c.len()), Some(1));
        assert!(!view.is_self_closing());
    }

    #[test]
    fn test_attribute_order_follows_keys() {
        let value: Value = serde_json::from_str(r#"{"@z":"1","<>":"e","@a":"2","@m":"3"}"#).unwrap();
        let view = ElementView::parse(&value, &lenient()).unwrap();
        let names: Vec<&str> = view.attributes.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn test_missing_or_empty_tag() {
        assert!(matches!(
            ElementView::parse(&json!({"foo": "bar"}), &lenient()),
            Err(TranscodeError::MissingTag)
        ));
        assert!(matches!(
            ElementView::parse(&json!({"<>": ""}), &lenient()),
            Err(TranscodeError::MissingTag)
        ));
        assert!(matches!(
            ElementView::parse(&json!({"<>": {"x": 1}}), &lenient()),
            Err(TranscodeError::MissingTag)
        ));
    }

    #[test]
    fn test_not_an_object() {
        assert!(matches!(
            ElementView::parse(&json!(["<>", "a"]), &lenient()),
            Err(TranscodeError::NotAnObject)
        ));
    }

    #[test]
    fn test_scalar_tag() {
        let value = json!({"<>": 42});
        assert_eq!(ElementView::parse(&value, &lenient()).unwrap().tag, "42");
    }

    #[test]
    fn test_name_validation() {
        let config = TranscoderConfig {
            validate_names: true,
            ..TranscoderConfig::default()
        };
        assert!(matches!(
            ElementView::parse(&json!({"<>": "a><script"}), &config),
            Err(TranscodeError::InvalidName(ref n)) if n == "a><script"
        ));
        assert!(matches!(
            ElementView::parse(&json!({"<>": "a", "@bad name": "1"}), &config),
            Err(TranscodeError::InvalidName(ref n)) if n == "bad name"
        ));
        assert!(ElementView::parse(&json!({"<>": "a><script"}), &lenient()).is_ok());
    }

    #[test]
    fn test_children_not_array() {
        let value = json!({"<>": "a", "children": {"<>": "b"}});
        let view = ElementView::parse(&value, &lenient()).unwrap();
        assert!(view.children.is_none());
        assert!(view.is_self_closing());
        assert!(matches!(
            ElementView::parse(&value, &TranscoderConfig::strict()),
            Err(TranscodeError::ChildrenNotArray(ref t)) if t == "a"
        ));
    }

    #[test]
    fn test_empty_text_and_children_still_present() {
        let value = json!({"<>": "a", "$": "", "children": []});
        let view = ElementView::parse(&value, &lenient()).unwrap();
        assert!(!view.is_self_closing());
    }

    #[test]
    fn test_write_scalar() {
        assert_eq!(scalar(&json!("a<b & 'c'")), "a&lt;b &amp; &apos;c&apos;");
        assert_eq!(scalar(&json!(true)), "true");
        assert_eq!(scalar(&json!(null)), "null");
        assert_eq!(scalar(&json!({"k": "<v>"})), "{&quot;k&quot;:&quot;&lt;v&gt;&quot;}");
    }

    #[test]
    fn test_number_token_kept_verbatim() {
        let value: Value = serde_json::from_str("1.50").unwrap();
        assert_eq!(scalar(&value), "1.50");
        let value: Value = serde_json::from_str("123456789012345678901234567890").unwrap();
        assert_eq!(scalar(&value), "123456789012345678901234567890");
    }
}
