//! JSON -> XML Transcoder
//!
//! Each call receives one complete JSON message describing one element
//! tree and emits the XML fragment for it in a single write. Nothing is
//! kept between calls apart from the sink and the configuration.

use super::emit::Emit;
use crate::config::TranscoderConfig;
use crate::dom::{write_scalar, ElementView};
use crate::error::Result;
use serde_json::Value;
use tracing::debug;

/// Convert one JSON message to an XML fragment
///
/// Returns `Ok(None)` for empty (or all-whitespace) input. A message that
/// cannot be converted is an error; child elements that cannot be
/// converted are skipped unless `config.strict` is set.
pub fn json_to_xml_string(json: &[u8], config: &TranscoderConfig) -> Result<Option<String>> {
    if json.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(json)?;
    let root = ElementView::parse(&value, config)?;

    let mut out = String::with_capacity(json.len());
    write_element(&mut out, &root, config)?;
    Ok(Some(out))
}

/// Write one element and, recursively, its children
fn write_element(out: &mut String, element: &ElementView<'_>, config: &TranscoderConfig) -> Result<()> {
    // Tag and attribute names are written unescaped
    out.push('<');
    out.push_str(&element.tag);
    for (name, value) in &element.attributes {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        write_scalar(out, value);
        out.push('"');
    }

    if element.is_self_closing() {
        out.push_str("/>");
        return Ok(());
    }
    out.push('>');

    if let Some(text) = element.text {
        write_scalar(out, text);
    }

    for child in element.children.unwrap_or_default() {
        match ElementView::parse(child, config) {
            Ok(view) => write_element(out, &view, config)?,
            Err(err) if config.strict => return Err(err),
            Err(err) => debug!(%err, parent = %element.tag, "skipping child element"),
        }
    }

    out.push_str("</");
    out.push_str(&element.tag);
    out.push('>');
    Ok(())
}

/// JSON -> XML transcoder
///
/// Stateless per message. Messages that cannot be converted are dropped
/// without emitting anything; in strict mode the reason is returned.
///
/// ```
/// use rustyxj::JsonToXml;
///
/// let mut out = Vec::new();
/// let mut j2x = JsonToXml::new(|xml: &str| out.push(xml.to_string()));
/// j2x.feed(br#"{"<>":"getProperties","@version":"1.7"}"#).unwrap();
/// j2x.feed(br#"{"foo":"bar"}"#).unwrap();
/// drop(j2x);
///
/// assert_eq!(out, [r#"<getProperties version="1.7"/>"#]);
/// ```
pub struct JsonToXml<E: Emit> {
    emit: E,
    config: TranscoderConfig,
}

impl<E: Emit> JsonToXml<E> {
    /// Create a lenient transcoder
    pub fn new(emit: E) -> Self {
        Self::with_config(emit, TranscoderConfig::default())
    }

    pub fn with_config(emit: E, config: TranscoderConfig) -> Self {
        JsonToXml { emit, config }
    }

    /// Convert one complete JSON message and emit the result
    pub fn feed(&mut self, json: &[u8]) -> Result<()> {
        match json_to_xml_string(json, &self.config) {
            Ok(Some(xml)) => {
                debug!(bytes = xml.len(), "emitting XML element");
                self.emit.emit(&xml);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) if self.config.strict => Err(err),
            Err(err) => {
                debug!(%err, "dropping JSON message");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranscodeError;
    use crate::transcode::XmlToJson;

    fn convert_with(messages: &[&[u8]], config: TranscoderConfig) -> Vec<String> {
        let mut out = Vec::new();
        let mut j2x = JsonToXml::with_config(|xml: &str| out.push(xml.to_string()), config);
        for message in messages {
            j2x.feed(message).unwrap();
        }
        drop(j2x);
        out
    }

    fn convert(message: &[u8]) -> Vec<String> {
        convert_with(&[message], TranscoderConfig::default())
    }

    fn xml_to_json(input: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        let mut x2j = XmlToJson::new(|json: &str| out.push(json.to_string()));
        x2j.feed(input).unwrap();
        x2j.close().unwrap();
        out
    }

    #[test]
    fn test_self_closing() {
        assert_eq!(convert(br#"{"<>":"tag","@attr":"val"}"#), vec![r#"<tag attr="val"/>"#]);
    }

    #[test]
    fn test_missing_tag_dropped() {
        assert!(convert(br#"{"foo":"bar"}"#).is_empty());
    }

    #[test]
    fn test_nested_with_text() {
        assert_eq!(
            convert(br#"{"<>":"a","@x":"1","$":"hi","children":[{"<>":"b"},{"<>":"c","$":"t"}]}"#),
            vec![r#"<a x="1">hi<b/><c>t</c></a>"#]
        );
    }

    #[test]
    fn test_values_escaped() {
        assert_eq!(
            convert(br#"{"<>":"a","@q":"\"<&>'","$":"x & y\n"}"#),
            vec!["<a q=\"&quot;&lt;&amp;&gt;&apos;\">x &amp; y\n</a>"]
        );
    }

    #[test]
    fn test_non_string_values_raw() {
        assert_eq!(
            convert(br#"{"<>":"n","@ok":true,"@none":null,"$":1.50}"#),
            vec![r#"<n ok="true" none="null">1.50</n>"#]
        );
    }

    #[test]
    fn test_present_but_empty_content_not_self_closing() {
        assert_eq!(convert(br#"{"<>":"a","$":""}"#), vec!["<a></a>"]);
        assert_eq!(convert(br#"{"<>":"a","children":[]}"#), vec!["<a></a>"]);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        assert_eq!(convert(br#"{"meta":{"x":1},"<>":"a","@":"z"}"#), vec!["<a/>"]);
    }

    #[test]
    fn test_empty_input_is_noop() {
        assert!(convert(b"").is_empty());
        assert!(convert(b" \n\t").is_empty());
        let mut j2x = JsonToXml::with_config(|_: &str| {}, TranscoderConfig::strict());
        assert!(j2x.feed(b"").is_ok());
    }

    #[test]
    fn test_invalid_json() {
        assert!(convert(b"{\"<>\":").is_empty());
        let mut j2x = JsonToXml::with_config(|_: &str| {}, TranscoderConfig::strict());
        assert!(matches!(j2x.feed(b"{\"<>\":"), Err(TranscodeError::Json(_))));
    }

    #[test]
    fn test_bad_children_skipped_when_lenient() {
        let message: &[u8] = br#"{"<>":"a","children":[{"x":1},{"<>":"b"},"str"]}"#;
        assert_eq!(convert(message), vec!["<a><b/></a>"]);

        let mut emitted = 0;
        let mut j2x = JsonToXml::with_config(|_: &str| emitted += 1, TranscoderConfig::strict());
        assert!(matches!(j2x.feed(message), Err(TranscodeError::MissingTag)));
        drop(j2x);
        assert_eq!(emitted, 0);
    }

    #[test]
    fn test_invalid_names_dropped() {
        let config = TranscoderConfig {
            validate_names: true,
            ..TranscoderConfig::default()
        };
        assert!(convert_with(&[br#"{"<>":"a b"}"#], config.clone()).is_empty());
        assert_eq!(
            convert_with(&[br#"{"<>":"a","children":[{"<>":"1x"},{"<>":"ok"}]}"#], config),
            vec!["<a><ok/></a>"]
        );
    }

    #[test]
    fn test_tag_name_written_verbatim() {
        assert_eq!(convert(br#"{"<>":"a&b"}"#), vec!["<a&b/>"]);
    }

    #[test]
    fn test_many_messages() {
        let out = convert_with(&[br#"{"<>":"a"}"#, br#"{"<>":"b"}"#, b"[]", br#"{"<>":"c"}"#], TranscoderConfig::default());
        assert_eq!(out, vec!["<a/>", "<b/>", "<c/>"]);
    }

    #[test]
    fn test_round_trip_through_json() {
        let xml: &[u8] = b"<defNumberVector device=\"Mount\" name=\"COORD\" state=\"Ok\">\
            <defNumber name=\"RA\" format=\"%10.6m\">  12.5 </defNumber>\
            <defNumber name=\"DEC\" label=\"&quot;Dec&quot; &apos;deg&apos;\">-45 &amp; &lt;x&gt;</defNumber>\
            <empty/></defNumberVector>";

        let first = xml_to_json(xml);
        assert_eq!(first.len(), 1);

        let regenerated = convert(first[0].as_bytes());
        assert_eq!(regenerated.len(), 1);

        let second = xml_to_json(regenerated[0].as_bytes());
        assert_eq!(second, first);
    }
}
