//! XML -> JSON Transcoder
//!
//! A [`PushReader`] drives a [`TreeSink`] that writes JSON text straight
//! into one reusable buffer while elements open and close. No tree is
//! built: the sink keeps one [`Frame`] per open element, indexed by
//! depth, and emits the buffer each time a top-level element closes.
//!
//! ```text
//! <a x="1">hi<b/></a>   ->   {"<>":"a","@x":"1","children":[{"<>":"b"}],"$":"hi"}
//! ```

use super::emit::Emit;
use crate::config::TranscoderConfig;
use crate::core::attributes::Attribute;
use crate::core::escape::push_json_escaped;
use crate::error::{Recovery, Result};
use crate::reader::PushReader;
use crate::sax::SaxHandler;
use tracing::debug;

/// Per-depth state of an open element
#[derive(Debug, Default)]
struct Frame {
    tag: String,
    /// Raw character data so far, leading whitespace dropped
    text: Vec<u8>,
    /// `"children":[` has been written for this element
    has_children: bool,
}

impl Frame {
    fn reset(&mut self, tag: &[u8]) {
        self.tag.clear();
        self.tag.push_str(&String::from_utf8_lossy(tag));
        self.text.clear();
        self.has_children = false;
    }
}

/// SaxHandler that serializes elements to JSON as events arrive
struct TreeSink<E> {
    emit: E,
    /// JSON of the top-level element being built
    json: String,
    /// `frames[d - 1]` belongs to the open element at depth `d`; frames
    /// are reused, never dropped
    frames: Vec<Frame>,
    /// Open elements, skipped ones included
    depth: usize,
    /// Depth of the outermost skipped element while inside one
    skip_from: Option<usize>,
    max_depth: usize,
    /// First defect seen since the last call returned
    first_issue: Option<Recovery>,
}

impl<E: Emit> TreeSink<E> {
    fn new(emit: E, config: &TranscoderConfig) -> Self {
        TreeSink {
            emit,
            json: String::with_capacity(config.initial_capacity),
            frames: Vec::with_capacity(16),
            depth: 0,
            skip_from: None,
            max_depth: config.max_depth,
            first_issue: None,
        }
    }

    fn note(&mut self, issue: Recovery) {
        debug!(%issue, "recovered from malformed XML");
        if self.first_issue.is_none() {
            self.first_issue = Some(issue);
        }
    }

    /// Close the innermost open element without checking its name
    fn pop_element(&mut self) {
        let depth = self.depth;
        self.depth -= 1;

        if let Some(from) = self.skip_from {
            if depth == from {
                self.skip_from = None;
            }
            return;
        }

        let frame = &self.frames[depth - 1];
        if frame.has_children {
            self.json.push(']');
        }
        let text = trim_trailing_space(&frame.text);
        if !text.is_empty() {
            self.json.push_str(",\"$\":\"");
            push_json_escaped(&mut self.json, &String::from_utf8_lossy(text));
            self.json.push('"');
        }
        self.json.push('}');

        if depth == 1 {
            debug!(tag = %frame.tag, bytes = self.json.len(), "emitting JSON element");
            self.emit.emit(&self.json);
        }
    }

    /// Close everything still open, innermost first
    fn close_open_elements(&mut self) {
        while self.depth > 0 {
            if self.skip_from.is_none() {
                let tag = self.frames[self.depth - 1].tag.clone();
                self.note(Recovery::UnclosedElement(tag));
            }
            self.pop_element();
        }
    }
}

impl<E: Emit> SaxHandler for TreeSink<E> {
    fn start_element(&mut self, name: &[u8], attrs: &[Attribute<'_>]) {
        self.depth += 1;
        let depth = self.depth;

        if self.skip_from.is_some() {
            return;
        }
        if depth > self.max_depth || name.is_empty() {
            self.skip_from = Some(depth);
            if !name.is_empty() {
                self.note(Recovery::DepthLimit {
                    tag: String::from_utf8_lossy(name).into_owned(),
                    limit: self.max_depth,
                });
            }
            return;
        }

        if depth == 1 {
            self.json.clear();
        } else {
            let parent = &mut self.frames[depth - 2];
            if parent.has_children {
                self.json.push(',');
            } else {
                self.json.push_str(",\"children\":[");
                parent.has_children = true;
            }
        }

        if self.frames.len() < depth {
            self.frames.push(Frame::default());
        }
        self.frames[depth - 1].reset(name);

        self.json.push_str("{\"<>\":\"");
        push_json_escaped(&mut self.json, &self.frames[depth - 1].tag);
        self.json.push('"');

        for attr in attrs {
            self.json.push_str(",\"@");
            push_json_escaped(&mut self.json, &attr.name_lossy());
            self.json.push_str("\":\"");
            push_json_escaped(&mut self.json, &attr.value_lossy());
            self.json.push('"');
        }
    }

    fn end_element(&mut self, name: &[u8]) {
        if self.depth == 0 {
            self.note(Recovery::UnmatchedEndTag(String::from_utf8_lossy(name).into_owned()));
            return;
        }

        if self.skip_from.is_none() {
            let found = String::from_utf8_lossy(name);
            let expected = &self.frames[self.depth - 1].tag;
            if found != expected.as_str() {
                let issue = Recovery::MismatchedEndTag {
                    expected: expected.clone(),
                    found: found.into_owned(),
                };
                self.note(issue);
            }
        }

        self.pop_element();
    }

    fn characters(&mut self, text: &[u8]) {
        if self.depth == 0 || self.skip_from.is_some() {
            return;
        }
        let frame = &mut self.frames[self.depth - 1];
        if frame.text.is_empty() {
            frame.text.extend_from_slice(trim_leading_space(text));
        } else {
            frame.text.extend_from_slice(text);
        }
    }

    fn recovered(&mut self, issue: Recovery) {
        self.note(issue);
    }
}

/// Space, tab, LF, VT, FF or CR
fn is_space(b: &u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

fn trim_leading_space(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !is_space(b)).unwrap_or(bytes.len());
    &bytes[start..]
}

fn trim_trailing_space(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|b| !is_space(b)).map_or(0, |i| i + 1);
    &bytes[..end]
}

/// Streaming XML -> JSON transcoder
///
/// One instance per stream. Feed chunks as they arrive; every top-level
/// element is emitted as one JSON object the moment its end tag is read.
///
/// ```
/// use rustyxj::XmlToJson;
///
/// let mut out = Vec::new();
/// let mut x2j = XmlToJson::new(|json: &str| out.push(json.to_string()));
/// x2j.feed(b"<ping id=\"1\"/><pong>").unwrap();
/// x2j.feed(b" ok </pong>").unwrap();
/// x2j.close().unwrap();
///
/// assert_eq!(out, [r#"{"<>":"ping","@id":"1"}"#, r#"{"<>":"pong","$":"ok"}"#]);
/// ```
pub struct XmlToJson<E: Emit> {
    reader: PushReader,
    sink: TreeSink<E>,
    strict: bool,
}

impl<E: Emit> XmlToJson<E> {
    /// Create a lenient transcoder with default limits
    pub fn new(emit: E) -> Self {
        Self::with_config(emit, TranscoderConfig::default())
    }

    pub fn with_config(emit: E, config: TranscoderConfig) -> Self {
        XmlToJson {
            reader: PushReader::with_limits(config.initial_capacity, config.max_pending_bytes),
            sink: TreeSink::new(emit, &config),
            strict: config.strict,
        }
    }

    /// Feed the next chunk of the stream
    ///
    /// Emissions completed by this chunk are delivered before it returns.
    /// Malformed input is always recovered from; in strict mode the first
    /// defect met during this call is returned afterwards.
    pub fn feed(&mut self, data: &[u8]) -> Result<()> {
        self.reader.feed(data, &mut self.sink);
        self.take_issue()
    }

    /// End the stream
    ///
    /// Pending text is flushed and every element still open is closed,
    /// which emits a dangling top-level element.
    pub fn close(mut self) -> Result<()> {
        self.reader.finish(&mut self.sink);
        self.sink.close_open_elements();
        self.take_issue()
    }

    /// Number of currently open elements
    pub fn depth(&self) -> usize {
        self.sink.depth
    }

    fn take_issue(&mut self) -> Result<()> {
        match self.sink.first_issue.take() {
            Some(issue) if self.strict => Err(issue.into()),
            _ => Ok(()),
        }
    }
}
