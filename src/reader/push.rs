//! Push Reader
//!
//! Stateful reader that processes XML in chunks with bounded memory.
//! Bytes are appended to a pending buffer, tokenized as far as complete
//! tokens allow, dispatched to a [`SaxHandler`], then drained. Text is
//! passed on as it arrives. Whatever is left is either unfinished markup or
//! the few bytes of a text tail that could still change meaning, and waits
//! for the next chunk.

use crate::config::{DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_PENDING_BYTES};
use crate::core::attributes::parse_attributes;
use crate::core::tokenizer::{Token, TokenKind, Tokenizer};
use crate::error::Recovery;
use crate::sax::SaxHandler;
use memchr::memchr;
use tracing::{debug, trace};

/// Incremental XML reader
pub struct PushReader {
    /// Accumulated buffer for incomplete input
    buffer: Vec<u8>,
    /// Stream offset of `buffer[0]`
    offset: u64,
    /// Largest unfinished markup kept before it is discarded
    max_pending: usize,
    /// Leading bytes of `buffer` already tokenized without finding the end
    /// of the construct they start
    scanned: usize,
}

impl PushReader {
    /// Create a reader with default buffer sizes
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_PENDING_BYTES)
    }

    /// Create a reader with an initial buffer capacity and a pending cap
    pub fn with_limits(initial_capacity: usize, max_pending: usize) -> Self {
        PushReader {
            buffer: Vec::with_capacity(initial_capacity),
            offset: 0,
            max_pending,
            scanned: 0,
        }
    }

    /// Feed a chunk of data, dispatching every event it completes
    pub fn feed<H: SaxHandler>(&mut self, chunk: &[u8], handler: &mut H) {
        if chunk.is_empty() {
            return;
        }
        let waiting_on_markup = self.buffer.len() > 1 && self.buffer[0] == b'<';
        self.buffer.extend_from_slice(chunk);

        // Every markup construct ends with '>'
        if waiting_on_markup && memchr(b'>', chunk).is_none() {
            self.release(0, handler, false);
            return;
        }
        self.process(handler, false);
    }

    /// Treat the pending bytes as the end of the stream
    ///
    /// Trailing text is flushed; an unterminated construct is discarded
    /// and reported. The reader can be fed again afterwards.
    pub fn finish<H: SaxHandler>(&mut self, handler: &mut H) {
        if !self.buffer.is_empty() {
            self.process(handler, true);
        }
    }

    /// Bytes waiting for the rest of a construct
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Check if there's unprocessed data
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Number of stream bytes fully processed so far
    pub fn stream_offset(&self) -> u64 {
        self.offset
    }

    fn process<H: SaxHandler>(&mut self, handler: &mut H, is_final: bool) {
        let base = self.offset;
        let consumed = {
            let tokenizer = if is_final {
                Tokenizer::new(&self.buffer)
            } else {
                Tokenizer::resumable(&self.buffer)
            };
            let mut tokenizer = tokenizer.with_resume_hint(self.scanned);

            while let Some(token) = tokenizer.next_token() {
                if token.kind == TokenKind::Eof {
                    break;
                }
                dispatch(token, base, handler);
            }
            tokenizer.position()
        };
        self.release(consumed, handler, is_final);
    }

    /// Drop the first `consumed` bytes, and the rest too if it is markup
    /// over the pending cap or the stream has ended
    fn release<H: SaxHandler>(&mut self, mut consumed: usize, handler: &mut H, is_final: bool) {
        let pending = &self.buffer[consumed..];
        let over_cap = pending.first() == Some(&b'<') && pending.len() > self.max_pending;
        if !pending.is_empty() && (is_final || over_cap) {
            debug!(
                offset = self.offset + consumed as u64,
                pending = pending.len(),
                is_final,
                "discarding incomplete markup"
            );
            handler.recovered(Recovery::DiscardedInput(pending.len()));
            consumed = self.buffer.len();
        }

        // drain keeps the allocation; remaining bytes move to the front
        self.buffer.drain(..consumed);
        self.offset += consumed as u64;
        self.scanned = self.buffer.len();
    }
}

impl Default for PushReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Route one token to the handler
fn dispatch<H: SaxHandler>(token: Token<'_>, base: u64, handler: &mut H) {
    match token.kind {
        TokenKind::StartTag | TokenKind::EmptyTag => {
            let Some(name) = token.name else { return };
            let (attrs, issue) = parse_attributes(token.attributes.unwrap_or_default());
            if let Some(reason) = issue {
                handler.recovered(Recovery::MalformedAttribute {
                    tag: String::from_utf8_lossy(name).into_owned(),
                    reason,
                });
            }
            handler.start_element(name, &attrs);
            if token.kind == TokenKind::EmptyTag {
                handler.end_element(name);
            }
        }

        TokenKind::EndTag => {
            if let Some(name) = token.name {
                handler.end_element(name);
            }
        }

        TokenKind::Text => {
            if let Some(at) = token.stray_at {
                handler.recovered(Recovery::StrayMarkup(base + at as u64));
            }
            if let Some(content) = token.content {
                handler.characters(&content);
            }
        }

        TokenKind::CData => {
            if let Some(content) = token.content {
                handler.characters(&content);
            }
        }

        TokenKind::Invalid => {
            handler.recovered(Recovery::InvalidMarkup(base + token.span.0 as u64));
        }

        TokenKind::Comment
        | TokenKind::ProcessingInstruction
        | TokenKind::XmlDeclaration
        | TokenKind::DocType => {
            trace!(kind = ?token.kind, start = base + token.span.0 as u64, "skipping markup");
        }

        TokenKind::Eof => {}
    }
}
