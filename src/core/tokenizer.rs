//! XML Tokenizer - State machine for XML token extraction
//!
//! Implements a pull-parser style tokenizer that extracts XML tokens:
//! - Element start/end tags
//! - Text content
//! - CDATA sections
//! - Comments
//! - Processing instructions and XML declarations
//! - DOCTYPE declarations
//!
//! The tokenizer is always lenient. Markup it cannot make sense of becomes
//! an `Invalid` token (or literal text for a stray `<`) and scanning goes on.
//!
//! A *resumable* tokenizer works on a prefix of a stream. When the input
//! ends inside a construct whose extent is not yet known it stops without
//! consuming that construct, so the caller can retry once more bytes have
//! arrived. Text is returned in pieces as it arrives; only a trailing entity
//! reference or UTF-8 sequence that may still be incomplete is held back.

use super::scanner::{is_name_start_char, Scanner};
use std::borrow::Cow;

/// Type of XML token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Element start tag: <element>
    StartTag,
    /// Element end tag: </element>
    EndTag,
    /// Empty element: <element/>
    EmptyTag,
    /// Text content
    Text,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Comment: <!--...-->
    Comment,
    /// Processing instruction: <?target ...?>
    ProcessingInstruction,
    /// XML declaration: <?xml ...?>
    XmlDeclaration,
    /// DOCTYPE declaration
    DocType,
    /// Unrecognised markup, skipped by consumers
    Invalid,
    /// End of file
    Eof,
}

/// A parsed XML token
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw span in input (start, end)
    pub span: (usize, usize),
    /// For tags and PIs: the name
    pub name: Option<&'a [u8]>,
    /// For text/cdata/comments: the content (owned if entities were decoded)
    pub content: Option<Cow<'a, [u8]>>,
    /// For start and empty tags: raw attribute text after the name
    pub attributes: Option<&'a [u8]>,
    /// For text: position of the first '<' that was kept as literal text
    pub stray_at: Option<usize>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, span: (usize, usize)) -> Self {
        Token {
            kind,
            span,
            name: None,
            content: None,
            attributes: None,
            stray_at: None,
        }
    }

    fn with_name(mut self, name: &'a [u8]) -> Self {
        self.name = Some(name);
        self
    }

    fn with_content(mut self, content: Cow<'a, [u8]>) -> Self {
        self.content = Some(content);
        self
    }
}

/// XML tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    /// No more input will follow this slice
    is_final: bool,
    /// Stopped at an unfinished construct
    stalled: bool,
    done: bool,
    /// Leading bytes already searched for a closing delimiter by an earlier,
    /// stalled run over the same stream
    scanned: usize,
}

impl<'a> Tokenizer<'a> {
    /// Create a tokenizer for a complete document
    pub fn new(input: &'a [u8]) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            is_final: true,
            stalled: false,
            done: false,
            scanned: 0,
        }
    }

    /// Create a tokenizer for a stream prefix that may continue later
    pub fn resumable(input: &'a [u8]) -> Self {
        Tokenizer {
            is_final: false,
            ..Self::new(input)
        }
    }

    /// Skip the first `scanned` bytes when looking for the end of a comment,
    /// CDATA section or PI that an earlier run stalled on
    pub fn with_resume_hint(mut self, scanned: usize) -> Self {
        self.scanned = scanned;
        self
    }

    /// Get the current position in the input; everything before it has
    /// been returned as tokens
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// True if tokenizing stopped at a construct that is not complete
    pub fn is_stalled(&self) -> bool {
        self.stalled
    }

    /// Get the next token, or None if more input is needed (or input is done)
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if self.done || self.stalled {
            return None;
        }

        if self.scanner.is_eof() {
            if self.is_final {
                self.done = true;
                let end = self.scanner.position();
                return Some(Token::new(TokenKind::Eof, (end, end)));
            }
            return None;
        }

        let start = self.scanner.position();
        let token = match self.scanner.peek() {
            Some(b'<') => match self.markup_starts_at(start) {
                Some(true) => self.parse_markup(start),
                Some(false) => self.parse_text(start),
                None => None,
            },
            _ => self.parse_text(start),
        };

        if token.is_none() {
            self.scanner.set_position(start);
            self.stalled = true;
        }
        token
    }

    /// Decide whether the '<' at `pos` opens markup.
    /// None means the answer depends on bytes that have not arrived yet.
    fn markup_starts_at(&self, pos: usize) -> Option<bool> {
        match self.scanner.slice(0, self.scanner.len()).get(pos + 1) {
            Some(&b) => Some(matches!(b, b'/' | b'!' | b'?') || is_name_start_char(b)),
            None if self.is_final => Some(false),
            None => None,
        }
    }

    /// Parse markup starting with '<'
    fn parse_markup(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1); // Skip '<'

        match self.scanner.peek()? {
            b'/' => self.parse_end_tag(start),
            b'!' => self.parse_bang_markup(start),
            b'?' => self.parse_pi(start),
            _ => self.parse_start_tag(start),
        }
    }

    /// Parse a start tag or empty element tag
    fn parse_start_tag(&mut self, start: usize) -> Option<Token<'a>> {
        let name = self.scanner.read_name()?;
        let name_end = self.scanner.position();

        // Find the end of the tag, handling quoted attributes
        let end = self.scanner.find_tag_end_quoted()?;

        let is_empty = end > name_end && self.scanner.slice(end - 1, end) == b"/";
        let attr_end = if is_empty { end - 1 } else { end };

        self.scanner.set_position(end + 1);

        let kind = if is_empty { TokenKind::EmptyTag } else { TokenKind::StartTag };
        let mut token = Token::new(kind, (start, end + 1)).with_name(name);
        token.attributes = Some(self.scanner.slice(name_end, attr_end));
        Some(token)
    }

    /// Parse an end tag
    fn parse_end_tag(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1); // Skip '/'

        let name = self.scanner.read_name();

        // Anything up to '>' after the name is tolerated and ignored
        let end = self.scanner.find_tag_end()?;
        self.scanner.set_position(end + 1);

        match name {
            Some(name) => Some(Token::new(TokenKind::EndTag, (start, end + 1)).with_name(name)),
            None => Some(Token::new(TokenKind::Invalid, (start, end + 1))),
        }
    }

    /// Parse markup starting with '!' (comment, CDATA, DOCTYPE)
    fn parse_bang_markup(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1); // Skip '!'

        if self.scanner.starts_with(b"--") {
            self.scanner.advance(2);
            return self.parse_delimited(start, b"-->", TokenKind::Comment);
        }
        if self.scanner.starts_with(b"[CDATA[") {
            self.scanner.advance(7);
            return self.parse_delimited(start, b"]]>", TokenKind::CData);
        }
        if self.starts_with_ignore_case(b"DOCTYPE") {
            return self.parse_doctype(start);
        }

        // Could still become one of the above once more bytes arrive
        if !self.is_final
            && (self.scanner.is_partial_prefix_of(b"--")
                || self.scanner.is_partial_prefix_of(b"[CDATA[")
                || self.is_partial_prefix_ignore_case(b"DOCTYPE"))
        {
            return None;
        }

        let end = self.scanner.find_tag_end()?;
        self.scanner.set_position(end + 1);
        Some(Token::new(TokenKind::Invalid, (start, end + 1)))
    }

    /// Parse content up to a closing delimiter (comments and CDATA)
    fn parse_delimited(&mut self, start: usize, close: &[u8], kind: TokenKind) -> Option<Token<'a>> {
        let content_start = self.scanner.position();
        let content_end = self.find_close(content_start, close)?;
        let content = self.scanner.slice(content_start, content_end);

        self.scanner.set_position(content_end + close.len());
        Some(Token::new(kind, (start, self.scanner.position())).with_content(Cow::Borrowed(content)))
    }

    /// Parse a DOCTYPE declaration, skipping any internal subset
    fn parse_doctype(&mut self, start: usize) -> Option<Token<'a>> {
        let mut pos = self.scanner.position();
        let input = self.scanner.slice(0, self.scanner.len());
        let mut bracket_depth = 0usize;
        let mut quote: Option<u8> = None;

        while pos < input.len() {
            let b = input[pos];
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None => match b {
                    b'"' | b'\'' => quote = Some(b),
                    b'[' => bracket_depth += 1,
                    b']' => bracket_depth = bracket_depth.saturating_sub(1),
                    b'>' if bracket_depth == 0 => {
                        self.scanner.set_position(pos + 1);
                        return Some(Token::new(TokenKind::DocType, (start, pos + 1)));
                    }
                    _ => {}
                },
            }
            pos += 1;
        }
        None
    }

    /// Parse a processing instruction <?...?>
    fn parse_pi(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1); // Skip '?'

        let name = self.scanner.read_name();
        let content_start = self.scanner.position();
        let close = self.find_close(content_start, b"?>")?;
        let content = self.scanner.slice(content_start, close);
        self.scanner.set_position(close + 2);
        let span = (start, self.scanner.position());

        let Some(name) = name else {
            return Some(Token::new(TokenKind::Invalid, span));
        };

        let kind = if name.eq_ignore_ascii_case(b"xml") {
            TokenKind::XmlDeclaration
        } else {
            TokenKind::ProcessingInstruction
        };
        Some(Token::new(kind, span).with_name(name).with_content(Cow::Borrowed(content)))
    }

    /// Find `close` at or after `from`, skipping what was already searched
    fn find_close(&self, from: usize, close: &[u8]) -> Option<usize> {
        let from = from.max(self.scanned.saturating_sub(close.len() - 1));
        self.scanner.find_sequence_from(from, close)
    }

    /// Parse text content up to the next markup, or as much of it as has
    /// arrived
    fn parse_text(&mut self, start: usize) -> Option<Token<'a>> {
        let mut cursor = start;
        let mut stray_at = None;

        let end = loop {
            let search_from = if cursor == start && self.scanner.peek() == Some(b'<') {
                // Text that begins with a stray '<'
                stray_at = Some(start);
                start + 1
            } else {
                cursor
            };

            match self.scanner.find_tag_start_from(search_from) {
                None if self.is_final => break self.scanner.len(),
                None => break self.settled_text_end(start, self.scanner.len()),
                Some(lt) => match self.markup_starts_at(lt) {
                    Some(true) => break lt,
                    Some(false) => {
                        stray_at.get_or_insert(lt);
                        cursor = lt + 1;
                    }
                    None => break self.settled_text_end(start, lt),
                },
            }
        };

        if end == start {
            return None;
        }

        let content = self.scanner.slice(start, end);
        self.scanner.set_position(end);

        let mut token = Token::new(TokenKind::Text, (start, end))
            .with_content(super::entities::decode_text(content));
        token.stray_at = stray_at.filter(|&at| at < end);
        Some(token)
    }

    /// End of the text in `start..limit` that can be returned before the
    /// rest of the run arrives
    fn settled_text_end(&self, start: usize, limit: usize) -> usize {
        let text = self.scanner.slice(start, limit);
        let settled = super::entities::settled_prefix_len(text);
        start + settled - incomplete_utf8_tail(&text[..settled])
    }

    fn starts_with_ignore_case(&self, needle: &[u8]) -> bool {
        let rest = self.scanner.remaining();
        rest.len() >= needle.len() && rest[..needle.len()].eq_ignore_ascii_case(needle)
    }

    fn is_partial_prefix_ignore_case(&self, needle: &[u8]) -> bool {
        let rest = self.scanner.remaining();
        rest.len() < needle.len() && needle[..rest.len()].eq_ignore_ascii_case(rest)
    }
}

/// Number of trailing bytes that start a UTF-8 sequence not yet complete
fn incomplete_utf8_tail(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let b = bytes[bytes.len() - back];
        if b & 0xC0 == 0x80 {
            continue;
        }
        let width = match b {
            0xF0.. => 4,
            0xE0.. => 3,
            0xC0.. => 2,
            _ => 1,
        };
        return if width > back { back } else { 0 };
    }
    0
}

/// Iterator adapter for tokenizer
impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token()?;
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &[u8]) -> Vec<TokenKind> {
        Tokenizer::new(input).map(|t| t.kind).collect()
    }

    fn content(token: &Token<'_>) -> Vec<u8> {
        token.content.as_ref().map(|c| c.to_vec()).unwrap_or_default()
    }

    #[test]
    fn test_simple_element() {
        let mut tok = Tokenizer::new(b"<root>content</root>");

        let t1 = tok.next_token().unwrap();
        assert_eq!(t1.kind, TokenKind::StartTag);
        assert_eq!(t1.name, Some(b"root" as &[u8]));

        let t2 = tok.next_token().unwrap();
        assert_eq!(t2.kind, TokenKind::Text);
        assert_eq!(content(&t2), b"content");

        let t3 = tok.next_token().unwrap();
        assert_eq!(t3.kind, TokenKind::EndTag);
        assert_eq!(t3.name, Some(b"root" as &[u8]));

        assert_eq!(tok.next_token().unwrap().kind, TokenKind::Eof);
        assert!(tok.next_token().is_none());
    }

    #[test]
    fn test_empty_element_attributes() {
        let mut tok = Tokenizer::new(b"<oneNumber name=\"RA\" format='%10.6m'/>");
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::EmptyTag);
        assert_eq!(t.name, Some(b"oneNumber" as &[u8]));
        assert_eq!(t.attributes, Some(b" name=\"RA\" format='%10.6m'" as &[u8]));
    }

    #[test]
    fn test_gt_inside_attribute() {
        let mut tok = Tokenizer::new(b"<a expr=\"x > 1\">");
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::StartTag);
        assert_eq!(t.span, (0, 16));
    }

    #[test]
    fn test_cdata() {
        let mut tok = Tokenizer::new(b"<![CDATA[<script>a && b</script>]]>");
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::CData);
        assert_eq!(content(&t), b"<script>a && b</script>");
    }

    #[test]
    fn test_comment() {
        let mut tok = Tokenizer::new(b"<!-- a > b -->");
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::Comment);
        assert_eq!(content(&t), b" a > b ");
    }

    #[test]
    fn test_declaration_and_doctype() {
        let input = b"<?xml version=\"1.0\"?><!DOCTYPE r [<!ENTITY e \"x>\">]><?pi data?><r/>";
        assert_eq!(
            kinds(input),
            vec![
                TokenKind::XmlDeclaration,
                TokenKind::DocType,
                TokenKind::ProcessingInstruction,
                TokenKind::EmptyTag,
            ]
        );
    }

    #[test]
    fn test_entities_decoded_in_text() {
        let mut tok = Tokenizer::new(b"a &lt; b &amp;&amp; c");
        let t = tok.next_token().unwrap();
        assert_eq!(content(&t), b"a < b && c");
    }

    #[test]
    fn test_stray_lt_is_text() {
        let mut tok = Tokenizer::new(b"<v>1 < 2</v>");
        assert_eq!(tok.next_token().unwrap().kind, TokenKind::StartTag);
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::Text);
        assert_eq!(content(&t), b"1 < 2");
        assert_eq!(t.stray_at, Some(5));
        assert_eq!(tok.next_token().unwrap().kind, TokenKind::EndTag);
    }

    #[test]
    fn test_invalid_markup_skipped() {
        assert_eq!(
            kinds(b"<a></ ><!junk><b/></a>"),
            vec![
                TokenKind::StartTag,
                TokenKind::Invalid,
                TokenKind::Invalid,
                TokenKind::EmptyTag,
                TokenKind::EndTag,
            ]
        );
    }

    #[test]
    fn test_resumable_stops_inside_tag() {
        let mut tok = Tokenizer::resumable(b"<a><b x=\"1");
        assert_eq!(tok.next_token().unwrap().kind, TokenKind::StartTag);
        assert!(tok.next_token().is_none());
        assert!(tok.is_stalled());
        assert_eq!(tok.position(), 3);
    }

    #[test]
    fn test_resumable_returns_text_so_far() {
        let mut tok = Tokenizer::resumable(b"<a>hello wor");
        assert_eq!(tok.next_token().unwrap().kind, TokenKind::StartTag);
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::Text);
        assert_eq!(content(&t), b"hello wor");
        assert!(tok.next_token().is_none());
        assert!(!tok.is_stalled());
        assert_eq!(tok.position(), 12);
    }

    #[test]
    fn test_resumable_undecided_lt() {
        let mut tok = Tokenizer::resumable(b"<a>x <");
        assert_eq!(tok.next_token().unwrap().kind, TokenKind::StartTag);
        assert_eq!(content(&tok.next_token().unwrap()), b"x ");
        assert!(tok.next_token().is_none());
        assert!(tok.is_stalled());
        assert_eq!(tok.position(), 5);
    }

    #[test]
    fn test_resumable_holds_partial_entity() {
        let mut tok = Tokenizer::resumable(b"<a>x &am");
        assert_eq!(tok.next_token().unwrap().kind, TokenKind::StartTag);
        assert_eq!(content(&tok.next_token().unwrap()), b"x ");
        assert!(tok.next_token().is_none());
        assert_eq!(tok.position(), 5);

        let mut tok = Tokenizer::resumable(b"&am");
        assert!(tok.next_token().is_none());
        assert!(tok.is_stalled());
        assert_eq!(tok.position(), 0);
    }

    #[test]
    fn test_resumable_holds_partial_utf8() {
        let mut tok = Tokenizer::resumable("<a>caf\u{e9}".as_bytes().split_last().unwrap().1);
        assert_eq!(tok.next_token().unwrap().kind, TokenKind::StartTag);
        assert_eq!(content(&tok.next_token().unwrap()), b"caf");
        assert!(tok.next_token().is_none());
        assert_eq!(tok.position(), 6);
    }

    #[test]
    fn test_incomplete_utf8_tail() {
        assert_eq!(incomplete_utf8_tail(b"abc"), 0);
        assert_eq!(incomplete_utf8_tail("\u{e9}".as_bytes()), 0);
        assert_eq!(incomplete_utf8_tail(&"\u{20ac}".as_bytes()[..2]), 2);
        assert_eq!(incomplete_utf8_tail(&"\u{1F600}".as_bytes()[..3]), 3);
        assert_eq!(incomplete_utf8_tail(b"x\xC3"), 1);
    }

    #[test]
    fn test_resume_hint_finds_split_close() {
        // An earlier run saw "<!-- ab --" and stalled
        let mut tok = Tokenizer::resumable(b"<!-- ab --><a/>").with_resume_hint(10);
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::Comment);
        assert_eq!(content(&t), b" ab ");
        assert_eq!(tok.next_token().unwrap().kind, TokenKind::EmptyTag);
    }

    #[test]
    fn test_resumable_partial_comment_opener() {
        let mut tok = Tokenizer::resumable(b"<!-");
        assert!(tok.next_token().is_none());
        assert!(tok.is_stalled());
        assert_eq!(tok.position(), 0);
    }

    #[test]
    fn test_resumable_complete_input() {
        let mut tok = Tokenizer::resumable(b"<a>x</a>");
        assert_eq!(tok.by_ref().count(), 3);
        assert!(!tok.is_stalled());
        assert_eq!(tok.position(), 8);
    }

    #[test]
    fn test_final_flushes_text() {
        let mut tok = Tokenizer::new(b"tail text");
        let t = tok.next_token().unwrap();
        assert_eq!(t.kind, TokenKind::Text);
        assert_eq!(content(&t), b"tail text");
    }

    #[test]
    fn test_final_unterminated_tag() {
        let mut tok = Tokenizer::new(b"<a><b");
        assert_eq!(tok.next_token().unwrap().kind, TokenKind::StartTag);
        assert!(tok.next_token().is_none());
        assert!(tok.is_stalled());
        assert_eq!(tok.position(), 3);
    }
}
