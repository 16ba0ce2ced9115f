//! Error Types
//!
//! Both transcoders recover from malformed input by default. `Recovery`
//! names each defect the XML side tolerates; in strict mode it is returned
//! wrapped in `TranscodeError` instead of only being logged.

use thiserror::Error;

/// A malformed-input condition the XML reader or tree builder recovered from
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Recovery {
    /// `<` that cannot start markup, kept as literal text
    #[error("stray '<' at byte {0} kept as text")]
    StrayMarkup(u64),

    /// `</` without a name, or `<!` that is not a comment, CDATA or DOCTYPE
    #[error("unrecognised markup at byte {0} skipped")]
    InvalidMarkup(u64),

    /// Attribute list that needed repair
    #[error("malformed attribute in <{tag}>: {reason}")]
    MalformedAttribute { tag: String, reason: &'static str },

    /// End tag with no open element
    #[error("end tag </{0}> has no open element")]
    UnmatchedEndTag(String),

    /// End tag whose name differs from the element it closes
    #[error("end tag </{found}> closes <{expected}>")]
    MismatchedEndTag { expected: String, found: String },

    /// Element still open when the stream was closed
    #[error("element <{0}> left open at end of stream")]
    UnclosedElement(String),

    /// Incomplete markup thrown away (end of stream or pending limit)
    #[error("{0} bytes of incomplete markup discarded")]
    DiscardedInput(usize),

    /// Element nested deeper than the configured limit
    #[error("element <{tag}> exceeds maximum depth {limit}")]
    DepthLimit { tag: String, limit: usize },
}

/// Errors surfaced by the transcoders in strict mode
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("malformed XML: {0}")]
    Xml(#[from] Recovery),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON element is not an object")]
    NotAnObject,

    #[error("JSON element has no \"<>\" tag")]
    MissingTag,

    #[error("\"children\" of <{0}> is not an array")]
    ChildrenNotArray(String),

    #[error("{0:?} is not a valid XML name")]
    InvalidName(String),
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, TranscodeError>;
