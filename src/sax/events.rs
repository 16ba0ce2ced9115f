//! SAX Event Types
//!
//! Owned events, for consumers that want to keep what the reader
//! delivered beyond a single callback.

use crate::error::Recovery;

/// A SAX parsing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaxEvent {
    /// Start of an element
    StartElement {
        name: String,
        /// Attributes as (name, value) pairs in source order
        attributes: Vec<(String, String)>,
    },

    /// End of an element
    EndElement { name: String },

    /// Character data
    Characters(String),

    /// Malformed input that was repaired or skipped
    Recovered(Recovery),
}

impl SaxEvent {
    /// Check if this is an end element event
    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, SaxEvent::EndElement { .. })
    }

    /// Check if this reports a recovery
    #[inline]
    pub fn is_recovery(&self) -> bool {
        matches!(self, SaxEvent::Recovered(_))
    }
}
