//! SaxHandler Trait
//!
//! The seam between the push reader and whatever consumes its events.

use crate::core::attributes::Attribute;
use crate::error::Recovery;

/// Trait for handling parse events
///
/// Implement this trait to receive XML parsing events. The reader calls
/// these methods as tokens complete, passing borrowed slices that are
/// only valid for the duration of the call.
pub trait SaxHandler {
    /// Called when an element starts
    ///
    /// # Arguments
    /// * `name` - Element name, verbatim
    /// * `attrs` - Attributes in source order, values entity-decoded
    fn start_element(&mut self, name: &[u8], attrs: &[Attribute<'_>]);

    /// Called when an element ends (also right after `start_element`
    /// for a self-closing tag)
    fn end_element(&mut self, name: &[u8]);

    /// Called for character data
    ///
    /// Text arrives entity-decoded; CDATA content arrives verbatim.
    /// A text run may be split over several calls, depending on how the
    /// input was chunked; a piece never ends inside an entity reference
    /// or a UTF-8 sequence.
    fn characters(&mut self, text: &[u8]);

    /// Called when the reader repaired or skipped malformed input
    /// (optional, default does nothing)
    fn recovered(&mut self, _issue: Recovery) {}
}
