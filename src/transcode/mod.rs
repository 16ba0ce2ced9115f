//! Transcoders
//!
//! - [`XmlToJson`]: long-lived, fed arbitrary chunks of an XML stream,
//!   emits one JSON object per closed top-level element
//! - [`JsonToXml`]: fed one complete JSON message per call, emits one
//!   XML fragment
//!
//! Both deliver output through an [`Emit`] sink, synchronously, before
//! `feed` returns.

pub mod emit;
pub mod json_to_xml;
pub mod xml_to_json;

pub use emit::Emit;
pub use json_to_xml::{json_to_xml_string, JsonToXml};
pub use xml_to_json::XmlToJson;
