//! Conversion Strategy Module
//!
//! - Parallel: batch JSON -> XML over many independent messages
//!
//! Streaming XML -> JSON is inherently sequential and lives in
//! [`crate::transcode::XmlToJson`].

pub mod parallel;

pub use parallel::json_to_xml_batch;
