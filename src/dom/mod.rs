//! DOM Module - borrowed views over JSON element trees
//!
//! The JSON side of the transcoder arrives as a whole message, so it is
//! parsed into a `serde_json::Value` and read through [`ElementView`]
//! without copying keys or values.

pub mod element;

pub use element::{write_scalar, ElementView};
