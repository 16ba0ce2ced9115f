//! XML Reader Module
//!
//! - PushReader: incremental reader fed arbitrary chunks of a byte stream,
//!   dispatching SAX events as soon as each token is complete

pub mod push;

pub use push::PushReader;
