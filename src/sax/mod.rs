//! SAX (Simple API for XML) Module
//!
//! Event-based delivery of parsed XML to a consumer.
//!
//! ## Architecture
//!
//! ```text
//! bytes ---> PushReader ---> SaxHandler
//!                              |-- TreeSink (XML -> JSON)
//!                              `-- EventCollector (owned events)
//! ```
//!
//! ## Event Types
//!
//! - `StartElement` - Element opening tag with name and attributes
//! - `EndElement` - Element closing tag
//! - `Characters` - Character data (entities decoded) and CDATA content
//!
//! Problems the reader repaired are reported through
//! [`SaxHandler::recovered`], which handlers may ignore.

pub mod collector;
pub mod events;
pub mod handler;

pub use collector::EventCollector;
pub use events::SaxEvent;
pub use handler::SaxHandler;
