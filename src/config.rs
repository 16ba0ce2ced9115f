//! Transcoder Configuration
//!
//! Shared by both directions. Every field has a default, so a partial
//! JSON document (or none at all) yields a working configuration.

use serde::{Deserialize, Serialize};

/// Default maximum element nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Default cap on bytes held for a single unterminated construct
pub const DEFAULT_MAX_PENDING_BYTES: usize = 1 << 20;

/// Default initial capacity of reusable buffers
pub const DEFAULT_INITIAL_CAPACITY: usize = 4096;

/// Options controlling recovery policy and resource bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscoderConfig {
    /// Return recovered defects as errors instead of dropping silently
    pub strict: bool,
    /// Elements nested deeper than this are skipped with their subtree
    pub max_depth: usize,
    /// Unterminated markup longer than this is discarded
    pub max_pending_bytes: usize,
    /// Initial capacity of the reusable string buffers
    pub initial_capacity: usize,
    /// Reject tag and attribute names that are not XML names (JSON -> XML)
    pub validate_names: bool,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        TranscoderConfig {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_pending_bytes: DEFAULT_MAX_PENDING_BYTES,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            validate_names: false,
        }
    }
}

impl TranscoderConfig {
    /// Strict configuration: defects become errors and names are validated
    pub fn strict() -> Self {
        TranscoderConfig {
            strict: true,
            validate_names: true,
            ..Self::default()
        }
    }

    /// Load a configuration from JSON text; missing fields take defaults
    pub fn from_json_str(text: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
