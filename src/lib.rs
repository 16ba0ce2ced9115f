//! RustyXJ - Streaming XML <-> JSON tree transcoding
//!
//! Two independent transcoders behind an emit callback:
//! - [`XmlToJson`]: fed arbitrary chunks of an XML byte stream, emits one
//!   JSON object for every top-level element as soon as it closes
//! - [`JsonToXml`]: fed one complete JSON message at a time, emits the
//!   matching XML fragment
//!
//! JSON element shape:
//!
//! ```text
//! {"<>":"tag", "@attr":"value", ..., "children":[...], "$":"text"}
//! ```
//!
//! Malformed XML is recovered from rather than rejected, and JSON
//! messages without a tag are dropped. [`TranscoderConfig::strict`]
//! turns both into errors.
//!
//! Modules:
//! - core: scanner, tokenizer, entities, attributes, escaping
//! - reader: push reader driving a SAX handler
//! - transcode: the two transcoders
//! - strategy: parallel batch JSON -> XML
//! - ffi: C ABI

pub mod config;
pub mod core;
pub mod dom;
pub mod error;
pub mod ffi;
pub mod reader;
pub mod sax;
pub mod strategy;
pub mod transcode;

pub use config::TranscoderConfig;
pub use error::{Recovery, Result, TranscodeError};
pub use strategy::json_to_xml_batch;
pub use transcode::{Emit, JsonToXml, XmlToJson};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

    pub struct TrackingAllocator;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    fn record_peak(current: usize) {
        let mut peak = PEAK_ALLOCATED.load(Ordering::Relaxed);
        while current > peak {
            match PEAK_ALLOCATED.compare_exchange_weak(peak, current, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(_) => break,
                Err(p) => peak = p,
            }
        }
    }

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = UNDERLYING.alloc(layout);
            if !ptr.is_null() {
                record_peak(ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed) + layout.size());
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            UNDERLYING.dealloc(ptr, layout)
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator = tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Allocation counters, live only with the `memory_tracking` feature
///
/// Useful for checking that a long-running stream keeps steady-state
/// memory flat. Without the feature every accessor returns zero.
pub mod memory {
    #[cfg(feature = "memory_tracking")]
    use super::tracking::{ALLOCATED, PEAK_ALLOCATED};
    #[cfg(feature = "memory_tracking")]
    use std::sync::atomic::Ordering;

    /// Bytes currently allocated
    #[cfg(feature = "memory_tracking")]
    pub fn allocated() -> usize {
        ALLOCATED.load(Ordering::SeqCst)
    }

    /// Highest allocation seen since start or the last reset
    #[cfg(feature = "memory_tracking")]
    pub fn peak() -> usize {
        PEAK_ALLOCATED.load(Ordering::SeqCst)
    }

    /// Reset the peak to the current value, returning (current, old peak)
    #[cfg(feature = "memory_tracking")]
    pub fn reset_peak() -> (usize, usize) {
        let current = ALLOCATED.load(Ordering::SeqCst);
        let peak = PEAK_ALLOCATED.swap(current, Ordering::SeqCst);
        (current, peak)
    }

    #[cfg(not(feature = "memory_tracking"))]
    pub fn allocated() -> usize {
        0
    }

    #[cfg(not(feature = "memory_tracking"))]
    pub fn peak() -> usize {
        0
    }

    #[cfg(not(feature = "memory_tracking"))]
    pub fn reset_peak() -> (usize, usize) {
        (0, 0)
    }

}
