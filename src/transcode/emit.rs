//! Emit sink
//!
//! Receives each complete message. The `&str` is borrowed from a buffer
//! the transcoder reuses, so implementations copy what they keep.

/// Consumer of complete transcoded messages
pub trait Emit {
    fn emit(&mut self, message: &str);
}

impl<F: FnMut(&str)> Emit for F {
    #[inline]
    fn emit(&mut self, message: &str) {
        self(message)
    }
}
