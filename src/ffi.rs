//! C ABI
//!
//! Opaque contexts for C hosts. Each transcoder is created with an emit
//! callback receiving `(len, data)`; `data` points at `len` bytes followed
//! by a NUL and is valid only during the call.
//!
//! ```c
//! void on_json(size_t len, const char *data);
//!
//! RxjX2j *x2j = rxj_x2j_new(on_json);
//! rxj_x2j_feed(x2j, n, buf);
//! rxj_x2j_close(x2j);
//! ```
//!
//! Null contexts, null data and zero lengths are ignored. A context created
//! with a null callback accepts input and does nothing. Panics are caught
//! at the boundary and disable the context.

use crate::transcode::{Emit, JsonToXml, XmlToJson};
use std::ffi::c_char;
use std::panic::{self, AssertUnwindSafe};
use tracing::warn;

/// Emit callback: `(len, data)`, `data` NUL-terminated
pub type EmitCallback = Option<unsafe extern "C" fn(len: usize, data: *const c_char)>;

/// Emit sink that hands NUL-terminated copies to a C callback
struct CEmit {
    callback: EmitCallback,
    /// Reused for every message
    buf: Vec<u8>,
}

impl CEmit {
    fn new(callback: EmitCallback) -> Self {
        CEmit {
            callback,
            buf: Vec::new(),
        }
    }
}

impl Emit for CEmit {
    fn emit(&mut self, message: &str) {
        let Some(callback) = self.callback else { return };
        self.buf.clear();
        self.buf.extend_from_slice(message.as_bytes());
        self.buf.push(0);
        // SAFETY: buf holds len bytes plus a NUL and outlives the call
        unsafe { callback(message.len(), self.buf.as_ptr().cast()) }
    }
}

/// XML -> JSON context
pub struct RxjX2j {
    transcoder: XmlToJson<CEmit>,
    active: bool,
}

/// JSON -> XML context
pub struct RxjJ2x {
    transcoder: JsonToXml<CEmit>,
    active: bool,
}

/// Borrow `len` bytes at `data`, or None when there is nothing to read
///
/// # Safety
/// A non-null `data` must point at `len` readable bytes.
unsafe fn input<'a>(data: *const c_char, len: usize) -> Option<&'a [u8]> {
    if data.is_null() || len == 0 {
        return None;
    }
    Some(std::slice::from_raw_parts(data.cast::<u8>(), len))
}

/// Create an XML -> JSON context; release it with [`rxj_x2j_close`]
#[no_mangle]
pub extern "C" fn rxj_x2j_new(emit: EmitCallback) -> *mut RxjX2j {
    Box::into_raw(Box::new(RxjX2j {
        transcoder: XmlToJson::new(CEmit::new(emit)),
        active: emit.is_some(),
    }))
}

/// Feed the next chunk of the XML stream
///
/// # Safety
/// `ctx` must be null or come from [`rxj_x2j_new`] and not be closed.
/// `data` must be null or point at `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn rxj_x2j_feed(ctx: *mut RxjX2j, len: usize, data: *const c_char) {
    let Some(ctx) = ctx.as_mut() else { return };
    let Some(bytes) = input(data, len) else { return };
    if !ctx.active {
        return;
    }

    let transcoder = &mut ctx.transcoder;
    if panic::catch_unwind(AssertUnwindSafe(|| transcoder.feed(bytes))).is_err() {
        warn!("panic while transcoding XML, context disabled");
        ctx.active = false;
    }
}

/// Flush and release an XML -> JSON context
///
/// # Safety
/// `ctx` must be null or come from [`rxj_x2j_new`]; it is invalid afterwards.
#[no_mangle]
pub unsafe extern "C" fn rxj_x2j_close(ctx: *mut RxjX2j) {
    if ctx.is_null() {
        return;
    }
    let ctx = Box::from_raw(ctx);
    if ctx.active && panic::catch_unwind(AssertUnwindSafe(move || ctx.transcoder.close())).is_err() {
        warn!("panic while closing XML stream");
    }
}

/// Create a JSON -> XML context; release it with [`rxj_j2x_close`]
#[no_mangle]
pub extern "C" fn rxj_j2x_new(emit: EmitCallback) -> *mut RxjJ2x {
    Box::into_raw(Box::new(RxjJ2x {
        transcoder: JsonToXml::new(CEmit::new(emit)),
        active: emit.is_some(),
    }))
}

/// Convert one complete JSON message
///
/// # Safety
/// `ctx` must be null or come from [`rxj_j2x_new`] and not be closed.
/// `data` must be null or point at `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn rxj_j2x_feed(ctx: *mut RxjJ2x, len: usize, data: *const c_char) {
    let Some(ctx) = ctx.as_mut() else { return };
    let Some(bytes) = input(data, len) else { return };
    if !ctx.active {
        return;
    }

    let transcoder = &mut ctx.transcoder;
    if panic::catch_unwind(AssertUnwindSafe(|| transcoder.feed(bytes))).is_err() {
        warn!("panic while transcoding JSON, context disabled");
        ctx.active = false;
    }
}

/// Release a JSON -> XML context
///
/// # Safety
/// `ctx` must be null or come from [`rxj_j2x_new`]; it is invalid afterwards.
#[no_mangle]
pub unsafe extern "C" fn rxj_j2x_close(ctx: *mut RxjJ2x) {
    if !ctx.is_null() {
        drop(Box::from_raw(ctx));
    }
}
