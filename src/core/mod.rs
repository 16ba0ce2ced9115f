//! Core XML parsing primitives
//!
//! This module contains the fundamental building blocks for XML parsing:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Tokenizer: Resumable, lenient state machine for XML token extraction
//! - Entities: XML entity decoding with Cow (zero-copy when possible)
//! - Attributes: Attribute parsing and extraction
//! - Escape: JSON and XML output escaping into reusable buffers

pub mod attributes;
pub mod entities;
pub mod escape;
pub mod scanner;
pub mod tokenizer;
