//! ghostclass - class-file payload concealment engine
//!
//! Conceals an opaque byte string inside a compiled Java class file so that
//! the result stays structurally well-formed, passes the VM's verifier, and
//! loads and executes identically to the original. A companion operation
//! recovers the payload bit-for-bit.
//!
//! ## Architecture
//!
//! - **classfile**: round-trippable codec; untouched sections serialize back
//!   byte-for-byte
//! - **sbox**: payload <-> fake substitution table with an implicit length
//!   signature and CRC32
//! - **conceal**: the two strategies - a `GhostPayload` class attribute, or
//!   S-Box smearing through two injected static fields and a synthesized
//!   class-initializer prefix
//! - **verify**: structural checks plus the host-VM runtime gateway
//!
//! ```text
//! payload -> (S-Box encode) -> patch class tree -> serialize -> verify
//! class bytes -> parse -> locate attribute | simulate initializer -> payload
//! ```
//!
//! Every operation is a pure function on byte slices; the only process-wide
//! state is the operating system's random source.

pub mod classfile;
pub mod common;
pub mod conceal;
pub mod sbox;
pub mod verify;

pub use common::error::{Error, Result};
pub use conceal::{ConcealMode, RevealMode};

/// Conceal `payload` in `class_bytes` as a class-level `GhostPayload`
/// attribute. Deterministic in its inputs; an existing container is replaced.
pub fn conceal_attribute(class_bytes: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    conceal::attribute::conceal(class_bytes, payload)
}

/// Conceal `payload` in `class_bytes` by S-Box smearing. Payloads beyond
/// 1012 bytes are rejected with [`Error::PayloadTooLarge`]. The output is
/// structurally verified before it is returned.
pub fn conceal_sbox(class_bytes: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    conceal::sbox::conceal(class_bytes, payload)
}

/// Conceal `payload` with an explicitly chosen strategy.
pub fn conceal(class_bytes: &[u8], payload: &[u8], mode: ConcealMode) -> Result<Vec<u8>> {
    conceal::conceal(class_bytes, payload, mode)
}

/// Recover a payload concealed by [`conceal_attribute`].
pub fn reveal_attribute(class_bytes: &[u8]) -> Result<Vec<u8>> {
    conceal::attribute::reveal(class_bytes)
}

/// Recover a payload concealed by [`conceal_sbox`].
pub fn reveal_sbox(class_bytes: &[u8]) -> Result<Vec<u8>> {
    conceal::sbox::reveal(class_bytes)
}

/// Recover a payload trying S-Box first, then the attribute container. Only
/// a parse failure of the carrier itself is terminal; any decode-level
/// failure falls through to the next strategy.
pub fn reveal_auto(class_bytes: &[u8]) -> Result<Vec<u8>> {
    conceal::reveal(class_bytes, RevealMode::Auto)
}

/// Recover a payload with an explicitly chosen strategy.
pub fn reveal(class_bytes: &[u8], mode: RevealMode) -> Result<Vec<u8>> {
    conceal::reveal(class_bytes, mode)
}
