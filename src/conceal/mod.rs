//! Payload concealment strategies and mode dispatch

pub mod attribute;
pub mod clinit;
pub mod naming;
pub mod sbox;

use crate::common::error::{Error, Result};

/// How a payload is hidden in the carrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcealMode {
    /// Class-level `GhostPayload` attribute: small overhead, but visible to
    /// tools that list unknown attributes.
    Attribute,
    /// Fake S-Box table wired into the static initializer: survives
    /// dead-code elimination and reads as ordinary crypto setup.
    SboxSmear,
}

/// How a payload is searched for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealMode {
    /// S-Box first, then the attribute; first success wins.
    Auto,
    Attribute,
    Sbox,
}

pub fn conceal(class_bytes: &[u8], payload: &[u8], mode: ConcealMode) -> Result<Vec<u8>> {
    match mode {
        ConcealMode::Attribute => attribute::conceal(class_bytes, payload),
        ConcealMode::SboxSmear => sbox::conceal(class_bytes, payload),
    }
}

pub fn reveal(class_bytes: &[u8], mode: RevealMode) -> Result<Vec<u8>> {
    match mode {
        RevealMode::Attribute => attribute::reveal(class_bytes),
        RevealMode::Sbox => sbox::reveal(class_bytes),
        RevealMode::Auto => match sbox::reveal(class_bytes) {
            Ok(payload) => Ok(payload),
            // a carrier that does not even parse will not parse for the
            // attribute scan either; anything else falls through
            Err(err @ Error::Parse { .. }) => Err(err),
            Err(_) => attribute::reveal(class_bytes),
        },
    }
}
