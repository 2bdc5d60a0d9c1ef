//! Crate-wide error type and shared definitions

pub mod error;

pub use error::{Error, Result};
