use thiserror::Error;

use crate::classfile::constpool::ConstPoolError;

/// Result type for ghostclass operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the concealment engine.
///
/// The set is closed: every operation in the crate surfaces one of these
/// kinds, and none of them is swallowed on the way up.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Class file parse error: {message}")]
    Parse { message: String },

    #[error("Constant pool full: {current} entries, adding {adding} (max {max})")]
    PoolFull { current: usize, adding: usize, max: usize },

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Verification failed: {details}")]
    VerifyFailed { details: String },

    #[error("No concealed payload found")]
    NoPayload,

    #[error("Invalid payload magic: expected {expected:#010X}, found {found:#010X}")]
    BadMagic { expected: u32, found: u32 },

    #[error("Invalid payload length: {length} (available: {available})")]
    BadLength { length: i64, available: usize },

    #[error("Payload checksum mismatch: stored {stored:#010X}, computed {computed:#010X}")]
    BadChecksum { stored: u32, computed: u32 },

    #[error("Invalid S-Box table size: {size}")]
    BadSize { size: usize },

    #[error("Payload container corrupted: {message}")]
    Corrupted { message: String },
}

impl Error {
    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse { message: message.into() }
    }

    /// Create a corrupted-container error
    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::Corrupted { message: message.into() }
    }
}

impl From<ConstPoolError> for Error {
    fn from(err: ConstPoolError) -> Self {
        let ConstPoolError::SizeLimitExceeded { current, adding, max } = err;
        Self::PoolFull { current, adding, max }
    }
}
