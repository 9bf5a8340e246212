//! Error type shared by every codec in the crate.

use thiserror::Error;

/// Errors returned by the codecs, the chunk drivers and their collaborators.
///
/// Uncorrectable bit patterns are not errors: a decoder that cannot
/// repair a block still produces output and reports it through
/// [`ChunkReport`](crate::ecc::ChunkReport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A parameter or argument the codec cannot work with
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A length exceeding what the operation supports
    #[error("input too large: {length} exceeds the maximum of {max_length}")]
    InputTooLarge { length: usize, max_length: usize },

    /// A caller-owned output buffer shorter than the size formula requires
    #[error("output buffer too small: {needed} bytes needed, {available} available")]
    BufferTooSmall { needed: usize, available: usize },

    /// A bit index outside the addressed buffer
    #[error("bit {bit} is out of range for a {len}-bit buffer")]
    BitOutOfRange { bit: usize, len: usize },

    /// The scratch region or the global allocator could not satisfy a request
    #[error("out of memory: requested {requested} bytes, {available} available")]
    OutOfMemory { requested: usize, available: usize },
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }
}

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
