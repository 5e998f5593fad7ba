// Chunk: docs/chunks/gap_container - Generic gap container foundation

//! Error type shared by the container and the text buffer.

use thiserror::Error;

/// Errors reported by buffer operations.
///
/// Search misses are not errors; they are reported through
/// [`FindResult`](crate::FindResult). `InvalidPattern` is produced while
/// compiling a pattern and is downgraded to a not-found result by the
/// public search API.
#[derive(Debug, Error)]
pub enum BufferError {
    /// A logical index or position lies outside the valid range.
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    /// A search pattern failed to compile.
    #[error("invalid search pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The requested capacity does not fit in the address space.
    #[error("capacity overflow")]
    CapacityOverflow,

    /// The allocation strategy could not provide a block.
    #[error("allocation of {bytes} bytes failed")]
    AllocFailed { bytes: usize },

    /// Reading from or writing to a byte stream failed.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),
}

impl BufferError {
    pub(crate) fn out_of_range(index: usize, len: usize) -> Self {
        BufferError::OutOfRange { index, len }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = BufferError> = std::result::Result<T, E>;
