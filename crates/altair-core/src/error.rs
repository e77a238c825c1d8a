//! Error types for altair-core.

use thiserror::Error;

/// Configuration faults. All of these are raised at construction or selection
/// time; none can occur inside the audio callback.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Hop length {0} must be a non-zero power of two")]
    InvalidHopLength(usize),

    #[error("Block length mismatch: expected {expected} samples, got {actual}")]
    BlockLengthMismatch { expected: usize, actual: usize },

    #[error("Index {index} out of range for table of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Fails with [`Error::BlockLengthMismatch`] unless `actual == expected`.
#[inline]
pub fn check_block_length(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::BlockLengthMismatch { expected, actual });
    }
    Ok(())
}
