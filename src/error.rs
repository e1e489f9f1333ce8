//! Error types for the authenticated index

use thiserror::Error;

use crate::FixedHash;

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Error type for index, tree and store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// Block was not found in the store
    #[error("block {0} not found")]
    NotFound(FixedHash),
    /// Block bytes are not a canonical node encoding
    #[error("invalid block: {0}")]
    InvalidBlock(&'static str),
    /// Bit index outside of 0..=255
    #[error("bit index {0} out of range")]
    IndexOutOfRange(usize),
    /// Insert attempted on a vector that does not contain the path
    #[error("vector does not contain path {0}")]
    PathNotContained(FixedHash),
    /// Remove requested for a path that is not the vector endpoint
    #[error("unable to remove key {0}")]
    UnremovableKey(FixedHash),
    /// Delete or proof requested against an empty root
    #[error("index is empty")]
    EmptyIndex,
    /// Key or identifier is not a valid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Serialized vector is truncated or inconsistent
    #[error("malformed vector: {0}")]
    MalformedVector(&'static str),
    /// Value could not be encoded or decoded
    #[error("codec error: {0}")]
    Codec(String),
    /// Failure reported by the block store
    #[error("store error: {0}")]
    Store(String),
}

impl IndexError {
    pub(crate) fn store(err: impl std::fmt::Display) -> Self {
        Self::Store(err.to_string())
    }

    pub(crate) fn codec(err: impl std::fmt::Display) -> Self {
        Self::Codec(err.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::IndexError;
    use crate::FixedHash;

    #[test]
    fn test_error_display() {
        let key = FixedHash::from_hex("0x01").unwrap();
        assert_eq!(
            IndexError::UnremovableKey(key).to_string(),
            "unable to remove key 0x0000000000000000000000000000000000000000000000000000000000000001"
        );
        assert_eq!(IndexError::EmptyIndex.to_string(), "index is empty");
        assert_eq!(
            IndexError::IndexOutOfRange(256).to_string(),
            "bit index 256 out of range"
        );
    }
}
