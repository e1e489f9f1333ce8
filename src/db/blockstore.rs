//! Block store trait for the index
//!
//! Nodes and values are persisted as raw blocks addressed by the keccak-256
//! digest of their bytes. The identifier a store returns from `put` must be
//! that digest, as every block is referenced by it from its parents.

use std::fmt::Display;

use crate::FixedHash;

/// Thread safety marker trait
#[cfg(feature = "multi-thread")]
pub trait ThreadSafe: Send + Sync {}
#[cfg(feature = "multi-thread")]
impl<T: Send + Sync> ThreadSafe for T {}

#[cfg(not(feature = "multi-thread"))]
pub trait ThreadSafe {}
#[cfg(not(feature = "multi-thread"))]
impl<T> ThreadSafe for T {}

/// Store for raw blocks
///
/// This trait must be implemented by any storage backend used with the index.
/// Blocks are write-once: a stored block is never modified, only removed.
pub trait Blockstore: ThreadSafe {
    /// The error type for store operations
    type Error: Display;

    /// Stores a block and returns its keccak-256 digest.
    fn put(&mut self, block: Vec<u8>) -> Result<FixedHash, Self::Error>;

    /// Gets a block by digest, `None` when absent.
    fn get(&self, id: &FixedHash) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Removes a block. Removing an absent block is not an error.
    fn remove(&mut self, id: &FixedHash) -> Result<(), Self::Error>;

    /// Size of a stored block, `None` when absent.
    fn stat(&self, id: &FixedHash) -> Result<Option<usize>, Self::Error>;
}
