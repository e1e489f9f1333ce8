//! Authenticated key value index
//!
//! This crate provides a history independent, content addressed key value
//! index built on a path compressed binary Merkle trie over 256-bit keys.
//!
//! The index supports:
//! - Deterministic roots: the same set of entries always yields the same root
//! - Membership and non-membership proofs as compact [`Vector`]s
//! - Reads, proofs and mutations against any historical root
//! - Flexible storage backend through the [`Blockstore`] trait
//!
//! Nodes are encoded as dag-cbor and addressed by the keccak-256 digest of
//! their encoding, so every root is also a CIDv1 (`dag-cbor`, `keccak-256`).

mod db;
mod error;
mod hash;
mod node;
mod tree;
mod vector;

pub use db::{Blockstore, Dag, MemoryBlockstore, ThreadSafe};
pub use error::{IndexError, Result};
pub use hash::{keccak256, FixedHash, BITS, HASH_SIZE};
pub use ipld_core::cid::Cid;
pub use node::{Branch, Leaf, Node, Stub};
pub use tree::{Forest, HDIndex, Visitor};
pub use vector::Vector;
