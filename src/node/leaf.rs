use std::fmt::Display;
use std::sync::OnceLock;

use super::{decode_link, encode_link, BYTES_32, LEAF_SIZE, LEAF_TAG};
use crate::hash::{keccak256, FixedHash};
use crate::{IndexError, Result};

/// A Leaf is a node that has no children and binds a `key` to the
/// identifier of a value held in the value store (`pointer`).
///
/// The identifier and the canonical block are computed on first use and
/// cached for the lifetime of the leaf.
#[derive(Debug, Clone)]
pub struct Leaf {
    key: FixedHash,
    pointer: FixedHash,
    nid: OnceLock<FixedHash>,
    block: OnceLock<Vec<u8>>,
}

impl Leaf {
    pub fn new(key: FixedHash, pointer: FixedHash) -> Self {
        Self {
            key,
            pointer,
            nid: OnceLock::new(),
            block: OnceLock::new(),
        }
    }

    pub fn key(&self) -> FixedHash {
        self.key
    }

    pub fn pointer(&self) -> FixedHash {
        self.pointer
    }

    /// Canonical encoding: `[bytes(key), link(pointer)]`.
    pub fn block(&self) -> &[u8] {
        self.block.get_or_init(|| {
            let mut block = Vec::with_capacity(LEAF_SIZE);
            block.push(LEAF_TAG);
            block.extend_from_slice(&BYTES_32);
            block.extend_from_slice(self.key.as_bytes());
            encode_link(&mut block, &self.pointer);
            block
        })
    }

    /// Returns the identifier of the node, hashing the block on first call.
    pub fn nid(&self) -> FixedHash {
        *self.nid.get_or_init(|| keccak256(self.block()))
    }

    pub(super) fn decode(block: &[u8]) -> Result<Self> {
        if block.len() != LEAF_SIZE {
            return Err(IndexError::InvalidBlock("unexpected leaf length"));
        }
        if block[1..3] != BYTES_32 {
            return Err(IndexError::InvalidBlock("leaf key is not a 32 byte string"));
        }
        let key = FixedHash::from_slice(&block[3..35]);
        let pointer = decode_link(&block[35..])?;
        Ok(Self {
            key,
            pointer,
            nid: OnceLock::new(),
            block: OnceLock::from(block.to_vec()),
        })
    }
}

impl PartialEq for Leaf {
    fn eq(&self, other: &Self) -> bool {
        self.nid() == other.nid()
    }
}

impl Eq for Leaf {}

impl Display for Leaf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Leaf {{ key: {}, pointer: {}, nid: {} }}",
            self.key,
            self.pointer,
            self.nid()
        )
    }
}
