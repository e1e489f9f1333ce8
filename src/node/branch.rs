use std::fmt::Display;
use std::sync::OnceLock;

use super::{decode_link, encode_link, BRANCH_SIZE, BRANCH_TAG, LINK_SIZE, UINT8};
use crate::hash::{keccak256, FixedHash};
use crate::{IndexError, Result};

/// A branch is a node that has exactly 2 children, referenced by identifier.
///
/// `depth` is the bit position at which every key below `left` and every
/// key below `right` first differ. Depths along a root to leaf path are
/// strictly increasing but need not be contiguous.
#[derive(Debug, Clone)]
pub struct Branch {
    left: FixedHash,
    right: FixedHash,
    depth: u8,
    nid: OnceLock<FixedHash>,
    block: OnceLock<Vec<u8>>,
}

impl Branch {
    pub fn new(left: FixedHash, right: FixedHash, depth: u8) -> Self {
        Self {
            left,
            right,
            depth,
            nid: OnceLock::new(),
            block: OnceLock::new(),
        }
    }

    /// Creates a branch at `depth` holding `node` on the side `path` takes
    /// and `sidenode` on the other one.
    pub fn from_path(path: &FixedHash, node: FixedHash, sidenode: FixedHash, depth: u8) -> Self {
        if path.depth_bit(depth) == 0 {
            Self::new(node, sidenode, depth)
        } else {
            Self::new(sidenode, node, depth)
        }
    }

    pub fn left(&self) -> FixedHash {
        self.left
    }

    pub fn right(&self) -> FixedHash {
        self.right
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    /// Returns the left and right children of this branch.
    pub fn children(&self) -> (FixedHash, FixedHash) {
        (self.left, self.right)
    }

    /// Child followed by `path`.
    pub fn next(&self, path: &FixedHash) -> FixedHash {
        if path.depth_bit(self.depth) == 0 {
            self.left
        } else {
            self.right
        }
    }

    /// Child not followed by `path`.
    pub fn sidenode(&self, path: &FixedHash) -> FixedHash {
        if path.depth_bit(self.depth) == 0 {
            self.right
        } else {
            self.left
        }
    }

    /// Canonical encoding: `[link(left), link(right), uint(depth)]`.
    pub fn block(&self) -> &[u8] {
        self.block.get_or_init(|| {
            let mut block = Vec::with_capacity(BRANCH_SIZE + 1);
            block.push(BRANCH_TAG);
            encode_link(&mut block, &self.left);
            encode_link(&mut block, &self.right);
            if self.depth >= UINT8 {
                block.push(UINT8);
            }
            block.push(self.depth);
            block
        })
    }

    /// Returns the identifier of the node, hashing the block on first call.
    pub fn nid(&self) -> FixedHash {
        *self.nid.get_or_init(|| keccak256(self.block()))
    }

    pub(super) fn decode(block: &[u8]) -> Result<Self> {
        if block.len() < BRANCH_SIZE {
            return Err(IndexError::InvalidBlock("unexpected branch length"));
        }
        let left = decode_link(&block[1..1 + LINK_SIZE])?;
        let right = decode_link(&block[1 + LINK_SIZE..1 + 2 * LINK_SIZE])?;
        let depth = match &block[BRANCH_SIZE - 1..] {
            [UINT8, depth] if *depth >= UINT8 => *depth,
            [depth] if *depth < UINT8 => *depth,
            _ => return Err(IndexError::InvalidBlock("malformed branch depth")),
        };
        Ok(Self {
            left,
            right,
            depth,
            nid: OnceLock::new(),
            block: OnceLock::from(block.to_vec()),
        })
    }
}

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.nid() == other.nid()
    }
}

impl Eq for Branch {}

impl Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Branch {{ depth: {}, left: {}, right: {}, nid: {} }}",
            self.depth,
            self.left,
            self.right,
            self.nid()
        )
    }
}

#[cfg(test)]
mod test {
    use super::Branch;
    use crate::node::test::{a, b, dag_cbor, link};
    use crate::{FixedHash, IndexError};
    use ipld_core::ipld::Ipld;

    fn expected_block(depth: u8) -> Vec<u8> {
        let fields = vec![link(a()), link(b()), Ipld::Integer(depth.into())];
        dag_cbor(Ipld::List(fields))
    }

    #[test]
    fn test_branch_block_matches_dag_cbor() {
        for depth in [0, 16, 23, 24, 42, 255] {
            let branch = Branch::new(a(), b(), depth);
            assert_eq!(branch.block(), expected_block(depth).as_slice());
        }
        assert_eq!(Branch::new(a(), b(), 23).block().len(), 84);
        assert_eq!(Branch::new(a(), b(), 24).block().len(), 85);
    }

    #[test]
    fn test_branch_nid_of_null_branch() {
        let branch = Branch::new(FixedHash::ZERO, FixedHash::ZERO, 42);
        let expected = dag_cbor(Ipld::List(vec![
            link(FixedHash::ZERO),
            link(FixedHash::ZERO),
            Ipld::Integer(42),
        ]));
        assert_eq!(branch.nid(), crate::keccak256(&expected));
    }

    #[test]
    fn test_branch_decode() {
        for depth in [16, 23, 24, 42] {
            let decoded = Branch::decode(&expected_block(depth)).unwrap();
            assert_eq!(decoded.children(), (a(), b()));
            assert_eq!(decoded.depth(), depth);
        }
    }

    #[test]
    fn test_branch_decode_non_canonical_depth() {
        let mut block = Branch::new(a(), b(), 16).block().to_vec();
        block.pop();
        block.extend_from_slice(&[0x18, 16]);
        assert_eq!(
            Branch::decode(&block).unwrap_err(),
            IndexError::InvalidBlock("malformed branch depth")
        );
        let mut block = Branch::new(a(), b(), 42).block().to_vec();
        block.pop();
        assert_eq!(
            Branch::decode(&block).unwrap_err(),
            IndexError::InvalidBlock("malformed branch depth")
        );
    }

    #[test]
    fn test_branch_from_path() {
        let mut path = FixedHash::ZERO;
        let branch = Branch::from_path(&path, a(), b(), 10);
        assert_eq!(branch.children(), (a(), b()));
        assert_eq!(branch.next(&path), a());
        assert_eq!(branch.sidenode(&path), b());

        path.on(10).unwrap();
        let branch = Branch::from_path(&path, a(), b(), 10);
        assert_eq!(branch.children(), (b(), a()));
        assert_eq!(branch.next(&path), a());
        assert_eq!(branch.sidenode(&path), b());
    }
}
