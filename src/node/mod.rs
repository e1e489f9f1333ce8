mod branch;
mod leaf;
mod stub;

use std::fmt::Display;

pub use branch::Branch;
pub use leaf::Leaf;
pub use stub::Stub;

use crate::hash::{FixedHash, CID_V1, DAG_CBOR, HASH_SIZE, KECCAK_256};
use crate::{IndexError, Result};

// Canonical blocks are dag-cbor. Only the handful of headers needed for the
// two node shapes are ever emitted.

/// array(2)
const LEAF_TAG: u8 = 0x82;
/// array(3)
const BRANCH_TAG: u8 = 0x83;
/// bytes(32)
const BYTES_32: [u8; 2] = [0x58, 0x20];
/// uint8 follows. Smaller integers are inlined in the header byte.
const UINT8: u8 = 0x18;
/// tag(42), bytes(37), identity multibase prefix
const LINK: [u8; 5] = [0xd8, 0x2a, 0x58, 0x25, 0x00];
const CID_PREFIX: [u8; 4] = [CID_V1, DAG_CBOR, KECCAK_256, HASH_SIZE as u8];

const LINK_SIZE: usize = LINK.len() + CID_PREFIX.len() + HASH_SIZE;
const LEAF_SIZE: usize = 1 + BYTES_32.len() + HASH_SIZE + LINK_SIZE;
/// Size of a branch whose depth fits in the header byte.
const BRANCH_SIZE: usize = 1 + 2 * LINK_SIZE + 1;

fn encode_link(block: &mut Vec<u8>, id: &FixedHash) {
    block.extend_from_slice(&LINK);
    block.extend_from_slice(&id.cid());
}

fn decode_link(bytes: &[u8]) -> Result<FixedHash> {
    if bytes.len() != LINK_SIZE || bytes[..LINK.len()] != LINK {
        return Err(IndexError::InvalidBlock("expected a link"));
    }
    let cid = &bytes[LINK.len()..];
    if !cid.starts_with(&CID_PREFIX) {
        return Err(IndexError::InvalidBlock("unsupported cid"));
    }
    Ok(FixedHash::from_slice(&cid[CID_PREFIX.len()..]))
}

/// All possible nodes in the tree.
///
/// Equality is by identifier only.
#[derive(Debug, Clone)]
pub enum Node {
    /// A key bound to a value pointer
    Leaf(Leaf),
    /// Two subtrees diverging at a depth
    Branch(Branch),
    /// An already persisted node known only by identifier
    Stub(Stub),
}

impl Node {
    /// Creates a [`Node::Leaf`].
    pub fn leaf(key: FixedHash, pointer: FixedHash) -> Self {
        Self::Leaf(Leaf::new(key, pointer))
    }

    /// Creates a [`Node::Branch`] at `depth`, placing `node` on the side
    /// selected by `path` and `sidenode` on the other.
    pub fn branch(path: &FixedHash, node: FixedHash, sidenode: FixedHash, depth: u8) -> Self {
        Self::Branch(Branch::from_path(path, node, sidenode, depth))
    }

    /// Creates a [`Node::Stub`] standing in for `nid` at key `path`.
    pub fn stub(nid: FixedHash, path: FixedHash) -> Self {
        Self::Stub(Stub::new(nid, path))
    }

    /// Decodes a canonical block. The leading byte selects the node shape.
    pub fn decode(block: &[u8]) -> Result<Self> {
        match block.first() {
            Some(&LEAF_TAG) => Leaf::decode(block).map(Self::Leaf),
            Some(&BRANCH_TAG) => Branch::decode(block).map(Self::Branch),
            _ => Err(IndexError::InvalidBlock("unrecognized leading byte")),
        }
    }

    /// Returns the identifier of the node.
    pub fn nid(&self) -> FixedHash {
        match self {
            Self::Leaf(leaf) => leaf.nid(),
            Self::Branch(branch) => branch.nid(),
            Self::Stub(stub) => stub.nid(),
        }
    }

    /// Canonical block of the node. Stubs have none.
    pub fn block(&self) -> Option<&[u8]> {
        match self {
            Self::Leaf(leaf) => Some(leaf.block()),
            Self::Branch(branch) => Some(branch.block()),
            Self::Stub(_) => None,
        }
    }

    pub fn multihash(&self) -> [u8; HASH_SIZE + 2] {
        self.nid().multihash()
    }

    pub fn cid(&self) -> [u8; HASH_SIZE + 4] {
        self.nid().cid()
    }

    /// Key of a leaf or position of a stub.
    pub fn path(&self) -> Option<FixedHash> {
        match self {
            Self::Leaf(leaf) => Some(leaf.key()),
            Self::Stub(stub) => Some(stub.path()),
            Self::Branch(_) => None,
        }
    }

    pub fn pointer(&self) -> Option<FixedHash> {
        match self {
            Self::Leaf(leaf) => Some(leaf.pointer()),
            _ => None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    pub fn is_branch(&self) -> bool {
        matches!(self, Self::Branch(_))
    }

    pub fn is_stub(&self) -> bool {
        matches!(self, Self::Stub(_))
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.nid() == other.nid()
    }
}

impl Eq for Node {}

impl Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leaf(leaf) => write!(f, "{}", leaf),
            Self::Branch(branch) => write!(f, "{}", branch),
            Self::Stub(stub) => write!(f, "{}", stub),
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::Node;
    use crate::{FixedHash, IndexError};
    use ipld_core::ipld::Ipld;

    pub(crate) fn a() -> FixedHash {
        FixedHash::new([0xaa; 32])
    }

    pub(crate) fn b() -> FixedHash {
        FixedHash::new([0xbb; 32])
    }

    pub(crate) fn link(id: FixedHash) -> Ipld {
        Ipld::Link(id.to_cid().unwrap())
    }

    pub(crate) fn dag_cbor(value: Ipld) -> Vec<u8> {
        serde_ipld_dagcbor::to_vec(&value).unwrap()
    }

    #[test]
    fn test_node_kind() {
        assert!(Node::leaf(a(), b()).is_leaf());
        assert!(!Node::leaf(a(), b()).is_branch());
        assert!(Node::branch(&FixedHash::ZERO, a(), b(), 42).is_branch());
        assert!(!Node::branch(&FixedHash::ZERO, a(), b(), 42).is_leaf());
        assert!(Node::stub(a(), b()).is_stub());
    }

    #[test]
    fn test_node_cid_and_multihash() {
        let node = Node::leaf(a(), b());
        assert_eq!(node.multihash()[2..], *node.nid().as_bytes());
        assert_eq!(node.cid()[..4], [0x01, 0x71, 0x1b, 0x20]);
    }

    #[test]
    fn test_node_decode() {
        let leaf = Node::leaf(a(), b());
        let decoded = Node::decode(leaf.block().unwrap()).unwrap();
        assert!(decoded.is_leaf());
        assert_eq!(decoded, leaf);

        let branch = Node::branch(&FixedHash::ZERO, a(), b(), 200);
        let decoded = Node::decode(branch.block().unwrap()).unwrap();
        assert!(decoded.is_branch());
        assert_eq!(decoded, branch);
    }

    #[test]
    fn test_node_decode_invalid() {
        assert_eq!(
            Node::decode(&[0xa0]).unwrap_err(),
            IndexError::InvalidBlock("unrecognized leading byte")
        );
        assert_eq!(
            Node::decode(&[]).unwrap_err(),
            IndexError::InvalidBlock("unrecognized leading byte")
        );
        let mut block = Node::leaf(a(), b()).block().unwrap().to_vec();
        block[36] = 0x2b;
        assert_eq!(
            Node::decode(&block).unwrap_err(),
            IndexError::InvalidBlock("expected a link")
        );
    }

    #[test]
    fn test_stub_equals_node_with_same_nid() {
        let leaf = Node::leaf(a(), b());
        let stub = Node::stub(leaf.nid(), a());
        assert_eq!(stub, leaf);
        assert!(stub.block().is_none());
        assert_eq!(stub.path(), Some(a()));
        assert_eq!(stub.pointer(), None);
    }
}
