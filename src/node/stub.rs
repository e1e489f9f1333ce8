use std::fmt::Display;

use crate::hash::FixedHash;

/// A node known only by its identifier. Useful for folding already persisted
/// subtrees into a path without fetching and re-encoding them.
///
/// A stub keeps the key it stands in for so it can sit at the end of a
/// [`crate::Vector`]. It has no block and is never written to the store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Stub {
    nid: FixedHash,
    path: FixedHash,
}

impl Stub {
    pub fn new(nid: FixedHash, path: FixedHash) -> Self {
        Self { nid, path }
    }

    /// Returns the identifier of the node.
    pub fn nid(&self) -> FixedHash {
        self.nid
    }

    /// Returns the key this stub is positioned at.
    pub fn path(&self) -> FixedHash {
        self.path
    }
}

impl Display for Stub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Stub {{ nid: {}, path: {} }}", self.nid, self.path)
    }
}

#[cfg(test)]
mod test {
    use super::Stub;
    use crate::node::test::{a, b};

    #[test]
    fn test_stub() {
        let stub = Stub::new(a(), b());
        assert_eq!(stub.nid(), a());
        assert_eq!(stub.path(), b());
    }
}
