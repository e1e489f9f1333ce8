//! Public key value API over a [`Forest`]

use ipld_core::cid::Cid;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use super::{Drawing, Forest};
use crate::{
    db::{Blockstore, Dag},
    node::Node,
    FixedHash, IndexError, Result, Vector,
};

/// Authenticated key value index.
///
/// Holds the current root identifier of a tree in a [`Forest`], the null
/// identifier when the index is empty. Every operation has an `_at` form
/// taking an explicit root, so older snapshots can be read, proven or
/// branched from. Mutations through either form adopt the resulting root.
pub struct HDIndex<S: Blockstore> {
    forest: Forest<S>,
    root: FixedHash,
}

impl<S: Blockstore> HDIndex<S> {
    /// Creates an empty index.
    pub fn new(forest: Forest<S>) -> Self {
        Self::with_root(forest, FixedHash::ZERO)
    }

    /// Creates an empty index over `store` without a block cache.
    pub fn from_store(store: S) -> Self {
        Self::new(Forest::new(Dag::new(store)))
    }

    /// Resumes an index at a known root.
    pub fn with_root(forest: Forest<S>, root: FixedHash) -> Self {
        Self { forest, root }
    }

    pub fn forest(&self) -> &Forest<S> {
        &self.forest
    }

    pub fn forest_mut(&mut self) -> &mut Forest<S> {
        &mut self.forest
    }

    pub fn root(&self) -> FixedHash {
        self.root
    }

    /// Current root as a content identifier.
    pub fn cid(&self) -> Result<Cid> {
        self.root.to_cid()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_zero()
    }

    /// Binds `key` to `value` and returns the new root.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &FixedHash, value: &T) -> Result<FixedHash> {
        let root = self.root;
        self.set_at(key, value, &root)
    }

    pub fn set_at<T: Serialize + ?Sized>(
        &mut self,
        key: &FixedHash,
        value: &T,
        root: &FixedHash,
    ) -> Result<FixedHash> {
        let pointer = self.forest.dag_mut().set(value)?;
        let next = if root.is_zero() {
            self.forest.put_node(&Node::leaf(*key, pointer))?
        } else {
            self.forest.insert(root, key, pointer)?.root()
        };
        debug!(%key, from = %root, to = %next, "set key");
        self.root = next;
        Ok(next)
    }

    /// Value bound to `key`, `None` when the key is absent.
    pub fn get<T: DeserializeOwned>(&self, key: &FixedHash) -> Result<Option<T>> {
        self.get_at(key, &self.root)
    }

    pub fn get_at<T: DeserializeOwned>(
        &self,
        key: &FixedHash,
        root: &FixedHash,
    ) -> Result<Option<T>> {
        match self.forest.vector(root, key)? {
            Some(vector) if vector.path() == *key => {
                self.forest.dag().get(&vector.pointer()).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Removes `key` and returns the new root, null once the last key is gone.
    ///
    /// Fails with [`IndexError::UnremovableKey`] when `key` is absent.
    pub fn delete(&mut self, key: &FixedHash) -> Result<FixedHash> {
        let root = self.root;
        self.delete_at(key, &root)
    }

    pub fn delete_at(&mut self, key: &FixedHash, root: &FixedHash) -> Result<FixedHash> {
        if root.is_zero() {
            return Err(IndexError::EmptyIndex);
        }
        let next = self
            .forest
            .remove(root, key)?
            .map_or(FixedHash::ZERO, |vector| vector.root());
        debug!(%key, from = %root, to = %next, "deleted key");
        self.root = next;
        Ok(next)
    }

    /// Membership proof for `key`, or a non-membership proof ending at the
    /// leaf `key` would be inserted next to.
    pub fn proof(&self, key: &FixedHash) -> Result<Vector> {
        self.proof_at(key, &self.root)
    }

    pub fn proof_at(&self, key: &FixedHash, root: &FixedHash) -> Result<Vector> {
        self.forest.vector(root, key)?.ok_or(IndexError::EmptyIndex)
    }

    /// Whether `vector` folds to the current root.
    pub fn verify(&self, vector: &Vector) -> bool {
        self.verify_at(vector, &self.root)
    }

    pub fn verify_at(&self, vector: &Vector, root: &FixedHash) -> bool {
        vector.verify(root, None, None)
    }

    /// Whether `key` is provably absent from the current root.
    pub fn excludes(&self, key: &FixedHash) -> Result<bool> {
        Ok(match self.forest.vector(&self.root, key)? {
            Some(vector) => vector.excludes(&self.root, key),
            None => true,
        })
    }

    /// `(key, pointer)` pairs in key order.
    pub fn entries(&self) -> Result<Vec<(FixedHash, FixedHash)>> {
        Ok(self
            .forest
            .leaves(&self.root)?
            .iter()
            .map(|leaf| (leaf.key(), leaf.pointer()))
            .collect())
    }

    /// Renders the tree below `root`, one node per line.
    pub fn draw(&self, root: &FixedHash) -> Result<String> {
        let mut drawing = Drawing::default();
        self.forest
            .traverse(root, &mut drawing, &mut Default::default())?;
        let mut lines = vec![root.to_hex(true)];
        lines.extend(drawing.0);
        Ok(lines.join("\n"))
    }
}

#[cfg(test)]
mod test {
    use super::HDIndex;
    use crate::{FixedHash, IndexError, MemoryBlockstore};

    fn h(s: &str) -> FixedHash {
        FixedHash::from_hex(s).unwrap()
    }

    fn index() -> HDIndex<MemoryBlockstore> {
        HDIndex::from_store(MemoryBlockstore::new())
    }

    #[test]
    fn test_hdindex_new() {
        let index = index();
        assert!(index.is_empty());
        assert_eq!(index.root(), FixedHash::ZERO);
        assert!(index.entries().unwrap().is_empty());
    }

    #[test]
    fn test_hdindex_first_key() {
        let mut index = index();
        let root = index.set(&h("2"), "two").unwrap();
        // the root of a single key index is the leaf itself
        let leaf = index.forest().node(&root).unwrap();
        assert!(leaf.is_leaf());
        assert_eq!(leaf.path(), Some(h("2")));
        assert_eq!(index.get::<String>(&h("2")).unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_hdindex_get_absent() {
        let mut index = index();
        assert_eq!(index.get::<String>(&h("1")).unwrap(), None);
        index.set(&h("2"), "two").unwrap();
        assert_eq!(index.get::<String>(&h("1")).unwrap(), None);
    }

    #[test]
    fn test_hdindex_empty_errors() {
        let mut index = index();
        assert_eq!(index.delete(&h("1")).unwrap_err(), IndexError::EmptyIndex);
        assert_eq!(index.proof(&h("1")).unwrap_err(), IndexError::EmptyIndex);
        assert!(index.excludes(&h("1")).unwrap());
    }

    #[test]
    fn test_hdindex_snapshots() {
        let mut index = index();
        let first = index.set(&h("1"), &1u64).unwrap();
        let second = index.set(&h("2"), &2u64).unwrap();
        assert_eq!(index.get_at::<u64>(&h("2"), &first).unwrap(), None);
        assert_eq!(index.get_at::<u64>(&h("2"), &second).unwrap(), Some(2));

        // branching from the older root adopts the new one
        let third = index.set_at(&h("3"), &3u64, &first).unwrap();
        assert_eq!(index.root(), third);
        assert_eq!(index.get::<u64>(&h("2")).unwrap(), None);
        assert_eq!(index.get::<u64>(&h("3")).unwrap(), Some(3));

        let proof = index.proof_at(&h("2"), &second).unwrap();
        assert!(index.verify_at(&proof, &second));
        assert!(!index.verify(&proof));
    }

    #[test]
    fn test_hdindex_with_root() {
        let mut index = index();
        index.set(&h("1"), "one").unwrap();
        let root = index.set(&h("2"), "two").unwrap();
        let HDIndex { forest, .. } = index;
        let resumed = HDIndex::with_root(forest, root);
        assert_eq!(resumed.get::<String>(&h("1")).unwrap().as_deref(), Some("one"));
    }

    #[test]
    fn test_hdindex_excludes() {
        let mut index = index();
        index.set(&h("1"), "one").unwrap();
        index.set(&h("2"), "two").unwrap();
        assert!(index.excludes(&h("3")).unwrap());
        assert!(!index.excludes(&h("2")).unwrap());
    }

    #[test]
    fn test_hdindex_entries() {
        let mut index = index();
        index.set(&h("3"), "three").unwrap();
        index.set(&h("1"), "one").unwrap();
        let keys = index
            .entries()
            .unwrap()
            .into_iter()
            .map(|(key, _)| key)
            .collect::<Vec<_>>();
        assert_eq!(keys, vec![h("1"), h("3")]);
    }

    #[test]
    fn test_hdindex_draw() {
        let mut index = index();
        index.set(&h("1"), "one").unwrap();
        let root = index.set(&h("3"), "three").unwrap();
        let drawing = index.draw(&root).unwrap();
        let lines = drawing.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], root.to_hex(true));
        assert_eq!(
            lines[1..],
            [
                " └─ 254",
                "   ├─ 0x01 0b000000|01",
                "   └─ 0x03 0b000000|11",
            ]
        );
    }

    #[test]
    fn test_hdindex_draw_nested() {
        let mut index = index();
        let root = index.set(&h("4"), "four").unwrap();
        let drawing = index.draw(&root).unwrap();
        assert_eq!(drawing.lines().nth(1), Some(" └─ 0x04 0b00000100"));

        index.set(&h("1"), "one").unwrap();
        let root = index.set(&h("3"), "three").unwrap();
        let drawing = index.draw(&root).unwrap();
        assert_eq!(
            drawing.lines().skip(1).collect::<Vec<_>>(),
            [
                " └─ 253",
                "   ├─ 254",
                "   │ ├─ 0x01 0b000000|01",
                "   │ └─ 0x03 0b000000|11",
                "   └─ 0x04 0b00000|100",
            ]
        );
    }
}
