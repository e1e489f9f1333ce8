//! Node persistence and tree walks over a [`Dag`]

use tracing::trace;

use super::{Leaves, Visitor};
use crate::{
    db::{Blockstore, Dag},
    node::{Branch, Leaf, Node},
    FixedHash, IndexError, Result, Vector,
};

/// A forest of content addressed trees sharing one block store.
///
/// The forest holds no root of its own: every operation takes the root
/// identifier of the tree it works on, so any historical root stays
/// readable for as long as its blocks are kept.
pub struct Forest<S: Blockstore> {
    dag: Dag<S>,
}

impl<S: Blockstore> Forest<S> {
    pub fn new(dag: Dag<S>) -> Self {
        Self { dag }
    }

    /// Creates a forest over `store` without a block cache.
    pub fn from_store(store: S) -> Self {
        Self::new(Dag::new(store))
    }

    pub fn dag(&self) -> &Dag<S> {
        &self.dag
    }

    pub fn dag_mut(&mut self) -> &mut Dag<S> {
        &mut self.dag
    }

    /// Fetches and decodes the node `nid`.
    pub fn node(&self, nid: &FixedHash) -> Result<Node> {
        let block = self.dag.get_block(nid)?;
        trace!(%nid, size = block.len(), "fetched node");
        Node::decode(&block)
    }

    /// Persists the block of `node`. Stubs are already stored and are skipped.
    pub fn put_node(&mut self, node: &Node) -> Result<FixedHash> {
        let Some(block) = node.block() else {
            return Ok(node.nid());
        };
        let nid = self.dag.put_block(block.to_vec())?;
        trace!(%nid, size = block.len(), "stored node");
        Ok(nid)
    }

    /// Persists every node on the path of `vector`.
    pub fn sync(&mut self, vector: &Vector) -> Result<()> {
        for node in vector.nodes() {
            self.put_node(node)?;
        }
        Ok(())
    }

    /// Walk down the tree from `root` following `path`.
    /// * `for_each` - Closure that is executed at each branch passed, shallowest first.
    ///
    /// Returns the leaf the walk ends on, whose key may differ from `path`.
    pub fn walk(
        &self,
        root: &FixedHash,
        path: &FixedHash,
        mut for_each: impl FnMut(&Branch) -> Result<()>,
    ) -> Result<Leaf> {
        let mut current = self.node(root)?;
        loop {
            current = match current {
                Node::Leaf(leaf) => return Ok(leaf),
                Node::Branch(branch) => {
                    for_each(&branch)?;
                    self.node(&branch.next(path))?
                }
                Node::Stub(_) => return Err(IndexError::InvalidBlock("unexpected stub")),
            };
        }
    }

    /// Builds the vector from `root` towards `target`.
    ///
    /// Returns `None` for the null root.
    pub fn vector(&self, root: &FixedHash, target: &FixedHash) -> Result<Option<Vector>> {
        if root.is_zero() {
            return Ok(None);
        }
        let mut markers = FixedHash::ZERO;
        let mut waypoints = Vec::new();
        let leaf = self.walk(root, target, |branch| {
            markers.on(branch.depth().into())?;
            waypoints.push(branch.sidenode(target));
            Ok(())
        })?;
        Vector::new(leaf.key(), leaf.pointer(), markers, waypoints).map(Some)
    }

    /// Inserts or updates `(path, pointer)` below `root` and persists the
    /// resulting path.
    pub fn insert(
        &mut self,
        root: &FixedHash,
        path: &FixedHash,
        pointer: FixedHash,
    ) -> Result<Vector> {
        let vector = self
            .vector(root, path)?
            .ok_or(IndexError::EmptyIndex)?
            .insert(path, pointer)?;
        self.sync(&vector)?;
        Ok(vector)
    }

    /// Removes `path` from below `root` and persists the resulting path.
    ///
    /// Returns `None` when `path` was the only key.
    pub fn remove(&mut self, root: &FixedHash, path: &FixedHash) -> Result<Option<Vector>> {
        let vector = self.vector(root, path)?.ok_or(IndexError::EmptyIndex)?;
        match vector.remove(path)? {
            Some(vector) => {
                self.sync(&vector)?;
                Ok(Some(vector))
            }
            None => Ok(None),
        }
    }

    /// Depth first traversal of every node below `root`.
    pub fn traverse<V: Visitor>(
        &self,
        root: &FixedHash,
        visitor: &mut V,
        cursor: &mut V::Cursor,
    ) -> Result<()> {
        if root.is_zero() {
            return Ok(());
        }
        match self.node(root)? {
            Node::Branch(branch) => {
                visitor.pre_order(&branch, cursor);
                self.traverse(&branch.left(), visitor, &mut cursor.clone())?;
                visitor.in_order(&branch, cursor);
                self.traverse(&branch.right(), visitor, &mut cursor.clone())?;
                visitor.post_order(&branch, cursor);
            }
            Node::Leaf(leaf) => visitor.leaf(&leaf, cursor),
            Node::Stub(_) => {}
        }
        Ok(())
    }

    /// All leaves below `root` in key order.
    pub fn leaves(&self, root: &FixedHash) -> Result<Vec<Leaf>> {
        let mut leaves = Leaves::default();
        self.traverse(root, &mut leaves, &mut ())?;
        Ok(leaves.0)
    }
}
