//! Structured value store on top of a [`Blockstore`].
//!
//! Values are encoded as dag-cbor, so the pointer a leaf holds is the
//! keccak-256 digest of the canonical encoding of its value. An optional
//! bounded cache keeps recently written or read blocks in memory.

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::{db::Blockstore, FixedHash, IndexError, Result};

pub struct Dag<S: Blockstore> {
    blocks: S,
    cache: Option<Mutex<LruCache<FixedHash, Vec<u8>>>>,
}

impl<S: Blockstore> Dag<S> {
    /// Creates a value store without a cache.
    pub fn new(blocks: S) -> Self {
        Self {
            blocks,
            cache: None,
        }
    }

    /// Creates a value store keeping up to `capacity` blocks in memory.
    pub fn with_cache(blocks: S, capacity: NonZeroUsize) -> Self {
        Self {
            blocks,
            cache: Some(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub fn blocks(&self) -> &S {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut S {
        &mut self.blocks
    }

    /// Number of blocks currently cached.
    pub fn cached(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.lock().len())
    }

    /// Stores a raw block.
    pub fn put_block(&mut self, block: Vec<u8>) -> Result<FixedHash> {
        let copy = self.cache.is_some().then(|| block.clone());
        let id = self.blocks.put(block).map_err(IndexError::store)?;
        if let (Some(cache), Some(block)) = (&self.cache, copy) {
            cache.lock().put(id, block);
        }
        Ok(id)
    }

    /// Gets a raw block, failing with [`IndexError::NotFound`] when absent.
    pub fn get_block(&self, id: &FixedHash) -> Result<Vec<u8>> {
        if let Some(cache) = &self.cache {
            if let Some(block) = cache.lock().get(id) {
                debug!(%id, "block cache hit");
                return Ok(block.clone());
            }
        }
        let block = self
            .blocks
            .get(id)
            .map_err(IndexError::store)?
            .ok_or(IndexError::NotFound(*id))?;
        if let Some(cache) = &self.cache {
            cache.lock().put(*id, block.clone());
        }
        Ok(block)
    }

    pub fn has_block(&self, id: &FixedHash) -> Result<bool> {
        if let Some(cache) = &self.cache {
            if cache.lock().contains(id) {
                return Ok(true);
            }
        }
        Ok(self.blocks.stat(id).map_err(IndexError::store)?.is_some())
    }

    pub fn remove_block(&mut self, id: &FixedHash) -> Result<()> {
        if let Some(cache) = &self.cache {
            cache.lock().pop(id);
        }
        self.blocks.remove(id).map_err(IndexError::store)
    }

    /// Encodes and stores a value, returning its pointer.
    pub fn set<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<FixedHash> {
        let block = serde_ipld_dagcbor::to_vec(value).map_err(IndexError::codec)?;
        self.put_block(block)
    }

    /// Loads and decodes the value behind a pointer.
    pub fn get<T: DeserializeOwned>(&self, id: &FixedHash) -> Result<T> {
        let block = self.get_block(id)?;
        serde_ipld_dagcbor::from_slice(&block).map_err(IndexError::codec)
    }
}

#[cfg(test)]
mod test {
    use std::collections::BTreeMap;
    use std::num::NonZeroUsize;

    use super::Dag;
    use crate::db::Blockstore;
    use crate::{FixedHash, IndexError, MemoryBlockstore};
    use hex_literal::hex;

    #[test]
    fn test_dag_set_get() {
        let mut dag = Dag::new(MemoryBlockstore::new());
        let id = dag.set("hello world").unwrap();
        assert_eq!(dag.get::<String>(&id).unwrap(), "hello world");
        assert_eq!(dag.cached(), 0);
    }

    #[test]
    fn test_dag_encoding_is_dag_cbor() {
        let mut dag = Dag::new(MemoryBlockstore::new());
        let value = BTreeMap::from([("hello".to_string(), "world".to_string())]);
        let id = dag.set(&value).unwrap();
        assert_eq!(
            dag.get_block(&id).unwrap(),
            hex!("a16568656c6c6f65776f726c64").to_vec()
        );
    }

    #[test]
    fn test_dag_missing_value() {
        let dag = Dag::new(MemoryBlockstore::new());
        assert_eq!(
            dag.get::<String>(&FixedHash::ZERO).unwrap_err(),
            IndexError::NotFound(FixedHash::ZERO)
        );
    }

    #[test]
    fn test_dag_wrong_type() {
        let mut dag = Dag::new(MemoryBlockstore::new());
        let id = dag.set(&42u64).unwrap();
        assert!(matches!(
            dag.get::<String>(&id).unwrap_err(),
            IndexError::Codec(_)
        ));
    }

    #[test]
    fn test_dag_cache_serves_reads() {
        let mut dag = Dag::with_cache(MemoryBlockstore::new(), NonZeroUsize::new(2).unwrap());
        let id = dag.set("cached").unwrap();
        assert_eq!(dag.cached(), 1);
        // drop the block from the backing store only
        dag.blocks_mut().remove(&id).unwrap();
        assert_eq!(dag.get::<String>(&id).unwrap(), "cached");
        assert!(dag.has_block(&id).unwrap());
    }

    #[test]
    fn test_dag_cache_is_bounded() {
        let mut dag = Dag::with_cache(MemoryBlockstore::new(), NonZeroUsize::new(2).unwrap());
        for value in 0u64..5 {
            dag.set(&value).unwrap();
        }
        assert_eq!(dag.cached(), 2);
        assert_eq!(dag.blocks().len(), 5);
    }

    #[test]
    fn test_dag_remove_block() {
        let mut dag = Dag::with_cache(MemoryBlockstore::new(), NonZeroUsize::new(2).unwrap());
        let id = dag.set("gone").unwrap();
        dag.remove_block(&id).unwrap();
        assert!(!dag.has_block(&id).unwrap());
        assert_eq!(
            dag.get::<String>(&id).unwrap_err(),
            IndexError::NotFound(id)
        );
    }
}
