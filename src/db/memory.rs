use std::{collections::HashMap, convert::Infallible};

use crate::{db::Blockstore, keccak256, FixedHash};

/// A simple in-memory block store
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockstore {
    blocks: HashMap<FixedHash, Vec<u8>>,
}

impl MemoryBlockstore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get_blocks(&self) -> &HashMap<FixedHash, Vec<u8>> {
        &self.blocks
    }
}

impl Blockstore for MemoryBlockstore {
    type Error = Infallible;

    fn put(&mut self, block: Vec<u8>) -> Result<FixedHash, Self::Error> {
        let id = keccak256(&block);
        self.blocks.insert(id, block);
        Ok(id)
    }

    fn get(&self, id: &FixedHash) -> Result<Option<Vec<u8>>, Self::Error> {
        Ok(self.blocks.get(id).cloned())
    }

    fn remove(&mut self, id: &FixedHash) -> Result<(), Self::Error> {
        self.blocks.remove(id);
        Ok(())
    }

    fn stat(&self, id: &FixedHash) -> Result<Option<usize>, Self::Error> {
        Ok(self.blocks.get(id).map(Vec::len))
    }
}

#[cfg(test)]
mod test {
    use super::Blockstore;
    use crate::{keccak256, FixedHash, MemoryBlockstore};

    #[test]
    fn test_memory_blockstore_new() {
        let store = MemoryBlockstore::new();
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_blockstore_put_get() {
        let mut store = MemoryBlockstore::new();
        let id = store.put(vec![1, 2, 3]).unwrap();
        assert_eq!(id, keccak256(&[1, 2, 3]));
        assert_eq!(store.get(&id).unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(store.stat(&id).unwrap(), Some(3));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_blockstore_put_is_idempotent() {
        let mut store = MemoryBlockstore::new();
        let first = store.put(vec![7; 10]).unwrap();
        let second = store.put(vec![7; 10]).unwrap();
        assert_eq!(first, second);
        assert_eq!(store.get_blocks().len(), 1);
    }

    #[test]
    fn test_memory_blockstore_missing() {
        let store = MemoryBlockstore::new();
        assert_eq!(store.get(&FixedHash::ZERO).unwrap(), None);
        assert_eq!(store.stat(&FixedHash::ZERO).unwrap(), None);
    }

    #[test]
    fn test_memory_blockstore_remove() {
        let mut store = MemoryBlockstore::new();
        let id = store.put(vec![1, 2, 3]).unwrap();
        store.remove(&id).unwrap();
        assert!(store.is_empty());
        store.remove(&id).unwrap();
    }
}
