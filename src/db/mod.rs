mod blockstore;
mod dag;
mod memory;

pub use blockstore::{Blockstore, ThreadSafe};
pub use dag::Dag;
pub use memory::MemoryBlockstore;
