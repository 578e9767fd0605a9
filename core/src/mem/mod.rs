//! Bounded heap.
//!
//! All slot storage used by the interpreter comes out of a single [`Heap`]
//! region. The region is carved from a host `bumpalo::Bump` once, at engine
//! construction, so total memory use is fixed up front.

mod heap;

#[cfg(test)]
mod heap_test;

pub use heap::{Block, Heap, HeapStats, MAX_BLOCK_SIZE, MIN_BLOCK_SIZE, NUM_CLASSES};
