use core::alloc::Layout;
use core::{ptr, slice};

use bumpalo::Bump;

use crate::errors::FatalError;

/// Smallest block handed out. Every block offset is a multiple of this.
pub const MIN_BLOCK_SIZE: usize = 8;

/// Number of power-of-two size classes, `8 B ..= 32 KiB`.
pub const NUM_CLASSES: usize = 13;

/// Largest block handed out.
pub const MAX_BLOCK_SIZE: usize = MIN_BLOCK_SIZE << (NUM_CLASSES - 1);

/// Free-list terminator.
const NIL: u32 = u32::MAX;

/// Owned handle to a block inside a [`Heap`] region.
///
/// Blocks are addressed by offset, never by pointer. The handle is not
/// `Clone`: [`Heap::release`] consumes it, so a block cannot be released
/// twice. A handle is only meaningful for the heap that produced it, and
/// only until the heap is reset; releasing it after that is ignored.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Block {
    offset: u32,
    class: u8,
    epoch: u32,
}

impl Block {
    /// Byte offset of the block inside the region.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset as usize
    }

    /// Usable size in bytes (the size class, not the requested size).
    #[inline]
    pub fn size(&self) -> usize {
        class_size(self.class)
    }
}

/// Allocator counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeapStats {
    /// Region size in bytes.
    pub capacity: usize,
    /// Bytes in live blocks.
    pub allocated: usize,
    /// High-water mark of `allocated` since the heap was created.
    pub peak: usize,
    /// Number of live blocks.
    pub blocks: usize,
    /// Number of `reset` calls.
    pub resets: usize,
}

/// Fixed-capacity region with segregated power-of-two free lists.
///
/// Allocation pops the free list of the request's size class, or bumps the
/// region top when that list is empty. Release pushes the block back on its
/// list. Both are O(1). Blocks are never split or coalesced.
///
/// Free lists are intrusive: a released block stores the offset of the next
/// free block of its class in its first four bytes.
pub struct Heap<'a> {
    region: &'a mut [u8],
    top: usize,
    free: [u32; NUM_CLASSES],
    /// Bumped by every `reset`; blocks from an earlier epoch are stale.
    epoch: u32,
    stats: HeapStats,
}

impl<'a> Heap<'a> {
    /// Establish a region of `capacity` bytes inside `arena`.
    ///
    /// Fails when the arena cannot supply the memory (for example because
    /// the host capped it with `Bump::set_allocation_limit`).
    pub fn init(arena: &'a Bump, capacity: usize) -> Result<Self, FatalError> {
        let unavailable = FatalError::RegionUnavailable { capacity };
        if capacity > u32::MAX as usize {
            return Err(unavailable);
        }
        let layout =
            Layout::from_size_align(capacity.max(1), MIN_BLOCK_SIZE).map_err(|_| unavailable.clone())?;
        let ptr = arena.try_alloc_layout(layout).map_err(|_| unavailable)?;

        // SAFETY: `ptr` points to at least `capacity` freshly allocated bytes
        // owned by `arena` for `'a`, and nothing else references them.
        let region = unsafe {
            ptr::write_bytes(ptr.as_ptr(), 0, capacity);
            slice::from_raw_parts_mut(ptr.as_ptr(), capacity)
        };

        tracing::debug!(capacity, "heap region established");

        Ok(Heap {
            region,
            top: 0,
            free: [NIL; NUM_CLASSES],
            epoch: 0,
            stats: HeapStats {
                capacity,
                ..HeapStats::default()
            },
        })
    }

    /// Allocate a block of at least `size` bytes.
    ///
    /// The contents of a fresh block are unspecified.
    pub fn allocate(&mut self, size: usize) -> Result<Block, FatalError> {
        let class = size_class(size).ok_or(FatalError::BlockTooLarge {
            requested: size,
            max: MAX_BLOCK_SIZE,
        })?;
        let block_size = class_size(class);

        let head = self.free[class as usize];
        let offset = if head != NIL {
            self.free[class as usize] = self.read_link(head as usize);
            head
        } else {
            let available = self.region.len() - self.top;
            if block_size > available {
                tracing::warn!(size, block_size, available, "heap exhausted");
                return Err(FatalError::OutOfMemory {
                    requested: block_size,
                    available,
                });
            }
            let offset = self.top as u32;
            self.top += block_size;
            offset
        };

        self.stats.allocated += block_size;
        self.stats.blocks += 1;
        self.stats.peak = self.stats.peak.max(self.stats.allocated);
        tracing::trace!(size, block_size, offset, "allocate");

        Ok(Block {
            offset,
            class,
            epoch: self.epoch,
        })
    }

    /// Return `block` to its size class for reuse.
    ///
    /// A block handed out before the last [`reset`](Heap::reset), or one that
    /// lies outside the allocated part of the region, is ignored: its range
    /// already belongs to the bump area again.
    pub fn release(&mut self, block: Block) {
        if block.epoch != self.epoch || block.offset() + block.size() > self.top {
            tracing::warn!(?block, epoch = self.epoch, "ignoring release of stale block");
            return;
        }
        let head = self.free[block.class as usize];
        self.write_link(block.offset(), head);
        self.free[block.class as usize] = block.offset;

        self.stats.allocated -= block.size();
        self.stats.blocks -= 1;
        tracing::trace!(offset = block.offset, block_size = block.size(), "release");
    }

    /// Reclaim every block at once.
    ///
    /// Outstanding handles become stale: releasing one is a no-op, and
    /// reading through one sees whatever the next owner of that range wrote.
    pub fn reset(&mut self) {
        self.top = 0;
        self.epoch = self.epoch.wrapping_add(1);
        self.free = [NIL; NUM_CLASSES];
        self.stats.allocated = 0;
        self.stats.blocks = 0;
        self.stats.resets += 1;
        tracing::debug!(resets = self.stats.resets, "heap reset");
    }

    #[inline]
    pub fn bytes(&self, block: &Block) -> &[u8] {
        &self.region[block.offset()..block.offset() + block.size()]
    }

    #[inline]
    pub fn bytes_mut(&mut self, block: &Block) -> &mut [u8] {
        &mut self.region[block.offset()..block.offset() + block.size()]
    }

    pub fn capacity(&self) -> usize {
        self.region.len()
    }

    /// Bytes never handed out yet (free-listed blocks are not counted).
    pub fn untouched(&self) -> usize {
        self.region.len() - self.top
    }

    pub fn stats(&self) -> HeapStats {
        self.stats
    }

    fn read_link(&self, offset: usize) -> u32 {
        let mut link = [0u8; 4];
        link.copy_from_slice(&self.region[offset..offset + 4]);
        u32::from_le_bytes(link)
    }

    fn write_link(&mut self, offset: usize, next: u32) {
        self.region[offset..offset + 4].copy_from_slice(&next.to_le_bytes());
    }
}

impl core::fmt::Debug for Heap<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Heap")
            .field("capacity", &self.region.len())
            .field("top", &self.top)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Size class index for a request, or `None` if it is too large.
fn size_class(size: usize) -> Option<u8> {
    if size > MAX_BLOCK_SIZE {
        return None;
    }
    let rounded = size.max(MIN_BLOCK_SIZE).next_power_of_two();
    Some((rounded.trailing_zeros() - MIN_BLOCK_SIZE.trailing_zeros()) as u8)
}

#[inline]
fn class_size(class: u8) -> usize {
    MIN_BLOCK_SIZE << class
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_classes() {
        assert_eq!(size_class(0), Some(0));
        assert_eq!(size_class(1), Some(0));
        assert_eq!(size_class(8), Some(0));
        assert_eq!(size_class(9), Some(1));
        assert_eq!(size_class(16), Some(1));
        assert_eq!(size_class(17), Some(2));
        assert_eq!(size_class(MAX_BLOCK_SIZE), Some((NUM_CLASSES - 1) as u8));
        assert_eq!(size_class(MAX_BLOCK_SIZE + 1), None);
    }

    #[test]
    fn test_max_block_size() {
        assert_eq!(MAX_BLOCK_SIZE, 32 * 1024);
        assert_eq!(class_size((NUM_CLASSES - 1) as u8), MAX_BLOCK_SIZE);
    }
}
