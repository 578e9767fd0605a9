use bumpalo::Bump;

use super::*;
use crate::errors::{FatalCause, FatalError};

#[test]
fn test_allocate_rounds_to_size_class() {
    let arena = Bump::new();
    let mut heap = Heap::init(&arena, 1024).unwrap();

    let a = heap.allocate(3).unwrap();
    let b = heap.allocate(20).unwrap();
    assert_eq!(a.size(), 8);
    assert_eq!(b.size(), 32);
    assert_eq!(a.offset(), 0);
    assert_eq!(b.offset(), 8);
    assert_eq!(heap.bytes(&b).len(), 32);
    assert_eq!(heap.untouched(), 1024 - 40);
}

#[test]
fn test_release_reuses_block_of_same_class() {
    let arena = Bump::new();
    let mut heap = Heap::init(&arena, 256).unwrap();

    let a = heap.allocate(16).unwrap();
    let freed = a.offset();
    let _b = heap.allocate(16).unwrap();
    heap.release(a);

    // A different class does not take the freed block.
    let c = heap.allocate(32).unwrap();
    assert_ne!(c.offset(), freed);

    let d = heap.allocate(10).unwrap();
    assert_eq!(d.offset(), freed);
    assert_eq!(d.size(), 16);
}

#[test]
fn test_free_list_is_lifo() {
    let arena = Bump::new();
    let mut heap = Heap::init(&arena, 256).unwrap();

    let blocks: Vec<Block> = (0..4).map(|_| heap.allocate(8).unwrap()).collect();
    let offsets: Vec<usize> = blocks.iter().map(Block::offset).collect();
    for block in blocks {
        heap.release(block);
    }
    for &offset in offsets.iter().rev() {
        assert_eq!(heap.allocate(8).unwrap().offset(), offset);
    }
    assert_eq!(heap.stats().blocks, 4);
}

#[test]
fn test_out_of_memory() {
    let arena = Bump::new();
    let mut heap = Heap::init(&arena, 64).unwrap();

    heap.allocate(32).unwrap();
    heap.allocate(16).unwrap();
    let err = heap.allocate(32).unwrap_err();
    assert_eq!(
        err,
        FatalError::OutOfMemory {
            requested: 32,
            available: 16
        }
    );
    assert_eq!(err.cause(), FatalCause::OutOfMemory);

    // A smaller request still fits.
    assert!(heap.allocate(16).is_ok());
}

#[test]
fn test_block_too_large() {
    let arena = Bump::new();
    let mut heap = Heap::init(&arena, 2 * MAX_BLOCK_SIZE).unwrap();

    let err = heap.allocate(MAX_BLOCK_SIZE + 1).unwrap_err();
    assert_eq!(
        err,
        FatalError::BlockTooLarge {
            requested: MAX_BLOCK_SIZE + 1,
            max: MAX_BLOCK_SIZE
        }
    );
    assert!(heap.allocate(MAX_BLOCK_SIZE).is_ok());
}

#[test]
fn test_reset_reclaims_everything() {
    let arena = Bump::new();
    let mut heap = Heap::init(&arena, 128).unwrap();

    for _ in 0..4 {
        heap.allocate(32).unwrap();
    }
    assert!(heap.allocate(8).is_err());

    heap.reset();
    assert_eq!(heap.untouched(), 128);
    assert_eq!(heap.allocate(128).unwrap().offset(), 0);

    let stats = heap.stats();
    assert_eq!(stats.resets, 1);
    assert_eq!(stats.blocks, 1);
    assert_eq!(stats.allocated, 128);
    assert_eq!(stats.peak, 128);
}

#[test]
fn test_stats_track_peak() {
    let arena = Bump::new();
    let mut heap = Heap::init(&arena, 512).unwrap();

    let a = heap.allocate(64).unwrap();
    let b = heap.allocate(64).unwrap();
    heap.release(a);
    heap.release(b);
    heap.allocate(8).unwrap();

    assert_eq!(
        heap.stats(),
        HeapStats {
            capacity: 512,
            allocated: 8,
            peak: 128,
            blocks: 1,
            resets: 0,
        }
    );
}

#[test]
fn test_block_contents_survive_neighbours() {
    let arena = Bump::new();
    let mut heap = Heap::init(&arena, 64).unwrap();

    let a = heap.allocate(8).unwrap();
    let b = heap.allocate(8).unwrap();
    heap.bytes_mut(&a).copy_from_slice(b"abcdefgh");
    heap.bytes_mut(&b).fill(0xFF);
    heap.release(b);

    assert_eq!(heap.bytes(&a), b"abcdefgh");
}

#[test]
fn test_region_respects_arena_limit() {
    let arena = Bump::new();
    arena.set_allocation_limit(Some(64));

    let err = Heap::init(&arena, 4096).unwrap_err();
    assert_eq!(err, FatalError::RegionUnavailable { capacity: 4096 });
    assert_eq!(err.cause(), FatalCause::SyscallFailure);
}

#[test]
fn test_released_block_is_handed_out_once() {
    let arena = Bump::new();
    let mut heap = Heap::init(&arena, 64).unwrap();

    let a = heap.allocate(8).unwrap();
    let _b = heap.allocate(8).unwrap();
    heap.release(a);

    let x = heap.allocate(8).unwrap();
    let y = heap.allocate(8).unwrap();
    assert_ne!(x.offset(), y.offset());
    assert_eq!(heap.stats().blocks, 3);
}

#[test]
fn test_release_after_reset_is_ignored() {
    let arena = Bump::new();
    let mut heap = Heap::init(&arena, 64).unwrap();

    let stale = heap.allocate(8).unwrap();
    heap.reset();
    let live = heap.allocate(8).unwrap();
    assert_eq!(live.offset(), stale.offset());

    heap.release(stale);
    let stats = heap.stats();
    assert_eq!(stats.blocks, 1);
    assert_eq!(stats.allocated, 8);

    // The live block was not put back on the free list.
    let next = heap.allocate(8).unwrap();
    assert_ne!(next.offset(), live.offset());
}
