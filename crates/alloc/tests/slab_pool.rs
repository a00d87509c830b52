//! Integration tests for the slab pool

use std::alloc::Layout;

use nebula_alloc::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn production(item_size: usize, max_count: usize) -> SlabPool {
    SlabPool::new(SlabConfig::production(item_size).with_max_count(max_count))
        .expect("valid slab config")
}

#[test]
fn test_dealloc_then_alloc_returns_same_slot() {
    let pool = production(40, 8);
    let first = pool.alloc();

    unsafe { pool.dealloc(first) };
    let second = pool.alloc();

    assert_eq!(first, second);
}

#[test]
fn test_growth_keeps_live_items_intact() {
    let pool = production(32, 4);
    let mut ptrs = Vec::new();

    for i in 0..40u8 {
        let ptr = pool.alloc();
        unsafe { std::ptr::write_bytes(ptr.as_ptr(), i, 32) };
        ptrs.push(ptr);
    }
    assert_eq!(pool.chunk_count(), 10);

    for (i, ptr) in ptrs.iter().enumerate() {
        let bytes = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), 32) };
        assert!(bytes.iter().all(|&b| b == i as u8), "slot {i} was overwritten");
    }

    for ptr in ptrs {
        unsafe { pool.dealloc(ptr) };
    }
    assert_eq!(pool.free_count(), 40);
}

#[test]
fn test_free_slots_are_reused_before_growth() {
    let pool = production(16, 4);
    let ptrs: Vec<_> = (0..4).map(|_| pool.alloc()).collect();
    assert_eq!(pool.chunk_count(), 1);

    for ptr in &ptrs {
        unsafe { pool.dealloc(*ptr) };
    }
    for _ in 0..4 {
        let _ = pool.alloc();
    }
    assert_eq!(pool.chunk_count(), 1);
}

#[rstest]
#[case(Alignment::Align1)]
#[case(Alignment::Align2)]
#[case(Alignment::Align4)]
#[case(Alignment::Align8)]
#[case(Alignment::Align16)]
fn test_slots_honor_alignment(#[case] alignment: Alignment) {
    let pool = SlabPool::new(
        SlabConfig::production(13)
            .with_alignment(alignment)
            .with_max_count(3),
    )
    .unwrap();

    for _ in 0..10 {
        let ptr = pool.alloc();
        assert_eq!(ptr.as_ptr() as usize % alignment.get(), 0);
    }
}

#[test]
fn test_clear_keeps_pool_usable() {
    let mut pool = production(24, 4);
    for _ in 0..10 {
        let _ = pool.alloc();
    }
    pool.clear();

    let stats = pool.statistics();
    assert_eq!(stats.chunk_count, 0);
    assert_eq!(stats.reserved_bytes, 0);
    assert_eq!(pool.used_memory(), 0);

    for _ in 0..10 {
        let _ = pool.alloc();
    }
    assert_eq!(pool.chunk_count(), 3);
}

#[test]
fn test_init_changes_slot_size() {
    let mut pool = production(8, 4);
    let id = pool.id();
    let _ = pool.alloc();

    pool.init(SlabConfig::production(64).with_max_count(2)).unwrap();
    assert_eq!(pool.slot_size(), 64);
    assert_eq!(pool.chunk_count(), 0);
    assert_eq!(pool.id(), id);
}

#[test]
fn test_failed_init_leaves_pool_untouched() {
    let mut pool = production(8, 4);
    let err = pool.init(SlabConfig::production(0)).unwrap_err();

    assert!(err.is_config_error());
    assert_eq!(pool.slot_size(), 8);
}

#[test]
fn test_invalid_configs_are_rejected() {
    assert!(SlabPool::new(SlabConfig::new(0)).is_err());
    assert!(SlabPool::new(SlabConfig::new(16).with_max_count(1)).is_err());
    assert!(SlabPool::new(SlabConfig::new(16).with_max_count(0)).is_err());
}

#[test]
fn test_allocator_trait_surface() {
    let pool = production(48, 4);

    let block = pool.allocate(Layout::from_size_align(40, 8).unwrap()).unwrap();
    assert_eq!(block.len(), pool.slot_size());

    let empty = pool.allocate(Layout::from_size_align(0, 8).unwrap()).unwrap();
    assert_eq!(empty.len(), 0);

    unsafe {
        pool.deallocate(empty.cast(), Layout::from_size_align(0, 8).unwrap());
        pool.deallocate(block.cast(), Layout::from_size_align(40, 8).unwrap());
    }
    assert_eq!(pool.free_count(), 1);

    let err = pool
        .allocate(Layout::from_size_align(49, 8).unwrap())
        .unwrap_err();
    assert_eq!(
        err,
        MemoryError::ExceedsMaxSize {
            size: 49,
            max_size: 48
        }
    );
}
