//! Integration tests for the chunked bump allocator

use nebula_alloc::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn production(chunk_size: usize) -> BumpChunks {
    BumpChunks::new(BumpConfig::new(chunk_size).with_patterns(DebugPatterns::NONE))
        .expect("valid bump config")
}

#[test]
fn test_growth_keeps_live_items_intact() {
    let bump = production(512);
    let mut items = Vec::new();

    for i in 0..64u8 {
        let size = 24 + usize::from(i % 5) * 8;
        let ptr = bump.alloc(size, Alignment::Align8);
        unsafe { std::ptr::write_bytes(ptr.as_ptr(), i, size) };
        items.push((ptr, size, i));
    }
    assert!(bump.chunk_count() > 1);

    for (ptr, size, fill) in items {
        let bytes = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), size) };
        assert!(bytes.iter().all(|&b| b == fill));
    }
}

#[rstest]
#[case(Alignment::Align1)]
#[case(Alignment::Align2)]
#[case(Alignment::Align4)]
#[case(Alignment::Align8)]
#[case(Alignment::Align16)]
fn test_allocations_honor_alignment(#[case] alignment: Alignment) {
    let bump = production(256);
    for size in 1..100 {
        let ptr = bump.alloc(size, alignment);
        assert_eq!(ptr.as_ptr() as usize % alignment.get(), 0, "size {size}");
    }
}

#[test]
fn test_large_blocks_are_tracked_and_cleared() {
    let mut bump = BumpChunks::new(
        BumpConfig::new(1024)
            .with_large_size(256)
            .with_patterns(DebugPatterns::NONE),
    )
    .unwrap();

    let small = bump.alloc(256, Alignment::Align8);
    let large = bump.alloc(257, Alignment::Align8);
    assert!(bump.owns(small));
    assert!(bump.owns(large));
    assert_eq!(bump.chunk_count(), 1);
    assert_eq!(bump.large_count(), 1);

    bump.clear();
    assert_eq!(bump.chunk_count(), 0);
    assert_eq!(bump.large_count(), 0);
}

#[test]
fn test_clear_keeps_allocator_usable() {
    let mut bump = production(256);
    for _ in 0..3 {
        for _ in 0..20 {
            let _ = bump.alloc(40, Alignment::Align8);
        }
        let chunks = bump.chunk_count();
        bump.clear();
        assert_eq!(bump.chunk_count(), 0);
        assert!(chunks > 0);
    }
}

#[test]
fn test_init_rejects_large_size_above_chunk() {
    let mut bump = production(256);
    let err = bump
        .init(BumpConfig::new(256).with_large_size(512))
        .unwrap_err();
    assert_eq!(err.code(), "MEM:CONFIG:INVALID");
    assert_eq!(bump.chunk_size(), 256);

    bump.init(BumpConfig::new(1024)).unwrap();
    assert_eq!(bump.large_size(), 512);
}

#[test]
fn test_statistics_track_reserved_bytes() {
    let bump = production(1024);
    let _ = bump.alloc(100, Alignment::Align8);
    let _ = bump.alloc(600, Alignment::Align8);

    let stats = bump.statistics();
    assert_eq!(stats.allocation_count, 2);
    assert_eq!(stats.chunk_count, 1);
    assert_eq!(stats.large_count, 1);
    assert_eq!(stats.reserved_bytes, 1024 + 600);
    assert_eq!(bump.used_memory(), 700);
}
