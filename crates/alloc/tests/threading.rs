//! Integration tests for moving allocators between threads

use std::sync::{Arc, Mutex};
use std::thread;

use nebula_alloc::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_bucket_pool_behind_mutex() {
    let pool = Arc::new(Mutex::new(
        BucketPool::new(BucketConfig::production()).expect("valid bucket config"),
    ));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let pool = Arc::clone(&pool);
            thread::spawn(move || {
                for _ in 0..100 {
                    let pool = pool.lock().expect("lock poisoned");
                    let ptr = pool.alloc(40, Alignment::Align8);
                    unsafe {
                        std::ptr::write_bytes(ptr.as_ptr(), 0x11, 40);
                        pool.dealloc(ptr, 40, Alignment::Align8);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let pool = pool.lock().expect("lock poisoned");
    let stats = pool.statistics();
    assert_eq!(stats.allocation_count, 400);
    assert_eq!(stats.deallocation_count, 400);
    assert_eq!(pool.used_memory(), 0);
}

#[test]
fn test_pools_move_into_worker_thread() {
    let slab = SlabPool::new(SlabConfig::production(32)).expect("valid slab config");
    let bump = BumpChunks::new(BumpConfig::small()).expect("valid bump config");
    let scratch = ScratchArena::new(ScratchConfig::new(256)).expect("valid scratch config");

    let (slab, bump, scratch) = thread::spawn(move || {
        let slot = slab.alloc();
        let _ = bump.alloc(64, Alignment::Align16);
        let _ = scratch.alloc(64, Alignment::Align8);
        unsafe { slab.dealloc(slot) };
        (slab, bump, scratch)
    })
    .join()
    .expect("worker panicked");

    assert_eq!(slab.free_count(), 1);
    assert_eq!(bump.chunk_count(), 1);
    assert_eq!(scratch.top(), 64);
}

#[test]
fn test_one_pool_per_thread() {
    let handles: Vec<_> = (0..4)
        .map(|_| {
            thread::spawn(|| {
                let pool = BucketPool::new(BucketConfig::production()).expect("valid config");
                let mut values = PoolVec::new_in(&pool);
                for i in 0..256usize {
                    values.push(i).expect("push");
                }
                values.iter().sum::<usize>()
            })
        })
        .collect();
    let totals: Vec<usize> = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker panicked"))
        .collect();

    assert_eq!(totals, vec![255 * 256 / 2; 4]);
}
