//! Integration tests for adapters and pool-backed containers

use std::cell::Cell;

use nebula_alloc::prelude::*;
use pretty_assertions::assert_eq;

struct DropCounter<'a> {
    drops: &'a Cell<usize>,
    value: u64,
}

impl<'a> DropCounter<'a> {
    fn new(drops: &'a Cell<usize>, constructed: &Cell<usize>, value: u64) -> Self {
        constructed.set(constructed.get() + 1);
        Self { drops, value }
    }
}

impl Drop for DropCounter<'_> {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

#[test]
fn test_adapter_equality_follows_instance() {
    let first = BucketPool::new(BucketConfig::production()).unwrap();
    let second = BucketPool::new(BucketConfig::production()).unwrap();

    let a: BucketAdapter<'_, u32> = PoolAdapter::new(&first);
    let b: BucketAdapter<'_, u32> = PoolAdapter::new(&first);
    let c: BucketAdapter<'_, u32> = PoolAdapter::new(&second);

    assert_eq!(a, b);
    assert_ne!(a, c);

    let rebound = a.rebind::<String>();
    assert!(rebound == a);
    assert!(rebound != c);
    assert!(!BucketAdapter::<u32>::IS_ALWAYS_EQUAL);
    assert!(!BucketAdapter::<u32>::PROPAGATE_ON_COPY);
}

#[test]
fn test_adapters_over_different_pool_types_differ() {
    let slab = SlabPool::new(SlabConfig::production(64)).unwrap();
    let bump = BumpChunks::new(BumpConfig::production()).unwrap();

    let a: SlabAdapter<'_, u64> = PoolAdapter::new(&slab);
    let b: BumpAdapter<'_, u64> = PoolAdapter::new(&bump);
    assert!(a != b);
}

#[test]
fn test_create_destroy_runs_each_side_once() {
    let constructed = Cell::new(0);
    let drops = Cell::new(0);
    let slab = SlabPool::for_type::<DropCounter<'_>>().unwrap();

    let ptr = create(&slab, DropCounter::new(&drops, &constructed, 7)).unwrap();
    assert_eq!(unsafe { ptr.as_ref() }.value, 7);
    assert_eq!(drops.get(), 0);

    unsafe { destroy(&slab, ptr) };
    assert_eq!(constructed.get(), 1);
    assert_eq!(drops.get(), 1);
    assert_eq!(slab.free_count(), 1);
}

#[test]
fn test_adapter_construct_destroy_in_place() {
    let constructed = Cell::new(0);
    let drops = Cell::new(0);
    let pool = BucketPool::new(BucketConfig::production()).unwrap();
    let adapter: BucketAdapter<'_, DropCounter<'_>> = PoolAdapter::new(&pool);

    let ptr = adapter.allocate(3).unwrap();
    unsafe {
        for i in 0..3 {
            adapter.construct(ptr.add(i), DropCounter::new(&drops, &constructed, i as u64));
        }
        for i in 0..3 {
            adapter.destroy(ptr.add(i));
        }
        adapter.deallocate(ptr, 3);
    }

    assert_eq!(constructed.get(), 3);
    assert_eq!(drops.get(), 3);
    assert_eq!(pool.used_memory(), 0);
}

#[test]
fn test_pool_box_drops_once() {
    let constructed = Cell::new(0);
    let drops = Cell::new(0);
    let slab = SlabPool::for_type::<DropCounter<'_>>().unwrap();

    {
        let boxed = PoolBox::new_in(DropCounter::new(&drops, &constructed, 1), &slab).unwrap();
        assert_eq!(boxed.value, 1);
    }
    assert_eq!(drops.get(), 1);

    let boxed = PoolBox::new_in(DropCounter::new(&drops, &constructed, 2), &slab).unwrap();
    let inner = PoolBox::into_inner(boxed);
    assert_eq!(drops.get(), 1);
    drop(inner);
    assert_eq!(drops.get(), 2);
    assert_eq!(constructed.get(), 2);
}

#[test]
fn test_pool_vec_on_every_pool() {
    let slab = SlabPool::new(SlabConfig::production(256)).unwrap();
    let bump = BumpChunks::new(BumpConfig::production()).unwrap();
    let scratch = ScratchArena::new(ScratchConfig::production()).unwrap();
    let bucket = BucketPool::new(BucketConfig::production()).unwrap();

    let mut on_slab = PoolVec::new_in(&slab);
    let mut on_bump = PoolVec::new_in(&bump);
    let mut on_scratch = PoolVec::new_in(&scratch);
    let mut on_bucket = PoolVec::new_in(&bucket);

    for i in 0..32u64 {
        on_slab.push(i).unwrap();
        on_bump.push(i).unwrap();
        on_scratch.push(i).unwrap();
        on_bucket.push(i).unwrap();
    }

    let expected: Vec<u64> = (0..32).collect();
    assert_eq!(on_slab.as_slice(), expected.as_slice());
    assert_eq!(on_bump.as_slice(), expected.as_slice());
    assert_eq!(on_scratch.as_slice(), expected.as_slice());
    assert_eq!(on_bucket.as_slice(), expected.as_slice());

    // 33 u64 values no longer fit a 256-byte slot
    assert!(on_slab.push(32).is_err());
    assert_eq!(on_slab.len(), 32);
}

#[test]
fn test_pool_vec_drops_elements() {
    let constructed = Cell::new(0);
    let drops = Cell::new(0);
    let pool = BucketPool::new(BucketConfig::production()).unwrap();

    {
        let mut values = PoolVec::new_in(&pool);
        for i in 0..10 {
            values.push(DropCounter::new(&drops, &constructed, i)).unwrap();
        }
        drop(values.pop());
        assert_eq!(drops.get(), 1);
    }

    assert_eq!(constructed.get(), 10);
    assert_eq!(drops.get(), 10);
    assert_eq!(pool.used_memory(), 0);
}

#[test]
fn test_pool_strings_in_pool_vec() {
    let pool = BucketPool::new(BucketConfig::production()).unwrap();
    let mut names = PoolVec::new_in(&pool);

    for word in ["alpha", "beta", "gamma"] {
        let mut name = PoolString::from_str_in(word, &pool);
        name.push('!');
        names.push(name).unwrap();
    }

    assert_eq!(names.len(), 3);
    assert_eq!(names[1], "beta!");
    assert_eq!(names[2].to_uppercase(), "GAMMA!");

    drop(names);
    assert_eq!(pool.used_memory(), 0);
}
