use ctor::ctor;
use relex_core::EntityIndex;
use relex_core::DEFAULT_VERSION_BITS;

#[ctor]
fn init_logging() {
    log4rs::init_file("tests/log4rs.test.yaml", Default::default()).unwrap();
}

#[test]
fn alive_right_after_alloc_and_dead_after_free() {
    let mut index = EntityIndex::new();
    for _ in 0..100 {
        let id = index.alloc();
        assert!(index.is_alive(id));
        index.free(id);
        assert!(!index.is_alive(id));
    }
}

#[test]
fn plain_ids_reused() {
    let mut index = EntityIndex::new();
    let first = index.alloc();
    let second = index.alloc();
    index.free(first);
    assert_eq!(index.alloc(), first);
    assert!(index.is_alive(second));
    assert_eq!(index.alive_count(), 2);
    assert_eq!(index.max_slot(), 2);
}

#[test]
fn version_cycles_through_full_range() {
    let bits = 3;
    let mut index = EntityIndex::with_versioning(bits);
    let mut id = index.alloc();
    let slot = index.slot(id);
    let mut versions = vec![];
    for _ in 0..(1 << bits) {
        versions.push(index.version(id));
        index.free(id);
        let next = index.alloc();
        assert_eq!(index.slot(next), slot);
        assert!(!index.is_alive(id));
        assert!(index.is_alive(next));
        id = next;
    }
    assert_eq!(versions, (0..(1 << bits)).collect::<Vec<u32>>());
    assert_eq!(index.version(id), 0);
}

#[test]
fn default_versioning_uses_high_bits() {
    let mut index = EntityIndex::with_versioning(DEFAULT_VERSION_BITS);
    let id = index.alloc();
    index.free(id);
    let recycled = index.alloc();
    assert_eq!(recycled.raw(), id.raw() | (1 << (32 - DEFAULT_VERSION_BITS)));
}

#[test]
fn alive_lists_exactly_live_ids() {
    let mut index = EntityIndex::with_capacity(16);
    let ids: Vec<_> = (0..10).map(|_| index.alloc()).collect();
    for id in ids.iter().step_by(3) {
        index.free(*id);
    }
    let mut alive = index.alive().to_vec();
    alive.sort();
    let expected: Vec<_> = ids
        .iter()
        .enumerate()
        .filter(|(i, _)| i % 3 != 0)
        .map(|(_, id)| *id)
        .collect();
    assert_eq!(alive, expected);
}
