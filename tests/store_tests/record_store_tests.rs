//! Tests for RecordStore
//!
//! These tests verify:
//! - Construction preconditions (loaded cache, prefix validation)
//! - Hydration from the cache
//! - Sort invariant and insertion tie-break
//! - get / delete / delete_by_value / clear semantics
//! - Write-through addressing

use std::sync::Arc;

use proptest::prelude::*;
use shelfkv::cache::{record_address, MemoryCache, PersistentCache};
use shelfkv::{Key, KeyRange, Record, RecordStore, ShelfError, StoreType};

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_store(store_type: StoreType) -> (Arc<MemoryCache>, RecordStore) {
    let cache = Arc::new(MemoryCache::new());
    let store = RecordStore::open(cache.clone(), "people", store_type).unwrap();
    (cache, store)
}

fn keys_of(store: &RecordStore) -> Vec<Key> {
    store.records().iter().map(|r| r.key.clone()).collect()
}

fn assert_sorted(store: &RecordStore) {
    for pair in store.records().windows(2) {
        assert!(pair[0] <= pair[1], "{} sorted after {}", pair[0], pair[1]);
    }
}

// =============================================================================
// Construction Tests
// =============================================================================

#[test]
fn test_open_requires_loaded_cache() {
    let cache = Arc::new(MemoryCache::unloaded());

    let result = RecordStore::open(cache.clone(), "people", StoreType::Object);
    assert!(matches!(result, Err(ShelfError::CacheNotLoaded)));

    cache.load();
    assert!(RecordStore::open(cache, "people", StoreType::Object).is_ok());
}

#[test]
fn test_open_rejects_separator_in_prefix() {
    let cache = Arc::new(MemoryCache::new());
    let result = RecordStore::open(cache, "people/archive", StoreType::Object);
    assert!(matches!(result, Err(ShelfError::InvalidPrefix(_))));
}

#[test]
fn test_new_store_is_empty() {
    let (_cache, store) = setup_store(StoreType::Object);

    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert_eq!(store.key_prefix(), "people");
    assert_eq!(store.store_type(), StoreType::Object);
    assert!(store.get(Key::from(1)).is_none());
}

#[test]
fn test_open_hydrates_and_sorts() {
    let cache = Arc::new(MemoryCache::new());
    // Address order ("10" < "9") differs from key order
    for (key, value) in [(9, "nine"), (10, "ten"), (1, "one")] {
        let record = Record::new(key, value);
        cache
            .set(&record_address(StoreType::Object, "nums", &record), &record)
            .unwrap();
    }

    let store = RecordStore::open(cache, "nums", StoreType::Object).unwrap();

    assert_eq!(keys_of(&store), vec![Key::from(1), Key::from(9), Key::from(10)]);
}

#[test]
fn test_open_only_sees_own_prefix_and_type() {
    let cache = Arc::new(MemoryCache::new());
    {
        let mut people = RecordStore::open(cache.clone(), "people", StoreType::Object).unwrap();
        people.add(Record::new(1, "ann")).unwrap();
        let mut pets = RecordStore::open(cache.clone(), "pets", StoreType::Object).unwrap();
        pets.add(Record::new(1, "rex")).unwrap();
        let mut by_name = RecordStore::open(cache.clone(), "people", StoreType::Index).unwrap();
        by_name.add(Record::new("ann", 1)).unwrap();
    }

    let people = RecordStore::open(cache.clone(), "people", StoreType::Object).unwrap();
    assert_eq!(people.records(), &[Record::new(1, "ann")]);

    let by_name = RecordStore::open(cache, "people", StoreType::Index).unwrap();
    assert_eq!(by_name.records(), &[Record::new("ann", 1)]);
}

#[test]
fn test_prefix_that_starts_another_prefix_is_isolated() {
    let cache = Arc::new(MemoryCache::new());
    {
        let mut users = RecordStore::open(cache.clone(), "users", StoreType::Object).unwrap();
        users.add(Record::new("alice", 1)).unwrap();
    }

    let mut user = RecordStore::open(cache.clone(), "user", StoreType::Object).unwrap();
    assert!(user.records().is_empty());
    assert!(user.clear().unwrap().is_empty());
    user.add(Record::new("bob", 2)).unwrap();

    let users = RecordStore::open(cache.clone(), "users", StoreType::Object).unwrap();
    assert_eq!(users.records(), &[Record::new("alice", 1)]);

    let user = RecordStore::open(cache.clone(), "user", StoreType::Object).unwrap();
    assert_eq!(user.records(), &[Record::new("bob", 2)]);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_open_rejects_invalid_cached_key() {
    let cache = Arc::new(MemoryCache::new());
    let record = Record {
        key: Key::Number(f64::NAN),
        value: Key::from(1),
    };
    cache.set("object/bad/1/1", &record).unwrap();

    let result = RecordStore::open(cache, "bad", StoreType::Object);
    assert!(matches!(result, Err(ShelfError::InvalidKey(_))));
}

// =============================================================================
// Add / Sort Invariant Tests
// =============================================================================

#[test]
fn test_add_keeps_key_order() {
    let (_cache, mut store) = setup_store(StoreType::Object);

    for key in [5, 1, 4, 2, 3] {
        store.add(Record::new(key, key * 100)).unwrap();
    }

    assert_eq!(keys_of(&store), (1..=5).map(Key::from).collect::<Vec<_>>());
}

#[test]
fn test_add_mixed_kinds() {
    let (_cache, mut store) = setup_store(StoreType::Object);

    store.add(Record::new(Key::array(vec![Key::from(1)]), 0)).unwrap();
    store.add(Record::new("b", 0)).unwrap();
    store.add(Record::new(Key::date(0.0).unwrap(), 0)).unwrap();
    store.add(Record::new(vec![1u8, 2], 0)).unwrap();
    store.add(Record::new(99, 0)).unwrap();

    let kinds: Vec<_> = store.records().iter().map(|r| r.key.kind()).collect();
    let mut sorted = kinds.clone();
    sorted.sort();
    assert_eq!(kinds, sorted);
}

#[test]
fn test_duplicate_keys_sorted_by_value() {
    let (_cache, mut store) = setup_store(StoreType::Index);

    store.add(Record::new("smith", 30)).unwrap();
    store.add(Record::new("smith", 10)).unwrap();
    store.add(Record::new("jones", 99)).unwrap();
    store.add(Record::new("smith", 20)).unwrap();

    assert_eq!(
        store.records(),
        &[
            Record::new("jones", 99),
            Record::new("smith", 10),
            Record::new("smith", 20),
            Record::new("smith", 30),
        ]
    );
}

#[test]
fn test_equal_record_inserted_before_existing() {
    let (_cache, mut store) = setup_store(StoreType::Index);

    // 0 and -0 are equal values; the sign bit tells the two records apart
    store.add(Record::new("k", Key::Number(0.0))).unwrap();
    store.add(Record::new("k", Key::from(5))).unwrap();
    store.add(Record::new("k", Key::Number(-0.0))).unwrap();

    let first = &store.records()[0];
    assert_eq!(first.value, Key::from(0));
    assert!(matches!(first.value, Key::Number(v) if v.is_sign_negative()));
    assert!(matches!(store.records()[1].value, Key::Number(v) if v.is_sign_positive() && v == 0.0));
    assert_eq!(store.records()[2].value, Key::from(5));
}

#[test]
fn test_add_rejects_nan() {
    let (cache, mut store) = setup_store(StoreType::Object);

    let result = store.add(Record::new(Key::Number(f64::NAN), 1));

    assert!(matches!(result, Err(ShelfError::InvalidKey(_))));
    assert!(store.is_empty());
    assert!(cache.is_empty());
}

proptest! {
    #[test]
    fn prop_add_keeps_sort_invariant(pairs in prop::collection::vec((0i32..6, 0i32..4), 0..40)) {
        let (_cache, mut store) = setup_store(StoreType::Index);
        for (key, value) in &pairs {
            store.add(Record::new(*key, *value)).unwrap();
        }

        prop_assert_eq!(store.len(), pairs.len());
        for pair in store.records().windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }
}

// =============================================================================
// Get Tests
// =============================================================================

#[test]
fn test_get_exact_and_range() {
    let (_cache, mut store) = setup_store(StoreType::Object);
    for key in [10, 20, 30] {
        store.add(Record::new(key, key + 1)).unwrap();
    }

    assert_eq!(store.get(Key::from(20)), Some(&Record::new(20, 21)));
    assert_eq!(store.get(Key::from(25)), None);

    let range = KeyRange::bound(Key::from(11), Key::from(40), false, false).unwrap();
    assert_eq!(store.get(&range), Some(&Record::new(20, 21)));

    let empty = KeyRange::bound(Key::from(21), Key::from(29), false, false).unwrap();
    assert_eq!(store.get(empty), None);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_exact_key() {
    let (cache, mut store) = setup_store(StoreType::Object);
    store.add(Record::new(1, "a")).unwrap();
    store.add(Record::new(2, "b")).unwrap();

    let removed = store.delete(Key::from(1)).unwrap();

    assert_eq!(removed, vec![Record::new(1, "a")]);
    assert_eq!(store.records(), &[Record::new(2, "b")]);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_delete_missing_key_is_empty() {
    let (_cache, mut store) = setup_store(StoreType::Object);
    store.add(Record::new(1, "a")).unwrap();

    assert!(store.delete(Key::from(7)).unwrap().is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_delete_removes_every_duplicate() {
    let (cache, mut store) = setup_store(StoreType::Index);
    store.add(Record::new("k", 3)).unwrap();
    store.add(Record::new("j", 0)).unwrap();
    store.add(Record::new("k", 1)).unwrap();
    store.add(Record::new("k", 2)).unwrap();

    let removed = store.delete(Key::text("k")).unwrap();

    assert_eq!(
        removed,
        vec![Record::new("k", 1), Record::new("k", 2), Record::new("k", 3)]
    );
    assert!(store.get(Key::text("k")).is_none());
    assert_eq!(store.records(), &[Record::new("j", 0)]);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_delete_range() {
    let (_cache, mut store) = setup_store(StoreType::Object);
    for key in 1..=6 {
        store.add(Record::new(key, key)).unwrap();
    }

    let range = KeyRange::bound(Key::from(2), Key::from(5), true, false).unwrap();
    let removed = store.delete(range).unwrap();

    let removed_keys: Vec<Key> = removed.into_iter().map(|r| r.key).collect();
    assert_eq!(removed_keys, vec![Key::from(3), Key::from(4), Key::from(5)]);
    assert_eq!(keys_of(&store), vec![Key::from(1), Key::from(2), Key::from(6)]);
}

// =============================================================================
// Delete By Value Tests
// =============================================================================

#[test]
fn test_delete_by_value_purges_index_entries() {
    let (cache, mut store) = setup_store(StoreType::Index);
    store.add(Record::new("red", 1)).unwrap();
    store.add(Record::new("blue", 1)).unwrap();
    store.add(Record::new("red", 2)).unwrap();
    store.add(Record::new("green", 3)).unwrap();

    let removed = store.delete_by_value(Key::from(1)).unwrap();

    assert_eq!(removed, vec![Record::new("blue", 1), Record::new("red", 1)]);
    assert_eq!(
        store.records(),
        &[Record::new("green", 3), Record::new("red", 2)]
    );
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_delete_by_value_range_is_selective() {
    let (_cache, mut store) = setup_store(StoreType::Index);
    for value in 0..10 {
        store.add(Record::new(value % 3, value)).unwrap();
    }

    let range = KeyRange::bound(Key::from(3), Key::from(6), false, true).unwrap();
    let removed = store.delete_by_value(range.clone()).unwrap();

    let mut removed_values: Vec<Key> = removed.into_iter().map(|r| r.value).collect();
    removed_values.sort();
    assert_eq!(removed_values, vec![Key::from(3), Key::from(4), Key::from(5)]);

    assert_eq!(store.len(), 7);
    assert!(store.records().iter().all(|r| !range.includes(&r.value)));
    assert_sorted(&store);
}

// =============================================================================
// Clear Tests
// =============================================================================

#[test]
fn test_clear_returns_everything() {
    let (cache, mut store) = setup_store(StoreType::Index);
    store.add(Record::new(2, 0)).unwrap();
    store.add(Record::new(1, 0)).unwrap();
    store.add(Record::new(1, 1)).unwrap();
    let before = store.records().to_vec();

    let removed = store.clear().unwrap();

    assert_eq!(removed, before);
    assert!(store.is_empty());
    assert_eq!(store.values(None, Default::default()).count(), 0);
    assert!(cache.is_empty());
}

#[test]
fn test_clear_empty_store() {
    let (_cache, mut store) = setup_store(StoreType::Object);
    assert!(store.clear().unwrap().is_empty());
}

// =============================================================================
// Write-Through Tests
// =============================================================================

#[test]
fn test_write_through_addresses() {
    let (cache, mut store) = setup_store(StoreType::Index);
    store.add(Record::new("smith", 1)).unwrap();
    store.add(Record::new("smith", 2)).unwrap();

    assert_eq!(
        cache.addresses(),
        vec![
            "index/people/\"smith\"/1".to_string(),
            "index/people/\"smith\"/2".to_string(),
        ]
    );
    assert_eq!(cache.get("index/people/\"smith\"/2"), Some(Record::new("smith", 2)));
}

#[test]
fn test_duplicate_keys_do_not_collide_in_cache() {
    let cache = Arc::new(MemoryCache::new());
    {
        let mut store = RecordStore::open(cache.clone(), "tags", StoreType::Index).unwrap();
        for value in 0..5 {
            store.add(Record::new("hot", value)).unwrap();
        }
        store.delete_by_value(Key::from(2)).unwrap();
    }

    let reopened = RecordStore::open(cache, "tags", StoreType::Index).unwrap();
    let values: Vec<Key> = reopened.records().iter().map(|r| r.value.clone()).collect();
    assert_eq!(values, vec![Key::from(0), Key::from(1), Key::from(3), Key::from(4)]);
}

#[test]
fn test_failed_write_through_leaves_memory_untouched() {
    struct RefusingCache;

    impl PersistentCache for RefusingCache {
        fn is_loaded(&self) -> bool {
            true
        }
        fn values_with_prefix(&self, _prefix: &str) -> shelfkv::Result<Vec<Record>> {
            Ok(vec![Record::new(1, 1)])
        }
        fn set(&self, _address: &str, _record: &Record) -> shelfkv::Result<()> {
            Err(ShelfError::WalWrite("disk full".to_string()))
        }
        fn delete(&self, _address: &str) -> shelfkv::Result<()> {
            Err(ShelfError::WalWrite("disk full".to_string()))
        }
    }

    let mut store = RecordStore::open(Arc::new(RefusingCache), "x", StoreType::Object).unwrap();

    assert!(store.add(Record::new(2, 2)).is_err());
    assert!(store.delete(Key::from(1)).is_err());
    assert!(store.clear().is_err());
    // Memory is untouched by failed write-throughs
    assert_eq!(store.records(), &[Record::new(1, 1)]);
}
