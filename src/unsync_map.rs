use super::concurrent_map::ConcurrentMap;
use std::cell::UnsafeCell;
use std::collections::HashMap;
use std::hash::Hash;

/// The baseline with no locking at all: a bare hash table behind an
/// `UnsafeCell`. It measures what synchronization costs, so the missing
/// synchronization is deliberate, not a bug to fix.
///
/// Only two usage patterns are sound: a single lane doing anything, or
/// any number of lanes doing reads against a table that was fully
/// loaded before they started. Concurrent mutation is a data race; the
/// CLI refuses to set that up (see `config::map::setup`).
pub struct UnsyncMap<K, V> {
    data: UnsafeCell<HashMap<K, V>>,
}

// Sound only under the usage patterns documented above.
unsafe impl<K: Send, V: Send> Sync for UnsyncMap<K, V> {}

impl<K, V> UnsyncMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        UnsyncMap {
            data: UnsafeCell::new(HashMap::new()),
        }
    }

    pub fn get(&self, k: &K) -> Option<V> {
        unsafe { (*self.data.get()).get(k).cloned() }
    }

    pub fn put(&self, k: K, v: V) -> Option<V> {
        unsafe { (*self.data.get()).insert(k, v) }
    }

    pub fn remove(&self, k: &K) -> Option<V> {
        unsafe { (*self.data.get()).remove(k) }
    }
}

impl<K, V> Default for UnsyncMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ConcurrentMap<K, V> for UnsyncMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn new() -> Self {
        Self::new()
    }

    #[inline(never)]
    fn get(&self, key: &K) -> Option<V> {
        self.get(key)
    }

    #[inline(never)]
    fn put(&self, key: K, value: V) -> Option<V> {
        self.put(key, value)
    }

    #[inline(never)]
    fn remove(&self, key: &K) -> Option<V> {
        self.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::UnsyncMap;
    use crate::concurrent_map::tests;
    use crossbeam_utils::thread;

    // No concurrent-mutation smoke test here: that usage is exactly
    // what this variant does not support.

    #[test]
    fn put_get_all() {
        tests::put_get_all::<UnsyncMap<usize, String>>();
    }

    #[test]
    fn put_returns_previous() {
        tests::put_returns_previous::<UnsyncMap<usize, String>>();
    }

    #[test]
    fn remove_semantics() {
        tests::remove_semantics::<UnsyncMap<usize, String>>();
    }

    #[test]
    fn churn_occupancy() {
        tests::churn_occupancy::<UnsyncMap<usize, String>>();
    }

    #[test]
    fn concurrent_reads_after_bulk_load() {
        let map = UnsyncMap::new();
        for k in 0..1024usize {
            map.put(k, format!("{:12}", k));
        }
        let map = &map;
        thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(move |_| {
                    for k in 0..1024usize {
                        assert_eq!(map.get(&k), Some(format!("{:12}", k)));
                    }
                });
            }
        })
        .unwrap();
    }
}
