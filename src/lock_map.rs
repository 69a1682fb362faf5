use super::concurrent_map::ConcurrentMap;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// One hash table behind a single mutual-exclusion lock. Every
/// operation holds the lock for its whole duration, so all access is
/// serialized: readers block on writers and on each other. This is the
/// strictest (and usually slowest) of the reference variants.
pub struct LockMap<K, V> {
    data: Mutex<HashMap<K, V>>,
}

impl<K, V> LockMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        LockMap {
            data: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, k: &K) -> Option<V> {
        self.data.lock().unwrap().get(k).cloned()
    }

    pub fn put(&self, k: K, v: V) -> Option<V> {
        self.data.lock().unwrap().insert(k, v)
    }

    pub fn remove(&self, k: &K) -> Option<V> {
        self.data.lock().unwrap().remove(k)
    }
}

impl<K, V> Default for LockMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ConcurrentMap<K, V> for LockMap<K, V>
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
    use super::LockMap;
    use crate::concurrent_map::tests;

    #[test]
    fn smoke_lock_map() {
        tests::smoke::<LockMap<usize, String>>();
    }

    #[test]
    fn put_get_all() {
        tests::put_get_all::<LockMap<usize, String>>();
    }

    #[test]
    fn put_returns_previous() {
        tests::put_returns_previous::<LockMap<usize, String>>();
    }

    #[test]
    fn remove_semantics() {
        tests::remove_semantics::<LockMap<usize, String>>();
    }

    #[test]
    fn churn_occupancy() {
        tests::churn_occupancy::<LockMap<usize, String>>();
    }
}
