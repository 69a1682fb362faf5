use super::concurrent_map::ConcurrentMap;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

/// The same hash table behind a reader/writer lock. Gets take the lock
/// in shared mode and may run concurrently with each other; puts and
/// removes take it in exclusive mode and exclude everything else, so a
/// get can never observe a half-applied write.
pub struct RwLockMap<K, V> {
    data: RwLock<HashMap<K, V>>,
}

impl<K, V> RwLockMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        RwLockMap {
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn get(&self, k: &K) -> Option<V> {
        self.data.read().unwrap().get(k).cloned()
    }

    pub fn put(&self, k: K, v: V) -> Option<V> {
        self.data.write().unwrap().insert(k, v)
    }

    pub fn remove(&self, k: &K) -> Option<V> {
        self.data.write().unwrap().remove(k)
    }
}

impl<K, V> Default for RwLockMap<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ConcurrentMap<K, V> for RwLockMap<K, V>
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
    use super::RwLockMap;
    use crate::concurrent_map::tests;

    #[test]
    fn smoke_rwlock_map() {
        tests::smoke::<RwLockMap<usize, String>>();
    }

    #[test]
    fn put_get_all() {
        tests::put_get_all::<RwLockMap<usize, String>>();
    }

    #[test]
    fn put_returns_previous() {
        tests::put_returns_previous::<RwLockMap<usize, String>>();
    }

    #[test]
    fn remove_semantics() {
        tests::remove_semantics::<RwLockMap<usize, String>>();
    }

    #[test]
    fn churn_occupancy() {
        tests::churn_occupancy::<RwLockMap<usize, String>>();
    }
}
