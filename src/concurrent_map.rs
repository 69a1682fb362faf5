/// The capability set every map variant and the harness agree on.
///
/// All three operations take `&self`; whatever synchronization (or lack
/// of it) a variant provides is its own business. Values come back by
/// clone so no reference can outlive a variant's internal lock.
pub trait ConcurrentMap<K, V> {
    fn new() -> Self;
    /// Returns the currently stored value for `key`, if present.
    fn get(&self, key: &K) -> Option<V>;
    /// Installs `value` for `key`, returning the value it replaced
    /// (`None` on a fresh insert).
    fn put(&self, key: K, value: V) -> Option<V>;
    /// Deletes the mapping for `key`, returning the removed value.
    fn remove(&self, key: &K) -> Option<V>;
}

#[cfg(test)]
pub mod tests {
    use super::ConcurrentMap;
    use crossbeam_utils::thread;
    use rand::prelude::*;

    const THREADS: usize = 30;
    const ELEMENTS_PER_THREAD: usize = 1000;

    fn value_of(key: usize) -> String {
        format!("{:12}", key)
    }

    /// Concurrent put / remove / get over disjoint per-thread key sets.
    pub fn smoke<M: ConcurrentMap<usize, String> + Send + Sync>() {
        let map = &M::new();

        thread::scope(|s| {
            for t in 0..THREADS {
                s.spawn(move |_| {
                    let mut rng = rand::thread_rng();
                    let mut keys: Vec<usize> =
                        (0..ELEMENTS_PER_THREAD).map(|k| k * THREADS + t).collect();
                    keys.shuffle(&mut rng);
                    for k in keys {
                        assert_eq!(map.put(k, value_of(k)), None);
                    }
                });
            }
        })
        .unwrap();

        thread::scope(|s| {
            for t in 0..(THREADS / 2) {
                s.spawn(move |_| {
                    let mut rng = rand::thread_rng();
                    let mut keys: Vec<usize> =
                        (0..ELEMENTS_PER_THREAD).map(|k| k * THREADS + t).collect();
                    keys.shuffle(&mut rng);
                    for k in keys {
                        assert_eq!(map.remove(&k), Some(value_of(k)));
                    }
                });
            }
        })
        .unwrap();

        thread::scope(|s| {
            for t in (THREADS / 2)..THREADS {
                s.spawn(move |_| {
                    let mut rng = rand::thread_rng();
                    let mut keys: Vec<usize> =
                        (0..ELEMENTS_PER_THREAD).map(|k| k * THREADS + t).collect();
                    keys.shuffle(&mut rng);
                    for k in keys {
                        assert_eq!(map.get(&k), Some(value_of(k)));
                    }
                });
            }
        })
        .unwrap();
    }

    /// Put a small key space, then get every key back with its exact
    /// stored value.
    pub fn put_get_all<M: ConcurrentMap<usize, String>>() {
        let map = M::new();
        for k in 0..16 {
            map.put(k, value_of(k));
        }
        for k in 0..16 {
            assert_eq!(map.get(&k), Some(value_of(k)));
        }
    }

    /// A second put on the same key returns the first put's value.
    pub fn put_returns_previous<M: ConcurrentMap<usize, String>>() {
        let map = M::new();
        assert_eq!(map.put(5, "a".to_string()), None);
        assert_eq!(map.put(5, "b".to_string()), Some("a".to_string()));
        assert_eq!(map.get(&5), Some("b".to_string()));
    }

    /// Remove returns the stored value once; the key is gone afterwards,
    /// and keys never put miss on both get and remove.
    pub fn remove_semantics<M: ConcurrentMap<usize, String>>() {
        let map = M::new();
        map.put(5, "a".to_string());
        assert_eq!(map.remove(&5), Some("a".to_string()));
        assert_eq!(map.get(&5), None);
        assert_eq!(map.remove(&5), None);
        assert_eq!(map.get(&7), None);
        assert_eq!(map.remove(&7), None);
    }

    /// Write-delete-write cycles: full occupancy at each midpoint, empty
    /// at the end of each cycle.
    pub fn churn_occupancy<M: ConcurrentMap<usize, String>>() {
        let map = M::new();
        for _ in 0..5 {
            for k in 0..16 {
                map.put(k, value_of(k));
            }
            for k in 0..16 {
                assert_eq!(map.get(&k), Some(value_of(k)));
            }
            for k in 0..16 {
                assert_eq!(map.remove(&k), Some(value_of(k)));
            }
            for k in 0..16 {
                assert_eq!(map.get(&k), None);
            }
        }
    }
}
