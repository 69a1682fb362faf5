pub mod concurrent_map;
pub mod config;
pub mod keygen;
pub mod lock_map;
pub mod rwlock_map;
pub mod unsync_map;
pub mod workload;

pub use self::concurrent_map::ConcurrentMap;
pub use self::keygen::KeyGenerator;
pub use self::lock_map::LockMap;
pub use self::rwlock_map::RwLockMap;
pub use self::unsync_map::UnsyncMap;
