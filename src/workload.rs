use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Barrier, Mutex};
use std::time::{Duration, Instant};

use crossbeam_utils::thread::scope;

use crate::concurrent_map::ConcurrentMap;
use crate::config::map::KeyDist;
use crate::keygen::KeyGenerator;

/// Read every 1000th iteration: write-heavy, read-light.
pub const READ_RATIO_HIGH: usize = 1000;
/// Read every 2nd iteration: balanced read and write pressure.
pub const READ_RATIO_LOW: usize = 2;

const FAILURE_SAMPLES: usize = 8;

/// The expected value for a key: its 12-wide decimal rendering. Writers
/// derive stored values with this function and verifying readers
/// re-derive them, so no separate oracle is needed.
pub fn value_of(key: usize) -> String {
    format!("{:12}", key)
}

/// Per-run parameters shared by all drivers. `lanes` sizes the
/// single-role drivers; `writers`/`readers` size the fan-out driver.
pub struct WorkloadSpec {
    pub dist: KeyDist,
    pub iters: usize,
    pub key_range: usize,
    pub lanes: usize,
    pub writers: usize,
    pub readers: usize,
}

/// Accumulates verification failures without aborting the run, so an
/// isolated failure cannot invalidate the throughput measurement. Lanes
/// only append while the run is in flight; totals are read afterwards.
pub struct VerificationSink {
    ops: AtomicU64,
    mismatches: AtomicU64,
    missing: AtomicU64,
    samples: Mutex<Vec<String>>,
}

impl VerificationSink {
    pub fn new() -> Self {
        VerificationSink {
            ops: AtomicU64::new(0),
            mismatches: AtomicU64::new(0),
            missing: AtomicU64::new(0),
            samples: Mutex::new(Vec::new()),
        }
    }

    pub fn add_ops(&self, n: u64) {
        self.ops.fetch_add(n, Ordering::Relaxed);
    }

    /// A get or remove came back with a value that was never stored for
    /// that key.
    pub fn record_mismatch(&self, key: usize, expected: &str, got: &str) {
        self.mismatches.fetch_add(1, Ordering::Relaxed);
        self.sample(format!(
            "key {}: expected {:?}, got {:?}",
            key, expected, got
        ));
    }

    /// A key the driver's own logic guarantees present came back absent.
    pub fn record_missing(&self, key: usize) {
        self.missing.fetch_add(1, Ordering::Relaxed);
        self.sample(format!("key {}: expected a value, found none", key));
    }

    fn sample(&self, report: String) {
        let mut samples = self.samples.lock().unwrap();
        if samples.len() < FAILURE_SAMPLES {
            samples.push(report);
        }
    }

    pub fn ops(&self) -> u64 {
        self.ops.load(Ordering::Relaxed)
    }

    pub fn mismatches(&self) -> u64 {
        self.mismatches.load(Ordering::Relaxed)
    }

    pub fn missing(&self) -> u64 {
        self.missing.load(Ordering::Relaxed)
    }

    /// The first few failure descriptions, for the end-of-run report.
    pub fn failure_samples(&self) -> Vec<String> {
        self.samples.lock().unwrap().clone()
    }
}

impl Default for VerificationSink {
    fn default() -> Self {
        Self::new()
    }
}

fn verify_get<M>(map: &M, key: usize, require_found: bool, sink: &VerificationSink)
where
    M: ConcurrentMap<usize, String>,
{
    match map.get(&key) {
        Some(found) => {
            let expected = value_of(key);
            if found != expected {
                sink.record_mismatch(key, &expected, &found);
            }
        }
        None if require_found => sink.record_missing(key),
        None => {}
    }
}

/// Fans `body` out across `lanes` parallel lanes. Every lane blocks on
/// a shared gate until all lanes are spawned, so no lane gets a head
/// start; the clock starts when the gate opens and stops once every
/// lane has joined. Returns the timed span.
pub fn fan_out<F>(lanes: usize, body: F) -> Duration
where
    F: Fn(usize) + Sync,
{
    let barrier = Barrier::new(lanes + 1);
    let mut elapsed = Duration::ZERO;
    scope(|s| {
        let handles: Vec<_> = (0..lanes)
            .map(|lane| {
                let barrier = &barrier;
                let body = &body;
                s.spawn(move |_| {
                    barrier.wait();
                    body(lane);
                })
            })
            .collect();
        barrier.wait();
        let start = Instant::now();
        for handle in handles {
            handle.join().unwrap();
        }
        elapsed = start.elapsed();
    })
    .unwrap();
    elapsed
}

/// Bulk-loads `[0, key_range)` with the expected value for every key.
/// Drivers call this before the timed section.
pub fn prefill<M>(map: &M, key_range: usize)
where
    M: ConcurrentMap<usize, String>,
{
    for key in 0..key_range {
        map.put(key, value_of(key));
    }
}

/// Pure puts from the configured distribution. Nothing to verify beyond
/// completing without a crash.
pub fn write_only<M>(map: &M, spec: &WorkloadSpec, sink: &VerificationSink) -> Duration
where
    M: ConcurrentMap<usize, String> + Send + Sync,
{
    fan_out(spec.lanes, |_| {
        let mut keys = KeyGenerator::new(spec.dist, spec.key_range);
        for _ in 0..spec.iters {
            let key = keys.next_key();
            map.put(key, value_of(key));
        }
        sink.add_ops(spec.iters as u64);
    })
}

/// Puts with a verified get every `read_every`th iteration. Reads may
/// target keys nothing has written yet, so a miss is not a failure; a
/// found-but-wrong value is.
pub fn mixed<M>(
    map: &M,
    spec: &WorkloadSpec,
    read_every: usize,
    sink: &VerificationSink,
) -> Duration
where
    M: ConcurrentMap<usize, String> + Send + Sync,
{
    fan_out(spec.lanes, |_| {
        let mut keys = KeyGenerator::new(spec.dist, spec.key_range);
        for i in 0..spec.iters {
            let key = keys.next_key();
            if i > 0 && i % read_every == 0 {
                verify_get(map, key, false, sink);
            } else {
                map.put(key, value_of(key));
            }
        }
        sink.add_ops(spec.iters as u64);
    })
}

/// Verified gets against a prepopulated, static table. The bulk load
/// happens before the clock starts, and because nothing mutates during
/// the read phase, every read must hit.
pub fn read_only<M>(map: &M, spec: &WorkloadSpec, sink: &VerificationSink) -> Duration
where
    M: ConcurrentMap<usize, String> + Send + Sync,
{
    prefill(map, spec.key_range);
    fan_out(spec.lanes, |_| {
        let mut keys = KeyGenerator::new(spec.dist, spec.key_range);
        for _ in 0..spec.iters {
            verify_get(map, keys.next_key(), true, sink);
        }
        sink.add_ops(spec.iters as u64);
    })
}

/// One lane per writer doing pure random puts and one lane per reader
/// doing pure verified random gets, over a prepopulated table. Writers
/// overwrite but never remove, so a reader miss is a failure.
pub fn writers_readers<M>(map: &M, spec: &WorkloadSpec, sink: &VerificationSink) -> Duration
where
    M: ConcurrentMap<usize, String> + Send + Sync,
{
    prefill(map, spec.key_range);
    fan_out(spec.writers + spec.readers, |lane| {
        let mut keys = KeyGenerator::uniform(spec.key_range);
        if lane < spec.writers {
            for _ in 0..spec.iters {
                let key = keys.next_key();
                map.put(key, value_of(key));
            }
        } else {
            for _ in 0..spec.iters {
                verify_get(map, keys.next_key(), true, sink);
            }
        }
        sink.add_ops(spec.iters as u64);
    })
}

/// `iters` cycles of put-every-key then remove-every-key, per lane.
/// Stresses an implementation's ability to shrink and reclaim slots on
/// delete instead of growing without bound.
pub fn churn<M>(map: &M, spec: &WorkloadSpec, sink: &VerificationSink) -> Duration
where
    M: ConcurrentMap<usize, String> + Send + Sync,
{
    fan_out(spec.lanes, |_| {
        for _ in 0..spec.iters {
            for key in 0..spec.key_range {
                map.put(key, value_of(key));
            }
            for key in 0..spec.key_range {
                map.remove(&key);
            }
        }
        sink.add_ops((spec.iters * spec.key_range * 2) as u64);
    })
}
