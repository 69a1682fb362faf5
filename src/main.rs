use map_benchmark::config::map::{setup, Config, MapKind, Perf, WorkloadKind};
use map_benchmark::workload::{
    self, VerificationSink, WorkloadSpec, READ_RATIO_HIGH, READ_RATIO_LOW,
};
use map_benchmark::{ConcurrentMap, LockMap, RwLockMap, UnsyncMap};

fn main() {
    let (config, output) = setup();
    println!("{}", config);
    let perf = match config.map {
        MapKind::Lock => bench_map::<LockMap<usize, String>>(&config),
        MapKind::Rwlock => bench_map::<RwLockMap<usize, String>>(&config),
        MapKind::Unsync => bench_map::<UnsyncMap<usize, String>>(&config),
    };
    output.write_record(&config, &perf);
    println!("{}", perf);
}

fn bench_map<M: ConcurrentMap<usize, String> + Send + Sync>(config: &Config) -> Perf {
    let map = M::new();
    let sink = VerificationSink::new();
    let spec = WorkloadSpec {
        dist: config.key_dist,
        iters: config.iters,
        key_range: config.key_range,
        lanes: config.threads,
        writers: config.writers,
        readers: config.readers,
    };
    let elapsed = match config.workload {
        WorkloadKind::WriteOnly => workload::write_only(&map, &spec, &sink),
        WorkloadKind::ReadLight => workload::mixed(&map, &spec, READ_RATIO_HIGH, &sink),
        WorkloadKind::ReadWrite => workload::mixed(&map, &spec, READ_RATIO_LOW, &sink),
        WorkloadKind::ReadOnly => workload::read_only(&map, &spec, &sink),
        WorkloadKind::WritersReaders => workload::writers_readers(&map, &spec, &sink),
        WorkloadKind::Churn => workload::churn(&map, &spec, &sink),
    };

    for line in sink.failure_samples() {
        println!("verification failure: {}", line);
    }
    let ops = sink.ops();
    let secs = elapsed.as_secs_f64();
    Perf {
        ops,
        ops_per_sec: if secs > 0.0 { (ops as f64 / secs) as u64 } else { 0 },
        mismatches: sink.mismatches(),
        missing: sink.missing(),
    }
}
