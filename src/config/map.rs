use clap::{value_parser, Arg, ArgAction, Command, ValueEnum};
use csv::Writer;
use std::fmt;
use std::fs::{create_dir_all, File, OpenOptions};
use std::path::Path;
use std::thread::available_parallelism;

#[derive(PartialEq, Eq, Debug, ValueEnum, Clone, Copy)]
pub enum MapKind {
    /// One mutual-exclusion lock around the whole table.
    Lock,
    /// A reader/writer lock: shared gets, exclusive puts and removes.
    Rwlock,
    /// No locking at all; single-lane or read-only use only.
    Unsync,
}

#[derive(PartialEq, Eq, Debug, ValueEnum, Clone, Copy)]
pub enum WorkloadKind {
    WriteOnly,
    /// A verified get every 1000th iteration, puts otherwise.
    ReadLight,
    /// A verified get every 2nd iteration, puts otherwise.
    ReadWrite,
    /// Verified gets against a prepopulated static table.
    ReadOnly,
    /// Writer lanes and reader lanes over a prepopulated table.
    WritersReaders,
    /// Put-every-key then remove-every-key cycles.
    Churn,
}

#[derive(PartialEq, Eq, Debug, ValueEnum, Clone, Copy)]
pub enum KeyDist {
    Uniform,
    Gaussian,
    Sequential,
}

pub struct Config {
    pub map: MapKind,
    pub workload: WorkloadKind,
    pub key_dist: KeyDist,
    pub threads: usize,
    pub key_range: usize,
    pub iters: usize,
    pub writers: usize,
    pub readers: usize,
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {}: {} dist, r{}, t{}, i{}, {}w/{}r",
            self.map.to_possible_value().unwrap().get_name(),
            self.workload.to_possible_value().unwrap().get_name(),
            self.key_dist.to_possible_value().unwrap().get_name(),
            self.key_range,
            self.threads,
            self.iters,
            self.writers,
            self.readers,
        )
    }
}

#[derive(Clone)]
pub struct Perf {
    pub ops: u64,
    pub ops_per_sec: u64,
    pub mismatches: u64,
    pub missing: u64,
}

impl fmt::Display for Perf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ops: {}, ops/s: {}, value mismatches: {}, missing keys: {}",
            self.ops, self.ops_per_sec, self.mismatches, self.missing
        )
    }
}

pub struct BenchWriter {
    output: Option<Writer<File>>,
}

impl BenchWriter {
    pub fn write_record(self, config: &Config, perf: &Perf) {
        if let Some(mut output) = self.output {
            output
                .write_record(&[
                    config.map.to_possible_value().unwrap().get_name().to_string(),
                    config
                        .workload
                        .to_possible_value()
                        .unwrap()
                        .get_name()
                        .to_string(),
                    config
                        .key_dist
                        .to_possible_value()
                        .unwrap()
                        .get_name()
                        .to_string(),
                    config.threads.to_string(),
                    config.writers.to_string(),
                    config.readers.to_string(),
                    config.key_range.to_string(),
                    config.iters.to_string(),
                    perf.ops_per_sec.to_string(),
                    perf.ops.to_string(),
                    perf.mismatches.to_string(),
                    perf.missing.to_string(),
                ])
                .unwrap();
            output.flush().unwrap();
        }
    }
}

pub fn setup() -> (Config, BenchWriter) {
    let m = Command::new("map-benchmark")
        .arg(
            Arg::new("map")
                .short('d')
                .long("map")
                .value_parser(value_parser!(MapKind))
                .required(true)
                .ignore_case(true)
                .help("Map implementation to drive"),
        )
        .arg(
            Arg::new("workload")
                .short('w')
                .long("workload")
                .value_parser(value_parser!(WorkloadKind))
                .required(true)
                .ignore_case(true)
                .help("Workload driver"),
        )
        .arg(
            Arg::new("key dist")
                .short('k')
                .long("key-dist")
                .value_parser(value_parser!(KeyDist))
                .ignore_case(true)
                .default_value("uniform")
                .help("Key distribution"),
        )
        .arg(
            Arg::new("threads")
                .short('t')
                .value_parser(value_parser!(usize))
                .default_value("0")
                .help("Lanes for single-role workloads. 0 for one per logical core."),
        )
        .arg(
            Arg::new("range")
                .short('r')
                .value_parser(value_parser!(usize))
                .default_value("100000")
                .help("Key range: [0..RANGE)"),
        )
        .arg(
            Arg::new("iters")
                .short('i')
                .value_parser(value_parser!(usize))
                .help("Iterations per lane (cycles per lane for churn)"),
        )
        .arg(
            Arg::new("writers")
                .long("writers")
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Writer lanes for the writers-readers workload"),
        )
        .arg(
            Arg::new("readers")
                .long("readers")
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Reader lanes for the writers-readers workload"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .help("Output CSV filename. Appends the data if the file already exists."),
        )
        .arg(
            Arg::new("dry run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Check whether the arguments are parsable, without running a benchmark"),
        )
        .get_matches();

    let map = m.get_one::<MapKind>("map").copied().unwrap();
    let workload = m.get_one::<WorkloadKind>("workload").copied().unwrap();
    let key_dist = m.get_one::<KeyDist>("key dist").copied().unwrap();
    let threads = match m.get_one::<usize>("threads").copied().unwrap() {
        0 => available_parallelism().map(|v| v.get()).unwrap_or(1),
        t => t,
    };
    let key_range = m.get_one::<usize>("range").copied().unwrap();
    let iters = m
        .get_one::<usize>("iters")
        .copied()
        .unwrap_or(match workload {
            WorkloadKind::Churn => 5,
            _ => 1_000_000,
        });
    let writers = m.get_one::<usize>("writers").copied().unwrap();
    let readers = m.get_one::<usize>("readers").copied().unwrap();

    if key_range == 0 {
        eprintln!("key range must be at least 1");
        std::process::exit(1);
    }
    if workload == WorkloadKind::WritersReaders && writers + readers == 0 {
        eprintln!("writers-readers needs at least one lane");
        std::process::exit(1);
    }
    if map == MapKind::Unsync {
        let lanes = match workload {
            WorkloadKind::WritersReaders => writers + readers,
            _ => threads,
        };
        let mutates = match workload {
            WorkloadKind::ReadOnly => false,
            WorkloadKind::WritersReaders => writers > 0,
            _ => true,
        };
        if mutates && lanes > 1 {
            eprintln!(
                "the unsync map must not be mutated concurrently; \
                 use a single lane or the read-only workload"
            );
            std::process::exit(1);
        }
    }

    let output = m.get_one::<String>("output").map(|output_name| {
        let output_path = Path::new(output_name);
        let dir = output_path.parent().unwrap();
        create_dir_all(dir).unwrap();
        match OpenOptions::new().read(true).append(true).open(output_path) {
            Ok(f) => csv::Writer::from_writer(f),
            Err(_) => {
                let f = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(true)
                    .open(output_path)
                    .unwrap();
                let mut output = csv::Writer::from_writer(f);
                // NOTE: `write_record` on `bench`
                output
                    .write_record([
                        "map",
                        "workload",
                        "key_dist",
                        "threads",
                        "writers",
                        "readers",
                        "key_range",
                        "iters",
                        "throughput",
                        "ops",
                        "mismatches",
                        "missing",
                    ])
                    .unwrap();
                output.flush().unwrap();
                output
            }
        }
    });

    let config = Config {
        map,
        workload,
        key_dist,
        threads,
        key_range,
        iters,
        writers,
        readers,
    };

    if m.get_flag("dry run") {
        std::process::exit(0);
    }

    (config, BenchWriter { output })
}
