//! Pattern scan benchmark CLI.
//!
//! Builds a deterministic synthetic haystack, verifies every scan strategy
//! against the fixture set, times the survivors, and prints a ranking.
//!
//! # Output Format
//!
//! One block per passing strategy, fastest first:
//! `[+] <name>` followed by `Avg: <ms> | Med: <ms> | Dev: <ms>`.
//! Failed strategies are listed afterwards with their diagnostic.
//!
//! # Exit Codes
//!
//! - `0`: benchmark ran (regardless of per-strategy failures)
//! - `2`: invalid arguments

use std::env;
use std::process::ExitCode;
use std::time::Duration;

use sigscan::corpus::synthetic_corpus;
use sigscan::harness::{run_benchmark, HarnessConfig, StrategyError};
use sigscan::scan::{all_scanners, ParallelScanner, Scanner};

const DEFAULT_SIZE_MIB: usize = 16;
const DEFAULT_SEED: u64 = 0x2D74_CAE2_1908_5257;

fn print_usage(exe: &std::ffi::OsStr) {
    eprintln!(
        "usage: {} [OPTIONS]

OPTIONS:
    --size-mib=<N>      Haystack size in MiB (default: {DEFAULT_SIZE_MIB})
    --iterations=<N>    Timed fixture passes per strategy (default: 10)
    --seed=<N>          Haystack fill seed (default: {DEFAULT_SEED})
    --workers=<N>       Worker threads for the parallel strategy (default: all cores)
    --budget-secs=<N>   Per-strategy wall-clock budget (default: 120)
    --help, -h          Show this help message",
        exe.to_string_lossy()
    );
}

fn main() -> ExitCode {
    let mut args = env::args_os();
    let exe = args.next().unwrap_or_else(|| "sigscan".into());

    let mut size_mib = DEFAULT_SIZE_MIB;
    let mut config = HarnessConfig::default();
    let mut seed = DEFAULT_SEED;
    let mut workers: Option<usize> = None;

    for arg in args {
        let Some(flag) = arg.to_str() else {
            eprintln!("invalid argument: {arg:?}");
            return ExitCode::from(2);
        };
        let parsed = if let Some(value) = flag.strip_prefix("--size-mib=") {
            value.parse().map(|n: usize| size_mib = n.max(1))
        } else if let Some(value) = flag.strip_prefix("--iterations=") {
            value.parse().map(|n: usize| config.timed_iterations = n.max(1))
        } else if let Some(value) = flag.strip_prefix("--seed=") {
            value.parse().map(|n: u64| seed = n)
        } else if let Some(value) = flag.strip_prefix("--workers=") {
            value.parse().map(|n: usize| workers = Some(n.max(1)))
        } else if let Some(value) = flag.strip_prefix("--budget-secs=") {
            value
                .parse()
                .map(|n: u64| config.strategy_budget = Duration::from_secs(n.max(1)))
        } else {
            if flag == "--help" || flag == "-h" {
                print_usage(&exe);
                return ExitCode::SUCCESS;
            }
            eprintln!("unknown option: {flag}");
            print_usage(&exe);
            return ExitCode::from(2);
        };
        if parsed.is_err() {
            eprintln!("invalid value in {flag}");
            return ExitCode::from(2);
        }
    }

    let (hay, fixtures) = synthetic_corpus(size_mib * 1024 * 1024, seed);
    let mut scanners = all_scanners();
    if let Some(n) = workers {
        let replacement = ParallelScanner::with_workers(n);
        for slot in &mut scanners {
            if slot.name() == replacement.name() {
                *slot = Box::new(replacement.clone());
            }
        }
    }
    println!(
        "{} fixtures | {} iterations | {} strategies | {} MiB haystack",
        fixtures.len(),
        config.timed_iterations,
        scanners.len(),
        size_mib
    );

    let report = run_benchmark(&scanners, &hay, &fixtures, &config);

    for strat in report.ranking() {
        let Ok(series) = &strat.outcome else {
            continue;
        };
        println!("[+] {}", strat.name);
        println!(
            "\tAvg: {} ms | Med: {} ms | Dev: {:.2} ms",
            series.mean().as_millis(),
            series.median().as_millis(),
            series.std_dev().as_secs_f64() * 1000.0
        );
    }

    for strat in report.failures() {
        let Err(err) = &strat.outcome else {
            continue;
        };
        match err {
            StrategyError::Unsupported(reason) => {
                println!("[-] {} skipped: {reason}", strat.name);
            }
            other => println!("[-] {} FAILED: {other}", strat.name),
        }
    }

    println!("finished...");
    ExitCode::SUCCESS
}
