//! Masked byte-pattern scanning with a verify-then-benchmark harness.
//!
//! ## Scope
//! This crate locates a fixed-length byte pattern containing "don't care"
//! slots inside a large immutable buffer, implements several competing
//! search strategies, and proves each strategy bit-identical against
//! fixture ground truth before timing it.
//!
//! ## Key invariants
//! - One correctness oracle: the smallest offset where every exact slot
//!   compares equal ([`scan::matches_at`]). Every strategy must agree with
//!   it on every input, including all-wildcard patterns, literal `00`
//!   bytes, and patterns longer than the buffer.
//! - Buffers and patterns are immutable and shared without locking; the
//!   only mutable shared state anywhere is the parallel scanner's
//!   best-offset atomic.
//! - A strategy is either fully verified or excluded from ranking; failed
//!   strategies contribute no timing data.
//!
//! ## Strategy families
//! - Linear byte-wise scanners (ground truth, performance floor).
//! - A skip-table scanner (Boyer-Moore-Horspool adapted for wildcards).
//! - Vectorized scanners (SSE2/NEON lanes, AVX2 wide candidate windows).
//! - A sharded parallel scanner racing vectorized scans to the smallest
//!   offset.
//!
//! ## Flow
//! `pattern text -> Pattern -> Scanner::find -> offset -> harness verify ->
//! timing series -> ranked report`
//!
//! ## Notable entry points
//! - [`Pattern::parse`]: compile hex-or-wildcard token text.
//! - [`scan::Scanner`] / [`scan::all_scanners`]: the strategy contract and
//!   registry.
//! - [`harness::run_benchmark`]: verification, timing, ranking.
//! - [`corpus::synthetic_corpus`]: deterministic haystack + fixtures for
//!   the demo binary, benches, and tests.

pub mod corpus;
pub mod harness;
pub mod pattern;
pub mod scan;

pub use harness::{
    BenchmarkReport, Fixture, FixtureSet, HarnessConfig, StrategyError, StrategyReport,
    TimingSample, TimingSeries,
};
pub use pattern::{Pattern, PatternParseError};
pub use scan::{
    all_scanners, matches_at, AnchorByteScanner, CapabilityError, HorspoolScanner, NaiveScanner,
    ParallelScanner, RestartScanner, Scanner, VectorScanner, WideVectorScanner,
};
