//! Scan strategies: a common contract and the families that implement it.
//!
//! Every strategy answers the same question: the smallest offset `o` such
//! that for every slot `i` of the pattern, either slot `i` is a wildcard or
//! `hay[o + i] == pattern.bytes()[i]`; `None` when no such offset exists
//! with `o + pattern.len() <= hay.len()`. [`matches_at`] is that definition
//! in code form and is the single correctness oracle; every family's verify
//! step either calls it or must agree with it bit-for-bit.
//!
//! # Invariants
//! - `find` is pure with respect to its inputs: no hidden mutable state,
//!   identical inputs yield identical results.
//! - A pattern longer than the buffer is `None`, never a fault.
//! - An all-wildcard pattern matches at offset 0 whenever it fits.
//! - Wildcard filler bytes are never compared; the mask decides.
//!
//! # Families
//! - [`linear`] — byte-wise scanners; the performance floor and ground truth.
//! - [`horspool`] — skip-table scanner (Boyer-Moore-Horspool with wildcards).
//! - [`simd`] — vectorized scanners (SSE2/NEON lanes, AVX2 wide windows).
//! - [`parallel`] — sharded multi-threaded scan over the vectorized core.

use std::fmt;

use crate::pattern::Pattern;

pub mod horspool;
pub mod linear;
pub mod parallel;
pub mod simd;

pub use horspool::HorspoolScanner;
pub use linear::{AnchorByteScanner, NaiveScanner, RestartScanner};
pub use parallel::ParallelScanner;
pub use simd::{VectorScanner, WideVectorScanner};

/// A pattern search strategy.
///
/// Implementations are stateless with respect to scans: `find` may be called
/// concurrently from multiple threads on shared buffers and patterns.
pub trait Scanner: Send + Sync {
    /// Stable display name used in reports and rankings.
    fn name(&self) -> &'static str;

    /// One-time capability probe.
    ///
    /// Strategies that require hardware support fail fast here with a
    /// descriptive error instead of silently running an unaccelerated path
    /// the caller would mistake for the accelerated one.
    fn probe(&self) -> Result<(), CapabilityError> {
        Ok(())
    }

    /// Returns the smallest matching offset, or `None`.
    fn find(&self, hay: &[u8], pat: &Pattern) -> Option<usize>;
}

/// A strategy's hardware requirements are not met on this machine.
///
/// Strategy-scoped: the harness skips the strategy and proceeds with the
/// rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CapabilityError {
    /// The CPU lacks a required instruction set extension.
    MissingCpuFeature { feature: &'static str },
    /// The target architecture has no accelerated implementation.
    UnsupportedArch { arch: &'static str },
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCpuFeature { feature } => {
                write!(f, "required CPU feature unavailable: {feature}")
            }
            Self::UnsupportedArch { arch } => {
                write!(f, "no vectorized implementation for target arch {arch}")
            }
        }
    }
}

impl std::error::Error for CapabilityError {}

/// Masked equality of the pattern against `hay` at `offset`.
///
/// # Preconditions
/// - `offset + pat.len() <= hay.len()`; checked via slice bounds, panics
///   otherwise (callers derive `offset` from [`last_candidate`]).
#[inline]
pub fn matches_at(hay: &[u8], pat: &Pattern, offset: usize) -> bool {
    let window = &hay[offset..offset + pat.len()];
    window
        .iter()
        .zip(pat.bytes().iter())
        .zip(pat.mask().iter())
        .all(|((&h, &p), &exact)| !exact || h == p)
}

/// Largest valid candidate offset (inclusive), or `None` when the pattern
/// does not fit in the buffer.
#[inline]
pub fn last_candidate(hay_len: usize, pat_len: usize) -> Option<usize> {
    hay_len.checked_sub(pat_len)
}

/// Every strategy the harness knows about, in deterministic report order.
pub fn all_scanners() -> Vec<Box<dyn Scanner>> {
    vec![
        Box::new(NaiveScanner),
        Box::new(AnchorByteScanner),
        Box::new(RestartScanner),
        Box::new(HorspoolScanner),
        Box::new(VectorScanner),
        Box::new(WideVectorScanner),
        Box::new(ParallelScanner::new()),
    ]
}
