//! Sharded parallel scan over the vectorized core.
//!
//! The buffer is split into one shard per worker. A worker owns the
//! candidate offsets inside its nominal shard but may read `m - 1` bytes
//! past its end so a match straddling the shard boundary is not missed.
//!
//! # Aggregation
//! Completion order says nothing about offset order: a worker far into the
//! buffer can finish first. The shared best-offset cell is therefore updated
//! with an atomic `fetch_min`, and the final answer is read only after every
//! worker has joined. The result is the true global minimum, never "first
//! thread to finish".
//!
//! # Cancellation
//! Workers scan their shard in blocks and stop early when the best known
//! offset already precedes the next block. This is purely an optimization;
//! correctness never depends on a worker being cancelled.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crossbeam_utils::CachePadded;

use super::{last_candidate, simd, CapabilityError, Scanner};
use crate::pattern::Pattern;

/// Buffers below this size are scanned single-threaded; thread start-up
/// costs more than the scan itself.
const MIN_PARALLEL_LEN: usize = 256 * 1024;

/// Worker block size between cancellation checks.
const BLOCK_BYTES: usize = 1 << 20;

/// Multi-threaded scanner racing per-shard vectorized scans to the smallest
/// offset.
#[derive(Debug, Clone)]
pub struct ParallelScanner {
    workers: usize,
}

impl ParallelScanner {
    /// One worker per available hardware thread.
    pub fn new() -> Self {
        let workers = thread::available_parallelism().map_or(1, |n| n.get());
        Self { workers }
    }

    /// Explicit worker count, clamped to at least 1.
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }
}

impl Default for ParallelScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for ParallelScanner {
    fn name(&self) -> &'static str {
        "parallel-vector"
    }

    fn probe(&self) -> Result<(), CapabilityError> {
        simd::probe_lanes()
    }

    fn find(&self, hay: &[u8], pat: &Pattern) -> Option<usize> {
        let last = last_candidate(hay.len(), pat.len())?;
        if pat.is_all_wildcards() {
            return Some(0);
        }
        if self.workers <= 1 || hay.len() < MIN_PARALLEL_LEN {
            return simd::find_accelerated(hay, pat);
        }

        let shard_len = hay.len().div_ceil(self.workers);
        let best = CachePadded::new(AtomicUsize::new(usize::MAX));

        thread::scope(|s| {
            for w in 0..self.workers {
                let start = w * shard_len;
                if start > last {
                    break;
                }
                // Candidate offsets owned by this worker; the scan itself may
                // read up to `m - 1` bytes past `cand_end`.
                let cand_end = (start + shard_len).min(last + 1);
                let best = &best;
                s.spawn(move || scan_shard(hay, pat, start, cand_end, best));
            }
        });

        // All workers joined; relaxed read observes the final minimum.
        match best.load(Ordering::Relaxed) {
            usize::MAX => None,
            offset => Some(offset),
        }
    }
}

/// Scans candidate offsets `[start, cand_end)` block-wise, folding any hit
/// into the shared minimum.
fn scan_shard(hay: &[u8], pat: &Pattern, start: usize, cand_end: usize, best: &AtomicUsize) {
    let m = pat.len();
    let mut block = start;
    while block < cand_end {
        // Advisory cancel: nothing at or after `block` can beat the
        // current best.
        if best.load(Ordering::Relaxed) <= block {
            return;
        }
        let block_end = (block + BLOCK_BYTES).min(cand_end);
        let window_end = (block_end + m - 1).min(hay.len());
        if let Some(local) = simd::find_accelerated(&hay[block..window_end], pat) {
            best.fetch_min(block + local, Ordering::Relaxed);
            // Later blocks in this shard only hold larger offsets.
            return;
        }
        block = block_end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::VectorScanner;

    /// Deterministic xorshift fill, seeded per test.
    fn fill(buf: &mut [u8], mut state: u64) {
        for b in buf.iter_mut() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            *b = (state & 0xFF) as u8;
        }
    }

    fn assert_matches_vector(hay: &[u8], text: &str, workers: usize) {
        let pat = Pattern::parse(text).expect("valid pattern");
        let expect = VectorScanner.find(hay, &pat);
        let par = ParallelScanner::with_workers(workers);
        assert_eq!(par.find(hay, &pat), expect, "workers={workers} {text}");
    }

    #[test]
    fn small_buffers_degrade_to_single_thread() {
        let hay = [0x01, 0x02, 0x03, 0x04];
        assert_matches_vector(&hay, "03 04", 8);
        assert_matches_vector(&hay, "?? ?? ?? ??", 8);
        assert_matches_vector(&hay, "01 02 03 04 05", 8);
    }

    #[test]
    fn match_straddling_shard_boundary() {
        let workers = 4;
        let mut hay = vec![0u8; MIN_PARALLEL_LEN * 2];
        fill(&mut hay, 0x1234_5678_9ABC_DEF0);

        let shard_len = hay.len().div_ceil(workers);
        // Plant so the match begins 2 bytes before a shard boundary and ends
        // inside the next shard.
        let at = shard_len - 2;
        hay[at..at + 6].copy_from_slice(&[0xD0, 0x0D, 0xFE, 0xED, 0xFA, 0xCE]);
        assert_matches_vector(&hay, "D0 0D FE ED FA CE", workers);
        assert_matches_vector(&hay, "D0 ?? FE ED ?? CE", workers);
    }

    #[test]
    fn earliest_offset_wins_across_shards() {
        let workers = 4;
        let mut hay = vec![0x00u8; MIN_PARALLEL_LEN * 2];
        let needle = [0xBA, 0xDC, 0x0F, 0xFE, 0xE0];

        // Same needle in the last shard and (planted second) near the front;
        // the front occurrence must win no matter which worker finishes
        // first.
        let back = hay.len() - 4096;
        hay[back..back + 5].copy_from_slice(&needle);
        hay[77..77 + 5].copy_from_slice(&needle);

        let pat = Pattern::parse("BA DC 0F FE E0").expect("valid pattern");
        let par = ParallelScanner::with_workers(workers);
        assert_eq!(par.find(&hay, &pat), Some(77));
    }

    #[test]
    fn match_in_final_shard_tail() {
        let workers = 3;
        let mut hay = vec![0x11u8; MIN_PARALLEL_LEN * 2];
        let at = hay.len() - 4;
        hay[at..].copy_from_slice(&[0xCA, 0xFE, 0xBA, 0xBE]);
        assert_matches_vector(&hay, "CA FE BA BE", workers);
    }

    #[test]
    fn not_found_requires_all_shards_to_miss() {
        let mut hay = vec![0u8; MIN_PARALLEL_LEN * 2];
        fill(&mut hay, 42);
        let pat = Pattern::parse("CF 99 DA DF EA EF FF FF BB BB").expect("valid pattern");
        let par = ParallelScanner::with_workers(4);
        assert_eq!(
            par.find(&hay, &pat),
            VectorScanner.find(&hay, &pat)
        );
    }

    #[test]
    fn more_workers_than_shardable_bytes() {
        let mut hay = vec![0x22u8; MIN_PARALLEL_LEN];
        hay[10] = 0x77;
        let pat = Pattern::parse("77").expect("valid pattern");
        let par = ParallelScanner::with_workers(64);
        assert_eq!(par.find(&hay, &pat), Some(10));
    }

    #[test]
    fn idempotent_across_calls() {
        let mut hay = vec![0u8; MIN_PARALLEL_LEN * 2];
        fill(&mut hay, 7);
        hay[123_456..123_460].copy_from_slice(&[0xAB, 0xAD, 0x1D, 0xEA]);
        let pat = Pattern::parse("AB AD 1D EA").expect("valid pattern");
        let par = ParallelScanner::with_workers(4);
        let first = par.find(&hay, &pat);
        let second = par.find(&hay, &pat);
        assert_eq!(first, second);
        assert_eq!(first, Some(123_456));
    }
}
