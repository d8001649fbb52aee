//! Linear byte-wise scanners.
//!
//! These exist to define ground truth and a performance floor. There is no
//! algorithmic subtlety here beyond correct short-circuiting and the
//! inclusive bound on the last valid candidate offset; the vectorized and
//! skip-table families are validated against [`NaiveScanner`].

use memchr::memchr_iter;

use super::{last_candidate, matches_at, Scanner};
use crate::pattern::Pattern;

/// Baseline O(n * m) scan: every candidate offset, every slot, short-circuit
/// on the first masked mismatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveScanner;

impl Scanner for NaiveScanner {
    fn name(&self) -> &'static str {
        "naive"
    }

    fn find(&self, hay: &[u8], pat: &Pattern) -> Option<usize> {
        let last = last_candidate(hay.len(), pat.len())?;
        (0..=last).find(|&o| matches_at(hay, pat, o))
    }
}

/// Naive scan behind a first-exact-byte prefilter.
///
/// Candidate offsets are generated with `memchr` over the anchor byte (the
/// first exact slot), then fully verified. Same outcome as [`NaiveScanner`],
/// smaller constant factor on sparse haystacks.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorByteScanner;

impl Scanner for AnchorByteScanner {
    fn name(&self) -> &'static str {
        "anchor-byte"
    }

    fn find(&self, hay: &[u8], pat: &Pattern) -> Option<usize> {
        let last = last_candidate(hay.len(), pat.len())?;
        let Some((anchor, byte)) = pat.first_anchor() else {
            return Some(0);
        };

        // A candidate offset o requires hay[o + anchor] == byte, so the
        // anchor byte lives in hay[anchor..=last + anchor].
        let region = &hay[anchor..=last + anchor];
        memchr_iter(byte, region).find(|&o| matches_at(hay, pat, o))
    }
}

/// Streaming scan with restart-on-mismatch.
///
/// Advances a pattern cursor alongside the haystack cursor; a mismatch past
/// the first slot rewinds the haystack to one past the tentative match start.
/// The rewind is always exactly one byte; skipping further on wildcard runs
/// loses matches.
#[derive(Debug, Clone, Copy, Default)]
pub struct RestartScanner;

impl Scanner for RestartScanner {
    fn name(&self) -> &'static str {
        "restart"
    }

    fn find(&self, hay: &[u8], pat: &Pattern) -> Option<usize> {
        let last = last_candidate(hay.len(), pat.len())?;
        let m = pat.len();

        let mut begin = 0usize;
        let mut cursor = 0usize;
        let mut slot = 0usize;

        while cursor < hay.len() {
            if slot == 0 {
                begin = cursor;
                if begin > last {
                    return None;
                }
            }
            if !pat.is_exact(slot) || hay[cursor] == pat.bytes()[slot] {
                slot += 1;
                cursor += 1;
                if slot == m {
                    return Some(begin);
                }
            } else if slot == 0 {
                cursor += 1;
            } else {
                cursor = begin + 1;
                slot = 0;
            }
        }

        None
    }
}
