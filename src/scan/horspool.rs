//! Boyer-Moore-Horspool adapted for wildcard slots.
//!
//! The 256-entry skip table is built only from the trailing contiguous run
//! of exact slots. When the pattern ends in wildcards the effective run is
//! shorter and the default skip shrinks accordingly; it is never hard-coded
//! to the pattern length.
//!
//! This is *not* a textbook Horspool table once wildcards appear near the
//! pattern end: a wildcard inside the scanned range simply contributes no
//! table entry, and the default skip is the distance from the last slot to
//! the last wildcard before it, clamped to 1. The skips are shorter than a
//! textbook table would allow but never pass over a match; correctness is
//! always judged by the linear-scan oracle, never by the table.
//!
//! # Invariants
//! - Every table entry is >= 1, so the scan always makes forward progress.
//! - The table lives on the stack of one `find` call; there is no shared
//!   scratch between invocations.

use super::{last_candidate, Scanner};
use crate::pattern::Pattern;

/// Skip-table scanner. See the module docs for the wildcard approximation.
#[derive(Debug, Clone, Copy, Default)]
pub struct HorspoolScanner;

impl Scanner for HorspoolScanner {
    fn name(&self) -> &'static str {
        "horspool"
    }

    fn find(&self, hay: &[u8], pat: &Pattern) -> Option<usize> {
        let scan_end = last_candidate(hay.len(), pat.len())?;
        if pat.is_all_wildcards() {
            return Some(0);
        }

        let last = pat.len() - 1;
        let table = build_skip_table(pat);

        let mut pos = 0usize;
        while pos <= scan_end {
            if masked_match_rev(hay, pat, pos) {
                return Some(pos);
            }
            pos += table[hay[pos + last] as usize];
        }
        None
    }
}

/// Builds the bad-character skip table from the trailing exact run.
///
/// Default entry: distance from the last slot to the last wildcard before
/// the end (1 minimum). Bytes occurring at exact slots within that trailing
/// run get their distance from the pattern end.
fn build_skip_table(pat: &Pattern) -> [usize; 256] {
    let last = pat.len() - 1;

    // Last wildcard index before the end; 0 when none is found, which also
    // covers the all-exact pattern.
    let mut idx = last;
    while idx > 0 && pat.is_exact(idx) {
        idx -= 1;
    }
    let default = (last - idx).max(1);

    // Empty for a single-slot pattern, where `default > last`.
    let mut table = [default; 256];
    for i in last.saturating_sub(default)..last {
        if pat.is_exact(i) {
            table[pat.bytes()[i] as usize] = last - i;
        }
    }
    table
}

/// Right-to-left masked compare at `pos`, matching the scan direction the
/// table was derived for.
#[inline]
fn masked_match_rev(hay: &[u8], pat: &Pattern, pos: usize) -> bool {
    for i in (0..pat.len()).rev() {
        if pat.is_exact(i) && hay[pos + i] != pat.bytes()[i] {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::{matches_at, NaiveScanner};

    #[test]
    fn table_defaults_to_run_length_for_exact_pattern() {
        let pat = Pattern::parse("AA BB CC DD").expect("valid pattern");
        let table = build_skip_table(&pat);
        // No wildcard: default is last index, trailing-run bytes get their
        // distance from the end.
        assert_eq!(table[0x12], 3);
        assert_eq!(table[0xAA], 3);
        assert_eq!(table[0xBB], 2);
        assert_eq!(table[0xCC], 1);
        // The last byte itself contributes no entry.
        assert_eq!(table[0xDD], 3);
    }

    #[test]
    fn trailing_wildcard_shrinks_default_skip() {
        let pat = Pattern::parse("AA BB ?? DD EE").expect("valid pattern");
        let table = build_skip_table(&pat);
        // Last wildcard is at index 2; default skip is 4 - 2 = 2.
        assert_eq!(table[0x12], 2);
        assert_eq!(table[0xDD], 1);
    }

    #[test]
    fn pattern_ending_in_wildcard_still_advances() {
        let pat = Pattern::parse("AA ??").expect("valid pattern");
        let table = build_skip_table(&pat);
        assert!(table.iter().all(|&d| d >= 1));

        let hay = [0x00, 0x00, 0xAA, 0x42];
        assert_eq!(HorspoolScanner.find(&hay, &pat), Some(2));
    }

    #[test]
    fn single_byte_pattern() {
        let pat = Pattern::parse("7F").expect("valid pattern");
        let table = build_skip_table(&pat);
        assert!(table.iter().all(|&d| d == 1));

        let hay = [0x00, 0x7F, 0x7F];
        assert_eq!(HorspoolScanner.find(&hay, &pat), Some(1));

        let absent = Pattern::parse("7E").expect("valid pattern");
        assert_eq!(HorspoolScanner.find(&hay, &absent), None);
    }

    #[test]
    fn first_occurrence_wins() {
        let hay = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0xAA, 0xBB, 0xCC, 0x02, 0x03, 0x04, 0x05,
        ];
        let pat = Pattern::parse("02 ?? 04 05").expect("valid pattern");
        assert_eq!(HorspoolScanner.find(&hay, &pat), Some(1));
    }

    #[test]
    fn matches_zero_literals() {
        let hay = [0xCC, 0x00, 0x00, 0xCC, 0x00];
        let pat = Pattern::parse("00 CC 00").expect("valid pattern");
        assert_eq!(HorspoolScanner.find(&hay, &pat), Some(2));
        assert!(matches_at(&hay, &pat, 2));
    }

    #[test]
    fn agrees_with_naive_on_structured_input() {
        // Repetitive input exercises long skips and near-miss candidates.
        let mut hay = Vec::new();
        for i in 0..512u32 {
            hay.extend_from_slice(&i.to_le_bytes());
        }
        let patterns = [
            "F0 01 00 00",
            "?? 01 00 00 F1",
            "FF 01 ?? ??",
            "00 02 00 00 01 02",
            "DE AD BE EF",
        ];
        for text in patterns {
            let pat = Pattern::parse(text).expect("valid pattern");
            assert_eq!(
                HorspoolScanner.find(&hay, &pat),
                NaiveScanner.find(&hay, &pat),
                "{text}"
            );
        }
    }

    #[test]
    fn not_found_and_too_long() {
        let hay = [0x01, 0x02];
        let long = Pattern::parse("01 02 03").expect("valid pattern");
        assert_eq!(HorspoolScanner.find(&hay, &long), None);

        let absent = Pattern::parse("09").expect("valid pattern");
        assert_eq!(HorspoolScanner.find(&hay, &absent), None);
    }
}
