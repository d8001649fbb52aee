//! Deterministic synthetic corpus: a pseudo-random haystack with masked
//! patterns planted at known offsets.
//!
//! Loading and integrity-checking a real binary dump is an external
//! collaborator's job; the demo binary, benches, and integration tests share
//! this generator instead. The fill is a seeded xorshift so every run sees
//! the same bytes.
//!
//! Ground truth comes from the linear-scan oracle, not from the planted
//! offsets: after planting, each fixture's expected result is recomputed
//! with [`NaiveScanner`], so an accidental earlier occurrence in the random
//! fill can never make the fixture set lie.

use crate::harness::{Fixture, FixtureSet};
use crate::pattern::Pattern;
use crate::scan::{NaiveScanner, Scanner};

/// Minimum haystack size the planting table fits into.
pub const MIN_CORPUS_LEN: usize = 4096;

/// Patterns planted into the haystack, with their offsets as fractions of
/// the buffer (numerator, denominator). Mask shapes mirror real signature
/// scans: interior wildcard runs, a wildcard-heavy tail, a short exact
/// needle, and an exact `00` byte that a zero-as-wildcard scanner trips on.
const PLANTED: &[(usize, usize, &str)] = &[
    (1, 16, "0F 84 ?? ?? ?? ?? 48 8D 4C 24 20"),
    (1, 5, "57 48 81 EC ?? ?? ?? ?? 48 8B 69"),
    (1, 3, "E3 2E 4D 02"),
    (1, 2, "C6 84 24 ?? ?? ?? ?? ?? C6 44 24 ?? 00"),
    (2, 3, "75 ?? ?? ?? ?? EB 21 ?? ?? ?? ?? ?? ?? ?? 48 8B 9C"),
    (4, 5, "48 83 BC 24 ?? ?? ?? ?? ?? 74 ?? 48 8B 84 24"),
    (9, 10, "4C 8D 1D BA 55 4F 00"),
];

/// Pattern that must not occur anywhere; exercises the NotFound path.
const ABSENT: &str = "CF 99 DA DF EA EF FF FF BB BB";

struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    fn fill_bytes(&mut self, buf: &mut [u8]) {
        for chunk in buf.chunks_mut(8) {
            let mut v = self.next_u64();
            for b in chunk {
                *b = (v & 0xFF) as u8;
                v >>= 8;
            }
        }
    }

    /// A byte guaranteed non-zero, used to plant wildcard slots with
    /// something other than the pattern's filler.
    fn nonzero_byte(&mut self) -> u8 {
        ((self.next_u64() % 255) + 1) as u8
    }
}

/// Builds a haystack of `len` bytes and the fixture set over it.
///
/// # Panics
/// - When `len < MIN_CORPUS_LEN`.
pub fn synthetic_corpus(len: usize, seed: u64) -> (Vec<u8>, FixtureSet) {
    assert!(
        len >= MIN_CORPUS_LEN,
        "corpus length {len} below minimum {MIN_CORPUS_LEN}"
    );

    let mut rng = XorShift64::new(seed);
    let mut hay = vec![0u8; len];
    rng.fill_bytes(&mut hay);

    let mut planted: Vec<&str> = Vec::with_capacity(PLANTED.len());
    for &(num, den, text) in PLANTED {
        let pat = Pattern::parse(text).unwrap_or_else(|err| {
            panic!("planting table holds invalid pattern {text:?}: {err}")
        });
        let offset = len * num / den;
        debug_assert!(offset + pat.len() <= len, "planting table overflows corpus");

        for (i, (&byte, &exact)) in pat.bytes().iter().zip(pat.mask().iter()).enumerate() {
            hay[offset + i] = if exact { byte } else { rng.nonzero_byte() };
        }
        planted.push(text);
    }

    // Expected results come from the oracle over the final buffer, so
    // planting order and accidental earlier occurrences cannot skew truth.
    let mut fixtures = Vec::with_capacity(planted.len() + 1);
    for text in planted {
        fixtures.push(oracle_fixture(&hay, text));
    }
    fixtures.push(oracle_fixture(&hay, ABSENT));

    (hay, FixtureSet::new(fixtures))
}

fn oracle_fixture(hay: &[u8], text: &str) -> Fixture {
    let pat = Pattern::parse(text)
        .unwrap_or_else(|err| panic!("invalid corpus pattern {text:?}: {err}"));
    match NaiveScanner.find(hay, &pat) {
        Some(offset) => Fixture::found(text, offset),
        None => Fixture::absent(text),
    }
    .unwrap_or_else(|err| panic!("invalid corpus pattern {text:?}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_is_deterministic() {
        let (a, _) = synthetic_corpus(8192, 7);
        let (b, _) = synthetic_corpus(8192, 7);
        assert_eq!(a, b);

        let (c, _) = synthetic_corpus(8192, 8);
        assert_ne!(a, c);
    }

    #[test]
    fn fixtures_cover_found_and_absent() {
        let (_, fixtures) = synthetic_corpus(64 * 1024, 0x5EED);
        assert_eq!(fixtures.len(), PLANTED.len() + 1);
        assert!(fixtures.fixtures()[..PLANTED.len()]
            .iter()
            .all(|f| f.expected().is_some()));
        assert!(fixtures.fixtures().last().map_or(false, |f| f.expected().is_none()));
    }

    #[test]
    fn expected_offsets_match_oracle() {
        let (hay, fixtures) = synthetic_corpus(64 * 1024, 1);
        for fixture in fixtures.fixtures() {
            assert_eq!(
                NaiveScanner.find(&hay, fixture.pattern()),
                fixture.expected(),
                "{}",
                fixture.text()
            );
        }
    }

    #[test]
    fn wildcard_slots_are_not_filler_bytes() {
        // The first planted pattern has wildcards at slots 2..6; planted
        // bytes there must differ from the zero filler so scanners that
        // compare filler bytes fail verification.
        let (hay, fixtures) = synthetic_corpus(64 * 1024, 2);
        let fixture = &fixtures.fixtures()[0];
        let offset = fixture.expected().expect("planted pattern is present");
        for (i, &exact) in fixture.pattern().mask().iter().enumerate() {
            if !exact {
                assert_ne!(hay[offset + i], 0, "slot {i}");
            }
        }
    }
}
