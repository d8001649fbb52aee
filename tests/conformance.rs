//! Cross-strategy conformance suite.
//!
//! Every strategy must agree with the masked-equality oracle on every
//! scenario here. Strategies whose capability probe fails on the current
//! machine are skipped, never excused from a scenario they claim to
//! support.

use sigscan::corpus::synthetic_corpus;
use sigscan::scan::{all_scanners, ParallelScanner, Scanner, VectorScanner};
use sigscan::Pattern;

/// Runs `check` against every strategy supported on this machine.
fn for_each_supported(check: impl Fn(&dyn Scanner)) {
    let mut ran = 0;
    for scanner in all_scanners() {
        if scanner.probe().is_err() {
            continue;
        }
        check(scanner.as_ref());
        ran += 1;
    }
    assert!(ran > 0, "no strategy is supported on this machine");
}

fn assert_all_find(hay: &[u8], text: &str, expected: Option<usize>) {
    let pat = Pattern::parse(text).expect("valid pattern");
    for_each_supported(|s| {
        assert_eq!(s.find(hay, &pat), expected, "{} on {text:?}", s.name());
    });
}

#[test]
fn first_occurrence_beats_later_candidate() {
    // Masked boundary scenario: a second candidate exists at offset 8 but
    // the first occurrence at offset 1 must win.
    let hay = [
        0x01, 0x02, 0x03, 0x04, 0x05, 0xAA, 0xBB, 0xCC, 0x02, 0x03, 0x04, 0x05,
    ];
    assert_all_find(&hay, "02 ?? 04 05", Some(1));
}

#[test]
fn all_wildcards_match_at_zero_when_fitting() {
    let hay = [0x00u8; 8];
    assert_all_find(&hay, "?? ?? ??", Some(0));
    assert_all_find(&hay, "?? ?? ?? ?? ?? ?? ?? ??", Some(0));
}

#[test]
fn all_wildcards_longer_than_buffer_not_found() {
    let hay = [0x55, 0xAA];
    assert_all_find(&hay, "?? ?? ??", None);
}

#[test]
fn pattern_longer_than_buffer_is_not_found_without_fault() {
    let hay = [0x01, 0x02, 0x03];
    assert_all_find(&hay, "01 02 03 04 05 06 07 08", None);
}

#[test]
fn single_slot_patterns() {
    let hay = [0x00, 0x7F, 0x7F];
    assert_all_find(&hay, "7F", Some(1));
    assert_all_find(&hay, "00", Some(0));
    assert_all_find(&hay, "??", Some(0));
    assert_all_find(&hay, "7E", None);
}

#[test]
fn exact_pattern_at_unique_offset() {
    let mut hay = vec![0x11u8; 4096];
    hay[777..781].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    assert_all_find(&hay, "DE AD BE EF", Some(777));
}

#[test]
fn match_at_last_valid_candidate_offset() {
    let mut hay = vec![0x33u8; 4096];
    let at = hay.len() - 5;
    hay[at..].copy_from_slice(&[0x10, 0x20, 0x30, 0x40, 0x50]);
    assert_all_find(&hay, "10 20 30 40 50", Some(at));
    assert_all_find(&hay, "10 ?? 30 ?? 50", Some(at));
}

#[test]
fn literal_zero_bytes_are_not_wildcards() {
    // A scanner that repurposes 0x00 as an implicit wildcard will claim a
    // match at offset 0; the only real match is at offset 3.
    let hay = [0x01, 0x02, 0x03, 0x00, 0x00, 0x07, 0x08];
    assert_all_find(&hay, "00 00 07", Some(3));
    assert_all_find(&hay, "00 09 07", None);
}

#[test]
fn absent_pattern_yields_not_found() {
    let (hay, _) = synthetic_corpus(64 * 1024, 0xDEAD);
    assert_all_find(&hay, "CF 99 DA DF EA EF FF FF BB BB", None);
}

#[test]
fn idempotent_find() {
    let (hay, fixtures) = synthetic_corpus(64 * 1024, 0xBEEF);
    for_each_supported(|s| {
        for fixture in fixtures.fixtures() {
            let first = s.find(&hay, fixture.pattern());
            let second = s.find(&hay, fixture.pattern());
            assert_eq!(first, second, "{} on {}", s.name(), fixture.text());
        }
    });
}

#[test]
fn strategies_agree_on_the_synthetic_corpus() {
    let (hay, fixtures) = synthetic_corpus(1024 * 1024, 0x5EED);
    for fixture in fixtures.fixtures() {
        assert_all_find(&hay, fixture.text(), fixture.expected());
    }
}

#[test]
fn parallel_equals_vector_on_shard_boundary_matches() {
    if VectorScanner.probe().is_err() {
        return;
    }
    let workers = 4;
    let len = 2 * 1024 * 1024;
    let hay = vec![0x42u8; len];
    let shard_len = len.div_ceil(workers);
    let needle = [0xFA, 0xCE, 0x0F, 0xF1, 0xCE];

    // One match exactly at each shard boundary (straddling it), checked one
    // at a time so each is the first occurrence.
    for boundary in 1..workers {
        let mut buf = hay.clone();
        let at = boundary * shard_len - 2;
        buf[at..at + needle.len()].copy_from_slice(&needle);

        let pat = Pattern::parse("FA CE ?? F1 CE").expect("valid pattern");
        let par = ParallelScanner::with_workers(workers);
        assert_eq!(
            par.find(&buf, &pat),
            VectorScanner.find(&buf, &pat),
            "boundary {boundary}"
        );
        assert_eq!(par.find(&buf, &pat), Some(at));
    }
}
