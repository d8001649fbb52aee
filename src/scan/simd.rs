//! Vectorized scanners.
//!
//! The pattern is split into 16-byte chunks, each carrying a bitmask of its
//! exact lanes. Candidate offsets come from a broadcast-compare of the
//! anchor byte (the first exact slot) over a vector-width window of the
//! haystack; each candidate is then verified chunk-by-chunk, intersecting
//! the lane-compare bitmask with the chunk's exact-lane mask. A chunk
//! matches iff the intersection equals the mask, so wildcard lanes and the
//! zero padding of the final partial chunk never influence the outcome.
//!
//! # Invariants
//! - Candidates are visited in ascending offset order, so the first hit is
//!   the smallest matching offset.
//! - The last valid candidate offset (`hay.len() - pat.len()`) is covered
//!   inclusively: candidates past the final full vector window are checked
//!   by the scalar oracle, and vectorized verification is only used when the
//!   full zero-padded chunk span is in bounds.
//! - Hardware support is reported through `probe`; there is no silent
//!   scalar path masquerading as the accelerated one.
//!
//! # Per-arch paths
//! - x86_64: SSE2 (baseline) for [`VectorScanner`], AVX2 double-width
//!   candidate windows for [`WideVectorScanner`].
//! - aarch64: NEON (baseline) for [`VectorScanner`]; the movemask is
//!   emulated with the shift-and-multiply packing trick.
//! - Other architectures probe as unsupported.

use super::{last_candidate, matches_at, CapabilityError, Scanner};
use crate::pattern::Pattern;

/// Bytes per 128-bit vector lane group.
const LANE: usize = 16;

/// One 16-byte slice of the pattern.
///
/// `needle` holds exact-slot bytes (zero elsewhere); `mask` bit `j` is set
/// iff lane `j` is an exact slot. Padding lanes past the pattern end are
/// always clear in `mask`.
#[derive(Clone, Copy, Debug)]
struct PatternChunk {
    needle: [u8; LANE],
    mask: u16,
}

/// Splits the pattern into zero-padded chunks with exact-lane masks.
fn compile_chunks(pat: &Pattern) -> Vec<PatternChunk> {
    let m = pat.len();
    let count = m.div_ceil(LANE);
    let mut chunks = Vec::with_capacity(count);
    for k in 0..count {
        let mut needle = [0u8; LANE];
        let mut mask = 0u16;
        for (j, lane) in needle.iter_mut().enumerate() {
            let i = k * LANE + j;
            if i >= m {
                break;
            }
            if pat.is_exact(i) {
                *lane = pat.bytes()[i];
                mask |= 1 << j;
            }
        }
        chunks.push(PatternChunk { needle, mask });
    }
    chunks
}

/// 128-bit lane scanner: SSE2 on x86_64, NEON on aarch64.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorScanner;

impl Scanner for VectorScanner {
    fn name(&self) -> &'static str {
        "vector-128"
    }

    fn probe(&self) -> Result<(), CapabilityError> {
        probe_lanes()
    }

    fn find(&self, hay: &[u8], pat: &Pattern) -> Option<usize> {
        find_accelerated(hay, pat)
    }
}

/// 256-bit candidate-window scanner (AVX2). Verification still runs on
/// 16-byte chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct WideVectorScanner;

impl Scanner for WideVectorScanner {
    fn name(&self) -> &'static str {
        "vector-256"
    }

    #[cfg(target_arch = "x86_64")]
    fn probe(&self) -> Result<(), CapabilityError> {
        if std::is_x86_feature_detected!("avx2") {
            Ok(())
        } else {
            Err(CapabilityError::MissingCpuFeature { feature: "avx2" })
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn probe(&self) -> Result<(), CapabilityError> {
        Err(CapabilityError::UnsupportedArch {
            arch: std::env::consts::ARCH,
        })
    }

    #[cfg(target_arch = "x86_64")]
    fn find(&self, hay: &[u8], pat: &Pattern) -> Option<usize> {
        let last = last_candidate(hay.len(), pat.len())?;
        let Some((anchor, anchor_byte)) = pat.first_anchor() else {
            return Some(0);
        };
        let chunks = compile_chunks(pat);
        if std::is_x86_feature_detected!("avx2") {
            // SAFETY: guarded by runtime feature detection.
            unsafe { find_avx2(hay, pat, anchor, anchor_byte, &chunks, last) }
        } else {
            // Probe rejects this machine; keep `find` total for callers
            // that skipped it.
            // SAFETY: SSE2 is baseline on x86_64.
            unsafe { find_sse2(hay, pat, anchor, anchor_byte, &chunks, last) }
        }
    }

    #[cfg(not(target_arch = "x86_64"))]
    fn find(&self, hay: &[u8], pat: &Pattern) -> Option<usize> {
        find_accelerated(hay, pat)
    }
}

/// Capability probe for the 128-bit lane path.
pub(crate) fn probe_lanes() -> Result<(), CapabilityError> {
    #[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
    {
        Ok(())
    }
    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        Err(CapabilityError::UnsupportedArch {
            arch: std::env::consts::ARCH,
        })
    }
}

/// Lane-width scan entry point, shared with the parallel scanner's workers.
pub(crate) fn find_accelerated(hay: &[u8], pat: &Pattern) -> Option<usize> {
    let last = last_candidate(hay.len(), pat.len())?;
    let Some((anchor, anchor_byte)) = pat.first_anchor() else {
        return Some(0);
    };
    let chunks = compile_chunks(pat);
    find_arch(hay, pat, anchor, anchor_byte, &chunks, last)
}

#[cfg(target_arch = "x86_64")]
#[inline]
fn find_arch(
    hay: &[u8],
    pat: &Pattern,
    anchor: usize,
    anchor_byte: u8,
    chunks: &[PatternChunk],
    last: usize,
) -> Option<usize> {
    // SAFETY: SSE2 is baseline on x86_64.
    unsafe { find_sse2(hay, pat, anchor, anchor_byte, chunks, last) }
}

#[cfg(target_arch = "aarch64")]
#[inline]
fn find_arch(
    hay: &[u8],
    pat: &Pattern,
    anchor: usize,
    anchor_byte: u8,
    chunks: &[PatternChunk],
    last: usize,
) -> Option<usize> {
    // SAFETY: NEON is available on all aarch64 targets.
    unsafe { find_neon(hay, pat, anchor, anchor_byte, chunks, last) }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
#[inline]
fn find_arch(
    hay: &[u8],
    pat: &Pattern,
    _anchor: usize,
    _anchor_byte: u8,
    _chunks: &[PatternChunk],
    last: usize,
) -> Option<usize> {
    // Unreachable after a successful probe; the scalar oracle keeps the
    // contract total for callers that skip probing.
    (0..=last).find(|&o| matches_at(hay, pat, o))
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn find_sse2(
    hay: &[u8],
    pat: &Pattern,
    anchor: usize,
    anchor_byte: u8,
    chunks: &[PatternChunk],
    last: usize,
) -> Option<usize> {
    use core::arch::x86_64::*;

    let n = hay.len();
    let padded = chunks.len() * LANE;
    let broadcast = _mm_set1_epi8(anchor_byte as i8);
    let base = hay.as_ptr();

    let mut cursor = 0usize;
    // Full 16-byte loads along the anchor row (haystack shifted by `anchor`).
    while cursor + LANE <= n - anchor {
        let window = _mm_loadu_si128(base.add(anchor + cursor) as *const __m128i);
        let mut bits = _mm_movemask_epi8(_mm_cmpeq_epi8(window, broadcast)) as u32;
        while bits != 0 {
            let t = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            let o = cursor + t;
            if o > last {
                // Bits ascend and later windows start further right; no
                // valid candidate remains anywhere.
                return None;
            }
            if o + padded <= n {
                if verify_chunks_sse2(base.add(o), chunks) {
                    return Some(o);
                }
            } else if matches_at(hay, pat, o) {
                // Zero-padded verify would read past the buffer; use the
                // scalar oracle at its actual length.
                return Some(o);
            }
        }
        cursor += LANE;
    }

    // Tail shorter than one vector window, last candidate inclusive.
    while cursor <= last {
        if hay[cursor + anchor] == anchor_byte && matches_at(hay, pat, cursor) {
            return Some(cursor);
        }
        cursor += 1;
    }
    None
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "sse2")]
unsafe fn verify_chunks_sse2(at: *const u8, chunks: &[PatternChunk]) -> bool {
    use core::arch::x86_64::*;

    for (k, chunk) in chunks.iter().enumerate() {
        let hay_vec = _mm_loadu_si128(at.add(k * LANE) as *const __m128i);
        let needle = _mm_loadu_si128(chunk.needle.as_ptr() as *const __m128i);
        let eq = _mm_movemask_epi8(_mm_cmpeq_epi8(hay_vec, needle)) as u32 as u16;
        if eq & chunk.mask != chunk.mask {
            return false;
        }
    }
    true
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn find_avx2(
    hay: &[u8],
    pat: &Pattern,
    anchor: usize,
    anchor_byte: u8,
    chunks: &[PatternChunk],
    last: usize,
) -> Option<usize> {
    use core::arch::x86_64::*;

    let n = hay.len();
    let padded = chunks.len() * LANE;
    let broadcast = _mm256_set1_epi8(anchor_byte as i8);
    let base = hay.as_ptr();

    let mut cursor = 0usize;
    // Double-lane-width candidate windows along the anchor row.
    while cursor + 2 * LANE <= n - anchor {
        let window = _mm256_loadu_si256(base.add(anchor + cursor) as *const __m256i);
        let mut bits = _mm256_movemask_epi8(_mm256_cmpeq_epi8(window, broadcast)) as u32;
        while bits != 0 {
            let t = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            let o = cursor + t;
            if o > last {
                return None;
            }
            if o + padded <= n {
                if verify_chunks_sse2(base.add(o), chunks) {
                    return Some(o);
                }
            } else if matches_at(hay, pat, o) {
                return Some(o);
            }
        }
        cursor += 2 * LANE;
    }

    while cursor <= last {
        if hay[cursor + anchor] == anchor_byte && matches_at(hay, pat, cursor) {
            return Some(cursor);
        }
        cursor += 1;
    }
    None
}

/// Packs the high bit of each NEON lane into a `u16`.
///
/// Multiplication trick: after shifting each byte down to 0/1, a magic
/// multiply gathers one bit per byte into the top byte of each u64 half.
#[cfg(target_arch = "aarch64")]
#[inline]
#[target_feature(enable = "neon")]
unsafe fn neon_movemask(v: core::arch::aarch64::uint8x16_t) -> u16 {
    use core::arch::aarch64::*;

    let high_bits = vshrq_n_u8::<7>(v);
    let low = vgetq_lane_u64::<0>(vreinterpretq_u64_u8(high_bits));
    let high = vgetq_lane_u64::<1>(vreinterpretq_u64_u8(high_bits));

    const MAGIC: u64 = 0x0102_0408_1020_4080;
    let low_packed = (low.wrapping_mul(MAGIC) >> 56) as u8;
    let high_packed = (high.wrapping_mul(MAGIC) >> 56) as u8;
    (low_packed as u16) | ((high_packed as u16) << 8)
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn find_neon(
    hay: &[u8],
    pat: &Pattern,
    anchor: usize,
    anchor_byte: u8,
    chunks: &[PatternChunk],
    last: usize,
) -> Option<usize> {
    use core::arch::aarch64::*;

    let n = hay.len();
    let padded = chunks.len() * LANE;
    let broadcast = vdupq_n_u8(anchor_byte);
    let base = hay.as_ptr();

    let mut cursor = 0usize;
    while cursor + LANE <= n - anchor {
        let window = vld1q_u8(base.add(anchor + cursor));
        let mut bits = neon_movemask(vceqq_u8(window, broadcast)) as u32;
        while bits != 0 {
            let t = bits.trailing_zeros() as usize;
            bits &= bits - 1;
            let o = cursor + t;
            if o > last {
                return None;
            }
            if o + padded <= n {
                if verify_chunks_neon(base.add(o), chunks) {
                    return Some(o);
                }
            } else if matches_at(hay, pat, o) {
                return Some(o);
            }
        }
        cursor += LANE;
    }

    while cursor <= last {
        if hay[cursor + anchor] == anchor_byte && matches_at(hay, pat, cursor) {
            return Some(cursor);
        }
        cursor += 1;
    }
    None
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
unsafe fn verify_chunks_neon(at: *const u8, chunks: &[PatternChunk]) -> bool {
    use core::arch::aarch64::*;

    for (k, chunk) in chunks.iter().enumerate() {
        let hay_vec = vld1q_u8(at.add(k * LANE));
        let needle = vld1q_u8(chunk.needle.as_ptr());
        let eq = neon_movemask(vceqq_u8(hay_vec, needle));
        if eq & chunk.mask != chunk.mask {
            return false;
        }
    }
    true
}
