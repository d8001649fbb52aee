//! Masked byte patterns compiled from hex-or-wildcard token text.
//!
//! A pattern is an ordered sequence of slots. Each slot is either an exact
//! byte (`"4C"`) or a wildcard (`"??"`) that matches any byte. Slots are
//! stored as two parallel arrays: the byte values and a boolean mask.
//!
//! # Invariants
//! - `bytes.len() == mask.len()` and both are non-zero.
//! - `mask[i] == true` means slot `i` participates in comparison.
//! - Wildcard slots hold a filler byte of `0` in `bytes`. The filler is an
//!   artifact of storage; the mask is the sole authority on whether a slot
//!   is compared, and no scanner may read the filler as a match criterion.
//! - Patterns are immutable after construction.

use std::fmt;

/// A compiled masked byte pattern.
///
/// Produced once by [`Pattern::parse`] and never mutated. Shared read-only
/// across scanners (including parallel scan workers) without locking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pattern {
    bytes: Box<[u8]>,
    mask: Box<[bool]>,
}

impl Pattern {
    /// Compiles whitespace-separated tokens into a pattern.
    ///
    /// Each token must be a two-hex-digit byte literal (`"0F"`, `"c6"`) or
    /// the wildcard marker `"??"`.
    ///
    /// # Errors
    /// - [`PatternParseError::Empty`] when `text` contains no tokens.
    /// - [`PatternParseError::BadToken`] for any other token shape.
    pub fn parse(text: &str) -> Result<Self, PatternParseError> {
        let mut bytes = Vec::new();
        let mut mask = Vec::new();

        for (index, token) in text.split_ascii_whitespace().enumerate() {
            if token == "??" {
                bytes.push(0);
                mask.push(false);
                continue;
            }
            let value = parse_byte_token(token).ok_or_else(|| PatternParseError::BadToken {
                index,
                token: token.to_string(),
            })?;
            bytes.push(value);
            mask.push(true);
        }

        if bytes.is_empty() {
            return Err(PatternParseError::Empty);
        }

        Ok(Self {
            bytes: bytes.into_boxed_slice(),
            mask: mask.into_boxed_slice(),
        })
    }

    /// Number of slots. Always at least 1.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; kept for API symmetry with slice types.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Slot byte values. Wildcard slots hold the filler byte `0`.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Parallel mask; `true` marks an exact slot.
    #[inline]
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Returns true when slot `i` must compare equal.
    #[inline]
    pub fn is_exact(&self, i: usize) -> bool {
        self.mask[i]
    }

    /// First exact slot as `(slot index, byte value)`.
    ///
    /// Anchor-based scanners seed candidate generation from this slot so the
    /// wildcard filler byte is never compared. `None` means every slot is a
    /// wildcard.
    pub fn first_anchor(&self) -> Option<(usize, u8)> {
        self.mask
            .iter()
            .position(|&exact| exact)
            .map(|i| (i, self.bytes[i]))
    }

    /// Returns true when the pattern has no exact slots.
    ///
    /// Such a pattern matches at offset 0 of any buffer it fits in.
    #[inline]
    pub fn is_all_wildcards(&self) -> bool {
        self.first_anchor().is_none()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (&b, &exact)) in self.bytes.iter().zip(self.mask.iter()).enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            if exact {
                write!(f, "{b:02X}")?;
            } else {
                f.write_str("??")?;
            }
        }
        Ok(())
    }
}

/// Parses exactly two hex digits into a byte. `None` on any other shape.
fn parse_byte_token(token: &str) -> Option<u8> {
    let t = token.as_bytes();
    if t.len() != 2 {
        return None;
    }
    let hi = (t[0] as char).to_digit(16)?;
    let lo = (t[1] as char).to_digit(16)?;
    Some(((hi << 4) | lo) as u8)
}

/// Errors from compiling pattern text.
///
/// A malformed pattern is fatal to the fixture that carries it, never to the
/// process: the harness reports it and moves on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PatternParseError {
    /// The pattern text contained no tokens.
    Empty,
    /// A token was neither a two-hex-digit literal nor `??`.
    BadToken { index: usize, token: String },
}

impl fmt::Display for PatternParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "pattern contains no tokens"),
            Self::BadToken { index, token } => {
                write!(f, "bad pattern token {token:?} at position {index}")
            }
        }
    }
}

impl std::error::Error for PatternParseError {}
