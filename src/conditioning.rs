// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Methods to turn random bits into more constrained data types.

use crate::errors::{RandomError, Result};
use crate::rngs::BitGenerator;

/// Uniform f64 in [0, 1) with full 53 bit precision.
/// Consumes two words: 27 bits from the first, 26 from the second.
pub fn random_double<R: BitGenerator + ?Sized>(rng: &mut R) -> f64 {
    let a = (rng.next_word() >> 5) as f64;
    let b = (rng.next_word() >> 6) as f64;
    (a * 67108864.0 + b) / 9007199254740992.0
}

/// Non-negative i64 covering the whole [0, i64::MAX] range.
pub fn random_long<R: BitGenerator + ?Sized>(rng: &mut R) -> i64 {
    (rng.next() >> 1) as i64
}

/// Generate integer between 0 and `max`, both inclusive.
/// Uses rejection sampling on the smallest covering bit mask, so the number of
/// rng calls required is theoretically unbounded but below two on average.
pub fn random_interval<R: BitGenerator + ?Sized>(rng: &mut R, max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    let mask = u64::MAX >> max.leading_zeros();
    if max <= u32::MAX as u64 {
        loop {
            let rn = rng.next_word() as u64 & mask;
            if rn <= max {
                return rn;
            }
        }
    }
    loop {
        let rn = rng.next() & mask;
        if rn <= max {
            return rn;
        }
    }
}

/// Generate integer between `low` (inclusive) and `high` (exclusive).
/// Bounds may be negative. Nothing is drawn when the range is empty.
pub fn randint<R: BitGenerator + ?Sized>(rng: &mut R, low: i64, high: i64) -> Result<i64> {
    check_range(low, high)?;
    Ok(randint_unchecked(rng, low, high))
}

pub(crate) fn check_range(low: i64, high: i64) -> Result<()> {
    if low >= high {
        return Err(RandomError::invalid(
            "low",
            format!("low >= high ({} >= {})", low, high),
        ));
    }
    Ok(())
}

/// `low < high` must already hold.
pub(crate) fn randint_unchecked<R: BitGenerator + ?Sized>(rng: &mut R, low: i64, high: i64) -> i64 {
    let span = (high.wrapping_sub(low) as u64).wrapping_sub(1);
    low.wrapping_add(random_interval(rng, span) as i64)
}

/// Fill `buf` with little-endian bytes of successive words.
/// A trailing partial word still consumes one whole word.
pub fn fill_bytes<R: BitGenerator + ?Sized>(rng: &mut R, buf: &mut [u8]) {
    let mut chunks = buf.chunks_exact_mut(4);
    for chunk in &mut chunks {
        chunk.copy_from_slice(&rng.next_word().to_le_bytes());
    }
    let rest = chunks.into_remainder();
    if !rest.is_empty() {
        let word = rng.next_word().to_le_bytes();
        let n = rest.len();
        rest.copy_from_slice(&word[..n]);
    }
}
