// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Statistical checks for generators and samplers.
//!
//! Used by the test suites to catch broken bit streams and biased samplers.
//! All p values are upper tail, small values mean the sample is unlikely
//! under the hypothesised distribution.

use std::f64::consts::FRAC_1_SQRT_2;

use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::errors::{RandomError, Result};
use crate::rngs::BitGenerator;
use crate::utils::kahan_sum;

/// Upper tail p value for `chi_squared` with `df` degrees of freedom.
pub fn chi_squared_p_value(df: usize, chi_squared: f64) -> Result<f64> {
    let dist = ChiSquared::new(df as f64)
        .map_err(|e| RandomError::invalid("df", e.to_string()))?;
    Ok(dist.sf(chi_squared))
}

/// Pearson's chi-squared test of `observed` counts against category
/// probabilities `probs`.
/// Returns chi2 statistic, p value.
pub fn goodness_of_fit(observed: &[u64], probs: &[f64]) -> Result<(f64, f64)> {
    if observed.len() != probs.len() || observed.len() < 2 {
        return Err(RandomError::invalid(
            "probs",
            format!(
                "need matching lengths of at least 2, got {} counts and {} probabilities",
                observed.len(),
                probs.len()
            ),
        ));
    }
    if probs.iter().any(|&p| !(p > 0.0)) {
        return Err(RandomError::invalid("probs", "every probability must be > 0"));
    }
    let total: u64 = observed.iter().sum();
    let scale = total as f64 / kahan_sum(probs);
    let chi_squared = observed
        .iter()
        .zip(probs)
        .map(|(&o, &p)| {
            let expected = p * scale;
            (o as f64 - expected).powi(2) / expected
        })
        .sum();
    let p = chi_squared_p_value(observed.len() - 1, chi_squared)?;
    Ok((chi_squared, p))
}

/// Chi-squared test of byte frequencies over `sample_size` 64-bit draws,
/// 256 equally likely categories.
/// Returns chi2 statistic, p value.
pub fn byte_distribution_test<R: BitGenerator + ?Sized>(
    rng: &mut R,
    sample_size: usize,
) -> Result<(f64, f64)> {
    let mut counts = [0u64; 256];
    for _ in 0..sample_size {
        for by in rng.next().to_le_bytes() {
            counts[by as usize] += 1;
        }
    }
    goodness_of_fit(&counts, &[1.0 / 256.0; 256])
}

/// Frequency (monobit) test, NIST SP 800-22 section 2.1, over the bits of
/// `sample_size` 64-bit draws.
/// Returns ones minus zeros over all bits, p value.
pub fn monobit_test<R: BitGenerator + ?Sized>(rng: &mut R, sample_size: usize) -> (i64, f64) {
    let mut difference: i64 = 0;
    for _ in 0..sample_size {
        difference += 2 * rng.next().count_ones() as i64 - 64;
    }
    let p = statrs::function::erf::erfc(
        (difference.abs() as f64 / (sample_size as f64 * 64.0).sqrt()) * FRAC_1_SQRT_2,
    );
    (difference, p)
}
