// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! The public sampling interface.
//!
//! [`RandomState`] owns one [`Mt19937`] and its [`GaussCache`]. Every method
//! validates all of its arguments, including every element of array
//! parameters and the broadcast shape, before the first word is drawn. A
//! rejected call therefore leaves the state exactly as it was.
//!
//! Each distribution comes in two forms: a scalar method returning one value,
//! and an `_array` method taking scalar-or-array [`Param`]s plus an optional
//! output `size`.

use log::debug;

use crate::broadcast::{checked_len, map1, map2, map3, NdArray, Param};
use crate::conditioning::{self, random_double, random_long};
use crate::distributions::{self as kernels, POISSON_LAM_MAX};
use crate::errors::{RandomError, Result};
use crate::gauss::GaussCache;
use crate::rngs::Mt19937;
use crate::state::StateTuple;
use crate::utils::kahan_sum;

/// Allowed excess of `sum(pvals)` over one before a multinomial call is rejected.
pub const MULTINOMIAL_SUM_TOLERANCE: f64 = 1e-12;

/// Seed material accepted by [`RandomState::seed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Seed {
    /// Integer seed, must fit in 32 bits.
    Int(u64),
    /// Arbitrary length word sequence.
    Words(Vec<u32>),
    /// Arbitrary length byte sequence, packed little-endian into words.
    Bytes(Vec<u8>),
}

impl From<u32> for Seed {
    fn from(value: u32) -> Self {
        Seed::Int(value as u64)
    }
}

impl From<u64> for Seed {
    fn from(value: u64) -> Self {
        Seed::Int(value)
    }
}

impl From<Vec<u32>> for Seed {
    fn from(words: Vec<u32>) -> Self {
        Seed::Words(words)
    }
}

impl From<&[u8]> for Seed {
    fn from(bytes: &[u8]) -> Self {
        Seed::Bytes(bytes.to_vec())
    }
}

impl Seed {
    fn generator(&self) -> Result<Mt19937> {
        match self {
            Seed::Int(value) => {
                let value = u32::try_from(*value).map_err(|_| {
                    RandomError::InvalidSeed(format!(
                        "seed must be between 0 and 2**32 - 1, got {}",
                        value
                    ))
                })?;
                Ok(Mt19937::init_genrand(value))
            }
            Seed::Words(words) => Mt19937::init_by_array(words),
            Seed::Bytes(bytes) => {
                let words: Vec<u32> = bytes
                    .chunks(4)
                    .map(|chunk| {
                        let mut word = [0u8; 4];
                        word[..chunk.len()].copy_from_slice(chunk);
                        u32::from_le_bytes(word)
                    })
                    .collect();
                Mt19937::init_by_array(&words)
            }
        }
    }
}

fn check_probability(name: &'static str, p: f64) -> Result<()> {
    if p.is_nan() {
        return Err(RandomError::invalid(name, format!("{} is nan", name)));
    }
    if p < 0.0 {
        return Err(RandomError::invalid(name, format!("{} < 0, got {}", name, p)));
    }
    if p > 1.0 {
        return Err(RandomError::invalid(name, format!("{} > 1, got {}", name, p)));
    }
    Ok(())
}

fn check_non_negative(name: &'static str, value: f64) -> Result<()> {
    if !(value >= 0.0) {
        return Err(RandomError::invalid(name, format!("{} < 0, got {}", name, value)));
    }
    Ok(())
}

fn check_count(name: &'static str, value: i64) -> Result<()> {
    if value < 0 {
        return Err(RandomError::invalid(name, format!("{} < 0, got {}", name, value)));
    }
    Ok(())
}

fn check_binomial(n: i64, p: f64) -> Result<()> {
    check_count("n", n)?;
    check_probability("p", p)
}

fn check_negative_binomial(n: f64, p: f64) -> Result<()> {
    if !(n > 0.0) || !n.is_finite() {
        return Err(RandomError::invalid("n", format!("n <= 0, got {}", n)));
    }
    if !(p > 0.0) {
        return Err(RandomError::invalid("p", format!("p <= 0, got {}", p)));
    }
    if p > 1.0 {
        return Err(RandomError::invalid("p", format!("p > 1, got {}", p)));
    }
    Ok(())
}

fn check_hypergeometric(ngood: i64, nbad: i64, nsample: i64) -> Result<()> {
    check_count("ngood", ngood)?;
    check_count("nbad", nbad)?;
    if nsample < 1 {
        return Err(RandomError::invalid(
            "nsample",
            format!("nsample < 1, got {}", nsample),
        ));
    }
    let popsize = ngood.checked_add(nbad).ok_or_else(|| {
        RandomError::invalid(
            "ngood",
            format!("ngood + nbad overflows ({} + {})", ngood, nbad),
        )
    })?;
    if popsize < nsample {
        return Err(RandomError::invalid(
            "nsample",
            format!("ngood + nbad < nsample ({} + {} < {})", ngood, nbad, nsample),
        ));
    }
    Ok(())
}

fn check_logseries(p: f64) -> Result<()> {
    if !(p > 0.0) {
        return Err(RandomError::invalid("p", format!("p <= 0, got {}", p)));
    }
    if p >= 1.0 {
        return Err(RandomError::invalid("p", format!("p >= 1, got {}", p)));
    }
    Ok(())
}

fn check_vonmises(mu: f64, kappa: f64) -> Result<()> {
    if !mu.is_finite() {
        return Err(RandomError::invalid("mu", format!("mu must be finite, got {}", mu)));
    }
    check_non_negative("kappa", kappa)
}

fn check_geometric(p: f64) -> Result<()> {
    if !(p > 0.0) {
        return Err(RandomError::invalid("p", format!("p <= 0, got {}", p)));
    }
    if p > 1.0 {
        return Err(RandomError::invalid("p", format!("p > 1, got {}", p)));
    }
    Ok(())
}

fn check_poisson(lam: f64) -> Result<()> {
    check_non_negative("lam", lam)?;
    if lam > POISSON_LAM_MAX {
        return Err(RandomError::invalid("lam", format!("lam value too large, got {}", lam)));
    }
    Ok(())
}

fn check_uniform(low: f64, high: f64) -> Result<()> {
    if !(high - low).is_finite() {
        return Err(RandomError::invalid(
            "high",
            format!("range [{}, {}) exceeds valid bounds", low, high),
        ));
    }
    Ok(())
}

/// A Mersenne Twister plus its cached gaussian, with every sampler on top.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomState {
    bitgen: Mt19937,
    gauss: GaussCache,
}

impl RandomState {
    pub fn new(seed: impl Into<Seed>) -> Result<Self> {
        let bitgen = seed.into().generator()?;
        Ok(RandomState {
            bitgen,
            gauss: GaussCache::new(),
        })
    }

    /// Seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        RandomState {
            bitgen: Mt19937::from_entropy(),
            gauss: GaussCache::new(),
        }
    }

    /// Reinitialize from `seed`. The cached gaussian is dropped.
    /// An invalid seed leaves the state untouched.
    pub fn seed(&mut self, seed: impl Into<Seed>) -> Result<()> {
        let seed = seed.into();
        self.bitgen = seed.generator()?;
        self.gauss.reset();
        debug!("reseeded random state with {}", seed_summary(&seed));
        Ok(())
    }

    pub fn get_state(&self) -> StateTuple {
        StateTuple::encode(&self.bitgen, &self.gauss)
    }

    /// Restore a snapshot from [`get_state`](Self::get_state), in the
    /// current or the legacy layout. Nothing changes on error.
    pub fn set_state(&mut self, state: &StateTuple) -> Result<()> {
        let (bitgen, gauss) = state.decode()?;
        self.bitgen = bitgen;
        self.gauss = gauss;
        debug!(
            "restored state at position {} ({} fields)",
            self.bitgen.pos(),
            state.field_count()
        );
        Ok(())
    }

    /// The underlying bit generator, for use with the `rand` traits.
    pub fn bit_generator(&mut self) -> &mut Mt19937 {
        &mut self.bitgen
    }

    // Uniform draws

    /// Uniform f64 in [0, 1).
    pub fn random_sample(&mut self) -> f64 {
        random_double(&mut self.bitgen)
    }

    pub fn random_sample_array(&mut self, size: &[usize]) -> NdArray<f64> {
        self.fill(size, |s| s.random_sample())
    }

    /// Uniform i64 in [0, i64::MAX].
    pub fn tomaxint(&mut self) -> i64 {
        random_long(&mut self.bitgen)
    }

    pub fn tomaxint_array(&mut self, size: &[usize]) -> NdArray<i64> {
        self.fill(size, |s| s.tomaxint())
    }

    /// Uniform integer in [low, high).
    pub fn randint(&mut self, low: i64, high: i64) -> Result<i64> {
        conditioning::randint(&mut self.bitgen, low, high)
    }

    pub fn randint_array(&mut self, low: i64, high: i64, size: &[usize]) -> Result<NdArray<i64>> {
        conditioning::check_range(low, high)?;
        Ok(self.fill(size, |s| conditioning::randint_unchecked(&mut s.bitgen, low, high)))
    }

    /// `n` random bytes.
    pub fn bytes(&mut self, n: usize) -> Vec<u8> {
        let mut buf = vec![0u8; n];
        conditioning::fill_bytes(&mut self.bitgen, &mut buf);
        buf
    }

    /// Uniform f64 in [low, high).
    pub fn uniform(&mut self, low: f64, high: f64) -> Result<f64> {
        check_uniform(low, high)?;
        Ok(low + (high - low) * self.random_sample())
    }

    pub fn uniform_array(
        &mut self,
        low: impl Into<Param<f64>>,
        high: impl Into<Param<f64>>,
        size: Option<&[usize]>,
    ) -> Result<NdArray<f64>> {
        let (low, high) = (low.into(), high.into());
        map2(&low, &high, size, check_uniform)?
            .into_vec()
            .into_iter()
            .collect::<Result<Vec<()>>>()?;
        map2(&low, &high, size, |l, h| l + (h - l) * random_double(&mut self.bitgen))
    }

    /// Shuffle `slice` in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        kernels::shuffle(&mut self.bitgen, slice);
    }

    /// Random permutation of `0..n`.
    pub fn permutation(&mut self, n: usize) -> Vec<usize> {
        let mut values: Vec<usize> = (0..n).collect();
        self.shuffle(&mut values);
        values
    }

    // Normal family

    pub fn standard_normal(&mut self) -> f64 {
        self.gauss.next(&mut self.bitgen)
    }

    pub fn standard_normal_array(&mut self, size: &[usize]) -> NdArray<f64> {
        self.fill(size, |s| s.standard_normal())
    }

    /// Standard normals with the given dimensions.
    pub fn randn(&mut self, dims: &[usize]) -> NdArray<f64> {
        self.standard_normal_array(dims)
    }

    pub fn normal(&mut self, loc: f64, scale: f64) -> Result<f64> {
        check_non_negative("scale", scale)?;
        Ok(loc + scale * self.standard_normal())
    }

    pub fn normal_array(
        &mut self,
        loc: impl Into<Param<f64>>,
        scale: impl Into<Param<f64>>,
        size: Option<&[usize]>,
    ) -> Result<NdArray<f64>> {
        let (loc, scale) = (loc.into(), scale.into());
        scale.validate(|s| check_non_negative("scale", s))?;
        map2(&loc, &scale, size, |l, s| l + s * self.gauss.next(&mut self.bitgen))
    }

    // Continuous distributions

    pub fn standard_exponential(&mut self) -> f64 {
        kernels::standard_exponential(&mut self.bitgen)
    }

    pub fn standard_exponential_array(&mut self, size: &[usize]) -> NdArray<f64> {
        self.fill(size, |s| s.standard_exponential())
    }

    pub fn exponential(&mut self, scale: f64) -> Result<f64> {
        check_non_negative("scale", scale)?;
        Ok(scale * self.standard_exponential())
    }

    pub fn exponential_array(
        &mut self,
        scale: impl Into<Param<f64>>,
        size: Option<&[usize]>,
    ) -> Result<NdArray<f64>> {
        let scale = scale.into();
        scale.validate(|s| check_non_negative("scale", s))?;
        map1(&scale, size, |s| s * kernels::standard_exponential(&mut self.bitgen))
    }

    pub fn standard_gamma(&mut self, shape: f64) -> Result<f64> {
        check_non_negative("shape", shape)?;
        Ok(kernels::standard_gamma(&mut self.bitgen, &mut self.gauss, shape))
    }

    pub fn standard_gamma_array(
        &mut self,
        shape: impl Into<Param<f64>>,
        size: Option<&[usize]>,
    ) -> Result<NdArray<f64>> {
        let shape = shape.into();
        shape.validate(|k| check_non_negative("shape", k))?;
        map1(&shape, size, |k| {
            kernels::standard_gamma(&mut self.bitgen, &mut self.gauss, k)
        })
    }

    pub fn gamma(&mut self, shape: f64, scale: f64) -> Result<f64> {
        check_non_negative("shape", shape)?;
        check_non_negative("scale", scale)?;
        Ok(scale * kernels::standard_gamma(&mut self.bitgen, &mut self.gauss, shape))
    }

    pub fn gamma_array(
        &mut self,
        shape: impl Into<Param<f64>>,
        scale: impl Into<Param<f64>>,
        size: Option<&[usize]>,
    ) -> Result<NdArray<f64>> {
        let (shape, scale) = (shape.into(), scale.into());
        shape.validate(|k| check_non_negative("shape", k))?;
        scale.validate(|s| check_non_negative("scale", s))?;
        map2(&shape, &scale, size, |k, s| {
            s * kernels::standard_gamma(&mut self.bitgen, &mut self.gauss, k)
        })
    }

    /// Von Mises on the circle, always in (-pi, pi].
    pub fn vonmises(&mut self, mu: f64, kappa: f64) -> Result<f64> {
        check_vonmises(mu, kappa)?;
        Ok(kernels::vonmises(&mut self.bitgen, &mut self.gauss, mu, kappa))
    }

    pub fn vonmises_array(
        &mut self,
        mu: impl Into<Param<f64>>,
        kappa: impl Into<Param<f64>>,
        size: Option<&[usize]>,
    ) -> Result<NdArray<f64>> {
        let (mu, kappa) = (mu.into(), kappa.into());
        mu.validate(|m| check_vonmises(m, 0.0))?;
        kappa.validate(|k| check_non_negative("kappa", k))?;
        map2(&mu, &kappa, size, |m, k| {
            kernels::vonmises(&mut self.bitgen, &mut self.gauss, m, k)
        })
    }

    // Discrete distributions

    pub fn binomial(&mut self, n: i64, p: f64) -> Result<i64> {
        check_binomial(n, p)?;
        Ok(kernels::binomial(&mut self.bitgen, n, p))
    }

    pub fn binomial_array(
        &mut self,
        n: impl Into<Param<i64>>,
        p: impl Into<Param<f64>>,
        size: Option<&[usize]>,
    ) -> Result<NdArray<i64>> {
        let (n, p) = (n.into(), p.into());
        n.validate(|n| check_count("n", n))?;
        p.validate(|p| check_probability("p", p))?;
        map2(&n, &p, size, |n, p| kernels::binomial(&mut self.bitgen, n, p))
    }

    /// Negative binomial with real valued `n`.
    pub fn negative_binomial(&mut self, n: f64, p: f64) -> Result<i64> {
        check_negative_binomial(n, p)?;
        Ok(kernels::negative_binomial(&mut self.bitgen, &mut self.gauss, n, p))
    }

    pub fn negative_binomial_array(
        &mut self,
        n: impl Into<Param<f64>>,
        p: impl Into<Param<f64>>,
        size: Option<&[usize]>,
    ) -> Result<NdArray<i64>> {
        let (n, p) = (n.into(), p.into());
        n.validate(|n| check_negative_binomial(n, 1.0))?;
        p.validate(|p| check_negative_binomial(1.0, p))?;
        map2(&n, &p, size, |n, p| {
            kernels::negative_binomial(&mut self.bitgen, &mut self.gauss, n, p)
        })
    }

    pub fn poisson(&mut self, lam: f64) -> Result<i64> {
        check_poisson(lam)?;
        Ok(kernels::poisson(&mut self.bitgen, lam))
    }

    pub fn poisson_array(
        &mut self,
        lam: impl Into<Param<f64>>,
        size: Option<&[usize]>,
    ) -> Result<NdArray<i64>> {
        let lam = lam.into();
        lam.validate(check_poisson)?;
        map1(&lam, size, |l| kernels::poisson(&mut self.bitgen, l))
    }

    pub fn geometric(&mut self, p: f64) -> Result<i64> {
        check_geometric(p)?;
        Ok(kernels::geometric(&mut self.bitgen, p))
    }

    pub fn geometric_array(
        &mut self,
        p: impl Into<Param<f64>>,
        size: Option<&[usize]>,
    ) -> Result<NdArray<i64>> {
        let p = p.into();
        p.validate(check_geometric)?;
        map1(&p, size, |p| kernels::geometric(&mut self.bitgen, p))
    }

    /// Number of good items in `nsample` draws without replacement.
    pub fn hypergeometric(&mut self, ngood: i64, nbad: i64, nsample: i64) -> Result<i64> {
        check_hypergeometric(ngood, nbad, nsample)?;
        Ok(kernels::hypergeometric(&mut self.bitgen, ngood, nbad, nsample))
    }

    pub fn hypergeometric_array(
        &mut self,
        ngood: impl Into<Param<i64>>,
        nbad: impl Into<Param<i64>>,
        nsample: impl Into<Param<i64>>,
        size: Option<&[usize]>,
    ) -> Result<NdArray<i64>> {
        let (ngood, nbad, nsample) = (ngood.into(), nbad.into(), nsample.into());
        // The population constraint ties elements together, check it per slot.
        map3(&ngood, &nbad, &nsample, size, check_hypergeometric)?
            .into_vec()
            .into_iter()
            .collect::<Result<Vec<()>>>()?;
        map3(&ngood, &nbad, &nsample, size, |g, b, s| {
            kernels::hypergeometric(&mut self.bitgen, g, b, s)
        })
    }

    pub fn logseries(&mut self, p: f64) -> Result<i64> {
        check_logseries(p)?;
        Ok(kernels::logseries(&mut self.bitgen, p))
    }

    pub fn logseries_array(
        &mut self,
        p: impl Into<Param<f64>>,
        size: Option<&[usize]>,
    ) -> Result<NdArray<i64>> {
        let p = p.into();
        p.validate(check_logseries)?;
        map1(&p, size, |p| kernels::logseries(&mut self.bitgen, p))
    }

    /// Multinomial counts with shape `size + [k]`.
    ///
    /// `k` is `pvals.len()`, plus one trailing category holding the residual
    /// mass when `pvals` sums to less than one.
    pub fn multinomial(
        &mut self,
        n: i64,
        pvals: &[f64],
        size: Option<&[usize]>,
    ) -> Result<NdArray<i64>> {
        check_count("n", n)?;
        if pvals.is_empty() {
            return Err(RandomError::invalid("pvals", "pvals must not be empty"));
        }
        for &p in pvals {
            check_probability("pvals", p)?;
        }
        let total = kahan_sum(pvals);
        if total > 1.0 + MULTINOMIAL_SUM_TOLERANCE {
            return Err(RandomError::invalid(
                "pvals",
                format!("sum(pvals) > 1.0, got {}", total),
            ));
        }
        let implicit_rest = total < 1.0 - MULTINOMIAL_SUM_TOLERANCE;
        let k = pvals.len() + usize::from(implicit_rest);

        let mut shape: Vec<usize> = size.map(|s| s.to_vec()).unwrap_or_default();
        shape.push(k);
        let mut data = vec![0i64; checked_len(&shape)?];
        for row in data.chunks_exact_mut(k) {
            kernels::multinomial(&mut self.bitgen, n, pvals, implicit_rest, row);
        }
        NdArray::from_shape_vec(shape, data)
    }

    /// One value per slot of `size`.
    fn fill<T>(&mut self, size: &[usize], mut draw: impl FnMut(&mut Self) -> T) -> NdArray<T> {
        NdArray::from_fn(size, || draw(&mut *self))
    }
}

fn seed_summary(seed: &Seed) -> String {
    match seed {
        Seed::Int(v) => v.to_string(),
        Seed::Words(w) => format!("{} words", w.len()),
        Seed::Bytes(b) => format!("{} bytes", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;
    use test_log::test;

    fn state() -> RandomState {
        RandomState::new(1234567890u32).unwrap()
    }

    #[test]
    fn seeds_out_of_range_or_empty_are_rejected() {
        let mut rs = state();
        let before = rs.clone();
        assert!(matches!(rs.seed(1u64 << 32), Err(RandomError::InvalidSeed(_))));
        assert!(rs.seed(Vec::<u32>::new()).is_err());
        assert!(rs.seed(&b""[..]).is_err());
        assert_eq!(rs, before);
    }

    #[test]
    fn byte_seed_packs_little_endian_words() {
        let mut a = RandomState::new(&[1u8, 0, 0, 0, 2][..]).unwrap();
        let mut b = RandomState::new(vec![1u32, 2]).unwrap();
        assert_eq!(a.tomaxint(), b.tomaxint());
    }

    #[test]
    fn reseed_clears_cached_gaussian() {
        let mut rs = state();
        let first = rs.standard_normal();
        rs.standard_normal();
        rs.standard_normal();
        rs.seed(1234567890u32).unwrap();
        assert_eq!(rs.standard_normal(), first);
    }

    #[test]
    fn tomaxint_round_trip() {
        let mut rs = state();
        let saved = rs.get_state();
        let old = rs.tomaxint_array(&[16]);
        rs.set_state(&saved).unwrap();
        let new = rs.tomaxint_array(&[16]);
        assert_eq!(old, new);
    }

    #[test]
    fn gaussian_round_trip_mid_pair() {
        let mut rs = state();
        rs.standard_normal();
        let saved = rs.get_state();
        assert!(matches!(saved, StateTuple::Full(_, _, _, true, _)));
        let old = rs.standard_normal_array(&[3]);
        rs.set_state(&saved).unwrap();
        let new = rs.standard_normal_array(&[3]);
        assert_eq!(old, new);
    }

    #[test]
    fn corrupt_state_leaves_generator_untouched() {
        let mut rs = state();
        rs.random_sample();
        let before = rs.clone();
        let bad = StateTuple::Legacy("MT19937".into(), vec![0; 10], 0);
        assert!(matches!(rs.set_state(&bad), Err(RandomError::CorruptState(_))));
        assert_eq!(rs, before);
    }

    #[test]
    fn binomial_rejects_out_of_domain() {
        let mut rs = state();
        let before = rs.clone();
        assert!(rs.binomial(-1, 0.5).is_err());
        assert!(rs.binomial(10, -0.1).is_err());
        assert!(rs.binomial(10, 1.1).is_err());
        assert!(rs.binomial(10, f64::NAN).is_err());
        assert_eq!(rs, before);
    }

    #[test]
    fn binomial_mean() {
        let mut rs = state();
        let sample = rs.binomial_array(10i64, 0.5, Some(&[1000])).unwrap();
        let avg = sample.iter().sum::<i64>() as f64 / 1000.0 / 10.0;
        assert!(0.45 < avg && avg < 0.55, "avg {avg}");
    }

    #[test]
    fn binomial_broadcasts_n_and_p() {
        let mut rs = state();
        let n = vec![10i64, 20, 5];
        let p = vec![0.4, 0.7, 0.2];
        assert_eq!(rs.binomial_array(n.clone(), 0.4, None).unwrap().shape(), &[3]);
        assert_eq!(rs.binomial_array(5i64, p.clone(), None).unwrap().shape(), &[3]);
        let both = rs.binomial_array(n.clone(), p.clone(), None).unwrap();
        assert_eq!(both.shape(), &[3]);
        for (x, n) in both.iter().zip(&n) {
            assert!((0..=*n).contains(x));
        }
        let grid = rs.binomial_array(n, p, Some(&[4, 3])).unwrap();
        assert_eq!(grid.shape(), &[4, 3]);
    }

    #[test]
    fn binomial_arrays_with_invalid_entries() {
        let mut rs = state();
        let before = rs.clone();
        assert!(rs.binomial_array(vec![10i64, 20, 5], -0.1, None).is_err());
        assert!(rs.binomial_array(vec![10i64, -20, 5], 0.4, None).is_err());
        assert!(rs.binomial_array(10i64, vec![0.1, 1.5], None).is_err());
        assert!(matches!(
            rs.binomial_array(vec![10i64, 20, 5], vec![0.1, 0.2], None),
            Err(RandomError::ShapeMismatch { .. })
        ));
        assert!(rs.binomial_array(vec![10i64, 20, 5], 0.5, Some(&[2])).is_err());
        assert_eq!(rs, before);
    }

    #[test]
    fn scalar_array_call_is_zero_dimensional() {
        let mut rs = state();
        let out = rs.binomial_array(10i64, 0.5, None).unwrap();
        assert_eq!(out.ndim(), 0);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn negative_binomial_accepts_fractional_n() {
        let mut rs = state();
        assert!(rs.negative_binomial(0.5, 0.5).unwrap() >= 0);
        assert!(rs.negative_binomial(0.0, 0.5).is_err());
        assert!(rs.negative_binomial(1.0, 0.0).is_err());
        assert!(rs.negative_binomial(1.0, 1.5).is_err());
        let many = rs.negative_binomial_array(vec![0.5, 2.5], 0.3, Some(&[10, 2])).unwrap();
        assert_eq!(many.shape(), &[10, 2]);
    }

    #[test]
    fn hypergeometric_validation() {
        let mut rs = state();
        assert!(rs.hypergeometric(-1, 5, 2).is_err());
        assert!(rs.hypergeometric(5, -1, 2).is_err());
        assert!(rs.hypergeometric(5, 5, 0).is_err());
        assert!(rs.hypergeometric(5, 5, 11).is_err());
        assert!(rs
            .hypergeometric_array(vec![5i64, 1], vec![5i64, 1], 3i64, None)
            .is_err());
        assert_eq!(rs.hypergeometric(5, 5, 10).unwrap(), 5);
    }

    #[test]
    fn hypergeometric_population_overflow_is_rejected() {
        let mut rs = state();
        let before = rs.clone();
        assert!(rs.hypergeometric(i64::MAX, 5, 3).unwrap_err().is_domain());
        assert!(rs.hypergeometric(i64::MAX - 2, 5, 20).is_err());
        assert!(rs
            .hypergeometric_array(vec![10i64, i64::MAX], 5i64, 3i64, None)
            .is_err());
        assert_eq!(rs, before);
    }

    #[test]
    fn logseries_validation() {
        let mut rs = state();
        assert!(rs.logseries(0.0).is_err());
        assert!(rs.logseries(1.0).is_err());
        assert!(rs.logseries(f64::NAN).is_err());
        assert!(rs.logseries(0.5).unwrap() >= 1);
    }

    #[test]
    fn vonmises_validation() {
        let mut rs = state();
        assert!(rs.vonmises(0.0, -1.0).is_err());
        assert!(rs.vonmises(f64::INFINITY, 1.0).is_err());
        assert!(rs.vonmises_array(vec![0.0, f64::NAN], 1.0, None).is_err());
        let tight = rs.vonmises_array(0.5, vec![1e7, 1e17], Some(&[50, 2])).unwrap();
        assert!(tight.iter().all(|&x| (x - 0.5).abs() < 0.01));
        assert!(rs.vonmises(1.0, 0.0).unwrap().abs() <= PI);
    }

    #[test]
    fn multinomial_shapes_and_zero_categories() {
        let mut rs = state();
        let out = rs.multinomial(100, &[0.2, 0.8], None).unwrap();
        assert_eq!(out.shape(), &[2]);
        assert_eq!(out.iter().sum::<i64>(), 100);

        let out = rs.multinomial(100, &[0.2, 0.8, 0.0, 0.0, 0.0], Some(&[20])).unwrap();
        assert_eq!(out.shape(), &[20, 5]);
        for row in out.as_slice().chunks(5) {
            assert_eq!(&row[2..], &[0, 0, 0]);
            assert_eq!(row.iter().sum::<i64>(), 100);
        }
    }

    #[test]
    fn multinomial_residual_category() {
        let mut rs = state();
        let out = rs.multinomial(50, &[0.1, 0.2], Some(&[3])).unwrap();
        assert_eq!(out.shape(), &[3, 3]);
        for row in out.as_slice().chunks(3) {
            assert_eq!(row.iter().sum::<i64>(), 50);
        }
    }

    #[test]
    fn multinomial_rejects_oversized_output() {
        let mut rs = state();
        let before = rs.clone();
        let err = rs
            .multinomial(10, &[0.5, 0.5], Some(&[usize::MAX / 2, 3]))
            .unwrap_err();
        assert!(matches!(err, RandomError::ShapeMismatch { .. }));
        assert!(rs.binomial_array(10i64, 0.5, Some(&[usize::MAX, 2])).is_err());
        assert_eq!(rs, before);
    }

    #[test]
    fn multinomial_validation() {
        let mut rs = state();
        assert!(rs.multinomial(-1, &[0.5, 0.5], None).is_err());
        assert!(rs.multinomial(10, &[], None).is_err());
        assert!(rs.multinomial(10, &[0.5, 0.6], None).is_err());
        assert!(rs.multinomial(10, &[1.5, -0.5], None).is_err());
    }

    #[test]
    fn uniform_and_normal_families() {
        let mut rs = state();
        let u = rs.uniform_array(-2.0, vec![0.0, 10.0], Some(&[100, 2])).unwrap();
        for row in u.as_slice().chunks(2) {
            assert!((-2.0..0.0).contains(&row[0]));
            assert!((-2.0..10.0).contains(&row[1]));
        }
        assert!(rs.uniform(0.0, f64::INFINITY).is_err());
        assert!(rs.normal(0.0, -1.0).is_err());
        assert!(rs.normal_array(vec![0.0, 1.0], vec![1.0, -1.0], None).is_err());
        let n = rs.normal_array(5.0, 0.0, Some(&[4])).unwrap();
        assert!(n.iter().all(|&x| x == 5.0));
    }

    #[test]
    fn gamma_family() {
        let mut rs = state();
        assert!(rs.gamma(-1.0, 1.0).is_err());
        assert!(rs.gamma(1.0, -1.0).is_err());
        assert_eq!(rs.standard_gamma(0.0).unwrap(), 0.0);
        let g = rs.gamma_array(vec![0.5, 3.0], 2.0, Some(&[5000, 2])).unwrap();
        let mean_right: f64 =
            g.as_slice().chunks(2).map(|r| r[1]).sum::<f64>() / 5000.0;
        assert_relative_eq!(mean_right, 6.0, max_relative = 0.05);
        assert!(rs.standard_gamma_array(vec![1.0, -0.5], None).is_err());
        assert_eq!(rs.standard_gamma_array(0.0, Some(&[3])).unwrap().into_vec(), vec![0.0; 3]);
        assert!(rs.standard_exponential_array(&[2, 2]).iter().all(|&x| x >= 0.0));
        assert!(rs.exponential(-1.0).is_err());
        assert!(rs.exponential_array(vec![1.0, 2.0], None).unwrap().iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn poisson_and_geometric_validation() {
        let mut rs = state();
        assert!(rs.poisson(-1.0).is_err());
        assert!(rs.poisson(1e19).is_err());
        assert!(rs.geometric(0.0).is_err());
        assert!(rs.geometric(1.1).is_err());
        assert_eq!(rs.geometric(1.0).unwrap(), 1);
        assert_eq!(rs.poisson_array(vec![0.0, 0.0], None).unwrap().into_vec(), vec![0, 0]);
        assert!(rs.geometric_array(0.5, Some(&[10])).unwrap().iter().all(|&x| x >= 1));
        assert!(rs.logseries_array(vec![0.2, 0.9], None).unwrap().iter().all(|&x| x >= 1));
    }

    #[test]
    fn permutation_covers_range() {
        let mut rs = state();
        let mut p = rs.permutation(50);
        p.sort_unstable();
        assert_eq!(p, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn bit_generator_is_shared() {
        use rand::Rng;
        let mut a = state();
        let mut b = state();
        let x: u32 = a.bit_generator().random();
        let mut expected = [0u8; 4];
        expected.copy_from_slice(&b.bytes(4));
        assert_eq!(x, u32::from_le_bytes(expected));
        assert_eq!(a.get_state(), b.get_state());
    }
}
