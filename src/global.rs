// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Process-wide default [`RandomState`].
//!
//! The instance is created on first use from operating system entropy. Every
//! function here locks it for the duration of one call, so concurrent callers
//! see whole draws only. A panic while holding the lock does not poison the
//! instance for later callers.
//!
//! The common samplers have a function here. Anything else on
//! [`RandomState`] is reached through [`with_default`].

use std::sync::{LazyLock, Mutex, PoisonError};

use crate::broadcast::{NdArray, Param};
use crate::errors::Result;
use crate::random_state::{RandomState, Seed};
use crate::state::StateTuple;

static DEFAULT: LazyLock<Mutex<RandomState>> =
    LazyLock::new(|| Mutex::new(RandomState::from_entropy()));

/// Run `f` with exclusive access to the default instance.
pub fn with_default<T>(f: impl FnOnce(&mut RandomState) -> T) -> T {
    let mut guard = DEFAULT.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

pub fn seed(seed: impl Into<Seed>) -> Result<()> {
    let seed = seed.into();
    with_default(|rs| rs.seed(seed))
}

pub fn get_state() -> StateTuple {
    with_default(|rs| rs.get_state())
}

pub fn set_state(state: &StateTuple) -> Result<()> {
    with_default(|rs| rs.set_state(state))
}

pub fn random_sample() -> f64 {
    with_default(|rs| rs.random_sample())
}

pub fn randint(low: i64, high: i64) -> Result<i64> {
    with_default(|rs| rs.randint(low, high))
}

pub fn randint_array(low: i64, high: i64, size: &[usize]) -> Result<NdArray<i64>> {
    with_default(|rs| rs.randint_array(low, high, size))
}

pub fn standard_normal() -> f64 {
    with_default(|rs| rs.standard_normal())
}

pub fn uniform(low: f64, high: f64) -> Result<f64> {
    with_default(|rs| rs.uniform(low, high))
}

pub fn randn(dims: &[usize]) -> NdArray<f64> {
    with_default(|rs| rs.randn(dims))
}

pub fn bytes(n: usize) -> Vec<u8> {
    with_default(|rs| rs.bytes(n))
}

pub fn normal(loc: f64, scale: f64) -> Result<f64> {
    with_default(|rs| rs.normal(loc, scale))
}

pub fn binomial(n: i64, p: f64) -> Result<i64> {
    with_default(|rs| rs.binomial(n, p))
}

pub fn binomial_array(
    n: impl Into<Param<i64>>,
    p: impl Into<Param<f64>>,
    size: Option<&[usize]>,
) -> Result<NdArray<i64>> {
    let (n, p) = (n.into(), p.into());
    with_default(|rs| rs.binomial_array(n, p, size))
}

pub fn negative_binomial(n: f64, p: f64) -> Result<i64> {
    with_default(|rs| rs.negative_binomial(n, p))
}

pub fn hypergeometric(ngood: i64, nbad: i64, nsample: i64) -> Result<i64> {
    with_default(|rs| rs.hypergeometric(ngood, nbad, nsample))
}

pub fn hypergeometric_array(
    ngood: impl Into<Param<i64>>,
    nbad: impl Into<Param<i64>>,
    nsample: impl Into<Param<i64>>,
    size: Option<&[usize]>,
) -> Result<NdArray<i64>> {
    let (ngood, nbad, nsample) = (ngood.into(), nbad.into(), nsample.into());
    with_default(|rs| rs.hypergeometric_array(ngood, nbad, nsample, size))
}

pub fn logseries(p: f64) -> Result<i64> {
    with_default(|rs| rs.logseries(p))
}

pub fn logseries_array(p: impl Into<Param<f64>>, size: Option<&[usize]>) -> Result<NdArray<i64>> {
    let p = p.into();
    with_default(|rs| rs.logseries_array(p, size))
}

pub fn vonmises(mu: f64, kappa: f64) -> Result<f64> {
    with_default(|rs| rs.vonmises(mu, kappa))
}

pub fn vonmises_array(
    mu: impl Into<Param<f64>>,
    kappa: impl Into<Param<f64>>,
    size: Option<&[usize]>,
) -> Result<NdArray<f64>> {
    let (mu, kappa) = (mu.into(), kappa.into());
    with_default(|rs| rs.vonmises_array(mu, kappa, size))
}

pub fn multinomial(n: i64, pvals: &[f64], size: Option<&[usize]>) -> Result<NdArray<i64>> {
    with_default(|rs| rs.multinomial(n, pvals, size))
}

pub fn poisson(lam: f64) -> Result<i64> {
    with_default(|rs| rs.poisson(lam))
}

pub fn shuffle<T>(slice: &mut [T]) {
    with_default(|rs| rs.shuffle(slice))
}

pub fn permutation(n: usize) -> Vec<usize> {
    with_default(|rs| rs.permutation(n))
}
