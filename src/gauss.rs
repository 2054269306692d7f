// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Standard normal variates from the Marsaglia polar method.
//! Every accepted pair of uniforms yields two normals, the second one is kept
//! here until the next call and is part of the saved state.

use crate::conditioning::random_double;
use crate::rngs::BitGenerator;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GaussCache {
    cached: Option<f64>,
}

impl GaussCache {
    pub fn new() -> Self {
        GaussCache { cached: None }
    }

    /// Draw one N(0, 1) value, consuming the cached one first if present.
    pub fn next<R: BitGenerator + ?Sized>(&mut self, rng: &mut R) -> f64 {
        if let Some(value) = self.cached.take() {
            return value;
        }
        let (x1, x2, r2) = loop {
            let x1 = 2.0 * random_double(rng) - 1.0;
            let x2 = 2.0 * random_double(rng) - 1.0;
            let r2 = x1 * x1 + x2 * x2;
            if r2 < 1.0 && r2 != 0.0 {
                break (x1, x2, r2);
            }
        };
        let f = (-2.0 * r2.ln() / r2).sqrt();
        self.cached = Some(f * x1);
        f * x2
    }

    pub fn reset(&mut self) {
        self.cached = None;
    }

    pub fn cached(&self) -> Option<f64> {
        self.cached
    }

    pub fn restore(&mut self, cached: Option<f64>) {
        self.cached = cached;
    }
}
