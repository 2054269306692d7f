// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Sampling kernels.
//!
//! These functions assume their parameters were already validated by the
//! caller (see `random_state`). They only ever read uniforms and normals
//! through [`random_double`] and [`GaussCache`], so their output is fully
//! determined by the generator state they start from.

use std::f64::consts::PI;

use statrs::function::gamma::ln_gamma;

use crate::conditioning::{random_double, random_interval};
use crate::gauss::GaussCache;
use crate::rngs::BitGenerator;
use crate::utils::wrap_angle;

/// Binomial draws with `n * min(p, 1 - p)` up to this use inversion, BTPE above.
pub const BINOMIAL_INVERSION_LIMIT: f64 = 30.0;

/// Poisson draws with a mean below this multiply uniforms, PTRS above.
const POISSON_MULT_LIMIT: f64 = 10.0;

/// Largest Poisson mean whose draws stay representable as i64.
pub const POISSON_LAM_MAX: f64 = 9.223372006484771e18;

pub fn standard_exponential<R: BitGenerator + ?Sized>(rng: &mut R) -> f64 {
    // 1 - u lies in (0, 1], so the log is finite.
    -(1.0 - random_double(rng)).ln()
}

/// Gamma(shape, 1). Marsaglia–Tsang above 1, a Johnk style rejection below.
pub fn standard_gamma<R: BitGenerator + ?Sized>(
    rng: &mut R,
    gauss: &mut GaussCache,
    shape: f64,
) -> f64 {
    if shape == 0.0 {
        return 0.0;
    }
    if shape == 1.0 {
        return standard_exponential(rng);
    }
    if shape < 1.0 {
        loop {
            let u = random_double(rng);
            let v = standard_exponential(rng);
            if u <= 1.0 - shape {
                let x = u.powf(1.0 / shape);
                if x <= v {
                    return x;
                }
            } else {
                let y = -((1.0 - u) / shape).ln();
                let x = (1.0 - shape + shape * y).powf(1.0 / shape);
                if x <= v + y {
                    return x;
                }
            }
        }
    }
    let b = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * b).sqrt();
    loop {
        let (x, v) = loop {
            let x = gauss.next(rng);
            let v = 1.0 + c * x;
            if v > 0.0 {
                break (x, v);
            }
        };
        let v = v * v * v;
        let u = random_double(rng);
        if u < 1.0 - 0.0331 * (x * x) * (x * x) {
            return b * v;
        }
        if u.ln() < 0.5 * x * x + b * (1.0 - v + v.ln()) {
            return b * v;
        }
    }
}

pub fn poisson<R: BitGenerator + ?Sized>(rng: &mut R, lam: f64) -> i64 {
    if lam >= POISSON_MULT_LIMIT {
        poisson_ptrs(rng, lam)
    } else if lam == 0.0 {
        0
    } else {
        poisson_mult(rng, lam)
    }
}

fn poisson_mult<R: BitGenerator + ?Sized>(rng: &mut R, lam: f64) -> i64 {
    let enlam = (-lam).exp();
    let mut x = 0;
    let mut prod = 1.0;
    loop {
        prod *= random_double(rng);
        if prod > enlam {
            x += 1;
        } else {
            return x;
        }
    }
}

/// Hörmann's transformed rejection with squeeze.
fn poisson_ptrs<R: BitGenerator + ?Sized>(rng: &mut R, lam: f64) -> i64 {
    let slam = lam.sqrt();
    let loglam = lam.ln();
    let b = 0.931 + 2.53 * slam;
    let a = -0.059 + 0.02483 * b;
    let invalpha = 1.1239 + 1.1328 / (b - 3.4);
    let vr = 0.9277 - 3.6224 / (b - 2.0);
    loop {
        let u = random_double(rng) - 0.5;
        let v = random_double(rng);
        let us = 0.5 - u.abs();
        let k = ((2.0 * a / us + b) * u + lam + 0.43).floor() as i64;
        if us >= 0.07 && v <= vr {
            return k;
        }
        if k < 0 || (us < 0.013 && v > us) {
            continue;
        }
        if v.ln() + invalpha.ln() - (a / (us * us) + b).ln()
            <= -lam + k as f64 * loglam - ln_gamma(k as f64 + 1.0)
        {
            return k;
        }
    }
}

/// Binomial(n, p) for any `0 <= p <= 1`, working on the smaller tail.
pub fn binomial<R: BitGenerator + ?Sized>(rng: &mut R, n: i64, p: f64) -> i64 {
    if p <= 0.5 {
        if p * n as f64 <= BINOMIAL_INVERSION_LIMIT {
            binomial_inversion(rng, n, p)
        } else {
            binomial_btpe(rng, n, p)
        }
    } else {
        let q = 1.0 - p;
        if q * n as f64 <= BINOMIAL_INVERSION_LIMIT {
            n - binomial_inversion(rng, n, q)
        } else {
            n - binomial_btpe(rng, n, q)
        }
    }
}

fn binomial_inversion<R: BitGenerator + ?Sized>(rng: &mut R, n: i64, p: f64) -> i64 {
    let q = 1.0 - p;
    let qn = (n as f64 * q.ln()).exp();
    let np = n as f64 * p;
    let bound = (n as f64).min(np + 10.0 * (np * q + 1.0).sqrt());
    let mut x: i64 = 0;
    let mut px = qn;
    let mut u = random_double(rng);
    while u > px {
        x += 1;
        if x as f64 > bound {
            x = 0;
            px = qn;
            u = random_double(rng);
        } else {
            u -= px;
            px = ((n - x + 1) as f64 * p * px) / (x as f64 * q);
        }
    }
    x
}

/// Kachitvichyanukul & Schmeiser BTPE, `p <= 0.5`.
fn binomial_btpe<R: BitGenerator + ?Sized>(rng: &mut R, n: i64, p: f64) -> i64 {
    let nf = n as f64;
    let r = p.min(1.0 - p);
    let q = 1.0 - r;
    let fm = nf * r + r;
    let m = fm.floor();
    let p1 = (2.195 * (nf * r * q).sqrt() - 4.6 * q).floor() + 0.5;
    let xm = m + 0.5;
    let xl = xm - p1;
    let xr = xm + p1;
    let c = 0.134 + 20.5 / (15.3 + m);
    let a = (fm - xl) / (fm - xl * r);
    let laml = a * (1.0 + a / 2.0);
    let a = (xr - fm) / (xr * q);
    let lamr = a * (1.0 + a / 2.0);
    let p2 = p1 * (1.0 + 2.0 * c);
    let p3 = p2 + c / laml;
    let p4 = p3 + c / lamr;
    let nrq = nf * r * q;
    let m = m as i64;

    loop {
        let u = random_double(rng) * p4;
        let mut v = random_double(rng);

        // Triangular region: accept immediately.
        if u <= p1 {
            return (xm - p1 * v + u).floor() as i64;
        }
        let y: i64;
        if u <= p2 {
            // Parallelogram
            let x = xl + (u - p1) / c;
            v = v * c + 1.0 - (m as f64 - x + 0.5).abs() / p1;
            if v > 1.0 {
                continue;
            }
            y = x.floor() as i64;
        } else if u <= p3 {
            // Left exponential tail
            y = (xl + v.ln() / laml).floor() as i64;
            if y < 0 {
                continue;
            }
            v = v * (u - p2) * laml;
        } else {
            // Right exponential tail
            y = (xr - v.ln() / lamr).floor() as i64;
            if y > n {
                continue;
            }
            v = v * (u - p3) * lamr;
        }

        let k = (y - m).abs();
        if !(k > 20 && (k as f64) < nrq / 2.0 - 1.0) {
            // Explicit evaluation of f(y) / f(m).
            let s = r / q;
            let a = s * (nf + 1.0);
            let mut f = 1.0;
            if m < y {
                for i in (m + 1)..=y {
                    f *= a / i as f64 - s;
                }
            } else if m > y {
                for i in (y + 1)..=m {
                    f /= a / i as f64 - s;
                }
            }
            if v > f {
                continue;
            }
            return y;
        }

        // Squeeze using upper and lower bounds on log f(y).
        let kf = k as f64;
        let rho = (kf / nrq) * ((kf * (kf / 3.0 + 0.625) + 0.16666666666666666) / nrq + 0.5);
        let t = -kf * kf / (2.0 * nrq);
        let big_a = v.ln();
        if big_a < t - rho {
            return y;
        }
        if big_a > t + rho {
            continue;
        }
        let yf = y as f64;
        let mf = m as f64;
        let x1 = yf + 1.0;
        let f1 = mf + 1.0;
        let z = nf + 1.0 - mf;
        let w = nf - yf + 1.0;
        let stirling = |v: f64| {
            let v2 = v * v;
            (13680.0 - (462.0 - (132.0 - (99.0 - 140.0 / v2) / v2) / v2) / v2) / v / 166320.0
        };
        let bound = xm * (f1 / x1).ln()
            + (nf - mf + 0.5) * (z / w).ln()
            + (yf - mf) * (w * r / (x1 * q)).ln()
            + stirling(f1)
            + stirling(z)
            + stirling(x1)
            + stirling(w);
        if big_a > bound {
            continue;
        }
        return y;
    }
}

/// Gamma–Poisson mixture, defined for real `n > 0`.
pub fn negative_binomial<R: BitGenerator + ?Sized>(
    rng: &mut R,
    gauss: &mut GaussCache,
    n: f64,
    p: f64,
) -> i64 {
    let y = standard_gamma(rng, gauss, n) * ((1.0 - p) / p);
    poisson(rng, y)
}

pub fn geometric<R: BitGenerator + ?Sized>(rng: &mut R, p: f64) -> i64 {
    if p >= 1.0 / 3.0 {
        geometric_search(rng, p)
    } else {
        geometric_inversion(rng, p)
    }
}

fn geometric_search<R: BitGenerator + ?Sized>(rng: &mut R, p: f64) -> i64 {
    let q = 1.0 - p;
    let u = random_double(rng);
    let mut x = 1;
    let mut sum = p;
    let mut prod = p;
    while u > sum {
        prod *= q;
        sum += prod;
        x += 1;
    }
    x
}

fn geometric_inversion<R: BitGenerator + ?Sized>(rng: &mut R, p: f64) -> i64 {
    ((1.0 - random_double(rng)).ln() / (1.0 - p).ln()).ceil() as i64
}

/// Hypergeometric draw, HYP for small samples and HRUA* otherwise.
pub fn hypergeometric<R: BitGenerator + ?Sized>(
    rng: &mut R,
    good: i64,
    bad: i64,
    sample: i64,
) -> i64 {
    if sample > 10 {
        hypergeometric_hrua(rng, good, bad, sample)
    } else {
        hypergeometric_hyp(rng, good, bad, sample)
    }
}

fn hypergeometric_hyp<R: BitGenerator + ?Sized>(
    rng: &mut R,
    good: i64,
    bad: i64,
    sample: i64,
) -> i64 {
    let d1 = (bad + good - sample) as f64;
    let d2 = good.min(bad) as f64;
    let mut y = d2;
    let mut k = sample;
    while y > 0.0 {
        let u = random_double(rng);
        y -= (u + y / (d1 + k as f64)).floor();
        k -= 1;
        if k == 0 {
            break;
        }
    }
    let z = (d2 - y) as i64;
    if good > bad {
        sample - z
    } else {
        z
    }
}

const HRUA_D1: f64 = 1.7155277699214135;
const HRUA_D2: f64 = 0.8989161620588988;

/// Stadlober's ratio-of-uniforms, with the corrections that make the result
/// respect both ends of the support for any sample size.
fn hypergeometric_hrua<R: BitGenerator + ?Sized>(
    rng: &mut R,
    good: i64,
    bad: i64,
    sample: i64,
) -> i64 {
    let mingoodbad = good.min(bad);
    let maxgoodbad = good.max(bad);
    let popsize = good + bad;
    let m = sample.min(popsize - sample);
    let d4 = mingoodbad as f64 / popsize as f64;
    let d5 = 1.0 - d4;
    let d6 = m as f64 * d4 + 0.5;
    let d7 = ((popsize - m) as f64 * sample as f64 * d4 * d5 / (popsize - 1) as f64 + 0.5).sqrt();
    let d8 = HRUA_D1 * d7 + HRUA_D2;
    let d9 = ((m as f64 + 1.0) * (mingoodbad as f64 + 1.0) / (popsize as f64 + 2.0)).floor() as i64;
    // Float arguments keep populations near i64::MAX from overflowing.
    let log_weight = |z: i64| {
        ln_gamma(z as f64 + 1.0)
            + ln_gamma((mingoodbad - z) as f64 + 1.0)
            + ln_gamma((m - z) as f64 + 1.0)
            + ln_gamma((maxgoodbad - m) as f64 + z as f64 + 1.0)
    };
    let d10 = log_weight(d9);
    // 16 for 16-decimal-digit precision in HRUA_D1 and HRUA_D2
    let d11 = ((m.min(mingoodbad) + 1) as f64).min((d6 + 16.0 * d7).floor());

    let mut z = loop {
        let x = random_double(rng);
        let y = random_double(rng);
        let w = d6 + d8 * (y - 0.5) / x;
        if !(0.0..d11).contains(&w) {
            continue;
        }
        let z = w.floor() as i64;
        let t = d10 - log_weight(z);
        if x * (4.0 - x) - 3.0 <= t {
            break z;
        }
        if x * (x - t) >= 1.0 {
            continue;
        }
        if 2.0 * x.ln() <= t {
            break z;
        }
    };
    if good > bad {
        z = m - z;
    }
    if m < sample {
        z = good - z;
    }
    z
}

/// Kemp's second accelerated generator for the logarithmic series.
pub fn logseries<R: BitGenerator + ?Sized>(rng: &mut R, p: f64) -> i64 {
    let r = (1.0 - p).ln();
    loop {
        let v = random_double(rng);
        if v >= p {
            return 1;
        }
        let u = random_double(rng);
        let q = 1.0 - (r * u).exp();
        if v <= q * q {
            let result = (1.0 + v.ln() / q.ln()).floor() as i64;
            if result < 1 {
                continue;
            }
            return result;
        }
        if v >= q {
            return 1;
        }
        return 2;
    }
}

/// Above this concentration von Mises draws come from the wrapped normal.
pub const VONMISES_NORMAL_LIMIT: f64 = 1e6;

/// Best & Fisher rejection sampler; result wrapped into (-pi, pi].
///
/// For `kappa > VONMISES_NORMAL_LIMIT` the rejection envelope degenerates,
/// the draw is `mu + N(0, 1 / kappa)` instead.
pub fn vonmises<R: BitGenerator + ?Sized>(
    rng: &mut R,
    gauss: &mut GaussCache,
    mu: f64,
    kappa: f64,
) -> f64 {
    if kappa < 1e-8 {
        return wrap_angle(mu + PI * (2.0 * random_double(rng) - 1.0));
    }
    if kappa > VONMISES_NORMAL_LIMIT {
        return wrap_angle(mu + gauss.next(rng) / kappa.sqrt());
    }
    let s = if kappa < 1e-5 {
        1.0 / kappa + kappa
    } else {
        let r = 1.0 + (1.0 + 4.0 * kappa * kappa).sqrt();
        let rho = (r - (2.0 * r).sqrt()) / (2.0 * kappa);
        (1.0 + rho * rho) / (2.0 * rho)
    };
    let w = loop {
        let u = random_double(rng);
        let z = (PI * u).cos();
        let w = (1.0 + s * z) / (s + z);
        let y = kappa * (s - w);
        let v = random_double(rng);
        if y * (2.0 - y) - v >= 0.0 || (y / v).ln() + 1.0 - y >= 0.0 {
            break w;
        }
    };
    let u = random_double(rng);
    // Rounding can push w a hair outside [-1, 1].
    let mut angle = w.clamp(-1.0, 1.0).acos();
    if u < 0.5 {
        angle = -angle;
    }
    wrap_angle(angle + mu)
}

/// Counts per category for one multinomial draw, by conditional binomials.
///
/// `pvals` must be valid probabilities with a sum of at most one. When
/// `implicit_rest` is set the output gets one extra category holding the
/// trials not assigned to any listed category.
pub fn multinomial<R: BitGenerator + ?Sized>(
    rng: &mut R,
    n: i64,
    pvals: &[f64],
    implicit_rest: bool,
    out: &mut [i64],
) {
    out.fill(0);
    let mut remaining = n;
    let mut mass = 1.0;
    for (j, &p) in pvals.iter().enumerate() {
        if remaining <= 0 {
            break;
        }
        if p <= 0.0 {
            continue;
        }
        let cond = if mass > 0.0 { (p / mass).min(1.0) } else { 1.0 };
        let count = binomial(rng, remaining, cond);
        out[j] = count;
        remaining -= count;
        mass -= p;
    }
    if remaining > 0 {
        if implicit_rest {
            out[pvals.len()] = remaining;
        } else if let Some(last) = pvals.iter().rposition(|&p| p > 0.0) {
            out[last] += remaining;
        }
    }
}

/// Fisher–Yates, walking down from the last element.
pub fn shuffle<R: BitGenerator + ?Sized, T>(rng: &mut R, slice: &mut [T]) {
    for i in (1..slice.len()).rev() {
        let j = random_interval(rng, i as u64) as usize;
        slice.swap(i, j);
    }
}
