// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Saved generator state.
//!
//! The current layout is `(algorithm, key, pos, has_gauss, cached_gaussian)`.
//! Older snapshots stop after `pos`; they load as "no cached gaussian".

use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{RandomError, Result};
use crate::gauss::GaussCache;
use crate::rngs::Mt19937;

pub const ALGORITHM: &str = "MT19937";

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(untagged))]
pub enum StateTuple {
    Full(String, Vec<u32>, usize, bool, f64),
    Legacy(String, Vec<u32>, usize),
}

impl StateTuple {
    /// Snapshot a generator and its gaussian cache.
    pub fn encode(bitgen: &Mt19937, gauss: &GaussCache) -> Self {
        let (has_gauss, cached) = match gauss.cached() {
            Some(v) => (true, v),
            None => (false, 0.0),
        };
        StateTuple::Full(
            ALGORITHM.to_owned(),
            bitgen.key().to_vec(),
            bitgen.pos(),
            has_gauss,
            cached,
        )
    }

    /// Validate the whole tuple and rebuild generator and cache from it.
    pub fn decode(&self) -> Result<(Mt19937, GaussCache)> {
        let (algorithm, key, pos, cached) = match self {
            StateTuple::Full(algorithm, key, pos, has_gauss, value) => {
                let cached = if *has_gauss {
                    if !value.is_finite() {
                        return Err(RandomError::CorruptState(format!(
                            "cached gaussian {} is not finite",
                            value
                        )));
                    }
                    Some(*value)
                } else {
                    None
                };
                (algorithm, key, *pos, cached)
            }
            StateTuple::Legacy(algorithm, key, pos) => {
                debug!("state tuple without cached gaussian, treating cache as empty");
                (algorithm, key, *pos, None)
            }
        };
        if algorithm != ALGORITHM {
            return Err(RandomError::CorruptState(format!(
                "algorithm must be {}, got {}",
                ALGORITHM, algorithm
            )));
        }
        let bitgen = Mt19937::from_parts(key, pos)?;
        let mut gauss = GaussCache::new();
        gauss.restore(cached);
        Ok((bitgen, gauss))
    }

    /// Number of fields in the tuple.
    pub fn field_count(&self) -> usize {
        match self {
            StateTuple::Full(..) => 5,
            StateTuple::Legacy(..) => 3,
        }
    }

    /// The same snapshot in the older layout, dropping the gaussian fields.
    pub fn without_gaussian(&self) -> Self {
        match self {
            StateTuple::Full(algorithm, key, pos, ..) | StateTuple::Legacy(algorithm, key, pos) => {
                StateTuple::Legacy(algorithm.clone(), key.clone(), *pos)
            }
        }
    }

    pub fn key(&self) -> &[u32] {
        match self {
            StateTuple::Full(_, key, ..) | StateTuple::Legacy(_, key, _) => key,
        }
    }

    pub fn pos(&self) -> usize {
        match self {
            StateTuple::Full(_, _, pos, ..) | StateTuple::Legacy(_, _, pos) => *pos,
        }
    }
}
