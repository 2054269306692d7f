// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Bit generators.
//! Everything above this module only sees the [`BitGenerator`] interface,
//! the concrete generator is the 32-bit Mersenne Twister.

use log::debug;
use rand::{Rng, RngCore, SeedableRng};

use crate::errors::{RandomError, Result};

/// Number of 32-bit words in the Mersenne Twister state.
pub const STATE_LEN: usize = 624;

const SHIFT_LEN: usize = 397;
const MATRIX_A: u32 = 0x9908b0df;
const UPPER_MASK: u32 = 0x80000000;
const LOWER_MASK: u32 = 0x7fffffff;

/// General trait for bit generators.
pub trait BitGenerator {
    /// Initialize with specified seed.
    fn new(seed: u32) -> Self
    where
        Self: Sized;
    /// Generate u32 and advance the state one step.
    fn next_word(&mut self) -> u32;
    /// Generate u64 from two consecutive words, high word first.
    fn next(&mut self) -> u64 {
        let hi = self.next_word() as u64;
        let lo = self.next_word() as u64;
        (hi << 32) | lo
    }
    /// Discard the next `delta` words.
    fn advance(&mut self, delta: usize) {
        for _ in 0..delta {
            let _ = self.next_word();
        }
    }
    /// Reset to inital state, equivalent to replacing with ::new(seed).
    fn reseed(&mut self, seed: u32);
}

/// 32-bit Mersenne Twister (MT19937).
///
/// `pos` counts the words of the current block already handed out;
/// `pos == STATE_LEN` means the next draw regenerates the block.
#[derive(Clone, PartialEq, Eq)]
pub struct Mt19937 {
    key: [u32; STATE_LEN],
    pos: usize,
}

impl std::fmt::Debug for Mt19937 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mt19937")
            .field("key[0]", &self.key[0])
            .field("pos", &self.pos)
            .finish()
    }
}

impl Mt19937 {
    /// Knuth's linear recurrence seeding.
    pub fn init_genrand(seed: u32) -> Self {
        let mut key = [0u32; STATE_LEN];
        key[0] = seed;
        for i in 1..STATE_LEN {
            key[i] = 1812433253u32
                .wrapping_mul(key[i - 1] ^ (key[i - 1] >> 30))
                .wrapping_add(i as u32);
        }
        Mt19937 {
            key,
            pos: STATE_LEN,
        }
    }

    /// Seed from an arbitrary length word array.
    pub fn init_by_array(init_key: &[u32]) -> Result<Self> {
        if init_key.is_empty() {
            return Err(RandomError::InvalidSeed(
                "seed sequence must not be empty".to_owned(),
            ));
        }
        let mut state = Self::init_genrand(19650218);
        let mt = &mut state.key;
        let mut i = 1;
        let mut j = 0;
        for _ in 0..STATE_LEN.max(init_key.len()) {
            mt[i] = (mt[i] ^ (mt[i - 1] ^ (mt[i - 1] >> 30)).wrapping_mul(1664525))
                .wrapping_add(init_key[j])
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= STATE_LEN {
                mt[0] = mt[STATE_LEN - 1];
                i = 1;
            }
            if j >= init_key.len() {
                j = 0;
            }
        }
        for _ in 0..STATE_LEN - 1 {
            mt[i] = (mt[i] ^ (mt[i - 1] ^ (mt[i - 1] >> 30)).wrapping_mul(1566083941))
                .wrapping_sub(i as u32);
            i += 1;
            if i >= STATE_LEN {
                mt[0] = mt[STATE_LEN - 1];
                i = 1;
            }
        }
        // MSB is 1, assuring a non-zero initial array.
        mt[0] = 0x80000000;
        state.pos = STATE_LEN;
        Ok(state)
    }

    /// Fill the whole key from the operating system's entropy source.
    pub fn from_entropy() -> Self {
        let mut os = rand::rng();
        let mut key = [0u32; STATE_LEN];
        for word in key.iter_mut() {
            *word = os.random();
        }
        key[0] |= 0x80000000;
        debug!("seeded MT19937 from entropy");
        Mt19937 {
            key,
            pos: STATE_LEN,
        }
    }

    /// Rebuild a generator from saved words and cursor.
    pub fn from_parts(words: &[u32], pos: usize) -> Result<Self> {
        if words.len() != STATE_LEN {
            return Err(RandomError::CorruptState(format!(
                "key must have {} words, got {}",
                STATE_LEN,
                words.len()
            )));
        }
        if pos > STATE_LEN {
            return Err(RandomError::CorruptState(format!(
                "position {} exceeds {}",
                pos, STATE_LEN
            )));
        }
        let mut key = [0u32; STATE_LEN];
        key.copy_from_slice(words);
        Ok(Mt19937 { key, pos })
    }

    pub fn key(&self) -> &[u32; STATE_LEN] {
        &self.key
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Regenerate all STATE_LEN words at once.
    fn reload(&mut self) {
        let mt = &mut self.key;
        let mag01 = |y: u32| if y & 1 == 0 { 0 } else { MATRIX_A };
        for kk in 0..STATE_LEN - SHIFT_LEN {
            let y = (mt[kk] & UPPER_MASK) | (mt[kk + 1] & LOWER_MASK);
            mt[kk] = mt[kk + SHIFT_LEN] ^ (y >> 1) ^ mag01(y);
        }
        for kk in STATE_LEN - SHIFT_LEN..STATE_LEN - 1 {
            let y = (mt[kk] & UPPER_MASK) | (mt[kk + 1] & LOWER_MASK);
            mt[kk] = mt[kk + SHIFT_LEN - STATE_LEN] ^ (y >> 1) ^ mag01(y);
        }
        let y = (mt[STATE_LEN - 1] & UPPER_MASK) | (mt[0] & LOWER_MASK);
        mt[STATE_LEN - 1] = mt[SHIFT_LEN - 1] ^ (y >> 1) ^ mag01(y);
        self.pos = 0;
    }
}

impl BitGenerator for Mt19937 {
    fn new(seed: u32) -> Self {
        Mt19937::init_genrand(seed)
    }

    fn next_word(&mut self) -> u32 {
        if self.pos >= STATE_LEN {
            self.reload();
        }
        let mut y = self.key[self.pos];
        self.pos += 1;
        // Tempering
        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c5680;
        y ^= (y << 15) & 0xefc60000;
        y ^ (y >> 18)
    }

    fn reseed(&mut self, seed: u32) {
        *self = Mt19937::init_genrand(seed);
    }
}

impl RngCore for Mt19937 {
    fn next_u32(&mut self) -> u32 {
        self.next_word()
    }

    fn next_u64(&mut self) -> u64 {
        BitGenerator::next(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        crate::conditioning::fill_bytes(self, dst);
    }
}

impl SeedableRng for Mt19937 {
    /// Little-endian `init_genrand` seed.
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Mt19937::init_genrand(u32::from_le_bytes(seed))
    }
}
