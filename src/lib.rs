// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Seedable Mersenne Twister random state with restorable snapshots and a
//! collection of distribution samplers.
//!
//! ```
//! use pearlstate::RandomState;
//!
//! let mut rs = RandomState::new(0u32).unwrap();
//! let saved = rs.get_state();
//! let a = rs.binomial(10, 0.5).unwrap();
//! rs.set_state(&saved).unwrap();
//! assert_eq!(rs.binomial(10, 0.5).unwrap(), a);
//! ```

pub mod broadcast;
pub mod conditioning;
pub mod distributions;
pub mod errors;
pub mod gauss;
pub mod global;
pub mod random_state;
pub mod rngs;
pub mod state;
pub mod stats;
pub mod utils;

pub use broadcast::{NdArray, Param};
pub use errors::{RandomError, Result};
pub use random_state::{RandomState, Seed};
pub use rngs::{BitGenerator, Mt19937};
pub use state::StateTuple;
