// Copyright 2025 N. Dornseif
//
// Dual-licensed under Apache 2.0 and MIT terms.

//! Error taxonomy shared by every public operation.

use thiserror::Error;

/// Errors raised by seeding, state restore and the samplers.
///
/// Domain errors (`InvalidParameter`, `ShapeMismatch`, `InvalidSeed`) are
/// always raised before any generator state is consumed, so the caller can
/// retry with corrected arguments. `CorruptState` leaves the state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RandomError {
    /// A distribution parameter lies outside its domain.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Parameter arrays and the requested size cannot be broadcast together.
    #[error("shape mismatch: objects cannot be broadcast to a single shape ({shapes})")]
    ShapeMismatch { shapes: String },

    /// Seed outside the accepted range, or an empty seed sequence.
    #[error("invalid seed: {0}")]
    InvalidSeed(String),

    /// A state tuple that does not describe a valid generator state.
    #[error("corrupt state: {0}")]
    CorruptState(String),
}

impl RandomError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        RandomError::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// True for errors caused by bad arguments rather than a bad state tuple.
    pub fn is_domain(&self) -> bool {
        !matches!(self, RandomError::CorruptState(_))
    }
}

pub type Result<T> = std::result::Result<T, RandomError>;
