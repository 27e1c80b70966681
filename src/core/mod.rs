//! Core deterministic primitives.
//!
//! Everything here is designed for perfect cross-platform determinism:
//! replaying a session with the same seed deals the same boards.

pub mod rng;

// Re-export core types
pub use rng::{derive_round_seed, DeterministicRng};
