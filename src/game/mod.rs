//! Game Logic Module
//!
//! All game rules. 100% deterministic: no system time, no I/O.
//!
//! ## Module Structure
//!
//! - `card`: card identities, faces, flip/match flags
//! - `board`: difficulty table and the dealt board
//! - `engine`: flip/match/mismatch state machine
//! - `timer`: externally-ticked round timer
//! - `events`: events consumed by presentation layers

pub mod board;
pub mod card;
pub mod engine;
pub mod events;
pub mod timer;

// Re-export key types
pub use board::{Board, BoardError, Difficulty, InvalidDifficulty};
pub use card::{Card, CardFace, CardId, SpeciesKey};
pub use engine::{EnginePhase, MatchEngine, SelectOutcome};
pub use events::GameEvent;
pub use timer::{RoundTimer, TimerPolicy, TimerTick};
