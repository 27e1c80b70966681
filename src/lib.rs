//! # Pokepairs Game Engine
//!
//! Deterministic memory-matching card game core with a pluggable catalog
//! source for card artwork.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        POKEPAIRS                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  └── rng.rs      - Xorshift128+ PRNG, shuffle, seed derive   │
//! │                                                              │
//! │  game/           - Game logic (deterministic)                │
//! │  ├── card.rs     - Card identities and face state            │
//! │  ├── board.rs    - Difficulty table and dealt board          │
//! │  ├── engine.rs   - Flip/match/mismatch state machine         │
//! │  ├── timer.rs    - Round timer (count-up / count-down)       │
//! │  └── events.rs   - Events consumed by presentation layers    │
//! │                                                              │
//! │  deck/           - Deck provisioning (non-deterministic edge)│
//! │  ├── catalog.rs  - External species catalog interface        │
//! │  └── provider.rs - Shuffled, duplicated deck per difficulty  │
//! │                                                              │
//! │  session/        - Round lifecycle and scheduling            │
//! │  └── mod.rs      - GameSession, counters, stale-round guard  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - No system time dependencies (timers are externally ticked)
//! - All randomness from seeded Xorshift128+
//! - Per-round deck seeds derived from a session seed, so a replayed
//!   session deals identical boards
//!
//! The only suspension points are the mismatch-resolution delay and the
//! asynchronous deck fetch; both are scheduled continuations tagged with
//! the round they belong to, and stale continuations are dropped.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod deck;
pub mod game;
pub mod session;

// Re-export commonly used types
pub use crate::core::rng::DeterministicRng;
pub use deck::catalog::{CatalogSource, DataSourceError, MemoryCatalog};
pub use deck::provider::RandomDeckProvider;
pub use game::board::{Board, Difficulty};
pub use game::card::{Card, CardFace, CardId, SpeciesKey};
pub use game::engine::{EnginePhase, MatchEngine};
pub use game::events::GameEvent;
pub use game::timer::{RoundTimer, TimerPolicy};
pub use session::{GameSession, GameStats, RoundId, SessionError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long mismatched cards stay face-up before flipping back (ms).
pub const MISMATCH_DELAY_MS: u64 = 1000;

/// Timer tick resolution in seconds.
pub const TIMER_RESOLUTION_SECS: u64 = 1;

/// Maximum number of catalog entries considered when building a deck.
pub const CATALOG_POOL_LIMIT: usize = 810;
