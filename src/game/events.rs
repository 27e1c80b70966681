//! Game Events
//!
//! Events emitted by the engine and session for presentation layers to
//! render. The engine never touches rendering; it only reports what
//! happened, in order.

use serde::{Deserialize, Serialize};

use crate::game::card::{CardId, SpeciesKey};

/// An observable game event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A fresh board was dealt and is ready to render.
    BoardDealt {
        /// Grid rows.
        rows: u8,
        /// Grid columns.
        cols: u8,
        /// Total cards dealt.
        cards: u8,
    },

    /// A card was turned face-up by a selection.
    CardFlipped {
        /// The flipped card.
        card: CardId,
    },

    /// Two selections matched; both cards are locked face-up.
    PairMatched {
        /// First selected card.
        first: CardId,
        /// Second selected card.
        second: CardId,
        /// The shared identity.
        species: SpeciesKey,
        /// Pairs still on the board after this match.
        pairs_left: u32,
    },

    /// Two selections mismatched; the engine is locked until the unflip.
    MismatchLocked {
        /// First selected card.
        first: CardId,
        /// Second selected card.
        second: CardId,
    },

    /// The mismatch delay elapsed; both cards returned face-down.
    CardsUnflipped {
        /// First selected card.
        first: CardId,
        /// Second selected card.
        second: CardId,
    },

    /// Every pair was found. Fires exactly once per round.
    GameComplete {
        /// Matches made (equals the difficulty's pair count).
        matches: u32,
        /// Completed selection pairs it took.
        clicks: u32,
    },

    /// One second elapsed on the round timer.
    TimerTick {
        /// Formatted `minutes:seconds` display, seconds zero-padded.
        display: String,
    },

    /// The count-down timer reached zero; the round is over.
    TimeExpired,
}

impl GameEvent {
    /// Create a board-dealt event from grid geometry.
    pub fn board_dealt(rows: u8, cols: u8) -> Self {
        GameEvent::BoardDealt {
            rows,
            cols,
            cards: rows * cols,
        }
    }

    /// True for events that end the round.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            GameEvent::GameComplete { .. } | GameEvent::TimeExpired
        )
    }
}
