//! Flip/Match/Mismatch State Machine
//!
//! The engine owns the board and the selection slot and enforces the
//! ordering guarantee: exactly one resolution per two selections, and no
//! third selection while two are pending or during the mismatch lock.
//!
//! The engine is fully synchronous and deterministic. The 1000 ms unflip
//! delay lives outside it: on a mismatch the engine enters
//! [`EnginePhase::MismatchLock`] and stays there until something calls
//! [`MatchEngine::resolve_mismatch`] (the session schedules that call).

use serde::{Deserialize, Serialize};

use crate::game::board::Board;
use crate::game::card::{CardId, SpeciesKey};

// =============================================================================
// PHASE
// =============================================================================

/// Engine state machine phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Default)]
pub enum EnginePhase {
    /// No cards selected.
    #[default]
    Idle,
    /// One card face-up, awaiting its partner.
    OneSelected,
    /// Two cards mismatched; locked until the unflip delay elapses.
    MismatchLock,
    /// Round over (all pairs found, or time expired). Terminal.
    Complete,
}

// =============================================================================
// SELECTION SLOT
// =============================================================================

/// At most two cards pending comparison.
///
/// Transient: cleared after every resolution.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
struct SelectionSlot {
    first: Option<CardId>,
    second: Option<CardId>,
}

impl SelectionSlot {
    fn clear(&mut self) {
        self.first = None;
        self.second = None;
    }
}

// =============================================================================
// OUTCOME
// =============================================================================

/// What one `select_card` call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Silent no-op: locked, repeated card, matched card, bad id, or
    /// the round is already complete.
    Ignored,

    /// First card of a pair flipped face-up.
    FirstFlipped {
        /// The flipped card.
        card: CardId,
    },

    /// Second selection matched the first.
    Matched {
        /// First selected card.
        first: CardId,
        /// Second selected card.
        second: CardId,
        /// The shared identity.
        species: SpeciesKey,
        /// Did this match clear the board?
        complete: bool,
    },

    /// Second selection mismatched; engine is now locked.
    Mismatched {
        /// First selected card.
        first: CardId,
        /// Second selected card.
        second: CardId,
    },
}

// =============================================================================
// MATCH ENGINE
// =============================================================================

/// The flip/match/mismatch state machine over one dealt board.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchEngine {
    board: Board,
    phase: EnginePhase,
    selection: SelectionSlot,
}

impl MatchEngine {
    /// Create an engine over a freshly dealt board.
    pub fn new(board: Board) -> Self {
        Self {
            board,
            phase: EnginePhase::Idle,
            selection: SelectionSlot::default(),
        }
    }

    /// The board, for presentation reads.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current phase.
    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    /// True while a mismatch is waiting out the unflip delay.
    /// All selections are rejected in this window.
    pub fn is_locked(&self) -> bool {
        self.phase == EnginePhase::MismatchLock
    }

    /// Pairs still unmatched on the board.
    pub fn pairs_left(&self) -> u32 {
        self.board.pairs_left()
    }

    /// Select a card.
    ///
    /// No-ops (returning [`SelectOutcome::Ignored`]) when the engine is
    /// locked or complete, the id is out of range, the card is already
    /// matched, or the card is the currently selected first card.
    pub fn select_card(&mut self, id: CardId) -> SelectOutcome {
        match self.phase {
            EnginePhase::MismatchLock | EnginePhase::Complete => return SelectOutcome::Ignored,
            EnginePhase::Idle | EnginePhase::OneSelected => {}
        }

        if self.selection.first == Some(id) {
            return SelectOutcome::Ignored;
        }

        match self.board.card(id) {
            None => return SelectOutcome::Ignored,
            Some(card) if card.matched => return SelectOutcome::Ignored,
            Some(_) => {}
        }

        // Checks passed: flip face-up.
        if let Some(card) = self.board.card_mut(id) {
            card.flip_up();
        }

        match self.selection.first {
            None => {
                self.selection.first = Some(id);
                self.phase = EnginePhase::OneSelected;
                SelectOutcome::FirstFlipped { card: id }
            }
            Some(first) => {
                self.selection.second = Some(id);
                self.resolve(first, id)
            }
        }
    }

    /// Compare the two pending selections. Runs exactly once per pair.
    fn resolve(&mut self, first: CardId, second: CardId) -> SelectOutcome {
        let matched_species = match (self.board.card(first), self.board.card(second)) {
            (Some(a), Some(b)) if a.species() == b.species() => Some(a.species().clone()),
            _ => None,
        };

        if let Some(species) = matched_species {
            if let Some(card) = self.board.card_mut(first) {
                card.mark_matched();
            }
            if let Some(card) = self.board.card_mut(second) {
                card.mark_matched();
            }
            self.selection.clear();

            let complete = self.board.is_fully_matched();
            // Matches resolve immediately: no delay, straight back to Idle.
            self.phase = if complete {
                EnginePhase::Complete
            } else {
                EnginePhase::Idle
            };

            SelectOutcome::Matched {
                first,
                second,
                species,
                complete,
            }
        } else {
            // Selection is retained so resolve_mismatch knows what to unflip.
            self.phase = EnginePhase::MismatchLock;
            SelectOutcome::Mismatched { first, second }
        }
    }

    /// Flip the mismatched pair back down and unlock.
    ///
    /// The scheduled continuation for the unflip delay lands here.
    /// Returns the unflipped pair, or `None` when no mismatch is pending
    /// (stale or spurious callbacks are harmless).
    pub fn resolve_mismatch(&mut self) -> Option<(CardId, CardId)> {
        if self.phase != EnginePhase::MismatchLock {
            return None;
        }
        let (first, second) = match (self.selection.first, self.selection.second) {
            (Some(f), Some(s)) => (f, s),
            _ => return None,
        };

        if let Some(card) = self.board.card_mut(first) {
            card.flip_down();
        }
        if let Some(card) = self.board.card_mut(second) {
            card.flip_down();
        }
        self.selection.clear();
        self.phase = EnginePhase::Idle;

        Some((first, second))
    }

    /// Force the round over (timer expiry). All further selections no-op.
    pub fn expire(&mut self) {
        self.selection.clear();
        self.phase = EnginePhase::Complete;
    }
}

// =============================================================================
// TESTS
// =============================================================================
