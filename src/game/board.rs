//! Difficulty Table and Dealt Board
//!
//! A board is an ordered sequence of cards sized by difficulty, with the
//! invariant that exactly two cards share each identity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::game::card::{Card, CardFace, CardId, SpeciesKey};

// =============================================================================
// DIFFICULTY
// =============================================================================

/// Grid geometry, pair count, and time limit per difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[derive(Default)]
pub enum Difficulty {
    /// 2x3 grid, 3 pairs, 100 second limit.
    #[default]
    Easy = 0,
    /// 3x4 grid, 6 pairs, 200 second limit.
    Medium = 1,
    /// 4x6 grid, 12 pairs, 300 second limit.
    Hard = 2,
}

impl Difficulty {
    /// Grid rows.
    #[inline]
    pub fn rows(self) -> u8 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
        }
    }

    /// Grid columns.
    #[inline]
    pub fn cols(self) -> u8 {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 4,
            Difficulty::Hard => 6,
        }
    }

    /// Number of identity pairs on the board.
    #[inline]
    pub fn pair_count(self) -> u32 {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 6,
            Difficulty::Hard => 12,
        }
    }

    /// Total cards dealt (always `2 * pair_count`).
    #[inline]
    pub fn card_count(self) -> usize {
        self.pair_count() as usize * 2
    }

    /// Count-down time limit in seconds.
    #[inline]
    pub fn time_limit_secs(self) -> u64 {
        match self {
            Difficulty::Easy => 100,
            Difficulty::Medium => 200,
            Difficulty::Hard => 300,
        }
    }

    /// Strict parse of a difficulty name.
    pub fn parse(name: &str) -> Result<Self, InvalidDifficulty> {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(InvalidDifficulty(other.to_string())),
        }
    }

    /// Lossy parse: unknown names fall back to easy.
    pub fn parse_or_default(name: &str) -> Self {
        Self::parse(name).unwrap_or_default()
    }
}

impl std::str::FromStr for Difficulty {
    type Err = InvalidDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Unknown difficulty name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty: {0:?}")]
pub struct InvalidDifficulty(pub String);

// =============================================================================
// BOARD
// =============================================================================

/// Deck shape errors raised when dealing a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// Deck size does not match the difficulty's card count.
    #[error("deck has {got} cards, difficulty requires {want}")]
    WrongCardCount {
        /// Cards provided.
        got: usize,
        /// Cards the difficulty needs.
        want: usize,
    },

    /// An identity does not appear exactly twice.
    #[error("species {0} appears {1} times, expected exactly 2")]
    UnpairedSpecies(SpeciesKey, usize),
}

/// Ordered sequence of cards dealt for one round.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Board {
    cards: Vec<Card>,
    rows: u8,
    cols: u8,
}

impl Board {
    /// Deal a board from already-shuffled faces.
    ///
    /// Enforces the pair invariant: exactly two cards per identity, and
    /// exactly `difficulty.card_count()` cards total.
    pub fn deal(difficulty: Difficulty, faces: Vec<CardFace>) -> Result<Self, BoardError> {
        let want = difficulty.card_count();
        if faces.len() != want {
            return Err(BoardError::WrongCardCount {
                got: faces.len(),
                want,
            });
        }

        // BTreeMap keeps the error for the lexically-first bad species stable.
        let mut counts: BTreeMap<&SpeciesKey, usize> = BTreeMap::new();
        for face in &faces {
            *counts.entry(&face.species).or_insert(0) += 1;
        }
        for (species, count) in counts {
            if count != 2 {
                return Err(BoardError::UnpairedSpecies(species.clone(), count));
            }
        }

        Ok(Self {
            cards: faces.into_iter().map(Card::new).collect(),
            rows: difficulty.rows(),
            cols: difficulty.cols(),
        })
    }

    /// Grid rows.
    #[inline]
    pub fn rows(&self) -> u8 {
        self.rows
    }

    /// Grid columns.
    #[inline]
    pub fn cols(&self) -> u8 {
        self.cols
    }

    /// Total cards on the board.
    #[inline]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// True when the board holds no cards.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Get a card by id.
    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.get(id.index())
    }

    /// Get a card mutably by id.
    pub fn card_mut(&mut self, id: CardId) -> Option<&mut Card> {
        self.cards.get_mut(id.index())
    }

    /// Iterate cards with their ids, in grid order.
    pub fn iter(&self) -> impl Iterator<Item = (CardId, &Card)> {
        self.cards
            .iter()
            .enumerate()
            .map(|(i, c)| (CardId::new(i as u8), c))
    }

    /// True when every card has been matched.
    pub fn is_fully_matched(&self) -> bool {
        self.cards.iter().all(|c| c.matched)
    }

    /// Pairs still unmatched.
    pub fn pairs_left(&self) -> u32 {
        (self.cards.iter().filter(|c| !c.matched).count() / 2) as u32
    }
}

// =============================================================================
// TESTS
// =============================================================================
