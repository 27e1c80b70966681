//! Card Identities and Face State
//!
//! A card is one grid cell: an identity (species key), the artwork the
//! presentation layer renders, and two flags the engine mutates.

use serde::{Deserialize, Serialize};

// =============================================================================
// SPECIES KEY
// =============================================================================

/// Card identity: an interned species name.
///
/// Two cards match when their keys are equal. Keys are normalized to
/// lowercase so catalog casing differences cannot break matching.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeciesKey(String);

impl SpeciesKey {
    /// Create a key from a species name.
    pub fn new(name: &str) -> Self {
        Self(name.trim().to_ascii_lowercase())
    }

    /// The normalized species name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpeciesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CARD ID
// =============================================================================

/// Position of a card on the board, row-major.
///
/// Implements Ord so boards iterate and compare deterministically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u8);

impl CardId {
    /// Create from a raw board index.
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    /// Board index as usize.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// CARD FACE
// =============================================================================

/// What a card shows when face-up: its identity plus artwork location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFace {
    /// Matching identity.
    pub species: SpeciesKey,

    /// Artwork URL for the presentation layer.
    pub image_url: String,
}

impl CardFace {
    /// Create a face from a species name and artwork URL.
    pub fn new(name: &str, image_url: impl Into<String>) -> Self {
        Self {
            species: SpeciesKey::new(name),
            image_url: image_url.into(),
        }
    }
}

// =============================================================================
// CARD
// =============================================================================

/// One card on the board.
///
/// Created when a round is dealt, replaced when the board regenerates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Card {
    /// Identity and artwork.
    pub face: CardFace,

    /// Is the card currently face-up?
    pub face_up: bool,

    /// Has this card's pair been found? Matched cards reject selection.
    pub matched: bool,
}

impl Card {
    /// Create a new face-down, unmatched card.
    pub fn new(face: CardFace) -> Self {
        Self {
            face,
            face_up: false,
            matched: false,
        }
    }

    /// The card's matching identity.
    #[inline]
    pub fn species(&self) -> &SpeciesKey {
        &self.face.species
    }

    /// Turn the card face-up.
    pub fn flip_up(&mut self) {
        self.face_up = true;
    }

    /// Turn the card face-down. Matched cards stay face-up.
    pub fn flip_down(&mut self) {
        if !self.matched {
            self.face_up = false;
        }
    }

    /// Lock the card as matched. Matched cards stay face-up forever.
    pub fn mark_matched(&mut self) {
        self.matched = true;
        self.face_up = true;
    }
}

// =============================================================================
// TESTS
// =============================================================================
