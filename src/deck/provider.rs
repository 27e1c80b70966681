//! Random Deck Provider
//!
//! Builds the shuffled, duplicated deck for one round: list the candidate
//! pool, Fisher-Yates it, take `pair_count` distinct species, resolve each
//! to a face, duplicate, shuffle the combined set. Always exactly
//! `2 * pair_count` faces, or an error and nothing at all.

use std::collections::BTreeSet;

use tracing::debug;

use crate::core::rng::{derive_round_seed, DeterministicRng};
use crate::deck::catalog::{CatalogSource, DataSourceError};
use crate::game::board::Difficulty;
use crate::game::card::CardFace;
use crate::CATALOG_POOL_LIMIT;

/// Deck provider over a catalog source.
///
/// Holds the session seed; each round's shuffles draw from an independent
/// stream derived from it, so replays deal identical boards.
pub struct RandomDeckProvider<S> {
    source: S,
    session_seed: u64,
}

impl<S: CatalogSource> RandomDeckProvider<S> {
    /// Create a provider from a catalog and a session seed.
    pub fn new(source: S, session_seed: u64) -> Self {
        Self {
            source,
            session_seed,
        }
    }

    /// The underlying catalog.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch a deck for one round.
    ///
    /// `round` is the session's round generation; it selects the RNG
    /// stream. Errors propagate untouched - the caller installs nothing
    /// on failure and waits for an explicit user retry.
    pub async fn fetch_deck(
        &self,
        difficulty: Difficulty,
        round: u64,
    ) -> Result<Vec<CardFace>, DataSourceError> {
        let pair_count = difficulty.pair_count() as usize;

        let mut pool = self.source.list(CATALOG_POOL_LIMIT).await?;

        // The pool must offer distinct identities; drop duplicate names.
        let mut seen: BTreeSet<String> = BTreeSet::new();
        pool.retain(|r| seen.insert(r.name.clone()));

        if pool.len() < pair_count {
            return Err(DataSourceError::PoolTooSmall {
                needed: pair_count,
                available: pool.len(),
            });
        }

        let mut rng = DeterministicRng::new(derive_round_seed(self.session_seed, round));

        // Uniform selection: shuffle the pool, take the prefix.
        rng.shuffle(&mut pool);
        let chosen = &pool[..pair_count];

        let mut faces = Vec::with_capacity(pair_count * 2);
        for species in chosen {
            let face = self.source.detail(species).await?;
            faces.push(face.clone());
            faces.push(face);
        }
        rng.shuffle(&mut faces);

        debug!(
            round,
            ?difficulty,
            cards = faces.len(),
            "deck fetched and shuffled"
        );
        Ok(faces)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::catalog::{MemoryCatalog, SpeciesRef};
    use crate::game::card::SpeciesKey;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    fn provider(seed: u64) -> RandomDeckProvider<MemoryCatalog> {
        RandomDeckProvider::new(MemoryCatalog::sample(), seed)
    }

    fn species_counts(faces: &[CardFace]) -> BTreeMap<SpeciesKey, usize> {
        let mut counts = BTreeMap::new();
        for face in faces {
            *counts.entry(face.species.clone()).or_insert(0) += 1;
        }
        counts
    }

    #[tokio::test]
    async fn test_deck_shape_all_difficulties() {
        let provider = provider(42);
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            let faces = provider.fetch_deck(difficulty, 1).await.unwrap();
            assert_eq!(faces.len(), difficulty.card_count());

            for (species, count) in species_counts(&faces) {
                assert_eq!(count, 2, "species {species} should appear exactly twice");
            }
        }
    }

    #[tokio::test]
    async fn test_deck_is_deterministic_per_round() {
        let provider = provider(7);
        let a = provider.fetch_deck(Difficulty::Medium, 1).await.unwrap();
        let b = provider.fetch_deck(Difficulty::Medium, 1).await.unwrap();
        assert_eq!(a, b, "same seed + round must deal the same deck");

        let c = provider.fetch_deck(Difficulty::Medium, 2).await.unwrap();
        assert_ne!(a, c, "a new round should deal a fresh deck");
    }

    #[tokio::test]
    async fn test_pool_too_small() {
        let tiny = MemoryCatalog::new(vec![
            ("bulbasaur".into(), "mem://1".into()),
            ("ivysaur".into(), "mem://2".into()),
        ]);
        let provider = RandomDeckProvider::new(tiny, 1);

        let err = provider.fetch_deck(Difficulty::Easy, 1).await.unwrap_err();
        assert_eq!(
            err,
            DataSourceError::PoolTooSmall {
                needed: 3,
                available: 2
            }
        );
    }

    #[tokio::test]
    async fn test_duplicate_catalog_names_collapse() {
        let dupes = MemoryCatalog::new(vec![
            ("bulbasaur".into(), "mem://1".into()),
            ("bulbasaur".into(), "mem://1b".into()),
            ("ivysaur".into(), "mem://2".into()),
            ("venusaur".into(), "mem://3".into()),
        ]);
        let provider = RandomDeckProvider::new(dupes, 9);

        let faces = provider.fetch_deck(Difficulty::Easy, 1).await.unwrap();
        for (_, count) in species_counts(&faces) {
            assert_eq!(count, 2);
        }
    }

    /// Unreachable source: errors propagate, nothing is returned.
    struct DownCatalog;

    #[async_trait]
    impl CatalogSource for DownCatalog {
        async fn list(&self, _limit: usize) -> Result<Vec<SpeciesRef>, DataSourceError> {
            Err(DataSourceError::Unreachable("connection refused".into()))
        }

        async fn detail(&self, _species: &SpeciesRef) -> Result<CardFace, DataSourceError> {
            Err(DataSourceError::Unreachable("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_unreachable_source_propagates() {
        let provider = RandomDeckProvider::new(DownCatalog, 1);
        assert!(matches!(
            provider.fetch_deck(Difficulty::Easy, 1).await,
            Err(DataSourceError::Unreachable(_))
        ));
    }

    proptest! {
        /// For any seed and round, every difficulty deals exactly
        /// 2 * pair_count faces with each identity appearing twice.
        #[test]
        fn prop_deck_shape(seed: u64, round in 1u64..10_000) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            rt.block_on(async {
                let provider = provider(seed);
                for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
                    let faces = provider.fetch_deck(difficulty, round).await.unwrap();
                    prop_assert_eq!(faces.len(), difficulty.card_count());
                    for (_, count) in species_counts(&faces) {
                        prop_assert_eq!(count, 2);
                    }
                }
                Ok(())
            })?;
        }
    }
}
