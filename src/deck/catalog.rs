//! Species Catalog Interface
//!
//! A catalog lists candidate species and resolves each to a card face
//! (name + artwork URL). The real thing is a remote API; the engine only
//! ever sees this trait, so any equivalent catalog works. JSON parsing
//! for the PokeAPI document shapes lives here so an HTTP adapter can be
//! bolted on outside the crate.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::game::card::CardFace;

// =============================================================================
// ERRORS
// =============================================================================

/// Catalog fetch/parse failures.
///
/// A failed fetch aborts the round start; nothing is partially installed
/// and nothing is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataSourceError {
    /// The catalog could not be reached.
    #[error("catalog unreachable: {0}")]
    Unreachable(String),

    /// The catalog returned a document we could not make sense of.
    #[error("malformed catalog document: {0}")]
    Malformed(String),

    /// The catalog has fewer distinct species than the difficulty needs.
    #[error("catalog pool too small: need {needed}, have {available}")]
    PoolTooSmall {
        /// Distinct species required.
        needed: usize,
        /// Distinct species available.
        available: usize,
    },
}

// =============================================================================
// CATALOG SOURCE
// =============================================================================

/// Reference to one catalog entry, before its detail is fetched.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct SpeciesRef {
    /// Species name.
    pub name: String,
    /// Where the detail document lives.
    pub url: String,
}

/// Read-only species catalog.
///
/// The deck fetch is the crate's only network-shaped suspension point,
/// so both operations are async.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// List up to `limit` candidate species.
    async fn list(&self, limit: usize) -> Result<Vec<SpeciesRef>, DataSourceError>;

    /// Resolve one species to its card face.
    async fn detail(&self, species: &SpeciesRef) -> Result<CardFace, DataSourceError>;
}

// =============================================================================
// JSON DOCUMENT PARSING (PokeAPI shapes)
// =============================================================================

#[derive(Deserialize)]
struct SpeciesListDoc {
    results: Vec<SpeciesRef>,
}

#[derive(Deserialize)]
struct SpriteDoc {
    front_default: Option<String>,
}

#[derive(Deserialize)]
struct SpeciesDetailDoc {
    name: String,
    sprites: SpriteDoc,
}

/// Parse a species list document: `{"results": [{"name", "url"}, ...]}`.
pub fn parse_species_list(doc: &str) -> Result<Vec<SpeciesRef>, DataSourceError> {
    let parsed: SpeciesListDoc =
        serde_json::from_str(doc).map_err(|e| DataSourceError::Malformed(e.to_string()))?;
    Ok(parsed.results)
}

/// Parse a species detail document:
/// `{"name": ..., "sprites": {"front_default": ...}}`.
///
/// A missing or null `front_default` sprite is malformed: a card without
/// artwork cannot be rendered.
pub fn parse_species_detail(doc: &str) -> Result<CardFace, DataSourceError> {
    let parsed: SpeciesDetailDoc =
        serde_json::from_str(doc).map_err(|e| DataSourceError::Malformed(e.to_string()))?;
    let image_url = parsed.sprites.front_default.ok_or_else(|| {
        DataSourceError::Malformed(format!("species {:?} has no front sprite", parsed.name))
    })?;
    Ok(CardFace::new(&parsed.name, image_url))
}

// =============================================================================
// IN-MEMORY CATALOG
// =============================================================================

/// In-process catalog fixture, used by the demo and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryCatalog {
    entries: Vec<(String, String)>,
}

impl MemoryCatalog {
    /// Create a catalog from `(name, image_url)` entries.
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// A small fixture catalog with enough species for every difficulty.
    pub fn sample() -> Self {
        const NAMES: [&str; 16] = [
            "bulbasaur",
            "charmander",
            "squirtle",
            "pikachu",
            "jigglypuff",
            "meowth",
            "psyduck",
            "machop",
            "geodude",
            "gastly",
            "onix",
            "cubone",
            "magikarp",
            "eevee",
            "snorlax",
            "dratini",
        ];
        Self::new(
            NAMES
                .iter()
                .map(|n| (n.to_string(), format!("mem://sprites/{n}.png")))
                .collect(),
        )
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    async fn list(&self, limit: usize) -> Result<Vec<SpeciesRef>, DataSourceError> {
        Ok(self
            .entries
            .iter()
            .take(limit)
            .map(|(name, url)| SpeciesRef {
                name: name.clone(),
                url: url.clone(),
            })
            .collect())
    }

    async fn detail(&self, species: &SpeciesRef) -> Result<CardFace, DataSourceError> {
        self.entries
            .iter()
            .find(|(name, _)| name == &species.name)
            .map(|(name, url)| CardFace::new(name, url.clone()))
            .ok_or_else(|| {
                DataSourceError::Malformed(format!("unknown species {:?}", species.name))
            })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_species_list() {
        let doc = r#"{
            "count": 1302,
            "results": [
                {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
                {"name": "ivysaur", "url": "https://pokeapi.co/api/v2/pokemon/2/"}
            ]
        }"#;
        let refs = parse_species_list(doc).unwrap();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name, "bulbasaur");
        assert_eq!(refs[1].url, "https://pokeapi.co/api/v2/pokemon/2/");
    }

    #[test]
    fn test_parse_species_list_malformed() {
        assert!(matches!(
            parse_species_list("not json"),
            Err(DataSourceError::Malformed(_))
        ));
        assert!(matches!(
            parse_species_list(r#"{"no_results": []}"#),
            Err(DataSourceError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_species_detail() {
        let doc = r#"{
            "name": "Pikachu",
            "id": 25,
            "sprites": {"front_default": "https://img.example/25.png", "back_default": null}
        }"#;
        let face = parse_species_detail(doc).unwrap();
        assert_eq!(face.species.as_str(), "pikachu");
        assert_eq!(face.image_url, "https://img.example/25.png");
    }

    #[test]
    fn test_parse_species_detail_missing_sprite() {
        let doc = r#"{"name": "missingno", "sprites": {"front_default": null}}"#;
        assert!(matches!(
            parse_species_detail(doc),
            Err(DataSourceError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_catalog_roundtrip() {
        let catalog = MemoryCatalog::sample();
        let refs = catalog.list(4).await.unwrap();
        assert_eq!(refs.len(), 4);

        let face = catalog.detail(&refs[0]).await.unwrap();
        assert_eq!(face.species.as_str(), refs[0].name);

        let bogus = SpeciesRef {
            name: "missingno".into(),
            url: "mem://nope".into(),
        };
        assert!(catalog.detail(&bogus).await.is_err());
    }
}
