//! Deck Provisioning
//!
//! The non-deterministic edge of the crate: fetching card artwork from an
//! external species catalog. All randomness still flows through the
//! deterministic RNG; only the catalog itself is an external collaborator.
//!
//! - `catalog`: the catalog interface, an in-memory fixture, and parsing
//!   for PokeAPI-shaped JSON documents
//! - `provider`: turns a catalog into a shuffled, duplicated deck

pub mod catalog;
pub mod provider;

pub use catalog::{
    parse_species_detail, parse_species_list, CatalogSource, DataSourceError, MemoryCatalog,
    SpeciesRef,
};
pub use provider::RandomDeckProvider;
