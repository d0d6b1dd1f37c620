//! # Storage Module
//!
//! Persistence for the breeding records. The domain layer only sees the
//! traits in [`traits`]; the SQLite repositories implement them over a
//! shared [`DbConnection`].
//!
//! ## Deletion rules
//!
//! - Deleting a species removes its stocks
//! - Stocks with lines, lines with animals and animals in pairings are kept
//! - Deleting a pairing removes its litters; animals born in them keep their record
//! - Deleting an animal removes every pedigree edge it appears in

pub mod connection;
pub mod repositories;
pub mod traits;

pub use connection::DbConnection;
pub use repositories::{
    AccountRepository, AncestryRepository, AnimalRepository, BreedingRepository, LineRepository,
    SpeciesRepository, StudyRepository,
};
pub use traits::{
    AccountStorage, AncestryStorage, AnimalFilter, AnimalStorage, BreedingStorage, LineStorage,
    SpeciesStorage, StudyStorage,
};
