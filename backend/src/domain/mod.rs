//! # Domain Module
//!
//! Business rules of the breeding records: taxonomy (species, stocks,
//! lines), animals with their derived age, pedigrees, breeding pairs and
//! litters, user accounts, and observational studies.
//!
//! Services take command types from [`commands`], talk to storage only
//! through the traits in [`crate::storage`], and report failures as
//! [`errors::DomainError`].

pub mod account_service;
pub mod ancestry_service;
pub mod animal_service;
pub mod breeding_service;
pub mod commands;
pub mod errors;
pub mod line_service;
pub mod models;
pub mod species_service;
pub mod study_service;

pub use account_service::AccountService;
pub use ancestry_service::AncestryService;
pub use animal_service::AnimalService;
pub use breeding_service::BreedingService;
pub use errors::{DomainError, DomainResult, ErrorKind};
pub use line_service::LineService;
pub use species_service::SpeciesService;
pub use study_service::StudyService;

/// Trim optional free text, treating blank as absent
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
