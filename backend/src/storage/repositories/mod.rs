// Repository modules
pub mod account_repository;
pub mod ancestry_repository;
pub mod animal_repository;
pub mod breeding_repository;
pub mod line_repository;
pub mod species_repository;
pub mod study_repository;

pub use account_repository::AccountRepository;
pub use ancestry_repository::AncestryRepository;
pub use animal_repository::AnimalRepository;
pub use breeding_repository::BreedingRepository;
pub use line_repository::LineRepository;
pub use species_repository::SpeciesRepository;
pub use study_repository::StudyRepository;
