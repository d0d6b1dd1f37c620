pub mod account;
pub mod ancestry;
pub mod animal;
pub mod breeding;
pub mod species;
pub mod study;

pub use account::{AccountType, Credentials, Individual, NewAccount, User, UserAccount};
pub use ancestry::{AncestryEdge, NewAncestryEdge, Pedigree};
pub use animal::{Animal, NewAnimal};
pub use breeding::{Litter, Pairing};
pub use species::{Line, Species, Stock};
pub use study::{DataPoint, Observation, ObservationData, Study, StudyAnimal, StudyGroup};
