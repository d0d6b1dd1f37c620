//! # Storage Traits
//!
//! Repository interfaces the domain layer depends on. Related records are
//! fetched through these on demand by foreign key; nothing is loaded
//! implicitly.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use shared::Sex;

use crate::domain::models::{
    AccountType, AncestryEdge, Animal, Credentials, DataPoint, Line, Litter, NewAccount,
    NewAncestryEdge, NewAnimal, ObservationData, Pairing, Species, Stock, Study, StudyAnimal,
    StudyGroup, UserAccount,
};

/// Filters for listing animals; `None` means "any"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnimalFilter {
    pub species_id: Option<i64>,
    pub sex: Option<Sex>,
    pub search_term: Option<String>,
}

#[async_trait]
pub trait SpeciesStorage: Send + Sync {
    async fn store_species(&self, scientific_name: &str, common_name: Option<&str>) -> Result<Species>;
    async fn get_species(&self, species_id: i64) -> Result<Option<Species>>;
    async fn find_species_by_name(&self, scientific_name: &str) -> Result<Option<Species>>;
    /// All species ordered by scientific name
    async fn list_species(&self) -> Result<Vec<Species>>;
    async fn update_species(&self, species: &Species) -> Result<()>;
    /// Returns true if a row was removed
    async fn delete_species(&self, species_id: i64) -> Result<bool>;

    async fn store_stock(&self, species_id: i64, name: &str, description: Option<&str>) -> Result<Stock>;
    async fn get_stock(&self, stock_id: i64) -> Result<Option<Stock>>;
    async fn list_stocks(&self, species_id: i64) -> Result<Vec<Stock>>;
    async fn delete_stock(&self, stock_id: i64) -> Result<bool>;
    /// Number of lines kept under the stock (or under any stock of the species)
    async fn count_lines_for_stock(&self, stock_id: i64) -> Result<i64>;
    async fn count_lines_for_species(&self, species_id: i64) -> Result<i64>;
}

#[async_trait]
pub trait LineStorage: Send + Sync {
    async fn store_line(&self, stock_id: i64, name: &str, description: Option<&str>) -> Result<Line>;
    async fn get_line(&self, line_id: i64) -> Result<Option<Line>>;
    /// Lines ordered by name, optionally restricted to one stock
    async fn list_lines(&self, stock_id: Option<i64>) -> Result<Vec<Line>>;
    async fn update_line(&self, line: &Line) -> Result<()>;
    async fn delete_line(&self, line_id: i64) -> Result<bool>;
    async fn count_animals_in_line(&self, line_id: i64) -> Result<i64>;
}

#[async_trait]
pub trait AnimalStorage: Send + Sync {
    async fn store_animal(&self, animal: &NewAnimal) -> Result<Animal>;
    /// Insert a litter pup and its (1, 1) maternal and (1, 2) paternal edges in one transaction
    async fn store_animal_with_parents(&self, animal: &NewAnimal, dam_id: i64, sire_id: i64) -> Result<Animal>;
    async fn get_animal(&self, animal_id: i64) -> Result<Option<Animal>>;
    /// Animals matching every given filter, ordered by id
    async fn list_animals(&self, filter: &AnimalFilter) -> Result<Vec<Animal>>;
    async fn update_animal(&self, animal: &Animal) -> Result<()>;
    async fn delete_animal(&self, animal_id: i64) -> Result<bool>;
    /// Number of pairings the animal takes part in as dam or sire
    async fn count_pairings_for_animal(&self, animal_id: i64) -> Result<i64>;
}

#[async_trait]
pub trait AncestryStorage: Send + Sync {
    async fn store_edge(&self, edge: &NewAncestryEdge) -> Result<AncestryEdge>;
    async fn get_edge(&self, edge_id: i64) -> Result<Option<AncestryEdge>>;
    /// Edges of a descendant ordered by (generation, sequence)
    async fn list_edges_for_descendant(&self, descendant_id: i64) -> Result<Vec<AncestryEdge>>;
    /// Edges naming the animal as ancestor, ordered by id
    async fn list_edges_for_ancestor(&self, ancestor_id: i64) -> Result<Vec<AncestryEdge>>;
    /// Highest sequence used in a generation, if any
    async fn max_sequence(&self, descendant_id: i64, generation: i64) -> Result<Option<i64>>;
    async fn sequence_taken(&self, descendant_id: i64, generation: i64, sequence: i64) -> Result<bool>;
    /// True when `ancestor_id` is reachable from `descendant_id` through recorded edges
    async fn is_ancestor_of(&self, ancestor_id: i64, descendant_id: i64) -> Result<bool>;
    async fn delete_edge(&self, edge_id: i64) -> Result<bool>;
}

#[async_trait]
pub trait BreedingStorage: Send + Sync {
    async fn store_pairing(&self, dam_id: i64, sire_id: i64, paired_on: NaiveDate) -> Result<Pairing>;
    async fn get_pairing(&self, pairing_id: i64) -> Result<Option<Pairing>>;
    /// Pairings ordered by pairing date, most recent first
    async fn list_pairings(&self) -> Result<Vec<Pairing>>;
    /// Pairings the animal takes part in as dam or sire
    async fn list_pairings_for_animal(&self, animal_id: i64) -> Result<Vec<Pairing>>;
    async fn update_pairing(&self, pairing: &Pairing) -> Result<()>;
    async fn delete_pairing(&self, pairing_id: i64) -> Result<bool>;

    async fn store_litter(
        &self,
        pairing_id: i64,
        date_of_birth: NaiveDate,
        pup_count: i64,
        notes: Option<&str>,
    ) -> Result<Litter>;
    async fn get_litter(&self, litter_id: i64) -> Result<Option<Litter>>;
    async fn list_litters(&self, pairing_id: i64) -> Result<Vec<Litter>>;
}

#[async_trait]
pub trait AccountStorage: Send + Sync {
    async fn store_account_type(&self, name: &str) -> Result<AccountType>;
    async fn get_account_type(&self, account_type_id: i64) -> Result<Option<AccountType>>;
    async fn find_account_type_by_name(&self, name: &str) -> Result<Option<AccountType>>;
    async fn list_account_types(&self) -> Result<Vec<AccountType>>;

    /// Insert individual, user and credentials atomically, returning the user id
    async fn create_account(&self, account: &NewAccount) -> Result<i64>;
    async fn get_user_account(&self, user_id: i64) -> Result<Option<UserAccount>>;
    async fn find_credentials(&self, username: &str) -> Result<Option<Credentials>>;
    async fn get_credentials_for_user(&self, user_id: i64) -> Result<Option<Credentials>>;
    async fn update_password_hash(&self, credentials_id: i64, password_hash: &str) -> Result<()>;
}

#[async_trait]
pub trait StudyStorage: Send + Sync {
    async fn store_study(
        &self,
        name: &str,
        description: Option<&str>,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Study>;
    async fn get_study(&self, study_id: i64) -> Result<Option<Study>>;
    /// Studies ordered by start date, most recent first
    async fn list_studies(&self) -> Result<Vec<Study>>;
    async fn update_study(&self, study: &Study) -> Result<()>;
    async fn delete_study(&self, study_id: i64) -> Result<bool>;

    async fn store_group(&self, group: &StudyGroup) -> Result<StudyGroup>;
    async fn get_group(&self, group_id: i64) -> Result<Option<StudyGroup>>;
    async fn list_groups(&self, study_id: i64) -> Result<Vec<StudyGroup>>;

    /// Add the animal to the group unless it already belongs to a group of the same study.
    /// Returns `None` when it does.
    async fn store_study_animal(&self, study_group_id: i64, animal_id: i64) -> Result<Option<StudyAnimal>>;
    async fn get_study_animal(&self, study_animal_id: i64) -> Result<Option<StudyAnimal>>;
    async fn list_group_animals(&self, study_group_id: i64) -> Result<Vec<StudyAnimal>>;
    /// Membership of the animal in any group of the study
    async fn find_study_membership(&self, study_id: i64, animal_id: i64) -> Result<Option<StudyAnimal>>;

    async fn store_data_point(&self, data_point: &DataPoint) -> Result<DataPoint>;
    async fn get_data_point(&self, data_point_id: i64) -> Result<Option<DataPoint>>;
    async fn list_data_points(&self, study_id: i64) -> Result<Vec<DataPoint>>;

    async fn store_observation(&self, observation: &ObservationData) -> Result<ObservationData>;
    /// Observations of one study animal ordered by recording time
    async fn list_observations(&self, study_animal_id: i64) -> Result<Vec<ObservationData>>;
}
