use chrono::Utc;
use shared::Sex;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::breeding::{CreateLitterCommand, CreatePairingCommand, SeparatePairingCommand};
use crate::domain::errors::{DomainError, DomainResult, Validator};
use crate::domain::models::{Animal, Litter, Pairing};
use crate::domain::non_blank;
use crate::storage::{AnimalStorage, BreedingStorage};

/// Service for pairings and litters
#[derive(Clone)]
pub struct BreedingService {
    breeding: Arc<dyn BreedingStorage>,
    animals: Arc<dyn AnimalStorage>,
}

impl BreedingService {
    pub fn new(breeding: Arc<dyn BreedingStorage>, animals: Arc<dyn AnimalStorage>) -> Self {
        Self { breeding, animals }
    }

    pub async fn list_pairings(&self) -> DomainResult<Vec<Pairing>> {
        info!("Listing pairings");
        Ok(self.breeding.list_pairings().await?)
    }

    pub async fn get_pairing(&self, pairing_id: i64) -> DomainResult<Pairing> {
        self.breeding.get_pairing(pairing_id).await?.ok_or_else(|| {
            warn!("Pairing not found: {}", pairing_id);
            DomainError::not_found("Pairing", pairing_id)
        })
    }

    pub async fn create_pairing(&self, command: CreatePairingCommand) -> DomainResult<Pairing> {
        info!(
            "Pairing dam {} with sire {} on {}",
            command.dam_id, command.sire_id, command.paired_on
        );

        Validator::new()
            .check(command.dam_id != command.sire_id, "Dam and sire must be different animals")
            .check(
                command.paired_on <= Utc::now().date_naive(),
                "Pairing date cannot be in the future",
            )
            .finish()?;

        let dam = self.animal(command.dam_id).await?;
        let sire = self.animal(command.sire_id).await?;

        let mut validator = Validator::new();
        validator
            .check(dam.sex == Sex::Female, format!("Dam {} is not female", dam.id))
            .check(sire.sex == Sex::Male, format!("Sire {} is not male", sire.id));
        for parent in [&dam, &sire] {
            validator
                .check(
                    parent.date_of_birth <= command.paired_on,
                    format!("Animal {} was not born by {}", parent.id, command.paired_on),
                )
                .check(
                    parent.date_of_death.map_or(true, |death| death >= command.paired_on),
                    format!("Animal {} had died by {}", parent.id, command.paired_on),
                );
        }
        validator.finish()?;

        let pairing = self
            .breeding
            .store_pairing(dam.id, sire.id, command.paired_on)
            .await?;

        info!("Created pairing {}", pairing.id);
        Ok(pairing)
    }

    pub async fn separate_pairing(&self, command: SeparatePairingCommand) -> DomainResult<Pairing> {
        info!("Separating pairing {} on {}", command.pairing_id, command.separated_on);
        let mut pairing = self.get_pairing(command.pairing_id).await?;

        if let Some(separated_on) = pairing.separated_on {
            return Err(DomainError::conflict(format!(
                "Pairing {} was already separated on {}",
                pairing.id, separated_on
            )));
        }
        Validator::new()
            .check(
                command.separated_on >= pairing.paired_on,
                "Separation date cannot be before the pairing date",
            )
            .finish()?;

        pairing.separated_on = Some(command.separated_on);
        self.breeding.update_pairing(&pairing).await?;
        Ok(pairing)
    }

    /// Deleting a pairing also deletes its litters
    pub async fn delete_pairing(&self, pairing_id: i64) -> DomainResult<()> {
        info!("Deleting pairing: {}", pairing_id);
        self.get_pairing(pairing_id).await?;
        self.breeding.delete_pairing(pairing_id).await?;
        Ok(())
    }

    pub async fn list_litters(&self, pairing_id: i64) -> DomainResult<Vec<Litter>> {
        self.get_pairing(pairing_id).await?;
        Ok(self.breeding.list_litters(pairing_id).await?)
    }

    pub async fn get_litter(&self, litter_id: i64) -> DomainResult<Litter> {
        self.breeding.get_litter(litter_id).await?.ok_or_else(|| {
            warn!("Litter not found: {}", litter_id);
            DomainError::not_found("Litter", litter_id)
        })
    }

    pub async fn create_litter(&self, command: CreateLitterCommand) -> DomainResult<Litter> {
        info!("Recording litter for pairing {}", command.pairing_id);
        let pairing = self.get_pairing(command.pairing_id).await?;

        Validator::new()
            .check(command.pup_count >= 0, "Pup count cannot be negative")
            .check(
                command.date_of_birth >= pairing.paired_on,
                "Litter cannot be born before the pairing date",
            )
            .check(
                command.date_of_birth <= Utc::now().date_naive(),
                "Litter date of birth cannot be in the future",
            )
            .finish()?;

        let notes = non_blank(command.notes);
        let litter = self
            .breeding
            .store_litter(pairing.id, command.date_of_birth, command.pup_count, notes.as_deref())
            .await?;

        info!("Created litter {} with {} pups", litter.id, litter.pup_count);
        Ok(litter)
    }

    async fn animal(&self, animal_id: i64) -> DomainResult<Animal> {
        self.animals
            .get_animal(animal_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Animal", animal_id))
    }
}
