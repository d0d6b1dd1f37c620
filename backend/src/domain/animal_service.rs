use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::animals::{CreateAnimalCommand, UpdateAnimalCommand};
use crate::domain::errors::{DomainError, DomainResult, Validator};
use crate::domain::models::{Animal, NewAnimal, Pairing};
use crate::domain::non_blank;
use crate::storage::{AncestryStorage, AnimalFilter, AnimalStorage, BreedingStorage, LineStorage};

/// Service for individual animal records
#[derive(Clone)]
pub struct AnimalService {
    animals: Arc<dyn AnimalStorage>,
    lines: Arc<dyn LineStorage>,
    breeding: Arc<dyn BreedingStorage>,
    ancestry: Arc<dyn AncestryStorage>,
}

impl AnimalService {
    pub fn new(
        animals: Arc<dyn AnimalStorage>,
        lines: Arc<dyn LineStorage>,
        breeding: Arc<dyn BreedingStorage>,
        ancestry: Arc<dyn AncestryStorage>,
    ) -> Self {
        Self {
            animals,
            lines,
            breeding,
            ancestry,
        }
    }

    pub async fn list_animals(&self, filter: AnimalFilter) -> DomainResult<Vec<Animal>> {
        info!("Listing animals with filter {:?}", filter);
        let animals = self.animals.list_animals(&filter).await?;
        info!("Found {} animals", animals.len());
        Ok(animals)
    }

    pub async fn get_animal(&self, animal_id: i64) -> DomainResult<Animal> {
        self.animals.get_animal(animal_id).await?.ok_or_else(|| {
            warn!("Animal not found: {}", animal_id);
            DomainError::not_found("Animal", animal_id)
        })
    }

    /// Create an animal. Animals born into a litter get the litter's dam and
    /// sire recorded as their parents in the same transaction.
    pub async fn create_animal(&self, command: CreateAnimalCommand) -> DomainResult<Animal> {
        info!(
            "Creating {} animal in line {} born {}",
            command.sex, command.line_id, command.date_of_birth
        );

        validate_dates(command.date_of_birth, command.date_of_death)?;
        self.ensure_line(command.line_id).await?;

        let parents = match command.litter_id {
            Some(litter_id) => Some(self.litter_parents(litter_id, command.date_of_birth).await?),
            None => None,
        };

        let new_animal = NewAnimal {
            line_id: command.line_id,
            litter_id: command.litter_id,
            sex: command.sex,
            date_of_birth: command.date_of_birth,
            date_of_death: command.date_of_death,
            name: non_blank(command.name),
            notes: non_blank(command.notes),
        };
        let animal = match parents {
            Some(pairing) => {
                self.animals
                    .store_animal_with_parents(&new_animal, pairing.dam_id, pairing.sire_id)
                    .await?
            }
            None => self.animals.store_animal(&new_animal).await?,
        };

        info!("Created animal {} with ID: {}", animal.display_name(), animal.id);
        Ok(animal)
    }

    pub async fn update_animal(&self, animal_id: i64, command: UpdateAnimalCommand) -> DomainResult<Animal> {
        info!("Updating animal: {}", animal_id);
        if command.clear_date_of_death && command.date_of_death.is_some() {
            return Err(DomainError::invalid("Date of death cannot be both set and cleared"));
        }
        let mut animal = self.get_animal(animal_id).await?;
        let recorded_dates = (animal.date_of_birth, animal.date_of_death);

        if let Some(line_id) = command.line_id {
            self.ensure_line(line_id).await?;
            animal.line_id = line_id;
        }
        if let Some(sex) = command.sex {
            animal.sex = sex;
        }
        if let Some(date_of_birth) = command.date_of_birth {
            animal.date_of_birth = date_of_birth;
        }
        if command.clear_date_of_death {
            animal.date_of_death = None;
        } else if command.date_of_death.is_some() {
            animal.date_of_death = command.date_of_death;
        }
        if command.name.is_some() {
            animal.name = non_blank(command.name);
        }
        if command.notes.is_some() {
            animal.notes = non_blank(command.notes);
        }
        validate_dates(animal.date_of_birth, animal.date_of_death)?;
        if (animal.date_of_birth, animal.date_of_death) != recorded_dates {
            self.check_recorded_relations(&animal).await?;
        }

        animal.updated_at = Utc::now();
        self.animals.update_animal(&animal).await?;

        info!("Updated animal {}", animal.id);
        Ok(animal)
    }

    /// Animals that took part in a pairing are kept for the breeding history
    pub async fn delete_animal(&self, animal_id: i64) -> DomainResult<()> {
        info!("Deleting animal: {}", animal_id);
        self.get_animal(animal_id).await?;

        let pairings = self.animals.count_pairings_for_animal(animal_id).await?;
        if pairings > 0 {
            return Err(DomainError::conflict(format!(
                "Animal {} is part of {} pairing(s)",
                animal_id, pairings
            )));
        }

        self.animals.delete_animal(animal_id).await?;
        info!("Deleted animal: {}", animal_id);
        Ok(())
    }

    async fn ensure_line(&self, line_id: i64) -> DomainResult<()> {
        match self.lines.get_line(line_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found("Line", line_id)),
        }
    }

    /// Pairing behind a litter, checked against the pup's birth date
    async fn litter_parents(&self, litter_id: i64, date_of_birth: NaiveDate) -> DomainResult<Pairing> {
        let litter = self
            .breeding
            .get_litter(litter_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Litter", litter_id))?;
        if litter.date_of_birth != date_of_birth {
            return Err(DomainError::invalid(format!(
                "Date of birth {} does not match litter {} born {}",
                date_of_birth, litter.id, litter.date_of_birth
            )));
        }
        let pairing = self
            .breeding
            .get_pairing(litter.pairing_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Pairing", litter.pairing_id))?;

        for parent_id in [pairing.dam_id, pairing.sire_id] {
            let parent = self.get_animal(parent_id).await?;
            if parent.date_of_birth >= date_of_birth {
                return Err(DomainError::conflict(format!(
                    "Parent {} was not born before {}",
                    parent.id, date_of_birth
                )));
            }
        }
        Ok(pairing)
    }

    /// Edited dates must still agree with the litter, the pedigree in both
    /// directions and every pairing the animal took part in
    async fn check_recorded_relations(&self, animal: &Animal) -> DomainResult<()> {
        if let Some(litter_id) = animal.litter_id {
            if let Some(litter) = self.breeding.get_litter(litter_id).await? {
                if litter.date_of_birth != animal.date_of_birth {
                    return Err(DomainError::conflict(format!(
                        "Animal {} belongs to litter {} born {}",
                        animal.id, litter.id, litter.date_of_birth
                    )));
                }
            }
        }

        for edge in self.ancestry.list_edges_for_descendant(animal.id).await? {
            let ancestor = self.get_animal(edge.ancestor_id).await?;
            if ancestor.date_of_birth >= animal.date_of_birth {
                return Err(DomainError::conflict(format!(
                    "Ancestor {} was not born before {}",
                    ancestor.id, animal.date_of_birth
                )));
            }
        }

        for edge in self.ancestry.list_edges_for_ancestor(animal.id).await? {
            let descendant = self.get_animal(edge.descendant_id).await?;
            if descendant.date_of_birth <= animal.date_of_birth {
                return Err(DomainError::conflict(format!(
                    "Descendant {} was not born after {}",
                    descendant.id, animal.date_of_birth
                )));
            }
        }

        for pairing in self.breeding.list_pairings_for_animal(animal.id).await? {
            if animal.date_of_birth > pairing.paired_on {
                return Err(DomainError::conflict(format!(
                    "Pairing {} on {} is before the date of birth",
                    pairing.id, pairing.paired_on
                )));
            }
            if animal.date_of_death.map_or(false, |death| death < pairing.paired_on) {
                return Err(DomainError::conflict(format!(
                    "Pairing {} on {} is after the date of death",
                    pairing.id, pairing.paired_on
                )));
            }
        }
        Ok(())
    }
}

fn validate_dates(date_of_birth: NaiveDate, date_of_death: Option<NaiveDate>) -> DomainResult<()> {
    let today = Utc::now().date_naive();
    Validator::new()
        .check(date_of_birth <= today, "Date of birth cannot be in the future")
        .check(
            date_of_death.map_or(true, |death| death >= date_of_birth),
            "Date of death cannot be before date of birth",
        )
        .check(
            date_of_death.map_or(true, |death| death <= today),
            "Date of death cannot be in the future",
        )
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ancestry_service::AncestryService;
    use crate::domain::commands::ancestry::AddAncestorCommand;
    use crate::domain::errors::ErrorKind;
    use crate::storage::{
        AncestryRepository, AnimalRepository, BreedingRepository, DbConnection, LineRepository,
    };
    use chrono::Duration;
    use shared::{RelationshipKind, Sex};

    struct Fixture {
        service: AnimalService,
        ancestry: AncestryService,
        breeding: Arc<BreedingRepository>,
        line_id: i64,
    }

    async fn setup_test() -> Fixture {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        for statement in [
            "INSERT INTO species (scientific_name) VALUES ('Mus musculus')",
            "INSERT INTO stocks (species_id, name) VALUES (1, 'C57BL/6')",
            "INSERT INTO lines (stock_id, name) VALUES (1, 'B6')",
        ] {
            sqlx::query(statement).execute(db.pool()).await.unwrap();
        }

        let animals = Arc::new(AnimalRepository::new(db.clone()));
        let breeding = Arc::new(BreedingRepository::new(db.clone()));
        let edges = Arc::new(AncestryRepository::new(db.clone()));
        let ancestry = AncestryService::new(edges.clone(), animals.clone());
        let service = AnimalService::new(
            animals,
            Arc::new(LineRepository::new(db)),
            breeding.clone(),
            edges,
        );

        Fixture {
            service,
            ancestry,
            breeding,
            line_id: 1,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn command(line_id: i64, sex: Sex, date_of_birth: NaiveDate) -> CreateAnimalCommand {
        CreateAnimalCommand {
            line_id,
            litter_id: None,
            sex,
            date_of_birth,
            date_of_death: None,
            name: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_animal() {
        let fx = setup_test().await;

        let mut create = command(fx.line_id, Sex::Female, date(2024, 1, 15));
        create.name = Some("  ".to_string());
        let animal = fx.service.create_animal(create).await.unwrap();

        assert!(animal.name.is_none());
        assert_eq!(animal.display_name(), animal.id.to_string());
        assert_eq!(fx.service.get_animal(animal.id).await.unwrap().sex, Sex::Female);
    }

    #[tokio::test]
    async fn test_create_animal_rejects_bad_dates() {
        let fx = setup_test().await;
        let tomorrow = Utc::now().date_naive() + Duration::days(1);

        let err = fx
            .service
            .create_animal(command(fx.line_id, Sex::Male, tomorrow))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let mut create = command(fx.line_id, Sex::Male, date(2024, 5, 1));
        create.date_of_death = Some(date(2024, 4, 1));
        match fx.service.create_animal(create).await {
            Err(DomainError::Validation(errors)) => {
                assert_eq!(errors, vec!["Date of death cannot be before date of birth"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_animal_in_missing_line() {
        let fx = setup_test().await;
        let err = fx
            .service
            .create_animal(command(42, Sex::Male, date(2024, 1, 1)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Line not found: 42");
    }

    #[tokio::test]
    async fn test_animal_from_litter_gets_parents() {
        let fx = setup_test().await;
        let dam = fx.service.create_animal(command(fx.line_id, Sex::Female, date(2023, 1, 1))).await.unwrap();
        let sire = fx.service.create_animal(command(fx.line_id, Sex::Male, date(2023, 1, 1))).await.unwrap();
        let pairing = fx.breeding.store_pairing(dam.id, sire.id, date(2023, 6, 1)).await.unwrap();
        let litter = fx.breeding.store_litter(pairing.id, date(2023, 6, 21), 7, None).await.unwrap();

        let mut create = command(fx.line_id, Sex::Unknown, date(2023, 6, 21));
        create.litter_id = Some(litter.id);
        let pup = fx.service.create_animal(create).await.unwrap();

        let pedigree = fx.ancestry.pedigree(pup.id).await.unwrap();
        let parents: Vec<(i64, RelationshipKind)> = pedigree.generations[0]
            .1
            .iter()
            .map(|e| (e.ancestor_id, e.relationship))
            .collect();
        assert_eq!(
            parents,
            vec![(dam.id, RelationshipKind::Maternal), (sire.id, RelationshipKind::Paternal)]
        );
    }

    #[tokio::test]
    async fn test_create_animal_with_missing_litter() {
        let fx = setup_test().await;
        let mut create = command(fx.line_id, Sex::Male, date(2024, 1, 1));
        create.litter_id = Some(9);

        let err = fx.service.create_animal(create).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_animal() {
        let fx = setup_test().await;
        let animal = fx.service.create_animal(command(fx.line_id, Sex::Unknown, date(2024, 1, 1))).await.unwrap();

        let updated = fx
            .service
            .update_animal(
                animal.id,
                UpdateAnimalCommand {
                    sex: Some(Sex::Female),
                    name: Some("Pip".to_string()),
                    date_of_death: Some(date(2024, 9, 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.display_name(), "Pip");
        assert!(!updated.is_alive());

        let err = fx
            .service
            .update_animal(
                animal.id,
                UpdateAnimalCommand {
                    date_of_birth: Some(date(2024, 10, 1)),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_delete_animal_in_pairing_is_rejected() {
        let fx = setup_test().await;
        let dam = fx.service.create_animal(command(fx.line_id, Sex::Female, date(2023, 1, 1))).await.unwrap();
        let sire = fx.service.create_animal(command(fx.line_id, Sex::Male, date(2023, 1, 1))).await.unwrap();
        fx.breeding.store_pairing(dam.id, sire.id, date(2023, 6, 1)).await.unwrap();

        let err = fx.service.delete_animal(dam.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);

        let loner = fx.service.create_animal(command(fx.line_id, Sex::Male, date(2023, 1, 1))).await.unwrap();
        fx.service.delete_animal(loner.id).await.unwrap();
        assert_eq!(fx.service.get_animal(loner.id).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_litter_pup_must_share_litter_birth_date() {
        let fx = setup_test().await;
        let dam = fx.service.create_animal(command(fx.line_id, Sex::Female, date(2023, 1, 1))).await.unwrap();
        let sire = fx.service.create_animal(command(fx.line_id, Sex::Male, date(2023, 1, 1))).await.unwrap();
        let pairing = fx.breeding.store_pairing(dam.id, sire.id, date(2023, 6, 1)).await.unwrap();
        let litter = fx.breeding.store_litter(pairing.id, date(2023, 6, 21), 7, None).await.unwrap();

        let mut create = command(fx.line_id, Sex::Unknown, date(2023, 7, 4));
        create.litter_id = Some(litter.id);
        let err = fx.service.create_animal(create).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let all = fx.service.list_animals(AnimalFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_birth_date_edit_keeps_pedigree_order() {
        let fx = setup_test().await;
        let parent = fx.service.create_animal(command(fx.line_id, Sex::Female, date(2022, 1, 1))).await.unwrap();
        let child = fx.service.create_animal(command(fx.line_id, Sex::Male, date(2024, 1, 1))).await.unwrap();
        fx.ancestry
            .add_edge(AddAncestorCommand {
                descendant_id: child.id,
                ancestor_id: parent.id,
                generation: 1,
                sequence: None,
                relationship: RelationshipKind::Maternal,
            })
            .await
            .unwrap();

        let backdate_child = UpdateAnimalCommand {
            date_of_birth: Some(date(2020, 1, 1)),
            ..Default::default()
        };
        let err = fx.service.update_animal(child.id, backdate_child).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);

        let postdate_parent = UpdateAnimalCommand {
            date_of_birth: Some(date(2024, 6, 1)),
            ..Default::default()
        };
        let err = fx.service.update_animal(parent.id, postdate_parent).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);

        assert_eq!(fx.service.get_animal(child.id).await.unwrap().date_of_birth, date(2024, 1, 1));

        let within_order = UpdateAnimalCommand {
            date_of_birth: Some(date(2023, 6, 1)),
            ..Default::default()
        };
        fx.service.update_animal(child.id, within_order).await.unwrap();
    }

    #[tokio::test]
    async fn test_date_edits_respect_pairings_and_litter() {
        let fx = setup_test().await;
        let dam = fx.service.create_animal(command(fx.line_id, Sex::Female, date(2023, 1, 1))).await.unwrap();
        let sire = fx.service.create_animal(command(fx.line_id, Sex::Male, date(2023, 1, 1))).await.unwrap();
        let pairing = fx.breeding.store_pairing(dam.id, sire.id, date(2023, 6, 1)).await.unwrap();
        let litter = fx.breeding.store_litter(pairing.id, date(2023, 6, 21), 7, None).await.unwrap();

        let late_birth = UpdateAnimalCommand {
            date_of_birth: Some(date(2023, 7, 1)),
            ..Default::default()
        };
        let err = fx.service.update_animal(sire.id, late_birth).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);

        let early_death = UpdateAnimalCommand {
            date_of_death: Some(date(2023, 5, 1)),
            ..Default::default()
        };
        let err = fx.service.update_animal(dam.id, early_death).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);

        let mut create = command(fx.line_id, Sex::Unknown, date(2023, 6, 21));
        create.litter_id = Some(litter.id);
        let pup = fx.service.create_animal(create).await.unwrap();
        let moved_birth = UpdateAnimalCommand {
            date_of_birth: Some(date(2023, 6, 22)),
            ..Default::default()
        };
        let err = fx.service.update_animal(pup.id, moved_birth).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[tokio::test]
    async fn test_clear_date_of_death() {
        let fx = setup_test().await;
        let animal = fx.service.create_animal(command(fx.line_id, Sex::Female, date(2024, 1, 1))).await.unwrap();

        let died = UpdateAnimalCommand {
            date_of_death: Some(date(2024, 9, 1)),
            ..Default::default()
        };
        assert!(!fx.service.update_animal(animal.id, died).await.unwrap().is_alive());

        let contradictory = UpdateAnimalCommand {
            date_of_death: Some(date(2024, 9, 2)),
            clear_date_of_death: true,
            ..Default::default()
        };
        let err = fx.service.update_animal(animal.id, contradictory).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let revived = fx
            .service
            .update_animal(
                animal.id,
                UpdateAnimalCommand {
                    clear_date_of_death: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(revived.date_of_death.is_none());
        assert!(fx.service.get_animal(animal.id).await.unwrap().is_alive());
    }
}
