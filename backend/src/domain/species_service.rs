use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::species::{CreateSpeciesCommand, CreateStockCommand, UpdateSpeciesCommand};
use crate::domain::errors::{DomainError, DomainResult, Validator};
use crate::domain::models::{Species, Stock};
use crate::domain::non_blank;
use crate::storage::SpeciesStorage;

/// Service for species and the stocks kept of them
#[derive(Clone)]
pub struct SpeciesService {
    storage: Arc<dyn SpeciesStorage>,
}

impl SpeciesService {
    pub fn new(storage: Arc<dyn SpeciesStorage>) -> Self {
        Self { storage }
    }

    pub async fn list_species(&self) -> DomainResult<Vec<Species>> {
        info!("Listing species");
        let species = self.storage.list_species().await?;
        info!("Found {} species", species.len());
        Ok(species)
    }

    pub async fn get_species(&self, species_id: i64) -> DomainResult<Species> {
        match self.storage.get_species(species_id).await? {
            Some(species) => Ok(species),
            None => {
                warn!("Species not found: {}", species_id);
                Err(DomainError::not_found("Species", species_id))
            }
        }
    }

    pub async fn create_species(&self, command: CreateSpeciesCommand) -> DomainResult<Species> {
        info!("Creating species: {}", command.scientific_name);

        let scientific_name = command.scientific_name.trim();
        Validator::new()
            .check(!scientific_name.is_empty(), "Scientific name cannot be empty")
            .finish()?;
        self.ensure_name_free(scientific_name, None).await?;

        let common_name = non_blank(command.common_name);
        let species = self
            .storage
            .store_species(scientific_name, common_name.as_deref())
            .await?;

        info!("Created species {} with ID: {}", species.scientific_name, species.id);
        Ok(species)
    }

    pub async fn update_species(
        &self,
        species_id: i64,
        command: UpdateSpeciesCommand,
    ) -> DomainResult<Species> {
        info!("Updating species: {}", species_id);
        let mut species = self.get_species(species_id).await?;

        if let Some(name) = command.scientific_name {
            let name = name.trim();
            Validator::new()
                .check(!name.is_empty(), "Scientific name cannot be empty")
                .finish()?;
            self.ensure_name_free(name, Some(species_id)).await?;
            species.scientific_name = name.to_string();
        }
        if command.common_name.is_some() {
            species.common_name = non_blank(command.common_name);
        }

        self.storage.update_species(&species).await?;
        Ok(species)
    }

    /// Deletes the species with its stocks, as long as no lines are kept under them
    pub async fn delete_species(&self, species_id: i64) -> DomainResult<()> {
        info!("Deleting species: {}", species_id);
        self.get_species(species_id).await?;

        let lines = self.storage.count_lines_for_species(species_id).await?;
        if lines > 0 {
            return Err(DomainError::conflict(format!(
                "Species {} still has {} line(s)",
                species_id, lines
            )));
        }

        self.storage.delete_species(species_id).await?;
        info!("Deleted species: {}", species_id);
        Ok(())
    }

    pub async fn list_stocks(&self, species_id: i64) -> DomainResult<Vec<Stock>> {
        self.get_species(species_id).await?;
        Ok(self.storage.list_stocks(species_id).await?)
    }

    pub async fn get_stock(&self, stock_id: i64) -> DomainResult<Stock> {
        self.storage.get_stock(stock_id).await?.ok_or_else(|| {
            warn!("Stock not found: {}", stock_id);
            DomainError::not_found("Stock", stock_id)
        })
    }

    pub async fn create_stock(&self, command: CreateStockCommand) -> DomainResult<Stock> {
        info!("Creating stock {} for species {}", command.name, command.species_id);

        let name = command.name.trim();
        Validator::new()
            .check(!name.is_empty(), "Stock name cannot be empty")
            .finish()?;
        self.get_species(command.species_id).await?;

        let description = non_blank(command.description);
        let stock = self
            .storage
            .store_stock(command.species_id, name, description.as_deref())
            .await?;

        info!("Created stock {} with ID: {}", stock.name, stock.id);
        Ok(stock)
    }

    pub async fn delete_stock(&self, stock_id: i64) -> DomainResult<()> {
        info!("Deleting stock: {}", stock_id);
        self.get_stock(stock_id).await?;

        let lines = self.storage.count_lines_for_stock(stock_id).await?;
        if lines > 0 {
            return Err(DomainError::conflict(format!(
                "Stock {} still has {} line(s)",
                stock_id, lines
            )));
        }

        self.storage.delete_stock(stock_id).await?;
        Ok(())
    }

    async fn ensure_name_free(&self, scientific_name: &str, current_id: Option<i64>) -> DomainResult<()> {
        match self.storage.find_species_by_name(scientific_name).await? {
            Some(existing) if Some(existing.id) != current_id => Err(DomainError::conflict(format!(
                "Species already exists: {}",
                existing.scientific_name
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ErrorKind;
    use crate::storage::{DbConnection, SpeciesRepository};

    async fn setup_test() -> (SpeciesService, DbConnection) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let service = SpeciesService::new(Arc::new(SpeciesRepository::new(db.clone())));
        (service, db)
    }

    fn mouse() -> CreateSpeciesCommand {
        CreateSpeciesCommand {
            scientific_name: "  Mus musculus ".to_string(),
            common_name: Some("House mouse".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_species_trims_and_rejects_duplicates() {
        let (service, _) = setup_test().await;

        let species = service.create_species(mouse()).await.unwrap();
        assert_eq!(species.scientific_name, "Mus musculus");

        let err = service.create_species(mouse()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[tokio::test]
    async fn test_create_species_requires_name() {
        let (service, _) = setup_test().await;

        let err = service
            .create_species(CreateSpeciesCommand {
                scientific_name: "   ".to_string(),
                common_name: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_species_clears_blank_common_name() {
        let (service, _) = setup_test().await;
        let species = service.create_species(mouse()).await.unwrap();

        let updated = service
            .update_species(
                species.id,
                UpdateSpeciesCommand {
                    scientific_name: None,
                    common_name: Some(" ".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.scientific_name, "Mus musculus");
        assert!(updated.common_name.is_none());
    }

    #[tokio::test]
    async fn test_get_missing_species() {
        let (service, _) = setup_test().await;

        let err = service.get_species(99).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Species not found: 99");
    }

    #[tokio::test]
    async fn test_delete_species_blocked_by_lines() {
        let (service, db) = setup_test().await;
        let species = service.create_species(mouse()).await.unwrap();
        let stock = service
            .create_stock(CreateStockCommand {
                species_id: species.id,
                name: "C57BL/6".to_string(),
                description: None,
            })
            .await
            .unwrap();

        sqlx::query("INSERT INTO lines (stock_id, name) VALUES (?, 'B6-GFP')")
            .bind(stock.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = service.delete_species(species.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        let err = service.delete_stock(stock.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[tokio::test]
    async fn test_delete_species_removes_stocks() {
        let (service, _) = setup_test().await;
        let species = service.create_species(mouse()).await.unwrap();
        let stock = service
            .create_stock(CreateStockCommand {
                species_id: species.id,
                name: "BALB/c".to_string(),
                description: Some("albino".to_string()),
            })
            .await
            .unwrap();

        assert_eq!(service.list_stocks(species.id).await.unwrap(), vec![stock.clone()]);

        service.delete_species(species.id).await.unwrap();
        assert_eq!(service.get_stock(stock.id).await.unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_create_stock_for_missing_species() {
        let (service, _) = setup_test().await;

        let err = service
            .create_stock(CreateStockCommand {
                species_id: 7,
                name: "Wistar".to_string(),
                description: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
