use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{Species, Stock};
use crate::storage::connection::DbConnection;
use crate::storage::traits::SpeciesStorage;

/// Repository for species and the stocks kept of them
#[derive(Clone)]
pub struct SpeciesRepository {
    db: DbConnection,
}

impl SpeciesRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn species_from_row(row: &SqliteRow) -> Result<Species> {
        Ok(Species {
            id: row.try_get("id")?,
            scientific_name: row.try_get("scientific_name")?,
            common_name: row.try_get("common_name")?,
        })
    }

    fn stock_from_row(row: &SqliteRow) -> Result<Stock> {
        Ok(Stock {
            id: row.try_get("id")?,
            species_id: row.try_get("species_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
        })
    }
}

#[async_trait]
impl SpeciesStorage for SpeciesRepository {
    async fn store_species(&self, scientific_name: &str, common_name: Option<&str>) -> Result<Species> {
        let id = sqlx::query("INSERT INTO species (scientific_name, common_name) VALUES (?, ?)")
            .bind(scientific_name)
            .bind(common_name)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();

        Ok(Species {
            id,
            scientific_name: scientific_name.to_string(),
            common_name: common_name.map(str::to_string),
        })
    }

    async fn get_species(&self, species_id: i64) -> Result<Option<Species>> {
        let row = sqlx::query("SELECT id, scientific_name, common_name FROM species WHERE id = ?")
            .bind(species_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::species_from_row).transpose()
    }

    async fn find_species_by_name(&self, scientific_name: &str) -> Result<Option<Species>> {
        let row = sqlx::query(
            "SELECT id, scientific_name, common_name FROM species WHERE scientific_name = ? COLLATE NOCASE",
        )
        .bind(scientific_name)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::species_from_row).transpose()
    }

    async fn list_species(&self) -> Result<Vec<Species>> {
        let rows = sqlx::query(
            "SELECT id, scientific_name, common_name FROM species ORDER BY scientific_name ASC",
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::species_from_row).collect()
    }

    async fn update_species(&self, species: &Species) -> Result<()> {
        sqlx::query("UPDATE species SET scientific_name = ?, common_name = ? WHERE id = ?")
            .bind(&species.scientific_name)
            .bind(&species.common_name)
            .bind(species.id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn delete_species(&self, species_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM species WHERE id = ?")
            .bind(species_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn store_stock(&self, species_id: i64, name: &str, description: Option<&str>) -> Result<Stock> {
        let id = sqlx::query("INSERT INTO stocks (species_id, name, description) VALUES (?, ?, ?)")
            .bind(species_id)
            .bind(name)
            .bind(description)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();

        Ok(Stock {
            id,
            species_id,
            name: name.to_string(),
            description: description.map(str::to_string),
        })
    }

    async fn get_stock(&self, stock_id: i64) -> Result<Option<Stock>> {
        let row = sqlx::query("SELECT id, species_id, name, description FROM stocks WHERE id = ?")
            .bind(stock_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::stock_from_row).transpose()
    }

    async fn list_stocks(&self, species_id: i64) -> Result<Vec<Stock>> {
        let rows = sqlx::query(
            "SELECT id, species_id, name, description FROM stocks WHERE species_id = ? ORDER BY name ASC",
        )
        .bind(species_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::stock_from_row).collect()
    }

    async fn delete_stock(&self, stock_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM stocks WHERE id = ?")
            .bind(stock_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_lines_for_stock(&self, stock_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM lines WHERE stock_id = ?")
            .bind(stock_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }

    async fn count_lines_for_species(&self, species_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM lines l
            JOIN stocks s ON s.id = l.stock_id
            WHERE s.species_id = ?
            "#,
        )
        .bind(species_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> SpeciesRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        SpeciesRepository::new(db)
    }

    #[tokio::test]
    async fn test_store_and_list_species() {
        let repo = setup_test().await;

        repo.store_species("Rattus norvegicus", Some("Brown rat")).await.unwrap();
        repo.store_species("Mus musculus", None).await.unwrap();

        let all = repo.list_species().await.unwrap();
        assert_eq!(all.len(), 2);
        // Ordered by scientific name
        assert_eq!(all[0].scientific_name, "Mus musculus");
        assert_eq!(all[1].common_name.as_deref(), Some("Brown rat"));

        let found = repo.find_species_by_name("mus MUSCULUS").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_deleting_species_removes_stocks() {
        let repo = setup_test().await;

        let species = repo.store_species("Mus musculus", None).await.unwrap();
        let stock = repo.store_stock(species.id, "C57BL/6", Some("inbred")).await.unwrap();

        assert!(repo.delete_species(species.id).await.unwrap());
        assert!(repo.get_stock(stock.id).await.unwrap().is_none());
        assert!(!repo.delete_species(species.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_line_counts() {
        let repo = setup_test().await;

        let species = repo.store_species("Mus musculus", None).await.unwrap();
        let stock = repo.store_stock(species.id, "C57BL/6", None).await.unwrap();
        assert_eq!(repo.count_lines_for_stock(stock.id).await.unwrap(), 0);

        sqlx::query("INSERT INTO lines (stock_id, name) VALUES (?, 'B6-GFP')")
            .bind(stock.id)
            .execute(repo.db.pool())
            .await
            .unwrap();

        assert_eq!(repo.count_lines_for_stock(stock.id).await.unwrap(), 1);
        assert_eq!(repo.count_lines_for_species(species.id).await.unwrap(), 1);
    }
}
