use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{Litter, Pairing};
use crate::storage::connection::DbConnection;
use crate::storage::traits::BreedingStorage;

/// Repository for pairings and the litters they produce
#[derive(Clone)]
pub struct BreedingRepository {
    db: DbConnection,
}

impl BreedingRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn pairing_from_row(row: &SqliteRow) -> Result<Pairing> {
        Ok(Pairing {
            id: row.try_get("id")?,
            dam_id: row.try_get("dam_id")?,
            sire_id: row.try_get("sire_id")?,
            paired_on: row.try_get("paired_on")?,
            separated_on: row.try_get("separated_on")?,
        })
    }

    fn litter_from_row(row: &SqliteRow) -> Result<Litter> {
        Ok(Litter {
            id: row.try_get("id")?,
            pairing_id: row.try_get("pairing_id")?,
            date_of_birth: row.try_get("date_of_birth")?,
            pup_count: row.try_get("pup_count")?,
            notes: row.try_get("notes")?,
        })
    }
}

#[async_trait]
impl BreedingStorage for BreedingRepository {
    async fn store_pairing(&self, dam_id: i64, sire_id: i64, paired_on: NaiveDate) -> Result<Pairing> {
        let id = sqlx::query("INSERT INTO pairings (dam_id, sire_id, paired_on) VALUES (?, ?, ?)")
            .bind(dam_id)
            .bind(sire_id)
            .bind(paired_on)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();

        Ok(Pairing {
            id,
            dam_id,
            sire_id,
            paired_on,
            separated_on: None,
        })
    }

    async fn get_pairing(&self, pairing_id: i64) -> Result<Option<Pairing>> {
        let row = sqlx::query(
            "SELECT id, dam_id, sire_id, paired_on, separated_on FROM pairings WHERE id = ?",
        )
        .bind(pairing_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::pairing_from_row).transpose()
    }

    async fn list_pairings(&self) -> Result<Vec<Pairing>> {
        let rows = sqlx::query(
            r#"
            SELECT id, dam_id, sire_id, paired_on, separated_on
            FROM pairings
            ORDER BY paired_on DESC, id DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::pairing_from_row).collect()
    }

    async fn list_pairings_for_animal(&self, animal_id: i64) -> Result<Vec<Pairing>> {
        let rows = sqlx::query(
            r#"
            SELECT id, dam_id, sire_id, paired_on, separated_on
            FROM pairings
            WHERE dam_id = ? OR sire_id = ?
            ORDER BY paired_on ASC, id ASC
            "#,
        )
        .bind(animal_id)
        .bind(animal_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::pairing_from_row).collect()
    }

    async fn update_pairing(&self, pairing: &Pairing) -> Result<()> {
        sqlx::query("UPDATE pairings SET paired_on = ?, separated_on = ? WHERE id = ?")
            .bind(pairing.paired_on)
            .bind(pairing.separated_on)
            .bind(pairing.id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn delete_pairing(&self, pairing_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pairings WHERE id = ?")
            .bind(pairing_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn store_litter(
        &self,
        pairing_id: i64,
        date_of_birth: NaiveDate,
        pup_count: i64,
        notes: Option<&str>,
    ) -> Result<Litter> {
        let id = sqlx::query(
            "INSERT INTO litters (pairing_id, date_of_birth, pup_count, notes) VALUES (?, ?, ?, ?)",
        )
        .bind(pairing_id)
        .bind(date_of_birth)
        .bind(pup_count)
        .bind(notes)
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();

        Ok(Litter {
            id,
            pairing_id,
            date_of_birth,
            pup_count,
            notes: notes.map(str::to_string),
        })
    }

    async fn get_litter(&self, litter_id: i64) -> Result<Option<Litter>> {
        let row = sqlx::query(
            "SELECT id, pairing_id, date_of_birth, pup_count, notes FROM litters WHERE id = ?",
        )
        .bind(litter_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::litter_from_row).transpose()
    }

    async fn list_litters(&self, pairing_id: i64) -> Result<Vec<Litter>> {
        let rows = sqlx::query(
            r#"
            SELECT id, pairing_id, date_of_birth, pup_count, notes
            FROM litters
            WHERE pairing_id = ?
            ORDER BY date_of_birth ASC
            "#,
        )
        .bind(pairing_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::litter_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> BreedingRepository {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        for statement in [
            "INSERT INTO species (scientific_name) VALUES ('Mus musculus')",
            "INSERT INTO stocks (species_id, name) VALUES (1, 'C57BL/6')",
            "INSERT INTO lines (stock_id, name) VALUES (1, 'B6')",
            "INSERT INTO animals (line_id, sex, date_of_birth, created_at, updated_at) \
             VALUES (1, 'Female', '2024-01-01', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
            "INSERT INTO animals (line_id, sex, date_of_birth, created_at, updated_at) \
             VALUES (1, 'Male', '2024-01-01', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')",
        ] {
            sqlx::query(statement).execute(db.pool()).await.unwrap();
        }
        BreedingRepository::new(db)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_pairing_lifecycle() {
        let repo = setup_test().await;

        let mut pairing = repo.store_pairing(1, 2, date(2024, 5, 1)).await.unwrap();
        assert!(pairing.is_active());

        pairing.separated_on = Some(date(2024, 6, 1));
        repo.update_pairing(&pairing).await.unwrap();

        let loaded = repo.get_pairing(pairing.id).await.unwrap().unwrap();
        assert_eq!(loaded.separated_on, Some(date(2024, 6, 1)));
        assert!(!loaded.is_active());
    }

    #[tokio::test]
    async fn test_pairings_for_animal() {
        let repo = setup_test().await;

        let later = repo.store_pairing(1, 2, date(2024, 8, 1)).await.unwrap();
        let earlier = repo.store_pairing(1, 2, date(2024, 5, 1)).await.unwrap();

        let ids: Vec<i64> = repo.list_pairings_for_animal(2).await.unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![earlier.id, later.id]);
        assert_eq!(repo.list_pairings_for_animal(1).await.unwrap().len(), 2);
        assert!(repo.list_pairings_for_animal(99).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_litters_cascade_with_pairing() {
        let repo = setup_test().await;

        let pairing = repo.store_pairing(1, 2, date(2024, 5, 1)).await.unwrap();
        let second = repo.store_litter(pairing.id, date(2024, 8, 20), 6, None).await.unwrap();
        let first = repo.store_litter(pairing.id, date(2024, 5, 22), 8, Some("first")).await.unwrap();

        let litters = repo.list_litters(pairing.id).await.unwrap();
        assert_eq!(litters.iter().map(|l| l.id).collect::<Vec<_>>(), vec![first.id, second.id]);

        assert!(repo.delete_pairing(pairing.id).await.unwrap());
        assert!(repo.get_litter(first.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_pairings_most_recent_first() {
        let repo = setup_test().await;

        repo.store_pairing(1, 2, date(2024, 1, 10)).await.unwrap();
        let recent = repo.store_pairing(1, 2, date(2024, 9, 10)).await.unwrap();

        let pairings = repo.list_pairings().await.unwrap();
        assert_eq!(pairings.len(), 2);
        assert_eq!(pairings[0].id, recent.id);
    }
}
