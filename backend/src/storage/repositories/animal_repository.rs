use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{RelationshipKind, Sex};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::Row;

use crate::domain::models::{Animal, NewAnimal};
use crate::storage::connection::DbConnection;
use crate::storage::traits::{AnimalFilter, AnimalStorage};

const INSERT_ANIMAL: &str = r#"
    INSERT INTO animals
        (line_id, litter_id, sex, date_of_birth, date_of_death, name, notes, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const ANIMAL_COLUMNS: &str = "a.id, a.line_id, a.litter_id, a.sex, a.date_of_birth, a.date_of_death, \
                              a.name, a.notes, a.created_at, a.updated_at";

/// Repository for animal records
#[derive(Clone)]
pub struct AnimalRepository {
    db: DbConnection,
}

impl AnimalRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn bind_new<'q>(
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
        animal: &'q NewAnimal,
        now: DateTime<Utc>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        query
            .bind(animal.line_id)
            .bind(animal.litter_id)
            .bind(animal.sex.as_str())
            .bind(animal.date_of_birth)
            .bind(animal.date_of_death)
            .bind(&animal.name)
            .bind(&animal.notes)
            .bind(now)
            .bind(now)
    }

    fn stored(id: i64, animal: &NewAnimal, now: DateTime<Utc>) -> Animal {
        Animal {
            id,
            line_id: animal.line_id,
            litter_id: animal.litter_id,
            sex: animal.sex,
            date_of_birth: animal.date_of_birth,
            date_of_death: animal.date_of_death,
            name: animal.name.clone(),
            notes: animal.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    fn from_row(row: &SqliteRow) -> Result<Animal> {
        let sex: String = row.try_get("sex")?;
        Ok(Animal {
            id: row.try_get("id")?,
            line_id: row.try_get("line_id")?,
            litter_id: row.try_get("litter_id")?,
            sex: sex.parse::<Sex>()?,
            date_of_birth: row.try_get("date_of_birth")?,
            date_of_death: row.try_get("date_of_death")?,
            name: row.try_get("name")?,
            notes: row.try_get("notes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Escape LIKE wildcards so the term matches literally under `ESCAPE '\'`
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl AnimalStorage for AnimalRepository {
    async fn store_animal(&self, animal: &NewAnimal) -> Result<Animal> {
        let now = Utc::now();
        let id = Self::bind_new(sqlx::query(INSERT_ANIMAL), animal, now)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();

        Ok(Self::stored(id, animal, now))
    }

    async fn store_animal_with_parents(&self, animal: &NewAnimal, dam_id: i64, sire_id: i64) -> Result<Animal> {
        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;

        let id = Self::bind_new(sqlx::query(INSERT_ANIMAL), animal, now)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for (ancestor_id, sequence, relationship) in
            [(dam_id, 1, RelationshipKind::Maternal), (sire_id, 2, RelationshipKind::Paternal)]
        {
            sqlx::query(
                r#"
                INSERT INTO ancestry_edges (descendant_id, ancestor_id, generation, sequence, relationship)
                VALUES (?, ?, 1, ?, ?)
                "#,
            )
            .bind(id)
            .bind(ancestor_id)
            .bind(sequence)
            .bind(relationship.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Self::stored(id, animal, now))
    }

    async fn get_animal(&self, animal_id: i64) -> Result<Option<Animal>> {
        let row = sqlx::query(&format!("SELECT {} FROM animals a WHERE a.id = ?", ANIMAL_COLUMNS))
            .bind(animal_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn list_animals(&self, filter: &AnimalFilter) -> Result<Vec<Animal>> {
        let search = filter
            .search_term
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty());
        let pattern = search.map(|term| format!("%{}%", escape_like(&term.to_lowercase())));

        let sql = format!(
            r#"
            SELECT {}
            FROM animals a
            JOIN lines l ON l.id = a.line_id
            JOIN stocks s ON s.id = l.stock_id
            WHERE (? IS NULL OR s.species_id = ?)
              AND (? IS NULL OR a.sex = ?)
              AND (? IS NULL OR LOWER(COALESCE(a.name, '')) LIKE ? ESCAPE '\' OR CAST(a.id AS TEXT) = ?)
            ORDER BY a.id ASC
            "#,
            ANIMAL_COLUMNS
        );

        let sex = filter.sex.map(|s| s.as_str());
        let rows = sqlx::query(&sql)
            .bind(filter.species_id)
            .bind(filter.species_id)
            .bind(sex)
            .bind(sex)
            .bind(pattern.as_deref())
            .bind(pattern.as_deref())
            .bind(search)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(Self::from_row).collect()
    }

    async fn update_animal(&self, animal: &Animal) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE animals
            SET line_id = ?, litter_id = ?, sex = ?, date_of_birth = ?, date_of_death = ?,
                name = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(animal.line_id)
        .bind(animal.litter_id)
        .bind(animal.sex.as_str())
        .bind(animal.date_of_birth)
        .bind(animal.date_of_death)
        .bind(&animal.name)
        .bind(&animal.notes)
        .bind(animal.updated_at)
        .bind(animal.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_animal(&self, animal_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM animals WHERE id = ?")
            .bind(animal_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_pairings_for_animal(&self, animal_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pairings WHERE dam_id = ? OR sire_id = ?",
        )
        .bind(animal_id)
        .bind(animal_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repositories::{LineRepository, SpeciesRepository};
    use crate::storage::traits::{LineStorage, SpeciesStorage};
    use chrono::NaiveDate;

    struct Fixture {
        repo: AnimalRepository,
        mouse_line: i64,
        rat_line: i64,
        mouse_species: i64,
    }

    async fn setup_test() -> Fixture {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let species_repo = SpeciesRepository::new(db.clone());
        let line_repo = LineRepository::new(db.clone());

        let mouse = species_repo.store_species("Mus musculus", None).await.unwrap();
        let rat = species_repo.store_species("Rattus norvegicus", None).await.unwrap();
        let b6 = species_repo.store_stock(mouse.id, "C57BL/6", None).await.unwrap();
        let wistar = species_repo.store_stock(rat.id, "Wistar", None).await.unwrap();
        let mouse_line = line_repo.store_line(b6.id, "B6-GFP", None).await.unwrap();
        let rat_line = line_repo.store_line(wistar.id, "WI-Han", None).await.unwrap();

        Fixture {
            repo: AnimalRepository::new(db),
            mouse_line: mouse_line.id,
            rat_line: rat_line.id,
            mouse_species: mouse.id,
        }
    }

    fn new_animal(line_id: i64, sex: Sex, name: Option<&str>) -> NewAnimal {
        NewAnimal {
            line_id,
            litter_id: None,
            sex,
            date_of_birth: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            date_of_death: None,
            name: name.map(str::to_string),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_store_and_get_animal() {
        let fx = setup_test().await;

        let stored = fx
            .repo
            .store_animal(&new_animal(fx.mouse_line, Sex::Female, Some("Fuzzy")))
            .await
            .unwrap();

        let loaded = fx.repo.get_animal(stored.id).await.unwrap().unwrap();
        assert_eq!(loaded.name.as_deref(), Some("Fuzzy"));
        assert_eq!(loaded.sex, Sex::Female);
        assert_eq!(loaded.date_of_birth, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert!(loaded.date_of_death.is_none());
    }

    #[tokio::test]
    async fn test_list_animals_filters() {
        let fx = setup_test().await;

        let fuzzy = fx.repo.store_animal(&new_animal(fx.mouse_line, Sex::Female, Some("Fuzzy"))).await.unwrap();
        fx.repo.store_animal(&new_animal(fx.mouse_line, Sex::Male, Some("Whiskers"))).await.unwrap();
        fx.repo.store_animal(&new_animal(fx.rat_line, Sex::Female, None)).await.unwrap();

        let all = fx.repo.list_animals(&AnimalFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let mice = fx
            .repo
            .list_animals(&AnimalFilter { species_id: Some(fx.mouse_species), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(mice.len(), 2);

        let females = fx
            .repo
            .list_animals(&AnimalFilter { sex: Some(Sex::Female), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(females.len(), 2);

        let by_name = fx
            .repo
            .list_animals(&AnimalFilter { search_term: Some("fuz".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, fuzzy.id);

        let by_id = fx
            .repo
            .list_animals(&AnimalFilter { search_term: Some(fuzzy.id.to_string()), ..Default::default() })
            .await
            .unwrap();
        assert!(by_id.iter().any(|a| a.id == fuzzy.id));

        let combined = fx
            .repo
            .list_animals(&AnimalFilter {
                species_id: Some(fx.mouse_species),
                sex: Some(Sex::Male),
                search_term: Some("fuzzy".to_string()),
            })
            .await
            .unwrap();
        assert!(combined.is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_animal() {
        let fx = setup_test().await;

        let mut animal = fx.repo.store_animal(&new_animal(fx.mouse_line, Sex::Unknown, None)).await.unwrap();
        animal.sex = Sex::Intersex;
        animal.date_of_death = NaiveDate::from_ymd_opt(2025, 1, 2);
        fx.repo.update_animal(&animal).await.unwrap();

        let loaded = fx.repo.get_animal(animal.id).await.unwrap().unwrap();
        assert_eq!(loaded.sex, Sex::Intersex);
        assert_eq!(loaded.date_of_death, NaiveDate::from_ymd_opt(2025, 1, 2));

        assert_eq!(fx.repo.count_pairings_for_animal(animal.id).await.unwrap(), 0);
        assert!(fx.repo.delete_animal(animal.id).await.unwrap());
        assert!(fx.repo.get_animal(animal.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let fx = setup_test().await;

        let literal = fx.repo.store_animal(&new_animal(fx.mouse_line, Sex::Female, Some("a_b"))).await.unwrap();
        fx.repo.store_animal(&new_animal(fx.mouse_line, Sex::Female, Some("axb"))).await.unwrap();
        fx.repo.store_animal(&new_animal(fx.mouse_line, Sex::Male, Some("50% het"))).await.unwrap();

        let underscore = fx
            .repo
            .list_animals(&AnimalFilter { search_term: Some("a_b".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(underscore.len(), 1);
        assert_eq!(underscore[0].id, literal.id);

        let percent = fx
            .repo
            .list_animals(&AnimalFilter { search_term: Some("%".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].name.as_deref(), Some("50% het"));
    }

    #[tokio::test]
    async fn test_store_animal_with_parents_records_edges() {
        let fx = setup_test().await;
        let dam = fx.repo.store_animal(&new_animal(fx.mouse_line, Sex::Female, None)).await.unwrap();
        let sire = fx.repo.store_animal(&new_animal(fx.mouse_line, Sex::Male, None)).await.unwrap();

        let mut pup = new_animal(fx.mouse_line, Sex::Female, Some("Pup"));
        pup.date_of_birth = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let pup = fx.repo.store_animal_with_parents(&pup, dam.id, sire.id).await.unwrap();

        let edges: Vec<(i64, i64, i64, String)> = sqlx::query_as(
            "SELECT ancestor_id, generation, sequence, relationship FROM ancestry_edges WHERE descendant_id = ? ORDER BY sequence",
        )
        .bind(pup.id)
        .fetch_all(fx.repo.db.pool())
        .await
        .unwrap();
        assert_eq!(
            edges,
            vec![
                (dam.id, 1, 1, "Maternal".to_string()),
                (sire.id, 1, 2, "Paternal".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_store_animal_with_parents_rolls_back_on_failure() {
        let fx = setup_test().await;
        let dam = fx.repo.store_animal(&new_animal(fx.mouse_line, Sex::Female, None)).await.unwrap();

        // Missing sire violates the edge foreign key after the animal row is written
        let result = fx
            .repo
            .store_animal_with_parents(&new_animal(fx.mouse_line, Sex::Male, Some("Orphan")), dam.id, 9999)
            .await;
        assert!(result.is_err());

        let all = fx.repo.list_animals(&AnimalFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        let edges: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ancestry_edges")
            .fetch_one(fx.repo.db.pool())
            .await
            .unwrap();
        assert_eq!(edges, 0);
    }

    #[tokio::test]
    async fn test_search_by_id_ignores_surrounding_whitespace() {
        let fx = setup_test().await;
        let plain = fx.repo.store_animal(&new_animal(fx.mouse_line, Sex::Male, None)).await.unwrap();

        let by_id = fx
            .repo
            .list_animals(&AnimalFilter { search_term: Some(format!(" {} ", plain.id)), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_id.len(), 1);
    }
}
