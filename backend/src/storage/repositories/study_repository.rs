use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use shared::{DataPointType, GroupType};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{DataPoint, ObservationData, Study, StudyAnimal, StudyGroup};
use crate::storage::connection::DbConnection;
use crate::storage::traits::StudyStorage;

/// Repository for studies and everything recorded under them
#[derive(Clone)]
pub struct StudyRepository {
    db: DbConnection,
}

impl StudyRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn study_from_row(row: &SqliteRow) -> Result<Study> {
        Ok(Study {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn group_from_row(row: &SqliteRow) -> Result<StudyGroup> {
        let group_type: String = row.try_get("group_type")?;
        Ok(StudyGroup {
            id: row.try_get("id")?,
            study_id: row.try_get("study_id")?,
            name: row.try_get("name")?,
            group_type: group_type.parse::<GroupType>()?,
        })
    }

    fn study_animal_from_row(row: &SqliteRow) -> Result<StudyAnimal> {
        Ok(StudyAnimal {
            id: row.try_get("id")?,
            study_group_id: row.try_get("study_group_id")?,
            animal_id: row.try_get("animal_id")?,
        })
    }

    fn data_point_from_row(row: &SqliteRow) -> Result<DataPoint> {
        let data_type: String = row.try_get("data_type")?;
        let options: String = row.try_get("options")?;
        Ok(DataPoint {
            id: row.try_get("id")?,
            study_id: row.try_get("study_id")?,
            name: row.try_get("name")?,
            data_type: data_type.parse::<DataPointType>()?,
            options: serde_json::from_str(&options)?,
        })
    }

    fn observation_from_row(row: &SqliteRow) -> Result<ObservationData> {
        Ok(ObservationData {
            id: row.try_get("id")?,
            study_animal_id: row.try_get("study_animal_id")?,
            data_point_id: row.try_get("data_point_id")?,
            value: row.try_get("value")?,
            recorded_at: row.try_get("recorded_at")?,
        })
    }
}

#[async_trait]
impl StudyStorage for StudyRepository {
    async fn store_study(
        &self,
        name: &str,
        description: Option<&str>,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Study> {
        let now = Utc::now();
        let id = sqlx::query(
            r#"
            INSERT INTO studies (name, description, start_date, end_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(start_date)
        .bind(end_date)
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();

        Ok(Study {
            id,
            name: name.to_string(),
            description: description.map(str::to_string),
            start_date,
            end_date,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_study(&self, study_id: i64) -> Result<Option<Study>> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, start_date, end_date, created_at, updated_at
            FROM studies
            WHERE id = ?
            "#,
        )
        .bind(study_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::study_from_row).transpose()
    }

    async fn list_studies(&self) -> Result<Vec<Study>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, description, start_date, end_date, created_at, updated_at
            FROM studies
            ORDER BY start_date DESC, id DESC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::study_from_row).collect()
    }

    async fn update_study(&self, study: &Study) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE studies
            SET name = ?, description = ?, start_date = ?, end_date = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&study.name)
        .bind(&study.description)
        .bind(study.start_date)
        .bind(study.end_date)
        .bind(study.updated_at)
        .bind(study.id)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn delete_study(&self, study_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM studies WHERE id = ?")
            .bind(study_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn store_group(&self, group: &StudyGroup) -> Result<StudyGroup> {
        let id = sqlx::query("INSERT INTO study_groups (study_id, name, group_type) VALUES (?, ?, ?)")
            .bind(group.study_id)
            .bind(&group.name)
            .bind(group.group_type.as_str())
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();

        Ok(StudyGroup { id, ..group.clone() })
    }

    async fn get_group(&self, group_id: i64) -> Result<Option<StudyGroup>> {
        let row = sqlx::query("SELECT id, study_id, name, group_type FROM study_groups WHERE id = ?")
            .bind(group_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::group_from_row).transpose()
    }

    async fn list_groups(&self, study_id: i64) -> Result<Vec<StudyGroup>> {
        let rows = sqlx::query(
            "SELECT id, study_id, name, group_type FROM study_groups WHERE study_id = ? ORDER BY id ASC",
        )
        .bind(study_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::group_from_row).collect()
    }

    async fn store_study_animal(&self, study_group_id: i64, animal_id: i64) -> Result<Option<StudyAnimal>> {
        // One statement, so the membership check and the insert cannot interleave
        let result = sqlx::query(
            r#"
            INSERT INTO study_animals (study_group_id, animal_id)
            SELECT ?, ?
            WHERE NOT EXISTS (
                SELECT 1
                FROM study_animals sa
                JOIN study_groups g ON g.id = sa.study_group_id
                WHERE sa.animal_id = ?
                  AND g.study_id = (SELECT study_id FROM study_groups WHERE id = ?)
            )
            "#,
        )
        .bind(study_group_id)
        .bind(animal_id)
        .bind(animal_id)
        .bind(study_group_id)
        .execute(self.db.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(StudyAnimal {
            id: result.last_insert_rowid(),
            study_group_id,
            animal_id,
        }))
    }

    async fn get_study_animal(&self, study_animal_id: i64) -> Result<Option<StudyAnimal>> {
        let row = sqlx::query("SELECT id, study_group_id, animal_id FROM study_animals WHERE id = ?")
            .bind(study_animal_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::study_animal_from_row).transpose()
    }

    async fn list_group_animals(&self, study_group_id: i64) -> Result<Vec<StudyAnimal>> {
        let rows = sqlx::query(
            "SELECT id, study_group_id, animal_id FROM study_animals WHERE study_group_id = ? ORDER BY id ASC",
        )
        .bind(study_group_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::study_animal_from_row).collect()
    }

    async fn find_study_membership(&self, study_id: i64, animal_id: i64) -> Result<Option<StudyAnimal>> {
        let row = sqlx::query(
            r#"
            SELECT sa.id, sa.study_group_id, sa.animal_id
            FROM study_animals sa
            JOIN study_groups g ON g.id = sa.study_group_id
            WHERE g.study_id = ? AND sa.animal_id = ?
            "#,
        )
        .bind(study_id)
        .bind(animal_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::study_animal_from_row).transpose()
    }

    async fn store_data_point(&self, data_point: &DataPoint) -> Result<DataPoint> {
        let options = serde_json::to_string(&data_point.options)?;
        let id = sqlx::query(
            "INSERT INTO data_points (study_id, name, data_type, options) VALUES (?, ?, ?, ?)",
        )
        .bind(data_point.study_id)
        .bind(&data_point.name)
        .bind(data_point.data_type.as_str())
        .bind(options)
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();

        Ok(DataPoint { id, ..data_point.clone() })
    }

    async fn get_data_point(&self, data_point_id: i64) -> Result<Option<DataPoint>> {
        let row = sqlx::query(
            "SELECT id, study_id, name, data_type, options FROM data_points WHERE id = ?",
        )
        .bind(data_point_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::data_point_from_row).transpose()
    }

    async fn list_data_points(&self, study_id: i64) -> Result<Vec<DataPoint>> {
        let rows = sqlx::query(
            "SELECT id, study_id, name, data_type, options FROM data_points WHERE study_id = ? ORDER BY id ASC",
        )
        .bind(study_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::data_point_from_row).collect()
    }

    async fn store_observation(&self, observation: &ObservationData) -> Result<ObservationData> {
        let id = sqlx::query(
            r#"
            INSERT INTO observations (study_animal_id, data_point_id, value, recorded_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(observation.study_animal_id)
        .bind(observation.data_point_id)
        .bind(&observation.value)
        .bind(observation.recorded_at)
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();

        Ok(ObservationData { id, ..observation.clone() })
    }

    async fn list_observations(&self, study_animal_id: i64) -> Result<Vec<ObservationData>> {
        let rows = sqlx::query(
            r#"
            SELECT id, study_animal_id, data_point_id, value, recorded_at
            FROM observations
            WHERE study_animal_id = ?
            ORDER BY recorded_at ASC, id ASC
            "#,
        )
        .bind(study_animal_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::observation_from_row).collect()
    }
}
