use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::Line;
use crate::storage::connection::DbConnection;
use crate::storage::traits::LineStorage;

/// Repository for breeding lines
#[derive(Clone)]
pub struct LineRepository {
    db: DbConnection,
}

impl LineRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn from_row(row: &SqliteRow) -> Result<Line> {
        Ok(Line {
            id: row.try_get("id")?,
            stock_id: row.try_get("stock_id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
        })
    }
}

#[async_trait]
impl LineStorage for LineRepository {
    async fn store_line(&self, stock_id: i64, name: &str, description: Option<&str>) -> Result<Line> {
        let id = sqlx::query("INSERT INTO lines (stock_id, name, description) VALUES (?, ?, ?)")
            .bind(stock_id)
            .bind(name)
            .bind(description)
            .execute(self.db.pool())
            .await?
            .last_insert_rowid();

        Ok(Line {
            id,
            stock_id,
            name: name.to_string(),
            description: description.map(str::to_string),
        })
    }

    async fn get_line(&self, line_id: i64) -> Result<Option<Line>> {
        let row = sqlx::query("SELECT id, stock_id, name, description FROM lines WHERE id = ?")
            .bind(line_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn list_lines(&self, stock_id: Option<i64>) -> Result<Vec<Line>> {
        let rows = sqlx::query(
            r#"
            SELECT id, stock_id, name, description
            FROM lines
            WHERE (? IS NULL OR stock_id = ?)
            ORDER BY name ASC
            "#,
        )
        .bind(stock_id)
        .bind(stock_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::from_row).collect()
    }

    async fn update_line(&self, line: &Line) -> Result<()> {
        sqlx::query("UPDATE lines SET name = ?, description = ? WHERE id = ?")
            .bind(&line.name)
            .bind(&line.description)
            .bind(line.id)
            .execute(self.db.pool())
            .await?;
        Ok(())
    }

    async fn delete_line(&self, line_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lines WHERE id = ?")
            .bind(line_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_animals_in_line(&self, line_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM animals WHERE line_id = ?")
            .bind(line_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(count)
    }
}
