use anyhow::Result;
use async_trait::async_trait;
use shared::RelationshipKind;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::domain::models::{AncestryEdge, NewAncestryEdge};
use crate::storage::connection::DbConnection;
use crate::storage::traits::AncestryStorage;

/// Repository for pedigree edges
#[derive(Clone)]
pub struct AncestryRepository {
    db: DbConnection,
}

impl AncestryRepository {
    pub fn new(db: DbConnection) -> Self {
        Self { db }
    }

    fn from_row(row: &SqliteRow) -> Result<AncestryEdge> {
        let relationship: String = row.try_get("relationship")?;
        Ok(AncestryEdge {
            id: row.try_get("id")?,
            descendant_id: row.try_get("descendant_id")?,
            ancestor_id: row.try_get("ancestor_id")?,
            generation: row.try_get("generation")?,
            sequence: row.try_get("sequence")?,
            relationship: relationship.parse::<RelationshipKind>()?,
        })
    }
}

#[async_trait]
impl AncestryStorage for AncestryRepository {
    async fn store_edge(&self, edge: &NewAncestryEdge) -> Result<AncestryEdge> {
        let id = sqlx::query(
            r#"
            INSERT INTO ancestry_edges (descendant_id, ancestor_id, generation, sequence, relationship)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(edge.descendant_id)
        .bind(edge.ancestor_id)
        .bind(edge.generation)
        .bind(edge.sequence)
        .bind(edge.relationship.as_str())
        .execute(self.db.pool())
        .await?
        .last_insert_rowid();

        Ok(AncestryEdge {
            id,
            descendant_id: edge.descendant_id,
            ancestor_id: edge.ancestor_id,
            generation: edge.generation,
            sequence: edge.sequence,
            relationship: edge.relationship,
        })
    }

    async fn get_edge(&self, edge_id: i64) -> Result<Option<AncestryEdge>> {
        let row = sqlx::query(
            r#"
            SELECT id, descendant_id, ancestor_id, generation, sequence, relationship
            FROM ancestry_edges
            WHERE id = ?
            "#,
        )
        .bind(edge_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn list_edges_for_descendant(&self, descendant_id: i64) -> Result<Vec<AncestryEdge>> {
        let rows = sqlx::query(
            r#"
            SELECT id, descendant_id, ancestor_id, generation, sequence, relationship
            FROM ancestry_edges
            WHERE descendant_id = ?
            ORDER BY generation ASC, sequence ASC
            "#,
        )
        .bind(descendant_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::from_row).collect()
    }

    async fn list_edges_for_ancestor(&self, ancestor_id: i64) -> Result<Vec<AncestryEdge>> {
        let rows = sqlx::query(
            r#"
            SELECT id, descendant_id, ancestor_id, generation, sequence, relationship
            FROM ancestry_edges
            WHERE ancestor_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(ancestor_id)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(Self::from_row).collect()
    }

    async fn max_sequence(&self, descendant_id: i64, generation: i64) -> Result<Option<i64>> {
        let max = sqlx::query_scalar::<_, Option<i64>>(
            "SELECT MAX(sequence) FROM ancestry_edges WHERE descendant_id = ? AND generation = ?",
        )
        .bind(descendant_id)
        .bind(generation)
        .fetch_one(self.db.pool())
        .await?;
        Ok(max)
    }

    async fn sequence_taken(&self, descendant_id: i64, generation: i64, sequence: i64) -> Result<bool> {
        let row = sqlx::query(
            "SELECT 1 FROM ancestry_edges WHERE descendant_id = ? AND generation = ? AND sequence = ?",
        )
        .bind(descendant_id)
        .bind(generation)
        .bind(sequence)
        .fetch_optional(self.db.pool())
        .await?;
        Ok(row.is_some())
    }

    async fn is_ancestor_of(&self, ancestor_id: i64, descendant_id: i64) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            r#"
            WITH RECURSIVE lineage(id) AS (
                SELECT ancestor_id FROM ancestry_edges WHERE descendant_id = ?
                UNION
                SELECT e.ancestor_id
                FROM ancestry_edges e
                JOIN lineage l ON e.descendant_id = l.id
            )
            SELECT EXISTS (SELECT 1 FROM lineage WHERE id = ?)
            "#,
        )
        .bind(descendant_id)
        .bind(ancestor_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(found != 0)
    }

    async fn delete_edge(&self, edge_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ancestry_edges WHERE id = ?")
            .bind(edge_id)
            .execute(self.db.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Inserts `count` bare animals (and the line they need) and returns their ids
    async fn setup_test(count: usize) -> (AncestryRepository, Vec<i64>) {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        for statement in [
            "INSERT INTO species (scientific_name) VALUES ('Mus musculus')",
            "INSERT INTO stocks (species_id, name) VALUES (1, 'C57BL/6')",
            "INSERT INTO lines (stock_id, name) VALUES (1, 'B6')",
        ] {
            sqlx::query(statement).execute(db.pool()).await.unwrap();
        }

        let mut ids = Vec::new();
        for _ in 0..count {
            let id = sqlx::query(
                r#"
                INSERT INTO animals (line_id, sex, date_of_birth, created_at, updated_at)
                VALUES (1, 'Unknown', '2024-01-01', '2024-01-01T00:00:00Z', '2024-01-01T00:00:00Z')
                "#,
            )
            .execute(db.pool())
            .await
            .unwrap()
            .last_insert_rowid();
            ids.push(id);
        }
        (AncestryRepository::new(db), ids)
    }

    fn edge(descendant_id: i64, ancestor_id: i64, generation: i64, sequence: i64) -> NewAncestryEdge {
        NewAncestryEdge {
            descendant_id,
            ancestor_id,
            generation,
            sequence,
            relationship: RelationshipKind::Other,
        }
    }

    #[tokio::test]
    async fn test_edges_ordered_by_generation_then_sequence() {
        let (repo, ids) = setup_test(5).await;
        let child = ids[0];

        repo.store_edge(&edge(child, ids[3], 2, 1)).await.unwrap();
        repo.store_edge(&edge(child, ids[2], 1, 2)).await.unwrap();
        repo.store_edge(&edge(child, ids[1], 1, 1)).await.unwrap();

        let edges = repo.list_edges_for_descendant(child).await.unwrap();
        let order: Vec<(i64, i64)> = edges.iter().map(|e| (e.generation, e.sequence)).collect();
        assert_eq!(order, vec![(1, 1), (1, 2), (2, 1)]);
        assert_eq!(edges[0].ancestor_id, ids[1]);

        assert_eq!(repo.max_sequence(child, 1).await.unwrap(), Some(2));
        assert_eq!(repo.max_sequence(child, 3).await.unwrap(), None);
        assert!(repo.sequence_taken(child, 2, 1).await.unwrap());
        assert!(!repo.sequence_taken(child, 2, 2).await.unwrap());
    }

    #[tokio::test]
    async fn test_edges_for_ancestor() {
        let (repo, ids) = setup_test(4).await;

        repo.store_edge(&edge(ids[1], ids[0], 1, 1)).await.unwrap();
        repo.store_edge(&edge(ids[2], ids[0], 2, 1)).await.unwrap();
        repo.store_edge(&edge(ids[2], ids[3], 1, 1)).await.unwrap();

        let edges = repo.list_edges_for_ancestor(ids[0]).await.unwrap();
        let descendants: Vec<i64> = edges.iter().map(|e| e.descendant_id).collect();
        assert_eq!(descendants, vec![ids[1], ids[2]]);
        assert!(repo.list_edges_for_ancestor(ids[1]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_sequence_rejected_by_schema() {
        let (repo, ids) = setup_test(3).await;
        repo.store_edge(&edge(ids[0], ids[1], 1, 1)).await.unwrap();
        assert!(repo.store_edge(&edge(ids[0], ids[2], 1, 1)).await.is_err());
    }

    #[tokio::test]
    async fn test_is_ancestor_of_follows_chain() {
        let (repo, ids) = setup_test(4).await;
        // ids[0] <- ids[1] <- ids[2]
        repo.store_edge(&edge(ids[0], ids[1], 1, 1)).await.unwrap();
        repo.store_edge(&edge(ids[1], ids[2], 1, 1)).await.unwrap();

        assert!(repo.is_ancestor_of(ids[1], ids[0]).await.unwrap());
        assert!(repo.is_ancestor_of(ids[2], ids[0]).await.unwrap());
        assert!(!repo.is_ancestor_of(ids[0], ids[2]).await.unwrap());
        assert!(!repo.is_ancestor_of(ids[3], ids[0]).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_edge() {
        let (repo, ids) = setup_test(2).await;
        let stored = repo.store_edge(&edge(ids[0], ids[1], 1, 1)).await.unwrap();

        assert!(repo.get_edge(stored.id).await.unwrap().is_some());
        assert!(repo.delete_edge(stored.id).await.unwrap());
        assert!(!repo.delete_edge(stored.id).await.unwrap());
    }
}
