/// List model and database operations
///
/// Lists are ordered columns within a board. New lists are appended: the
/// position is the count of existing lists at creation time, so N
/// sequential creates yield positions 0..N-1. Reordering assigns
/// position = index for each id in the caller-supplied order. Deleting a
/// list does not renumber the survivors; reads order by relative position
/// value, so gaps are tolerated.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE lists (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     name TEXT NOT NULL,
///     position INTEGER NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Deleting a list cascades to its cards at the schema level; the service
/// layer never orchestrates that cleanup itself.

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// List model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct List {
    /// Unique list ID (UUID v4)
    pub id: Uuid,

    /// Owning board
    pub board_id: Uuid,

    /// List name
    pub name: String,

    /// Zero-based ordering key, unique within the board after a settled
    /// create/reorder
    pub position: i32,

    /// When the list was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateList {
    /// Owning board
    pub board_id: Uuid,

    /// List name
    pub name: String,
}

impl List {
    /// Creates a new list appended at the end of the board
    ///
    /// The position is the current list count of the board; there is no
    /// mid-sequence insertion.
    pub async fn create(pool: &PgPool, data: CreateList) -> Result<Self, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lists WHERE board_id = $1")
            .bind(data.board_id)
            .fetch_one(pool)
            .await?;

        let list = sqlx::query_as::<_, List>(
            r#"
            INSERT INTO lists (board_id, name, position)
            VALUES ($1, $2, $3)
            RETURNING id, board_id, name, position, created_at
            "#,
        )
        .bind(data.board_id)
        .bind(data.name)
        .bind(count as i32)
        .fetch_one(pool)
        .await?;

        Ok(list)
    }

    /// Resolves a list's owning board
    ///
    /// # Returns
    ///
    /// The board ID if the list exists, None otherwise
    pub async fn board_id_of(pool: &PgPool, list_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        let board_id: Option<Uuid> =
            sqlx::query_scalar("SELECT board_id FROM lists WHERE id = $1")
                .bind(list_id)
                .fetch_optional(pool)
                .await?;

        Ok(board_id)
    }

    /// Lists all lists of a board, ordered by position ascending
    pub async fn list_for_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let lists = sqlx::query_as::<_, List>(
            r#"
            SELECT id, board_id, name, position, created_at
            FROM lists
            WHERE board_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(lists)
    }

    /// Deletes a list (cascades to its cards)
    ///
    /// Remaining lists keep their positions; the sequence may become
    /// gapped.
    ///
    /// # Returns
    ///
    /// True if a list was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Assigns position = index for each id in the given order
    ///
    /// The updates are issued as independent concurrent statements with no
    /// cross-row transaction; a partial failure can leave duplicate or
    /// gapped positions, and two simultaneous reorders race with
    /// last-write-wins per row. Applying the same order twice is
    /// idempotent.
    pub async fn reorder(pool: &PgPool, ordered_ids: &[Uuid]) -> Result<(), sqlx::Error> {
        let updates = ordered_ids.iter().enumerate().map(|(index, id)| {
            sqlx::query("UPDATE lists SET position = $1 WHERE id = $2")
                .bind(index as i32)
                .bind(*id)
                .execute(pool)
        });

        try_join_all(updates).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_list_struct() {
        let create = CreateList {
            board_id: Uuid::new_v4(),
            name: "Todo".to_string(),
        };

        assert_eq!(create.name, "Todo");
    }

    // Integration tests for database operations are in pinboard-api/tests/
}
