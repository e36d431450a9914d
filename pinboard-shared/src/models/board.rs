/// Board model and database operations
///
/// Boards are the top-level containers. Creating a board also creates an
/// `owner` membership row for the creator; the two inserts are wrapped in
/// a single transaction so a board can never exist without at least one
/// owner. There is no board deletion path.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name TEXT NOT NULL,
///     created_by UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::card::Card;
use super::list::List;
use super::membership::BoardRole;

/// Board model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Board {
    /// Unique board ID (UUID v4)
    pub id: Uuid,

    /// Board name
    pub name: String,

    /// The creating user
    pub created_by: Uuid,

    /// When the board was created
    pub created_at: DateTime<Utc>,
}

/// Board summary for listings (id and name only)
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct BoardSummary {
    /// Board ID
    pub id: Uuid,

    /// Board name
    pub name: String,
}

/// A list joined with its cards, both ordered by position ascending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListWithCards {
    /// List ID
    pub id: Uuid,

    /// Owning board
    pub board_id: Uuid,

    /// List name
    pub name: String,

    /// Zero-based ordering key within the board
    pub position: i32,

    /// Cards in the list, ordered by position ascending
    pub cards: Vec<Card>,
}

/// Full board snapshot: the board plus its lists, each with its cards
///
/// This is what clients refetch after every fan-out signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardDetail {
    /// Board ID
    pub id: Uuid,

    /// Board name
    pub name: String,

    /// Lists ordered by position ascending
    pub lists: Vec<ListWithCards>,
}

impl Board {
    /// Creates a board together with its owner membership
    ///
    /// Both inserts run inside one transaction: either the board and the
    /// owner row are both committed, or neither is.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert fails; the transaction is rolled
    /// back on drop.
    pub async fn create_with_owner(
        pool: &PgPool,
        name: &str,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let board = sqlx::query_as::<_, Board>(
            r#"
            INSERT INTO boards (name, created_by)
            VALUES ($1, $2)
            RETURNING id, name, created_by, created_at
            "#,
        )
        .bind(name)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO board_members (board_id, user_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(board.id)
        .bind(user_id)
        .bind(BoardRole::Owner)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(board)
    }

    /// Finds a board by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let board = sqlx::query_as::<_, Board>(
            r#"
            SELECT id, name, created_by, created_at
            FROM boards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(board)
    }

    /// Lists all boards where the user has a membership row
    ///
    /// Returns id and name only, suitable for a dashboard listing.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<BoardSummary>, sqlx::Error> {
        let boards = sqlx::query_as::<_, BoardSummary>(
            r#"
            SELECT b.id, b.name
            FROM boards b
            JOIN board_members bm ON b.id = bm.board_id
            WHERE bm.user_id = $1
            ORDER BY b.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(boards)
    }

    /// Loads the full board snapshot
    ///
    /// Lists come back ordered by position ascending, each populated with
    /// its cards ordered by position ascending. Ordering is by relative
    /// value, so gapped position sequences (after deletes and move-outs)
    /// still render correctly.
    ///
    /// # Returns
    ///
    /// The snapshot if the board exists, None otherwise
    pub async fn detail(pool: &PgPool, id: Uuid) -> Result<Option<BoardDetail>, sqlx::Error> {
        let Some(board) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let lists = List::list_for_board(pool, board.id).await?;

        let mut lists_with_cards = Vec::with_capacity(lists.len());
        for list in lists {
            let cards = Card::list_for_list(pool, list.id).await?;
            lists_with_cards.push(ListWithCards {
                id: list.id,
                board_id: list.board_id,
                name: list.name,
                position: list.position,
                cards,
            });
        }

        Ok(Some(BoardDetail {
            id: board.id,
            name: board.name,
            lists: lists_with_cards,
        }))
    }
}
