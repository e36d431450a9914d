/// Card model and database operations
///
/// Cards are ordered items within a list. Like lists, new cards are
/// appended (position = current card count of the list). Moving a card
/// writes the caller-supplied list id and position verbatim, with no
/// bounds validation and no renumbering of the source list.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE cards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     list_id UUID NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
///     content TEXT NOT NULL,
///     description TEXT,
///     due_date DATE,
///     position INTEGER NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Card model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    /// Unique card ID (UUID v4)
    pub id: Uuid,

    /// Owning list
    pub list_id: Uuid,

    /// Card text shown on the board
    pub content: String,

    /// Optional longer description
    pub description: Option<String>,

    /// Optional due date
    pub due_date: Option<NaiveDate>,

    /// Zero-based ordering key within the list
    pub position: i32,

    /// When the card was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCard {
    /// Owning list
    pub list_id: Uuid,

    /// Card text
    pub content: String,
}

/// Partial update for card details
///
/// Merge semantics: an absent field leaves the column unchanged; a
/// present-with-null description or due date clears the column. Content
/// is not nullable, so it can only be replaced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCard {
    /// New card text
    pub content: Option<String>,

    /// New description (Some(None) clears it)
    pub description: Option<Option<String>>,

    /// New due date (Some(None) clears it)
    pub due_date: Option<Option<NaiveDate>>,
}

impl UpdateCard {
    /// True when no field is set; such an update is skipped entirely
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.description.is_none() && self.due_date.is_none()
    }
}

impl Card {
    /// Creates a new card appended at the end of the list
    ///
    /// The position is the current card count of the list.
    pub async fn create(pool: &PgPool, data: CreateCard) -> Result<Self, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cards WHERE list_id = $1")
            .bind(data.list_id)
            .fetch_one(pool)
            .await?;

        let card = sqlx::query_as::<_, Card>(
            r#"
            INSERT INTO cards (list_id, content, position)
            VALUES ($1, $2, $3)
            RETURNING id, list_id, content, description, due_date, position, created_at
            "#,
        )
        .bind(data.list_id)
        .bind(data.content)
        .bind(count as i32)
        .fetch_one(pool)
        .await?;

        Ok(card)
    }

    /// Finds a card by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let card = sqlx::query_as::<_, Card>(
            r#"
            SELECT id, list_id, content, description, due_date, position, created_at
            FROM cards
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(card)
    }

    /// Resolves a card's owning board via the card→list→board chain
    ///
    /// # Returns
    ///
    /// The board ID if the card exists, None otherwise
    pub async fn board_id_of(pool: &PgPool, card_id: Uuid) -> Result<Option<Uuid>, sqlx::Error> {
        let board_id: Option<Uuid> = sqlx::query_scalar(
            r#"
            SELECT l.board_id
            FROM cards c
            JOIN lists l ON c.list_id = l.id
            WHERE c.id = $1
            "#,
        )
        .bind(card_id)
        .fetch_optional(pool)
        .await?;

        Ok(board_id)
    }

    /// Lists all cards of a list, ordered by position ascending
    pub async fn list_for_list(pool: &PgPool, list_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let cards = sqlx::query_as::<_, Card>(
            r#"
            SELECT id, list_id, content, description, due_date, position, created_at
            FROM cards
            WHERE list_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(list_id)
        .fetch_all(pool)
        .await?;

        Ok(cards)
    }

    /// Deletes a card
    ///
    /// # Returns
    ///
    /// True if a card was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Moves a card to a list and position
    ///
    /// Writes both values verbatim. Cards remaining in the source list
    /// keep their positions; the sequence may become gapped.
    pub async fn move_to(
        pool: &PgPool,
        card_id: Uuid,
        list_id: Uuid,
        position: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE cards SET list_id = $1, position = $2 WHERE id = $3")
            .bind(list_id)
            .bind(position)
            .bind(card_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Applies a partial update to a card
    ///
    /// Only the provided fields are written; an empty update set is a
    /// no-op and skips the statement entirely.
    ///
    /// # Returns
    ///
    /// The updated card if found, None if the card doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateCard,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        // Build the update statement from the fields that are present
        let mut assignments = Vec::new();
        let mut bind_count = 1;

        if data.content.is_some() {
            bind_count += 1;
            assignments.push(format!("content = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            assignments.push(format!("description = ${}", bind_count));
        }
        if data.due_date.is_some() {
            bind_count += 1;
            assignments.push(format!("due_date = ${}", bind_count));
        }

        let query = format!(
            "UPDATE cards SET {} WHERE id = $1 \
             RETURNING id, list_id, content, description, due_date, position, created_at",
            assignments.join(", ")
        );

        let mut q = sqlx::query_as::<_, Card>(&query).bind(id);

        if let Some(content) = data.content {
            q = q.bind(content);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(due_date) = data.due_date {
            q = q.bind(due_date);
        }

        let card = q.fetch_optional(pool).await?;

        Ok(card)
    }
}
