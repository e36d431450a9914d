/// Comment model and database operations
///
/// Comments are immutable once created, attributed to their author, and
/// read in ascending creation order (clients render newest-first by
/// reversing). Reads join the author's email so the UI never needs a
/// second lookup.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE comments (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     card_id UUID NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id),
///     text TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Comment joined with its author's email
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentWithAuthor {
    /// Unique comment ID (UUID v4)
    pub id: Uuid,

    /// Card the comment belongs to
    pub card_id: Uuid,

    /// Authoring user
    pub user_id: Uuid,

    /// Comment text
    pub text: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,

    /// Author's email address
    pub email: String,
}

/// Input for creating a new comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    /// Card the comment belongs to
    pub card_id: Uuid,

    /// Authoring user
    pub user_id: Uuid,

    /// Comment text
    pub text: String,
}

impl CommentWithAuthor {
    /// Creates a comment and returns it joined with the author's email
    pub async fn create(pool: &PgPool, data: CreateComment) -> Result<Self, sqlx::Error> {
        let comment_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO comments (card_id, user_id, text)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(data.card_id)
        .bind(data.user_id)
        .bind(data.text)
        .fetch_one(pool)
        .await?;

        let comment = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.card_id, c.user_id, c.text, c.created_at, u.email
            FROM comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.id = $1
            "#,
        )
        .bind(comment_id)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Lists all comments of a card, ordered by creation time ascending
    pub async fn list_for_card(pool: &PgPool, card_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, CommentWithAuthor>(
            r#"
            SELECT c.id, c.card_id, c.user_id, c.text, c.created_at, u.email
            FROM comments c
            JOIN users u ON c.user_id = u.id
            WHERE c.card_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(card_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }
}
