/// Authorization helpers
///
/// Board membership is the sole authorization unit in Pinboard: a user may
/// act on a board if and only if a `board_members` row exists for the pair.
/// Every board-scoped operation goes through [`require_board_membership`]
/// before touching data, so a non-member never learns anything about a
/// board's contents.
///
/// # Example
///
/// ```no_run
/// use pinboard_shared::auth::authorization::require_board_membership;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, board_id: Uuid, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// require_board_membership(&pool, board_id, user_id).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::membership::BoardMember;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// User is not a member of the board
    #[error("Not a member of board {0}")]
    NotMember(Uuid),

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Checks that a user is a member of a board
///
/// # Errors
///
/// Returns `AuthzError::NotMember` if no membership row exists for the
/// pair, or `AuthzError::DatabaseError` if the lookup itself fails.
pub async fn require_board_membership(
    pool: &PgPool,
    board_id: Uuid,
    user_id: Uuid,
) -> Result<(), AuthzError> {
    let has_access = BoardMember::has_access(pool, board_id, user_id).await?;

    if !has_access {
        return Err(AuthzError::NotMember(board_id));
    }

    Ok(())
}
