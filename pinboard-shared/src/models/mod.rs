/// Database models for Pinboard
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts and authentication
/// - `board`: Top-level containers of lists, scoped to a set of members
/// - `membership`: User-board relationships with roles
/// - `list`: Ordered columns within a board
/// - `card`: Ordered items within a list
/// - `comment`: Immutable notes attached to a card
///
/// # Example
///
/// ```no_run
/// use pinboard_shared::models::user::{User, CreateUser};
/// use pinboard_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod board;
pub mod card;
pub mod comment;
pub mod list;
pub mod membership;
pub mod user;
