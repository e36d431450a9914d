/// Comment endpoints
///
/// # Endpoints
///
/// - `POST /comments` - Add a comment to a card
///
/// Comments are immutable once created; there is no edit or delete path.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, Extension, Json};
use pinboard_shared::{
    auth::context::AuthContext,
    models::comment::{CommentWithAuthor, CreateComment},
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::cards;

/// Add comment request
#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentRequest {
    /// Card the comment belongs to
    pub card_id: Uuid,

    /// Comment text
    #[validate(length(min = 1, message = "Text is required"))]
    pub text: String,
}

/// Adds a comment to a card, attributed to the caller
///
/// Returns the created comment joined with the author's email so the UI
/// can render it without another lookup.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `403 Forbidden`: Caller is not a member of the card's board
/// - `404 Not Found`: Card does not exist
pub async fn add_comment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<(StatusCode, Json<CommentWithAuthor>)> {
    req.validate()?;

    let board_id = cards::authorize_card(&state, req.card_id, auth.user_id).await?;

    let comment = CommentWithAuthor::create(
        &state.db,
        CreateComment {
            card_id: req.card_id,
            user_id: auth.user_id,
            text: req.text,
        },
    )
    .await?;

    tracing::info!(comment_id = %comment.id, card_id = %comment.card_id, "Comment added");

    state.channels.notify(board_id);

    Ok((StatusCode::CREATED, Json(comment)))
}
