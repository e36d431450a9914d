/// Board endpoints
///
/// # Endpoints
///
/// - `GET /boards` - List the caller's boards (id and name only)
/// - `POST /boards` - Create a board (caller becomes owner)
/// - `GET /boards/:id` - Full board snapshot (lists with cards)
/// - `POST /boards/:id/members` - Invite a user by email

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::MessageResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use pinboard_shared::{
    auth::{authorization::require_board_membership, context::AuthContext},
    models::{
        board::{Board, BoardDetail, BoardSummary},
        membership::{BoardMember, BoardRole, CreateBoardMember},
        user::User,
    },
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Create board request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBoardRequest {
    /// Board name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Create board response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateBoardResponse {
    /// Board ID
    pub id: Uuid,

    /// Board name
    pub name: String,
}

/// Invite member request
#[derive(Debug, Deserialize, Validate)]
pub struct InviteMemberRequest {
    /// Email of the user to invite
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Checks that the board exists and the caller is a member of it
///
/// An absent board yields 404; an existing board without a membership row
/// for the caller yields 403, so non-members never see board content.
pub(crate) async fn ensure_member_of_existing_board(
    pool: &PgPool,
    board_id: Uuid,
    user_id: Uuid,
) -> Result<(), ApiError> {
    if !BoardMember::has_access(pool, board_id, user_id).await? {
        if Board::find_by_id(pool, board_id).await?.is_none() {
            return Err(ApiError::NotFound("Board not found".to_string()));
        }
        return Err(ApiError::Forbidden("Not a member of this board".to_string()));
    }

    Ok(())
}

/// Lists all boards where the caller has a membership row
pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<BoardSummary>>> {
    let boards = Board::list_for_user(&state.db, auth.user_id).await?;

    Ok(Json(boards))
}

/// Creates a board with the caller as its owner
///
/// The board row and the owner membership row are committed in one
/// transaction; both succeed or both roll back.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Missing or invalid token
/// - `500 Internal Server Error`: Server error
pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateBoardRequest>,
) -> ApiResult<(StatusCode, Json<CreateBoardResponse>)> {
    req.validate()?;

    let board = Board::create_with_owner(&state.db, &req.name, auth.user_id).await?;

    tracing::info!(board_id = %board.id, user_id = %auth.user_id, "Board created");

    Ok((
        StatusCode::CREATED,
        Json(CreateBoardResponse {
            id: board.id,
            name: board.name,
        }),
    ))
}

/// Returns the full board snapshot
///
/// Lists are ordered by position ascending, each populated with its cards
/// ordered by position ascending. This is the read that real-time
/// subscribers repeat after every fan-out signal.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member
/// - `404 Not Found`: Board does not exist
pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<BoardDetail>> {
    ensure_member_of_existing_board(&state.db, board_id, auth.user_id).await?;

    let detail = Board::detail(&state.db, board_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Board not found".to_string()))?;

    Ok(Json(detail))
}

/// Invites a user to a board by email
///
/// The invited user gets a `member` role. Inviting someone who is already
/// a member hits the composite primary key and comes back as 409.
///
/// # Errors
///
/// - `403 Forbidden`: Inviter is not a member
/// - `404 Not Found`: No user with that email
/// - `409 Conflict`: User is already a member
pub async fn invite_member(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<InviteMemberRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    req.validate()?;

    require_board_membership(&state.db, board_id, auth.user_id).await?;

    let invited = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("User with that email not found".to_string()))?;

    BoardMember::create(
        &state.db,
        CreateBoardMember {
            board_id,
            user_id: invited.id,
            role: BoardRole::Member,
        },
    )
    .await?;

    tracing::info!(board_id = %board_id, invited_user = %invited.id, "Member invited");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User added to the board")),
    ))
}
