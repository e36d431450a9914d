/// List endpoints
///
/// # Endpoints
///
/// - `POST /lists` - Append a list to a board
/// - `PUT /lists/reorder` - Assign positions from a caller-supplied order
/// - `DELETE /lists/:id` - Delete a list (cascades to its cards)
///
/// All three are board-scoped mutations and trigger the real-time fan-out
/// for the affected board.

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
        card::Card,
        list::{CreateList, List},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create list request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListRequest {
    /// Owning board
    pub board_id: Uuid,

    /// List name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Create list response
///
/// Includes an empty cards array so clients can splice the new list into
/// their snapshot without a refetch.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateListResponse {
    /// List ID
    pub id: Uuid,

    /// List name
    pub name: String,

    /// Assigned position (count of lists before this create)
    pub position: i32,

    /// Always empty on creation
    pub cards: Vec<Card>,
}

/// Reorder lists request
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderListsRequest {
    /// Board whose lists are being reordered
    pub board_id: Uuid,

    /// Every list id of the board in the desired display order
    pub ordered_list_ids: Vec<Uuid>,
}

/// Appends a list to a board
///
/// The new list's position is the current list count of the board; there
/// is no mid-sequence insertion.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `403 Forbidden`: Caller is not a member of the board
pub async fn create_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateListRequest>,
) -> ApiResult<(StatusCode, Json<CreateListResponse>)> {
    req.validate()?;

    require_board_membership(&state.db, req.board_id, auth.user_id).await?;

    let list = List::create(
        &state.db,
        CreateList {
            board_id: req.board_id,
            name: req.name,
        },
    )
    .await?;

    tracing::info!(list_id = %list.id, board_id = %list.board_id, position = list.position, "List created");

    state.channels.notify(list.board_id);

    Ok((
        StatusCode::CREATED,
        Json(CreateListResponse {
            id: list.id,
            name: list.name,
            position: list.position,
            cards: Vec::new(),
        }),
    ))
}

/// Deletes a list
///
/// Membership is resolved via the list's board. Contained cards go with
/// the list through the schema-level cascade. Remaining lists keep their
/// positions, so the board's sequence may become gapped; reads order by
/// relative value and tolerate that.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member of the list's board
/// - `404 Not Found`: List does not exist
pub async fn delete_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(list_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let board_id = List::board_id_of(&state.db, list_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("List not found".to_string()))?;

    require_board_membership(&state.db, board_id, auth.user_id).await?;

    List::delete(&state.db, list_id).await?;

    tracing::info!(list_id = %list_id, board_id = %board_id, "List deleted");

    state.channels.notify(board_id);

    Ok(Json(MessageResponse::new("List removed")))
}

/// Reorders a board's lists
///
/// Sets position = index for each id in the given order. The updates are
/// independent concurrent statements with no cross-row atomicity: a
/// partial failure can leave duplicate or gapped positions, and two
/// simultaneous reorders race with last-write-wins per row. Applying the
/// same order twice is idempotent.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member of the board
pub async fn reorder_lists(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ReorderListsRequest>,
) -> ApiResult<Json<MessageResponse>> {
    require_board_membership(&state.db, req.board_id, auth.user_id).await?;

    List::reorder(&state.db, &req.ordered_list_ids).await?;

    tracing::info!(board_id = %req.board_id, count = req.ordered_list_ids.len(), "Lists reordered");

    state.channels.notify(req.board_id);

    Ok(Json(MessageResponse::new("Lists reordered")))
}
