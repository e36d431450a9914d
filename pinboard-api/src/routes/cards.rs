/// Card endpoints
///
/// # Endpoints
///
/// - `POST /cards` - Append a card to a list
/// - `PUT /cards/move` - Move a card to a list and position
/// - `DELETE /cards/:id` - Delete a card
/// - `GET /cards/:id/details` - Card with its comments
/// - `PUT /cards/:id/details` - Partial update of content/description/due date
///
/// Membership is resolved through the card→list→board chain (or the
/// destination list for moves). Every mutation triggers the fan-out for
/// the resolved board.

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
use chrono::NaiveDate;
use pinboard_shared::{
    auth::{authorization::require_board_membership, context::AuthContext},
    models::{
        card::{Card, CreateCard, UpdateCard},
        comment::CommentWithAuthor,
        list::List,
    },
};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create card request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCardRequest {
    /// Owning list
    pub list_id: Uuid,

    /// Card text
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

/// Create card response
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCardResponse {
    /// Card ID
    pub id: Uuid,

    /// Owning list
    pub list_id: Uuid,

    /// Card text
    pub content: String,

    /// Assigned position (count of cards before this create)
    pub position: i32,
}

/// Move card request
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCardRequest {
    /// Card to move
    pub card_id: Uuid,

    /// Destination list
    pub new_list_id: Uuid,

    /// Destination position, written verbatim
    pub new_position: i32,
}

/// Card details response: the card plus its comments
#[derive(Debug, Serialize)]
pub struct CardDetailsResponse {
    /// The card
    #[serde(flatten)]
    pub card: Card,

    /// Comments ordered by creation time ascending
    pub comments: Vec<CommentWithAuthor>,
}

/// Partial update request for card details
///
/// Absent fields leave the column unchanged. An explicit null clears
/// description or due date; content is not nullable and can only be
/// replaced.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCardDetailsRequest {
    /// New card text
    pub content: Option<String>,

    /// New description; null clears it
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    /// New due date; null clears it
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Distinguishes an absent field (None) from an explicit null (Some(None))
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Resolves a card's board and checks the caller's membership
pub(crate) async fn authorize_card(
    state: &AppState,
    card_id: Uuid,
    user_id: Uuid,
) -> Result<Uuid, ApiError> {
    let board_id = Card::board_id_of(&state.db, card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    require_board_membership(&state.db, board_id, user_id).await?;

    Ok(board_id)
}

/// Appends a card to a list
///
/// The new card's position is the current card count of the list.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `403 Forbidden`: Caller is not a member of the list's board
/// - `404 Not Found`: List does not exist
pub async fn create_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateCardRequest>,
) -> ApiResult<(StatusCode, Json<CreateCardResponse>)> {
    req.validate()?;

    let board_id = List::board_id_of(&state.db, req.list_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("List not found".to_string()))?;

    require_board_membership(&state.db, board_id, auth.user_id).await?;

    let card = Card::create(
        &state.db,
        CreateCard {
            list_id: req.list_id,
            content: req.content,
        },
    )
    .await?;

    tracing::info!(card_id = %card.id, list_id = %card.list_id, position = card.position, "Card created");

    state.channels.notify(board_id);

    Ok((
        StatusCode::CREATED,
        Json(CreateCardResponse {
            id: card.id,
            list_id: card.list_id,
            content: card.content,
            position: card.position,
        }),
    ))
}

/// Deletes a card
///
/// Cards remaining in the list keep their positions.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member of the card's board
/// - `404 Not Found`: Card does not exist
pub async fn delete_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(card_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let board_id = authorize_card(&state, card_id, auth.user_id).await?;

    Card::delete(&state.db, card_id).await?;

    tracing::info!(card_id = %card_id, board_id = %board_id, "Card deleted");

    state.channels.notify(board_id);

    Ok(Json(MessageResponse::new("Card removed")))
}

/// Moves a card to a list and position
///
/// The destination list id and position are written verbatim with no
/// bounds validation and no renumbering of the source list. Membership is
/// checked against the destination list's board, which is also where the
/// fan-out signal goes.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member of the destination board
/// - `404 Not Found`: Destination list does not exist
pub async fn move_card(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<MoveCardRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let board_id = List::board_id_of(&state.db, req.new_list_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("List not found".to_string()))?;

    require_board_membership(&state.db, board_id, auth.user_id).await?;

    Card::move_to(&state.db, req.card_id, req.new_list_id, req.new_position).await?;

    tracing::info!(
        card_id = %req.card_id,
        new_list_id = %req.new_list_id,
        new_position = req.new_position,
        "Card moved"
    );

    state.channels.notify(board_id);

    Ok(Json(MessageResponse::new("Card moved successfully")))
}

/// Returns a card with its comments
///
/// Comments come back ordered by creation time ascending, each joined
/// with the author's email.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member of the card's board
/// - `404 Not Found`: Card does not exist
pub async fn get_card_details(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(card_id): Path<Uuid>,
) -> ApiResult<Json<CardDetailsResponse>> {
    authorize_card(&state, card_id, auth.user_id).await?;

    let card = Card::find_by_id(&state.db, card_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Card not found".to_string()))?;

    let comments = CommentWithAuthor::list_for_card(&state.db, card_id).await?;

    Ok(Json(CardDetailsResponse { card, comments }))
}

/// Applies a partial update to a card's details
///
/// Only the provided fields are written; an empty update set skips the
/// write entirely. The fan-out fires either way, matching every other
/// successful mutation on the board.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a member of the card's board
/// - `404 Not Found`: Card does not exist
pub async fn update_card_details(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(card_id): Path<Uuid>,
    Json(req): Json<UpdateCardDetailsRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let board_id = authorize_card(&state, card_id, auth.user_id).await?;

    Card::update(
        &state.db,
        card_id,
        UpdateCard {
            content: req.content,
            description: req.description,
            due_date: req.due_date,
        },
    )
    .await?;

    tracing::info!(card_id = %card_id, board_id = %board_id, "Card details updated");

    state.channels.notify(board_id);

    Ok(Json(MessageResponse::new("Card details updated")))
}
