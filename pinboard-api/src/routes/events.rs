/// Real-time board event stream (SSE)
///
/// Opening this stream joins the board's broadcast group; dropping the
/// connection leaves it. The server pushes one unparameterized
/// `board-updated` event per fan-out signal - no diff, no state - and the
/// client responds by refetching the full board snapshot.
///
/// # Endpoint
///
/// `GET /boards/:id/events`
///
/// # Response
///
/// ```text
/// HTTP/1.1 200 OK
/// Content-Type: text/event-stream
/// Cache-Control: no-cache
///
/// event: board-updated
/// data: {}
/// ```
///
/// Keep-alive comments are injected automatically between signals.
///
/// # Example
///
/// ```bash
/// curl -N -H "Authorization: Bearer <token>" \
///   "http://localhost:8080/boards/{board_id}/events"
/// ```

use crate::{app::AppState, error::ApiError, routes::boards::ensure_member_of_existing_board};
use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension,
};
use futures::stream::{self, Stream};
use pinboard_shared::auth::context::AuthContext;
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;
use uuid::Uuid;

/// SSE event name pushed on every board mutation
const BOARD_UPDATED: &str = "board-updated";

/// Board event stream handler
///
/// Validates board existence and membership, then subscribes the
/// connection to the board's broadcast group.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid authentication
/// - `403 Forbidden`: Caller is not a member of the board
/// - `404 Not Found`: Board does not exist
pub async fn board_events(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    ensure_member_of_existing_board(&state.db, board_id, auth.user_id).await?;

    tracing::info!(%board_id, user_id = %auth.user_id, "Board event subscription opened");

    let rx = state.channels.subscribe(board_id);

    let stream = stream::unfold(rx, move |mut rx| async move {
        match rx.recv().await {
            Ok(_) => {
                let event = Event::default().event(BOARD_UPDATED).data("{}");
                Some((Ok(event), rx))
            }
            Err(RecvError::Lagged(skipped)) => {
                // The signal carries no payload, so missed signals coalesce
                // into the one we emit now
                tracing::debug!(%board_id, skipped, "Subscriber lagged, coalescing signals");
                let event = Event::default().event(BOARD_UPDATED).data("{}");
                Some((Ok(event), rx))
            }
            Err(RecvError::Closed) => None,
        }
    });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
