/// Optimistic-update session and real-time synchronization
///
/// [`BoardSession`] ties an [`ApiClient`] to a [`BoardState`] and runs the
/// reconciliation protocol for drag gestures: apply the speculative change
/// locally, issue the request, and on failure throw the speculative state
/// away and refetch the authoritative snapshot. On success the next
/// fan-out signal triggers a refetch anyway.
///
/// [`watch_board`] opens the board's SSE stream and yields one item per
/// `board-updated` signal; callers refresh their session on each item.

use crate::api::{ApiClient, ClientError};
use crate::state::BoardState;
use futures::stream::{Stream, StreamExt};
use std::collections::VecDeque;
use uuid::Uuid;

/// Marker yielded by [`watch_board`] for every fan-out signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardUpdated;

/// A live view of one board: API client + local state
#[derive(Debug)]
pub struct BoardSession {
    api: ApiClient,
    board_id: Uuid,
    state: BoardState,
}

impl BoardSession {
    /// Opens a session by fetching the initial snapshot
    pub async fn open(api: ApiClient, board_id: Uuid) -> Result<Self, ClientError> {
        let detail = api.fetch_board(board_id).await?;

        Ok(Self {
            api,
            board_id,
            state: BoardState::new(detail),
        })
    }

    /// The board this session tracks
    pub fn board_id(&self) -> Uuid {
        self.board_id
    }

    /// The current (possibly speculative) state
    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Refetches the authoritative snapshot, discarding speculative state
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let detail = self.api.fetch_board(self.board_id).await?;
        self.state.replace(detail);

        Ok(())
    }

    /// Reorders lists optimistically
    ///
    /// The new order is rendered immediately; if the server rejects the
    /// request the snapshot is refetched and the error returned.
    pub async fn reorder_lists(&mut self, ordered_ids: Vec<Uuid>) -> Result<(), ClientError> {
        self.state.apply_list_order(&ordered_ids);

        match self
            .api
            .reorder_lists(self.board_id, &ordered_ids)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(%err, "Reorder rejected, resynchronizing");
                self.refresh().await?;
                Err(err)
            }
        }
    }

    /// Moves a card optimistically
    pub async fn move_card(
        &mut self,
        card_id: Uuid,
        new_list_id: Uuid,
        new_position: i32,
    ) -> Result<(), ClientError> {
        self.state
            .apply_card_move(card_id, new_list_id, new_position);

        match self
            .api
            .move_card(card_id, new_list_id, new_position)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) => {
                tracing::warn!(%err, "Card move rejected, resynchronizing");
                self.refresh().await?;
                Err(err)
            }
        }
    }
}

/// One event parsed from an SSE stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Event name from the `event:` field
    pub event: String,

    /// Concatenated `data:` lines
    pub data: String,
}

/// Incremental parser for `text/event-stream` payloads
///
/// Events are separated by a blank line; `event:` and `data:` fields are
/// collected, comment lines (leading ':') and unknown fields are ignored.
#[derive(Debug, Default)]
pub struct EventStreamParser {
    buffer: String,
}

impl EventStreamParser {
    /// Creates an empty parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every event completed by it
    pub fn push(&mut self, chunk: &str) -> Vec<SseEvent> {
        self.buffer.push_str(chunk);

        let mut events = Vec::new();

        while let Some(boundary) = self.buffer.find("\n\n") {
            let raw: String = self.buffer.drain(..boundary + 2).collect();

            if let Some(event) = Self::parse_block(&raw) {
                events.push(event);
            }
        }

        events
    }

    fn parse_block(block: &str) -> Option<SseEvent> {
        let mut event = String::new();
        let mut data_lines = Vec::new();

        for line in block.lines() {
            if line.starts_with(':') {
                // Keep-alive comment
                continue;
            }

            if let Some(value) = line.strip_prefix("event:") {
                event = value.trim_start().to_string();
            } else if let Some(value) = line.strip_prefix("data:") {
                data_lines.push(value.trim_start().to_string());
            }
        }

        if event.is_empty() && data_lines.is_empty() {
            return None;
        }

        Some(SseEvent {
            event,
            data: data_lines.join("\n"),
        })
    }
}

/// Opens a board's SSE stream and yields one item per fan-out signal
///
/// The stream ends when the server closes the connection or the transport
/// fails; callers reconnect by calling `watch_board` again and refetching
/// the snapshot (stale state is always safe to refetch away).
///
/// # Example
///
/// ```no_run
/// use futures::StreamExt;
/// use pinboard_client::api::ApiClient;
/// use pinboard_client::sync::{watch_board, BoardSession};
/// # use uuid::Uuid;
///
/// # async fn example(api: ApiClient, board_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let mut session = BoardSession::open(api.clone(), board_id).await?;
/// let mut signals = std::pin::pin!(watch_board(&api, board_id).await?);
///
/// while let Some(_) = signals.next().await {
///     session.refresh().await?;
/// }
/// # Ok(())
/// # }
/// ```
pub async fn watch_board(
    api: &ApiClient,
    board_id: Uuid,
) -> Result<impl Stream<Item = BoardUpdated>, ClientError> {
    let token = api.token().ok_or(ClientError::NotAuthenticated)?;

    let response = api
        .http()
        .get(format!("{}/boards/{}/events", api.base_url(), board_id))
        .bearer_auth(token)
        .header(reqwest::header::ACCEPT, "text/event-stream")
        .send()
        .await?
        .error_for_status()?;

    let body = response.bytes_stream();

    let stream = futures::stream::unfold(
        (body, EventStreamParser::new(), VecDeque::new()),
        |(mut body, mut parser, mut pending)| async move {
            loop {
                if let Some(signal) = pending.pop_front() {
                    return Some((signal, (body, parser, pending)));
                }

                match body.next().await {
                    Some(Ok(chunk)) => {
                        let text = String::from_utf8_lossy(&chunk);
                        for event in parser.push(&text) {
                            if event.event == "board-updated" {
                                pending.push_back(BoardUpdated);
                            }
                        }
                    }
                    Some(Err(err)) => {
                        tracing::warn!(%err, "Event stream transport error");
                        return None;
                    }
                    None => return None,
                }
            }
        },
    );

    Ok(stream)
}
