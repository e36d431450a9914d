/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login)
/// - `boards`: Board listing, creation, snapshot, membership invites
/// - `lists`: List creation, deletion, reordering
/// - `cards`: Card creation, deletion, moves, details
/// - `comments`: Card comments
/// - `events`: Real-time board event stream (SSE)

use serde::{Deserialize, Serialize};

pub mod auth;
pub mod boards;
pub mod cards;
pub mod comments;
pub mod events;
pub mod health;
pub mod lists;

/// Generic message response used by mutations that return no entity
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub msg: String,
}

impl MessageResponse {
    /// Creates a message response
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}
