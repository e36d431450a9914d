//! # Pinboard Client Library
//!
//! Client-side state and transport for the Pinboard board API:
//!
//! - [`api`]: typed HTTP client over every endpoint (reqwest)
//! - [`state`]: in-memory board snapshot with speculative reordering for
//!   drag-and-drop, mirroring the server's positional semantics
//! - [`sync`]: optimistic-update session and the SSE watcher that turns
//!   fan-out signals into snapshot refetches
//!
//! ## Reconciliation model
//!
//! A drag gesture is applied to the local snapshot immediately and the
//! matching request is sent to the server. If the request fails, the
//! speculative state is discarded and the authoritative snapshot is
//! refetched. If it succeeds, the subsequent `board-updated` signal
//! triggers a refetch anyway, so speculative state never outlives one
//! round trip.

pub mod api;
pub mod state;
pub mod sync;
