/// Real-time fan-out for board changes
///
/// Each board has an implicit broadcast group keyed by board id. Clients
/// join a group by opening the board's event stream; every successful
/// board-scoped mutation sends a single untyped signal to the group. The
/// signal carries no diff and no state - it only means "refetch this
/// board", so subscribers respond by pulling a fresh snapshot.
///
/// Signals are broadcast with `tokio::sync::broadcast`: delivery is
/// at-most-once and unordered relative to the HTTP response of the
/// triggering action, and a client may receive the echo of its own
/// mutation. A lagged receiver coalesces missed signals into one, which
/// is harmless for an invalidation nudge.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use uuid::Uuid;

/// The unparameterized "board changed" signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSignal;

/// Buffered signals per board channel; receivers that fall further behind
/// lag and coalesce
const CHANNEL_CAPACITY: usize = 16;

/// Subscription registry: board id to broadcast channel
///
/// Channels are created lazily on first subscription and pruned once a
/// notification finds no remaining receivers. Cloning the registry is
/// cheap; all clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct BoardChannels {
    inner: Arc<Mutex<HashMap<Uuid, broadcast::Sender<BoardSignal>>>>,
}

impl BoardChannels {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, broadcast::Sender<BoardSignal>>> {
        // A poisoned lock only means a panicked subscriber; the map itself
        // is still valid
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Joins a board's broadcast group
    ///
    /// The subscription lives as long as the returned receiver; dropping
    /// it leaves the group.
    pub fn subscribe(&self, board_id: Uuid) -> broadcast::Receiver<BoardSignal> {
        let mut map = self.lock();
        map.entry(board_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Sends one "board changed" signal to the board's group
    ///
    /// # Returns
    ///
    /// Number of active subscribers that received the signal (0 if the
    /// board has no subscribers)
    pub fn notify(&self, board_id: Uuid) -> usize {
        let mut map = self.lock();

        let Some(sender) = map.get(&board_id) else {
            return 0;
        };

        match sender.send(BoardSignal) {
            Ok(subscriber_count) => {
                tracing::debug!(%board_id, subscriber_count, "Board change signal sent");
                subscriber_count
            }
            Err(_) => {
                // Last receiver is gone; drop the channel
                map.remove(&board_id);
                tracing::debug!(%board_id, "No subscribers, channel pruned");
                0
            }
        }
    }
}

#[cfg(test)]
impl BoardChannels {
    /// Number of live channels, for tests
    fn channel_count(&self) -> usize {
        self.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_reaches_subscriber() {
        let channels = BoardChannels::new();
        let board_id = Uuid::new_v4();

        let mut rx = channels.subscribe(board_id);

        let count = channels.notify(board_id);
        assert_eq!(count, 1);

        let signal = rx.recv().await.unwrap();
        assert_eq!(signal, BoardSignal);
    }

    #[tokio::test]
    async fn test_notify_without_subscribers() {
        let channels = BoardChannels::new();

        assert_eq!(channels.notify(Uuid::new_v4()), 0);
    }

    #[tokio::test]
    async fn test_notify_reaches_all_subscribers() {
        let channels = BoardChannels::new();
        let board_id = Uuid::new_v4();

        let mut rx1 = channels.subscribe(board_id);
        let mut rx2 = channels.subscribe(board_id);
        let mut rx3 = channels.subscribe(board_id);

        let count = channels.notify(board_id);
        assert_eq!(count, 3);

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
        assert!(rx3.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_boards_are_isolated() {
        let channels = BoardChannels::new();
        let board_a = Uuid::new_v4();
        let board_b = Uuid::new_v4();

        let mut rx_a = channels.subscribe(board_a);
        let mut rx_b = channels.subscribe(board_b);

        channels.notify(board_a);

        assert!(rx_a.recv().await.is_ok());
        // Board B saw nothing
        assert!(matches!(
            rx_b.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_channel_pruned_after_last_receiver_drops() {
        let channels = BoardChannels::new();
        let board_id = Uuid::new_v4();

        let rx = channels.subscribe(board_id);
        assert_eq!(channels.channel_count(), 1);

        drop(rx);
        assert_eq!(channels.notify(board_id), 0);
        assert_eq!(channels.channel_count(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_registry() {
        let channels = BoardChannels::new();
        let board_id = Uuid::new_v4();

        let mut rx = channels.subscribe(board_id);

        let clone = channels.clone();
        assert_eq!(clone.notify(board_id), 1);
        assert!(rx.recv().await.is_ok());
    }
}
