/// Client-side board state with speculative reordering
///
/// [`BoardState`] holds the last authoritative snapshot and applies drag
/// gestures to it locally, mirroring the server's positional semantics so
/// the speculative render matches what the next refetch will show:
///
/// - reordering lists assigns position = index for each id in the new
///   order, then re-sorts by position ascending
/// - moving a card writes the destination list id and position verbatim
///   and does NOT renumber the source list, so position sequences may
///   become gapped - exactly like the server
///
/// The state is always superseded by server truth: on request failure the
/// caller replaces it with a fresh snapshot, and on success the fan-out
/// signal triggers a refetch anyway.

use pinboard_shared::models::board::{BoardDetail, ListWithCards};
use uuid::Uuid;

/// In-memory copy of a board snapshot
#[derive(Debug, Clone)]
pub struct BoardState {
    detail: BoardDetail,
}

impl BoardState {
    /// Wraps an authoritative snapshot
    pub fn new(detail: BoardDetail) -> Self {
        Self { detail }
    }

    /// The current (possibly speculative) snapshot
    pub fn board(&self) -> &BoardDetail {
        &self.detail
    }

    /// Replaces the state with a fresh authoritative snapshot
    pub fn replace(&mut self, detail: BoardDetail) {
        self.detail = detail;
    }

    /// List ids in current display order
    pub fn list_order(&self) -> Vec<Uuid> {
        self.detail.lists.iter().map(|l| l.id).collect()
    }

    /// Finds a list by id
    pub fn list(&self, list_id: Uuid) -> Option<&ListWithCards> {
        self.detail.lists.iter().find(|l| l.id == list_id)
    }

    /// Applies a speculative list reorder
    ///
    /// Sets position = index for each id in `ordered_ids`; ids not in the
    /// order keep their old positions. Lists are then re-sorted by
    /// position ascending, which is the order the server's snapshot read
    /// would produce.
    pub fn apply_list_order(&mut self, ordered_ids: &[Uuid]) {
        for list in &mut self.detail.lists {
            if let Some(index) = ordered_ids.iter().position(|id| *id == list.id) {
                list.position = index as i32;
            }
        }

        self.detail.lists.sort_by_key(|l| l.position);
    }

    /// Applies a speculative card move
    ///
    /// Removes the card from its current list, writes the destination
    /// list id and position verbatim, and re-sorts the destination list
    /// by position ascending. Cards remaining in the source list keep
    /// their positions.
    ///
    /// # Returns
    ///
    /// False if the card is not present in the snapshot (the move is then
    /// a no-op locally; the server response and refetch settle it)
    pub fn apply_card_move(
        &mut self,
        card_id: Uuid,
        new_list_id: Uuid,
        new_position: i32,
    ) -> bool {
        let mut moved = None;
        for list in &mut self.detail.lists {
            if let Some(index) = list.cards.iter().position(|c| c.id == card_id) {
                moved = Some(list.cards.remove(index));
                break;
            }
        }

        let Some(mut card) = moved else {
            return false;
        };

        card.list_id = new_list_id;
        card.position = new_position;

        if let Some(target) = self
            .detail
            .lists
            .iter_mut()
            .find(|l| l.id == new_list_id)
        {
            target.cards.push(card);
            target.cards.sort_by_key(|c| c.position);
        }

        true
    }
}
