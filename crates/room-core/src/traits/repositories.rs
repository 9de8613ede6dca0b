//! Store traits (ports) - the system of record for rooms and messages
//!
//! Implementations map their own failures to [`DomainError::StoreUnavailable`];
//! callers never trust in-memory copies across restarts.

use async_trait::async_trait;

use crate::entities::{Message, Participant, Room};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for store operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Room Store
// ============================================================================

#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn find_room(&self, room_id: Snowflake) -> RepoResult<Option<Room>>;

    /// Insert a room together with its initial participants (owner first)
    ///
    /// All-or-nothing: on error neither the room nor any participant is stored.
    async fn create_room(&self, room: &Room, participants: &[Participant]) -> RepoResult<()>;

    async fn update_room(&self, room: &Room) -> RepoResult<()>;

    /// Remove the room, its participants, and its messages
    async fn delete_room(&self, room_id: Snowflake) -> RepoResult<()>;

    /// Rooms the user participates in, oldest first
    async fn find_rooms_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Room>>;

    async fn find_participant(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<Participant>>;

    /// Participants ordered by join time
    async fn find_participants(&self, room_id: Snowflake) -> RepoResult<Vec<Participant>>;

    async fn participant_count(&self, room_id: Snowflake) -> RepoResult<u32>;

    async fn add_participant(&self, participant: &Participant) -> RepoResult<()>;

    async fn update_participant(&self, participant: &Participant) -> RepoResult<()>;

    async fn remove_participant(&self, room_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Message Store
// ============================================================================

/// Offset pagination over a room's messages, newest first
#[derive(Debug, Clone, Default)]
pub struct MessageQuery {
    pub offset: u64,
    pub limit: u64,
    /// Lowercased substring to match against content
    pub search: Option<String>,
    pub include_deleted: bool,
}

impl MessageQuery {
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            offset: u64::from(page.saturating_sub(1)) * u64::from(page_size),
            limit: u64::from(page_size),
            ..Self::default()
        }
    }

    pub fn with_search(mut self, needle: &str) -> Self {
        self.search = Some(needle.to_lowercase());
        self
    }
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn find_message(&self, message_id: Snowflake) -> RepoResult<Option<Message>>;

    async fn create_message(&self, message: &Message) -> RepoResult<()>;

    /// Persist content and deletion state
    async fn update_message(&self, message: &Message) -> RepoResult<()>;

    /// Atomically toggle a (user, emoji) reaction.
    ///
    /// Returns the updated message and whether the reaction was added, or
    /// `None` when the message does not exist.
    async fn toggle_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<Option<(Message, bool)>>;

    /// A page of matching messages (newest first) and the total match count
    async fn find_by_room(
        &self,
        room_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<(Vec<Message>, u64)>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_offsets() {
        let q = MessageQuery::page(1, 50);
        assert_eq!((q.offset, q.limit), (0, 50));
        let q = MessageQuery::page(3, 20);
        assert_eq!((q.offset, q.limit), (40, 20));
        assert!(!q.include_deleted);
    }

    #[test]
    fn test_search_is_lowercased() {
        let q = MessageQuery::page(1, 10).with_search("HeLLo");
        assert_eq!(q.search.as_deref(), Some("hello"));
    }
}
