//! `MessageStore` for [`MemoryStore`]

use async_trait::async_trait;
use tracing::{debug, instrument};

use room_core::entities::Message;
use room_core::error::DomainError;
use room_core::traits::{MessageQuery, MessageStore, RepoResult};
use room_core::value_objects::Snowflake;

use super::store::MemoryStore;

#[async_trait]
impl MessageStore for MemoryStore {
    #[instrument(skip(self))]
    async fn find_message(&self, message_id: Snowflake) -> RepoResult<Option<Message>> {
        self.ensure_available()?;
        Ok(self.inner.messages.get(&message_id).map(|m| m.clone()))
    }

    #[instrument(skip(self, message), fields(message_id = %message.id, room_id = %message.room_id))]
    async fn create_message(&self, message: &Message) -> RepoResult<()> {
        self.ensure_available()?;
        self.ensure_room(message.room_id)?;

        self.inner.messages.insert(message.id, message.clone());
        self.inner
            .room_messages
            .entry(message.room_id)
            .or_default()
            .insert(message.id);
        debug!("Message stored");
        Ok(())
    }

    #[instrument(skip(self, message), fields(message_id = %message.id))]
    async fn update_message(&self, message: &Message) -> RepoResult<()> {
        self.ensure_available()?;
        let mut entry = self
            .inner
            .messages
            .get_mut(&message.id)
            .ok_or(DomainError::MessageNotFound(message.id))?;

        // Deletion is sticky even if a stale copy is written back
        let deleted_at = entry.deleted_at.or(message.deleted_at);
        *entry = message.clone();
        entry.deleted_at = deleted_at;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn toggle_reaction(
        &self,
        message_id: Snowflake,
        user_id: Snowflake,
        emoji: &str,
    ) -> RepoResult<Option<(Message, bool)>> {
        self.ensure_available()?;
        let Some(mut entry) = self.inner.messages.get_mut(&message_id) else {
            return Ok(None);
        };

        let added = entry.toggle_reaction(user_id, emoji);
        Ok(Some((entry.clone(), added)))
    }

    #[instrument(skip(self))]
    async fn find_by_room(
        &self,
        room_id: Snowflake,
        query: MessageQuery,
    ) -> RepoResult<(Vec<Message>, u64)> {
        self.ensure_available()?;
        let ids: Vec<Snowflake> = self
            .inner
            .room_messages
            .get(&room_id)
            .map(|set| set.iter().rev().copied().collect())
            .unwrap_or_default();

        let matching: Vec<Message> = ids
            .into_iter()
            .filter_map(|id| self.inner.messages.get(&id).map(|m| m.clone()))
            .filter(|m| query.include_deleted || !m.is_deleted())
            .filter(|m| {
                query
                    .search
                    .as_deref()
                    .map_or(true, |needle| m.content_matches(needle))
            })
            .collect();

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
            .collect();

        Ok((page, total))
    }
}
