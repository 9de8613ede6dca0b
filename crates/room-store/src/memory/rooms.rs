//! `RoomStore` for [`MemoryStore`]

use async_trait::async_trait;
use tracing::{debug, instrument};

use room_core::entities::{Participant, Room};
use room_core::error::DomainError;
use room_core::traits::{RepoResult, RoomStore};
use room_core::value_objects::Snowflake;

use super::store::MemoryStore;

#[async_trait]
impl RoomStore for MemoryStore {
    #[instrument(skip(self))]
    async fn find_room(&self, room_id: Snowflake) -> RepoResult<Option<Room>> {
        self.ensure_available()?;
        Ok(self.inner.rooms.get(&room_id).map(|r| r.clone()))
    }

    #[instrument(skip(self, room, participants), fields(room_id = %room.id, participants = participants.len()))]
    async fn create_room(&self, room: &Room, participants: &[Participant]) -> RepoResult<()> {
        self.ensure_available()?;
        if participants.iter().any(|p| p.room_id != room.id) {
            return Err(DomainError::ValidationError(
                "participant belongs to another room".to_string(),
            ));
        }

        let mut list: Vec<Participant> = Vec::with_capacity(participants.len());
        for participant in participants {
            if !list.iter().any(|p| p.user_id == participant.user_id) {
                list.push(participant.clone());
            }
        }

        self.inner.participants.insert(room.id, list);
        self.inner.rooms.insert(room.id, room.clone());
        debug!("Room stored");
        Ok(())
    }

    #[instrument(skip(self, room), fields(room_id = %room.id))]
    async fn update_room(&self, room: &Room) -> RepoResult<()> {
        self.ensure_available()?;
        let mut entry = self
            .inner
            .rooms
            .get_mut(&room.id)
            .ok_or(DomainError::RoomNotFound(room.id))?;
        *entry = room.clone();
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_room(&self, room_id: Snowflake) -> RepoResult<()> {
        self.ensure_available()?;
        if self.inner.rooms.remove(&room_id).is_none() {
            return Err(DomainError::RoomNotFound(room_id));
        }

        self.inner.participants.remove(&room_id);
        let removed = self
            .inner
            .room_messages
            .remove(&room_id)
            .map(|(_, ids)| ids)
            .unwrap_or_default();
        for id in &removed {
            self.inner.messages.remove(id);
        }

        debug!(messages = removed.len(), "Room deleted with its messages");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_rooms_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Room>> {
        self.ensure_available()?;
        let room_ids: Vec<Snowflake> = self
            .inner
            .participants
            .iter()
            .filter(|entry| entry.value().iter().any(|p| p.user_id == user_id))
            .map(|entry| *entry.key())
            .collect();

        let mut rooms: Vec<Room> = room_ids
            .into_iter()
            .filter_map(|id| self.inner.rooms.get(&id).map(|r| r.clone()))
            .collect();
        rooms.sort_by_key(|r| r.id);
        Ok(rooms)
    }

    #[instrument(skip(self))]
    async fn find_participant(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<Participant>> {
        self.ensure_available()?;
        Ok(self.inner.participants.get(&room_id).and_then(|list| {
            list.iter().find(|p| p.user_id == user_id).cloned()
        }))
    }

    #[instrument(skip(self))]
    async fn find_participants(&self, room_id: Snowflake) -> RepoResult<Vec<Participant>> {
        self.ensure_available()?;
        Ok(self
            .inner
            .participants
            .get(&room_id)
            .map(|list| list.clone())
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn participant_count(&self, room_id: Snowflake) -> RepoResult<u32> {
        self.ensure_available()?;
        Ok(self
            .inner
            .participants
            .get(&room_id)
            .map_or(0, |list| list.len() as u32))
    }

    #[instrument(skip(self, participant), fields(room_id = %participant.room_id, user_id = %participant.user_id))]
    async fn add_participant(&self, participant: &Participant) -> RepoResult<()> {
        self.ensure_available()?;
        self.ensure_room(participant.room_id)?;

        let mut list = self.inner.participants.entry(participant.room_id).or_default();
        if !list.iter().any(|p| p.user_id == participant.user_id) {
            list.push(participant.clone());
        }
        Ok(())
    }

    #[instrument(skip(self, participant), fields(room_id = %participant.room_id, user_id = %participant.user_id))]
    async fn update_participant(&self, participant: &Participant) -> RepoResult<()> {
        self.ensure_available()?;
        let not_found = || DomainError::ParticipantNotFound {
            room_id: participant.room_id,
            user_id: participant.user_id,
        };

        let mut list = self
            .inner
            .participants
            .get_mut(&participant.room_id)
            .ok_or_else(not_found)?;
        let slot = list
            .iter_mut()
            .find(|p| p.user_id == participant.user_id)
            .ok_or_else(not_found)?;
        *slot = participant.clone();
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_participant(&self, room_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        self.ensure_available()?;
        if let Some(mut list) = self.inner.participants.get_mut(&room_id) {
            list.retain(|p| p.user_id != user_id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use room_core::entities::{Message, MessageType, RoomSettings, RoomType};
    use room_core::traits::MessageStore;
    use room_core::value_objects::ParticipantRole;
    use room_core::ErrorKind;

    fn room(id: i64, owner: i64) -> (Room, Participant) {
        let room = Room::new(
            Snowflake::new(id),
            format!("room-{id}"),
            RoomType::Public,
            Snowflake::new(owner),
            RoomSettings::default(),
        );
        let owner = Participant::owner(room.id, room.owner_id);
        (room, owner)
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = MemoryStore::new();
        let (room, owner) = room(1, 100);
        store.create_room(&room, &[owner.clone()]).await.unwrap();

        let found = store.find_room(room.id).await.unwrap().unwrap();
        assert_eq!(found.name, "room-1");
        assert_eq!(store.participant_count(room.id).await.unwrap(), 1);

        let p = store
            .find_participant(room.id, Snowflake::new(100))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(p.role, ParticipantRole::Owner);
    }

    #[tokio::test]
    async fn test_participants_keep_join_order_and_dedupe() {
        let store = MemoryStore::new();
        let (room, owner) = room(1, 100);
        store.create_room(&room, &[owner.clone()]).await.unwrap();

        let b = Participant::member(room.id, Snowflake::new(200));
        let c = Participant::member(room.id, Snowflake::new(300));
        store.add_participant(&b).await.unwrap();
        store.add_participant(&c).await.unwrap();
        store.add_participant(&b).await.unwrap();

        let users: Vec<i64> = store
            .find_participants(room.id)
            .await
            .unwrap()
            .iter()
            .map(|p| p.user_id.into_inner())
            .collect();
        assert_eq!(users, vec![100, 200, 300]);

        store.remove_participant(room.id, Snowflake::new(200)).await.unwrap();
        assert_eq!(store.participant_count(room.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_add_participant_requires_room() {
        let store = MemoryStore::new();
        let err = store
            .add_participant(&Participant::member(Snowflake::new(9), Snowflake::new(1)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::RoomNotFound(_)));
    }

    #[tokio::test]
    async fn test_update_participant() {
        let store = MemoryStore::new();
        let (room, owner) = room(1, 100);
        store.create_room(&room, &[owner.clone()]).await.unwrap();

        let mut member = Participant::member(room.id, Snowflake::new(200));
        store.add_participant(&member).await.unwrap();
        member.muted = true;
        store.update_participant(&member).await.unwrap();

        let stored = store
            .find_participant(room.id, member.user_id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.muted);

        let stranger = Participant::member(room.id, Snowflake::new(999));
        assert!(store.update_participant(&stranger).await.is_err());
    }

    #[tokio::test]
    async fn test_rooms_by_user() {
        let store = MemoryStore::new();
        let (a, a_owner) = room(1, 100);
        let (b, b_owner) = room(2, 200);
        store.create_room(&a, &[a_owner]).await.unwrap();
        store.create_room(&b, &[b_owner]).await.unwrap();
        store
            .add_participant(&Participant::member(b.id, Snowflake::new(100)))
            .await
            .unwrap();

        let rooms = store.find_rooms_by_user(Snowflake::new(100)).await.unwrap();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].id, a.id);

        let rooms = store.find_rooms_by_user(Snowflake::new(200)).await.unwrap();
        assert_eq!(rooms.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_room_cascades() {
        let store = MemoryStore::new();
        let (room, owner) = room(1, 100);
        store.create_room(&room, &[owner.clone()]).await.unwrap();
        let msg = Message::new(
            Snowflake::new(10),
            room.id,
            owner.user_id,
            "hi".to_string(),
            MessageType::Text,
        );
        store.create_message(&msg).await.unwrap();

        store.delete_room(room.id).await.unwrap();
        assert!(store.find_room(room.id).await.unwrap().is_none());
        assert!(store.find_participants(room.id).await.unwrap().is_empty());
        assert!(store.find_message(msg.id).await.unwrap().is_none());
        assert!(store.delete_room(room.id).await.is_err());
    }

    #[tokio::test]
    async fn test_offline_store_changes_nothing() {
        let store = MemoryStore::new();
        let (room, owner) = room(1, 100);
        store.set_available(false);

        let err = store.create_room(&room, &[owner.clone()]).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unavailable);

        store.set_available(true);
        assert!(store.find_room(room.id).await.unwrap().is_none());
        assert_eq!(store.room_count(), 0);
    }

    #[tokio::test]
    async fn test_create_room_with_members_is_all_or_nothing() {
        let store = MemoryStore::new();
        let (room, owner) = room(1, 100);
        let member = Participant::member(room.id, Snowflake::new(200));
        let stray = Participant::member(Snowflake::new(2), Snowflake::new(300));

        let err = store
            .create_room(&room, &[owner.clone(), member.clone(), stray])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
        assert_eq!(store.room_count(), 0);
        assert!(store.find_participants(room.id).await.unwrap().is_empty());

        store.create_room(&room, &[owner, member]).await.unwrap();
        assert_eq!(store.participant_count(room.id).await.unwrap(), 2);
    }
}
