//! Room directory
//!
//! Room metadata, membership, and roles. Every membership write runs under
//! the room's lock so capacity checks cannot race.

use room_common::{hash_password, verify_password};
use room_core::{DomainError, Participant, ParticipantRole, Permissions, Room, RoomSettings, RoomType, Snowflake};
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::dto::{CreateRoomRequest, ParticipantResponse, RoomResponse, UpdateRoomRequest};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Room directory service
pub struct RoomDirectory<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> RoomDirectory<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // ========================================================================
    // Rooms
    // ========================================================================

    /// Create a room owned by `owner_id`, optionally seeding members
    #[instrument(skip(self, request))]
    pub async fn create_room(
        &self,
        owner_id: Snowflake,
        request: CreateRoomRequest,
    ) -> ServiceResult<RoomResponse> {
        request.validate()?;

        let name = request.name.trim();
        if name.is_empty() {
            return Err(ServiceError::validation("Room name must be 1-100 characters"));
        }

        let max_participants = match request.room_type {
            RoomType::Direct => RoomSettings::DIRECT_MAX_PARTICIPANTS,
            _ => request
                .max_participants
                .unwrap_or(self.ctx.config().default_max_participants),
        };

        let mut members: Vec<Snowflake> = Vec::new();
        for user_id in request.participants {
            if user_id != owner_id && !user_id.is_zero() && !members.contains(&user_id) {
                members.push(user_id);
            }
        }
        if members.len() + 1 > max_participants as usize {
            return Err(DomainError::RoomFull {
                max: max_participants,
            }
            .into());
        }

        let password_hash = match request.password.as_deref() {
            Some(password) => Some(hash_password(password)?),
            None => None,
        };

        let settings = RoomSettings {
            max_participants,
            allow_file_uploads: request.allow_file_uploads.unwrap_or(true),
            message_retention_days: request
                .message_retention_days
                .unwrap_or(RoomSettings::DEFAULT_RETENTION_DAYS),
            require_approval: request.require_approval,
            password_hash,
        };

        let mut room = Room::new(
            self.ctx.generate_id(),
            name.to_string(),
            request.room_type,
            owner_id,
            settings,
        );
        room.description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let participants: Vec<Participant> = std::iter::once(Participant::owner(room.id, owner_id))
            .chain(members.into_iter().map(|user_id| Participant::member(room.id, user_id)))
            .collect();
        self.ctx
            .room_store()
            .create_room(&room, &participants)
            .await?;

        info!(room_id = %room.id, owner_id = %owner_id, "Room created");

        Ok(RoomResponse::from(room))
    }

    #[instrument(skip(self))]
    pub async fn get_room(&self, room_id: Snowflake) -> ServiceResult<RoomResponse> {
        self.load_room(room_id).await.map(RoomResponse::from)
    }

    /// Apply a partial update
    ///
    /// Owners and admins may rename and retune a room; access settings
    /// (type, password, approval) are owner-only.
    #[instrument(skip(self, patch))]
    pub async fn update_room(
        &self,
        room_id: Snowflake,
        actor_id: Snowflake,
        patch: UpdateRoomRequest,
    ) -> ServiceResult<RoomResponse> {
        patch.validate()?;

        let _guard = self.ctx.lock_room(room_id).await;

        let mut room = self.load_room(room_id).await?;
        let actor = self.require_participant(room_id, actor_id).await?;

        if !matches!(actor.role, ParticipantRole::Owner | ParticipantRole::Admin) {
            return Err(DomainError::MissingPermission("MANAGE_ROOM").into());
        }
        if patch.touches_access() && !actor.has(Permissions::MANAGE_ROOM) {
            return Err(DomainError::NotRoomOwner.into());
        }

        if let Some(name) = patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(ServiceError::validation("Room name must be 1-100 characters"));
            }
            room.name = name.to_string();
        }

        if let Some(description) = patch.description {
            let description = description.trim();
            room.description = (!description.is_empty()).then(|| description.to_string());
        }

        if let Some(room_type) = patch.room_type {
            let crosses_direct = room_type != room.room_type
                && (room_type == RoomType::Direct || room.room_type == RoomType::Direct);
            if crosses_direct {
                return Err(ServiceError::validation(
                    "Rooms cannot be converted to or from direct rooms",
                ));
            }
            room.room_type = room_type;
        }

        if let Some(max) = patch.max_participants {
            if room.room_type == RoomType::Direct && max != RoomSettings::DIRECT_MAX_PARTICIPANTS {
                return Err(ServiceError::validation(
                    "Direct rooms hold exactly two participants",
                ));
            }
            let current = self.ctx.room_store().participant_count(room_id).await?;
            if max < current {
                return Err(ServiceError::validation(format!(
                    "Max participants cannot be below the current count ({current})"
                )));
            }
            room.settings.max_participants = max;
        }

        if let Some(allow) = patch.allow_file_uploads {
            room.settings.allow_file_uploads = allow;
        }
        if let Some(days) = patch.message_retention_days {
            room.settings.message_retention_days = days;
        }
        if let Some(require) = patch.require_approval {
            room.settings.require_approval = require;
        }
        if let Some(password) = patch.password {
            room.settings.password_hash = if password.is_empty() {
                None
            } else {
                Some(hash_password(&password)?)
            };
        }

        room.touch();
        self.ctx.room_store().update_room(&room).await?;

        info!(room_id = %room_id, actor_id = %actor_id, "Room updated");

        Ok(RoomResponse::from(room))
    }

    /// Delete a room with its participants and messages (owner only)
    #[instrument(skip(self))]
    pub async fn delete_room(&self, room_id: Snowflake, actor_id: Snowflake) -> ServiceResult<()> {
        let _guard = self.ctx.lock_room(room_id).await;

        self.load_room(room_id).await?;
        let actor = self.require_participant(room_id, actor_id).await?;
        if !actor.has(Permissions::DELETE_ROOM) {
            return Err(DomainError::NotRoomOwner.into());
        }

        self.ctx.room_store().delete_room(room_id).await?;
        self.ctx.presence().clear_room(room_id);

        info!(room_id = %room_id, actor_id = %actor_id, "Room deleted");

        Ok(())
    }

    /// Rooms the user participates in
    #[instrument(skip(self))]
    pub async fn list_rooms_for_user(&self, user_id: Snowflake) -> ServiceResult<Vec<RoomResponse>> {
        let rooms = self.ctx.room_store().find_rooms_by_user(user_id).await?;
        Ok(rooms.into_iter().map(RoomResponse::from).collect())
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Join a room; joining twice is a no-op that reports `false`
    #[instrument(skip(self, password))]
    pub async fn join_room(
        &self,
        user_id: Snowflake,
        room_id: Snowflake,
        password: Option<&str>,
    ) -> ServiceResult<(RoomResponse, bool)> {
        let _guard = self.ctx.lock_room(room_id).await;

        let room = self.load_room(room_id).await?;

        if self
            .ctx
            .room_store()
            .find_participant(room_id, user_id)
            .await?
            .is_some()
        {
            debug!("Already a participant");
            return Ok((RoomResponse::from(room), false));
        }

        if room.settings.require_approval {
            return Err(DomainError::ApprovalRequired.into());
        }
        if room.room_type == RoomType::Direct {
            return Err(DomainError::InviteOnly.into());
        }

        match (room.settings.password_hash.as_deref(), password) {
            (Some(hash), Some(password)) if verify_password(password, hash)? => {}
            (Some(_), _) => return Err(DomainError::WrongPassword.into()),
            (None, _) if !room.allows_self_join() => return Err(DomainError::InviteOnly.into()),
            (None, _) => {}
        }

        self.ensure_capacity(&room).await?;
        self.ctx
            .room_store()
            .add_participant(&Participant::member(room_id, user_id))
            .await?;

        info!(room_id = %room_id, user_id = %user_id, "User joined room");

        Ok((RoomResponse::from(room), true))
    }

    /// Leave a room; returns `false` if the user was not a participant
    #[instrument(skip(self))]
    pub async fn leave_room(&self, user_id: Snowflake, room_id: Snowflake) -> ServiceResult<bool> {
        let _guard = self.ctx.lock_room(room_id).await;

        let room = self.load_room(room_id).await?;
        if room.is_owner(user_id) {
            return Err(DomainError::CannotLeaveOwnedRoom.into());
        }

        if self
            .ctx
            .room_store()
            .find_participant(room_id, user_id)
            .await?
            .is_none()
        {
            return Ok(false);
        }

        self.ctx
            .room_store()
            .remove_participant(room_id, user_id)
            .await?;
        self.ctx.presence().stop_typing(room_id, user_id);

        info!(room_id = %room_id, user_id = %user_id, "User left room");

        Ok(true)
    }

    /// Participants in join order
    #[instrument(skip(self))]
    pub async fn get_participants(
        &self,
        room_id: Snowflake,
    ) -> ServiceResult<Vec<ParticipantResponse>> {
        self.load_room(room_id).await?;
        let participants = self.ctx.room_store().find_participants(room_id).await?;
        Ok(participants
            .into_iter()
            .map(ParticipantResponse::from)
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get_participant(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Option<Participant>> {
        Ok(self
            .ctx
            .room_store()
            .find_participant(room_id, user_id)
            .await?)
    }

    /// The user's participant record, or `NotParticipant`
    pub async fn require_participant(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Participant> {
        self.get_participant(room_id, user_id)
            .await?
            .ok_or_else(|| DomainError::NotParticipant(room_id).into())
    }

    /// Add a user on a manager's behalf (the path into approval-only,
    /// private, and direct rooms)
    #[instrument(skip(self))]
    pub async fn add_participant(
        &self,
        room_id: Snowflake,
        actor_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<(ParticipantResponse, bool)> {
        let _guard = self.ctx.lock_room(room_id).await;

        let room = self.load_room(room_id).await?;
        self.require_manager(room_id, actor_id).await?;

        if let Some(existing) = self.get_participant(room_id, user_id).await? {
            return Ok((ParticipantResponse::from(existing), false));
        }

        self.ensure_capacity(&room).await?;
        let participant = Participant::member(room_id, user_id);
        self.ctx.room_store().add_participant(&participant).await?;

        info!(room_id = %room_id, actor_id = %actor_id, user_id = %user_id, "Participant added");

        Ok((ParticipantResponse::from(participant), true))
    }

    /// Kick a participant ranked below the actor
    #[instrument(skip(self))]
    pub async fn remove_participant(
        &self,
        room_id: Snowflake,
        actor_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<()> {
        let _guard = self.ctx.lock_room(room_id).await;

        self.load_room(room_id).await?;
        let actor = self.require_manager(room_id, actor_id).await?;
        let target = self.require_target(room_id, user_id).await?;

        if !actor.outranks(&target) {
            return Err(DomainError::CannotModifyHigherRole.into());
        }

        self.ctx
            .room_store()
            .remove_participant(room_id, user_id)
            .await?;
        self.ctx.presence().stop_typing(room_id, user_id);

        info!(room_id = %room_id, actor_id = %actor_id, user_id = %user_id, "Participant removed");

        Ok(())
    }

    /// Change a participant's role; the owner role is never granted
    #[instrument(skip(self))]
    pub async fn set_role(
        &self,
        room_id: Snowflake,
        actor_id: Snowflake,
        user_id: Snowflake,
        role: ParticipantRole,
    ) -> ServiceResult<ParticipantResponse> {
        if role == ParticipantRole::Owner {
            return Err(DomainError::CannotAssignOwner.into());
        }

        let _guard = self.ctx.lock_room(room_id).await;

        self.load_room(room_id).await?;
        let actor = self.require_manager(room_id, actor_id).await?;
        let mut target = self.require_target(room_id, user_id).await?;

        if !actor.outranks(&target) || !actor.role.outranks(role) {
            return Err(DomainError::CannotModifyHigherRole.into());
        }

        target.role = role;
        self.ctx.room_store().update_participant(&target).await?;

        info!(room_id = %room_id, user_id = %user_id, role = %role, "Participant role changed");

        Ok(ParticipantResponse::from(target))
    }

    /// Mute or unmute a participant ranked below the actor
    #[instrument(skip(self))]
    pub async fn set_muted(
        &self,
        room_id: Snowflake,
        actor_id: Snowflake,
        user_id: Snowflake,
        muted: bool,
    ) -> ServiceResult<ParticipantResponse> {
        let _guard = self.ctx.lock_room(room_id).await;

        self.load_room(room_id).await?;
        let actor = self.require_manager(room_id, actor_id).await?;
        let mut target = self.require_target(room_id, user_id).await?;

        if !actor.outranks(&target) {
            return Err(DomainError::CannotModifyHigherRole.into());
        }

        target.muted = muted;
        self.ctx.room_store().update_participant(&target).await?;

        info!(room_id = %room_id, user_id = %user_id, muted, "Participant mute changed");

        Ok(ParticipantResponse::from(target))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn load_room(&self, room_id: Snowflake) -> ServiceResult<Room> {
        self.ctx
            .room_store()
            .find_room(room_id)
            .await?
            .ok_or_else(|| DomainError::RoomNotFound(room_id).into())
    }

    async fn require_manager(
        &self,
        room_id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<Participant> {
        let actor = self.require_participant(room_id, actor_id).await?;
        if actor.has(Permissions::MANAGE_PARTICIPANTS) {
            Ok(actor)
        } else {
            Err(DomainError::MissingPermission("MANAGE_PARTICIPANTS").into())
        }
    }

    async fn require_target(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Participant> {
        self.get_participant(room_id, user_id)
            .await?
            .ok_or_else(|| DomainError::ParticipantNotFound { room_id, user_id }.into())
    }

    /// Must be called with the room lock held
    async fn ensure_capacity(&self, room: &Room) -> ServiceResult<()> {
        let count = self.ctx.room_store().participant_count(room.id).await?;
        if count >= room.settings.max_participants {
            return Err(DomainError::RoomFull {
                max: room.settings.max_participants,
            }
            .into());
        }
        Ok(())
    }
}
