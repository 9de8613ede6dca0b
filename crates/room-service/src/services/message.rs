//! Message router
//!
//! Validates and persists messages, edits, soft deletions, and reactions.
//! Callers broadcast the returned message; nothing here talks to connections.

use room_core::traits::MessageQuery;
use room_core::{DomainError, Message, MessageType, Participant, Permissions, Room, Snowflake};
use tracing::{info, instrument};
use validator::Validate;

use crate::dto::{
    EditMessageRequest, HistoryQuery, HistoryResponse, MessageResponse, ReactionRequest,
    SearchQuery, SendMessageRequest,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Outcome of a reaction toggle
#[derive(Debug, Clone)]
pub struct ReactionToggle {
    pub message: MessageResponse,
    pub added: bool,
}

/// Message router service
pub struct MessageRouter<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageRouter<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Validate and persist a new message
    ///
    /// Clears the sender's typing indicator in the room before returning.
    #[instrument(skip(self, request))]
    pub async fn send(
        &self,
        room_id: Snowflake,
        sender_id: Snowflake,
        request: SendMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let room = self.load_room(room_id).await?;
        let sender = self.require_participant(room_id, sender_id).await?;

        if sender.muted {
            return Err(DomainError::ParticipantMuted.into());
        }
        if !sender.has(Permissions::SEND_MESSAGES) {
            return Err(DomainError::MissingPermission("SEND_MESSAGES").into());
        }
        if request.message_type == MessageType::System {
            return Err(DomainError::SystemMessageNotAllowed.into());
        }

        let content = self.checked_content(&request.content, request.message_type)?;

        let metadata = if request.message_type.requires_attachment() {
            self.check_attachment(&room, &request).await?;
            request.metadata
        } else {
            None
        };

        if let Some(reply_to) = request.reply_to_id {
            let valid = self
                .ctx
                .message_store()
                .find_message(reply_to)
                .await?
                .is_some_and(|target| target.room_id == room_id && !target.is_deleted());
            if !valid {
                return Err(DomainError::InvalidReplyTarget(reply_to).into());
            }
        }

        let mut message = Message::new(
            self.ctx.generate_id(),
            room_id,
            sender_id,
            content,
            request.message_type,
        );
        message.metadata = metadata;
        message.reply_to = request.reply_to_id;

        self.ctx.message_store().create_message(&message).await?;
        self.ctx.presence().stop_typing(room_id, sender_id);

        info!(message_id = %message.id, room_id = %room_id, "Message sent");

        Ok(MessageResponse::from(message))
    }

    /// Replace the content of a live message (sender only)
    #[instrument(skip(self, request))]
    pub async fn edit(
        &self,
        message_id: Snowflake,
        actor_id: Snowflake,
        request: EditMessageRequest,
    ) -> ServiceResult<MessageResponse> {
        let mut message = self.load_live_message(message_id).await?;

        if message.sender_id != actor_id {
            return Err(DomainError::NotMessageAuthor.into());
        }

        let content = self.checked_content(&request.content, message.message_type)?;
        message.edit(content);
        self.ctx.message_store().update_message(&message).await?;

        info!(message_id = %message_id, "Message edited");

        Ok(MessageResponse::from(message))
    }

    /// Soft-delete a message (sender, or anyone holding `DELETE_ANY_MESSAGE`)
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        message_id: Snowflake,
        actor_id: Snowflake,
    ) -> ServiceResult<MessageResponse> {
        let mut message = self.load_live_message(message_id).await?;

        if message.sender_id != actor_id {
            let actor = self.require_participant(message.room_id, actor_id).await?;
            if !actor.has(Permissions::DELETE_ANY_MESSAGE) {
                return Err(DomainError::MissingPermission("DELETE_ANY_MESSAGE").into());
            }
        }

        message.soft_delete();
        self.ctx.message_store().update_message(&message).await?;

        info!(message_id = %message_id, actor_id = %actor_id, "Message deleted");

        Ok(MessageResponse::from(message))
    }

    /// Add the (actor, emoji) reaction, or remove it if present
    #[instrument(skip(self, request))]
    pub async fn toggle_reaction(
        &self,
        message_id: Snowflake,
        actor_id: Snowflake,
        request: ReactionRequest,
    ) -> ServiceResult<ReactionToggle> {
        request.validate()?;

        let message = self.load_live_message(message_id).await?;
        self.require_participant(message.room_id, actor_id).await?;

        let (message, added) = self
            .ctx
            .message_store()
            .toggle_reaction(message_id, actor_id, &request.emoji)
            .await?
            .ok_or(DomainError::MessageNotFound(message_id))?;

        info!(message_id = %message_id, emoji = %request.emoji, added, "Reaction toggled");

        Ok(ReactionToggle {
            message: MessageResponse::from(message),
            added,
        })
    }

    /// A page of history; page 1 is the newest, each page reads oldest first
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        room_id: Snowflake,
        query: HistoryQuery,
    ) -> ServiceResult<HistoryResponse> {
        query.validate()?;
        self.load_room(room_id).await?;

        self.page(
            room_id,
            MessageQuery::page(query.page, query.page_size),
            query.page,
            query.page_size,
        )
        .await
    }

    /// Case-insensitive content search, paged like history
    #[instrument(skip(self, query))]
    pub async fn search(
        &self,
        room_id: Snowflake,
        query: SearchQuery,
    ) -> ServiceResult<HistoryResponse> {
        query.validate()?;
        self.load_room(room_id).await?;

        let needle = query.query.trim();
        self.page(
            room_id,
            MessageQuery::page(query.page, query.page_size).with_search(needle),
            query.page,
            query.page_size,
        )
        .await
    }

    /// The newest `limit` messages, oldest first
    #[instrument(skip(self))]
    pub async fn recent(&self, room_id: Snowflake, limit: u32) -> ServiceResult<Vec<MessageResponse>> {
        let page = self
            .page(room_id, MessageQuery::page(1, limit), 1, limit)
            .await?;
        Ok(page.messages)
    }

    /// Room a message belongs to (deleted messages included)
    pub async fn room_of(&self, message_id: Snowflake) -> ServiceResult<Snowflake> {
        self.ctx
            .message_store()
            .find_message(message_id)
            .await?
            .map(|m| m.room_id)
            .ok_or_else(|| DomainError::MessageNotFound(message_id).into())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn page(
        &self,
        room_id: Snowflake,
        query: MessageQuery,
        page: u32,
        page_size: u32,
    ) -> ServiceResult<HistoryResponse> {
        let (mut messages, total) = self
            .ctx
            .message_store()
            .find_by_room(room_id, query)
            .await?;
        messages.reverse();

        Ok(HistoryResponse {
            room_id,
            messages: messages.into_iter().map(MessageResponse::from).collect(),
            total,
            page,
            page_size,
            has_more: u64::from(page) * u64::from(page_size) < total,
        })
    }

    fn checked_content(&self, raw: &str, message_type: MessageType) -> ServiceResult<String> {
        let content = raw.trim();
        let max = self.ctx.config().max_message_length;

        if content.chars().count() > max {
            return Err(DomainError::ContentTooLong { max }.into());
        }
        if content.is_empty() && !message_type.requires_attachment() {
            return Err(DomainError::EmptyContent.into());
        }
        Ok(content.to_string())
    }

    async fn check_attachment(&self, room: &Room, request: &SendMessageRequest) -> ServiceResult<()> {
        if !room.settings.allow_file_uploads {
            return Err(DomainError::FileUploadsDisabled.into());
        }
        let metadata = request.metadata.as_ref().ok_or_else(|| {
            DomainError::AttachmentRejected("a file reference is required".to_string())
        })?;
        self.ctx
            .attachments()
            .verify(request.message_type, metadata)
            .await?;
        Ok(())
    }

    async fn load_room(&self, room_id: Snowflake) -> ServiceResult<Room> {
        self.ctx
            .room_store()
            .find_room(room_id)
            .await?
            .ok_or_else(|| DomainError::RoomNotFound(room_id).into())
    }

    async fn load_live_message(&self, message_id: Snowflake) -> ServiceResult<Message> {
        self.ctx
            .message_store()
            .find_message(message_id)
            .await?
            .filter(|m| !m.is_deleted())
            .ok_or_else(|| DomainError::MessageNotFound(message_id).into())
    }

    async fn require_participant(
        &self,
        room_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Participant> {
        self.ctx
            .room_store()
            .find_participant(room_id, user_id)
            .await?
            .ok_or_else(|| DomainError::NotParticipant(room_id).into())
    }
}
