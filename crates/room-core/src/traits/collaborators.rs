//! External collaborators consumed by the room core

use async_trait::async_trait;

use crate::entities::{MessageMetadata, MessageType};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Resolves an opaque client credential to a user id
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Fails with [`DomainError::Unauthenticated`] when the credential is not valid.
    async fn resolve(&self, credential: &str) -> Result<Snowflake, DomainError>;
}

/// Checks file references attached to non-text messages
#[async_trait]
pub trait AttachmentService: Send + Sync {
    /// Fails with [`DomainError::AttachmentRejected`] when the reference is not acceptable.
    async fn verify(
        &self,
        message_type: MessageType,
        metadata: &MessageMetadata,
    ) -> Result<(), DomainError>;
}
