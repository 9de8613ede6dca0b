//! Handler error types

use room_core::{DomainError, ErrorKind};
use room_service::ServiceError;
use thiserror::Error;

use crate::protocol::{GatewayMessage, ProtocolError};

/// Handler error type
///
/// Rendered as an `error` frame for the originating connection only.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Undecodable frame or payload
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Rule violation or store failure from a service
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl HandlerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Protocol(_) => ErrorKind::ValidationFailed,
            Self::Service(e) => e.kind(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Protocol(e) => e.code(),
            Self::Service(e) => e.error_code(),
        }
    }

    /// Build the `error` frame, echoing the request id if there was one
    pub fn to_frame(&self, id: Option<String>) -> GatewayMessage {
        GatewayMessage::error(self.kind().as_str(), self.code(), &self.to_string(), id)
    }
}

impl From<DomainError> for HandlerError {
    fn from(err: DomainError) -> Self {
        Self::Service(err.into())
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
