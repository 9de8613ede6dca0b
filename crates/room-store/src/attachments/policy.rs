//! Allowlist-based attachment checks
//!
//! Only the file reference (name, size, mime type) is inspected; the bytes
//! are uploaded and stored elsewhere.

use async_trait::async_trait;
use tracing::debug;

use room_common::StorageConfig;
use room_core::entities::{MessageMetadata, MessageType};
use room_core::error::DomainError;
use room_core::traits::AttachmentService;

const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "png", "gif"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "webm"];
const FILE_EXTENSIONS: &[&str] = &[
    "jpeg", "jpg", "png", "gif", "pdf", "doc", "docx", "txt", "mp3", "wav", "mp4", "webm",
];

const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "text/plain",
    "audio/mpeg",
    "audio/wav",
    "audio/x-wav",
    "audio/webm",
    "video/mp4",
    "video/webm",
];

/// Attachment validation by extension, mime type, and size
#[derive(Debug, Clone)]
pub struct AttachmentPolicy {
    max_file_size: u64,
}

impl AttachmentPolicy {
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.max_file_size_bytes())
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    fn allowed_extensions(message_type: MessageType) -> &'static [&'static str] {
        match message_type {
            MessageType::Image => IMAGE_EXTENSIONS,
            MessageType::Voice => AUDIO_EXTENSIONS,
            _ => FILE_EXTENSIONS,
        }
    }

    fn check(&self, message_type: MessageType, metadata: &MessageMetadata) -> Result<(), String> {
        let file_name = metadata
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or("file name is required")?;

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .ok_or("file name has no extension")?;

        if !Self::allowed_extensions(message_type).contains(&extension.as_str()) {
            return Err(format!(
                ".{extension} files are not allowed for {} messages",
                message_type.as_str()
            ));
        }

        if let Some(mime) = metadata.mime_type.as_deref() {
            let mime = mime.to_ascii_lowercase();
            if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
                return Err(format!("mime type {mime} is not allowed"));
            }
        }

        match metadata.file_size {
            Some(0) => Err("file is empty".to_string()),
            Some(size) if size > self.max_file_size => Err(format!(
                "file exceeds the {} byte limit",
                self.max_file_size
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl AttachmentService for AttachmentPolicy {
    async fn verify(
        &self,
        message_type: MessageType,
        metadata: &MessageMetadata,
    ) -> Result<(), DomainError> {
        if !message_type.requires_attachment() {
            return Ok(());
        }

        self.check(message_type, metadata).map_err(|reason| {
            debug!(message_type = message_type.as_str(), %reason, "Attachment rejected");
            DomainError::AttachmentRejected(reason)
        })
    }
}
