//! Attachment reference validation

mod policy;

pub use policy::AttachmentPolicy;
