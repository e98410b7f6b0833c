use thiserror::Error;
use uuid::Uuid;

/// Errors raised while editing a draft.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Tag limit reached: at most {cap} hashtags allowed")]
    TagCapReached { cap: usize },
}

/// Errors from a [`crate::store::KeyValueStore`] backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Errors surfaced by [`crate::session::UploadSession`] operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Template name cannot be empty")]
    EmptyTemplateName,

    #[error("Template not found: {0}")]
    TemplateNotFound(Uuid),
}
