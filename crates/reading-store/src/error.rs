//! Error types for the storage layer.

use reading_core::TagKind;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("database error: {0}")]
    Connection(#[from] sqlx::Error),

    /// Tag not found (or not of the expected kind).
    #[error("tag not found: {0}")]
    TagNotFound(i64),

    /// Some of the named tags do not exist.
    #[error("tags not found: {0:?}")]
    TagsNotFound(Vec<i64>),

    /// A tag with this name already exists for the kind.
    #[error("{kind} tag named {name:?} already exists")]
    DuplicateTagName { kind: TagKind, name: String },

    /// Tag still has relations and deletion was not forced.
    #[error("tag {tag_id} is used by {usage_count} entities")]
    TagInUse { tag_id: i64, usage_count: i64 },

    /// Merge between tags of different kinds.
    #[error("cannot merge tag {source_tag} into tag {target_tag} of a different kind")]
    TagKindMismatch { source_tag: i64, target_tag: i64 },

    /// Target entity missing or owned by someone else.
    #[error("{kind} {id} not found")]
    EntityNotFound { kind: TagKind, id: i64 },

    /// Several target entities missing or owned by someone else.
    #[error("{kind} entities not found: {ids:?}")]
    EntitiesNotFound { kind: TagKind, ids: Vec<i64> },

    /// Detaching a tag that is not attached.
    #[error("tag {tag_id} is not attached to entity {entity_id}")]
    RelationNotFound { tag_id: i64, entity_id: i64 },

    /// The user already has a template with this name.
    #[error("template name already in use: {0}")]
    TemplateNameTaken(String),

    /// Migration error.
    #[error("migration error: {0}")]
    MigrationError(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    /// Whether the error describes a caller mistake rather than a failure of
    /// the storage backend.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Connection(_)
                | Self::MigrationError(_)
                | Self::SerializationError(_)
                | Self::ConfigError(_)
        )
    }
}
