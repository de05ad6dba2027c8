use thiserror::Error;
use uuid::Uuid;

use crate::models::RecordKind;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Malformed document: {0}")]
    Document(#[from] serde_json::Error),

    #[error("Unknown record kind: {0}")]
    UnknownKind(String),

    #[error("Not found")]
    NotFound,

    #[error("Record {id} is a {found} document, cannot apply a {expected} patch")]
    KindMismatch {
        id: Uuid,
        expected: RecordKind,
        found: RecordKind,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;
