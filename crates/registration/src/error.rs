use export::ExportError;
use storage::error::StorageError;
use storage::models::RecordKind;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

use crate::draft::Field;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Failed to save athlete: {0}")]
    Save(#[source] StorageError),

    #[error("Failed to delete athlete: {0}")]
    Delete(#[source] StorageError),

    #[error("Failed to export PDF: {0}")]
    Export(#[from] ExportError),

    #[error("The minor's tax id must differ from the guardian's")]
    SameTaxIds,

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Athlete {0} is not in the current list")]
    NotInList(Uuid),

    #[error("Field '{field}' is not part of the {kind} form")]
    UnknownField { field: Field, kind: RecordKind },
}

pub type Result<T> = std::result::Result<T, FormError>;
