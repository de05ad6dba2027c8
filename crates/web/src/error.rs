use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use export::ExportError;
use serde_json::json;
use std::fmt;
use storage::error::StorageError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Validation(ValidationErrors),
    Export(ExportError),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::Export(e) => write!(f, "Export error: {}", e),
        }
    }
}

fn validation_details(errors: &ValidationErrors) -> Vec<String> {
    errors
        .errors()
        .iter()
        .flat_map(|(field, kind)| {
            let messages: Vec<String> = match kind {
                validator::ValidationErrorsKind::Field(errors) => errors
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect(),
                validator::ValidationErrorsKind::Struct(nested) => validation_details(nested),
                validator::ValidationErrorsKind::List(items) => items
                    .values()
                    .flat_map(|nested| validation_details(nested))
                    .collect(),
            };
            messages
                .into_iter()
                .map(move |message| format!("{}: {}", field, message))
        })
        .collect()
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status_code = match &self {
            Self::Storage(StorageError::NotFound) => StatusCode::NOT_FOUND,
            Self::Storage(StorageError::KindMismatch { .. }) => StatusCode::CONFLICT,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Export(ExportError::UnknownStyle(_)) => StatusCode::BAD_REQUEST,
            Self::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = match &self {
            Self::Storage(StorageError::NotFound) => {
                json!({
                    "error": "Resource not found"
                })
            }
            Self::Storage(e @ StorageError::KindMismatch { .. }) => {
                json!({
                    "error": e.to_string()
                })
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                json!({
                    "error": "An internal error occurred"
                })
            }
            Self::Validation(errors) => {
                json!({
                    "error": "Validation failed",
                    "details": validation_details(errors)
                })
            }
            Self::Export(e @ ExportError::UnknownStyle(_)) => {
                json!({
                    "error": e.to_string()
                })
            }
            Self::Export(e) => {
                tracing::error!("Export error: {:?}", e);
                json!({
                    "error": "Failed to generate PDF"
                })
            }
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

impl From<ExportError> for WebError {
    fn from(error: ExportError) -> Self {
        Self::Export(error)
    }
}

pub type WebResult<T> = Result<T, WebError>;
