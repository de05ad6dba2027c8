use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::error::WebError;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/export/{style}",
    params(
        ("style" = String, Path, description = "`tabular` for the roster table, `slip` for one consent slip per athlete")
    ),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf", body = Vec<u8>),
        (status = 400, description = "Unknown export style")
    ),
    tag = "export"
)]
pub async fn export_athletes(
    State(state): State<AppState>,
    Path(style): Path<String>,
) -> Result<Response, WebError> {
    let file = services::export_athletes(&state, &style).await?;

    tracing::info!(
        "Exported {} ({} pages, {} bytes)",
        file.filename,
        file.pages,
        file.bytes.len()
    );

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.bytes,
    )
        .into_response())
}
