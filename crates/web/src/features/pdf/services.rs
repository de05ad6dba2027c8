use export::{ExportStyle, ExportedFile};

use crate::error::WebResult;
use crate::state::AppState;

/// Render the live list in `style`
pub async fn export_athletes(state: &AppState, style: &str) -> WebResult<ExportedFile> {
    let style: ExportStyle = style.parse()?;
    let records = state.store.current();

    Ok(state.exporter.export(style, &records).await?)
}
