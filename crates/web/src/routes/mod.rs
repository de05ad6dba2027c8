use axum::Router;

use crate::features::{athletes, pdf};
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/athletes", athletes::routes::routes())
        .nest("/export", pdf::routes::routes())
}
