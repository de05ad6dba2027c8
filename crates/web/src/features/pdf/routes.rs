use axum::{Router, routing::get};

use super::handlers::export_athletes;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/:style", get(export_athletes))
}
