use axum::{
    Router,
    routing::{get, post},
};

use super::handlers::{
    create_athlete, delete_athlete, get_athlete, list_athletes, stream_athletes, update_athlete,
};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_athlete).get(list_athletes))
        .route("/stream", get(stream_athletes))
        .route(
            "/:id",
            get(get_athlete).put(update_athlete).delete(delete_athlete),
        )
}
