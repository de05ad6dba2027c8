//! HTTP surface for athlete registration: JSON CRUD, a live list over
//! server-sent events, PDF downloads and the static assets the export logo
//! is served from.

use std::path::Path;
use std::time::Duration;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod features;
pub mod routes;
pub mod state;

use features::{athletes, pdf};
use state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        athletes::handlers::list_athletes,
        athletes::handlers::stream_athletes,
        athletes::handlers::get_athlete,
        athletes::handlers::create_athlete,
        athletes::handlers::update_athlete,
        athletes::handlers::delete_athlete,
        pdf::handlers::export_athletes,
    ),
    components(
        schemas(
            storage::models::AthleteRecord,
            storage::models::SelfRegistration,
            storage::models::GuardianConsent,
            storage::models::RecordKind,
            storage::models::StoredAthlete,
            storage::dto::athlete::AthletePatch,
            storage::dto::athlete::SelfRegistrationPatch,
            storage::dto::athlete::GuardianConsentPatch,
            storage::dto::athlete::CreatedResponse,
        )
    ),
    tags(
        (name = "athletes", description = "Athlete registration endpoints"),
        (name = "export", description = "PDF export of the athlete list"),
    )
)]
pub struct ApiDoc;

/// The full application: API under `/api`, Swagger UI, and static assets
/// for everything else.
pub fn app(state: AppState, assets_dir: impl AsRef<Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(3600));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", routes::api_routes())
        .fallback_service(ServeDir::new(assets_dir))
        .layer(cors)
        .with_state(state)
}
