use std::sync::Arc;

use anyhow::Context;
use export::{ExportSettings, PdfExporter};
use storage::{Database, MemoryRecordStore, PgRecordStore, RecordStore};
use web::config::{Config, StoreBackend};
use web::state::AppState;

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn RecordStore>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;

            tracing::info!(
                "Connecting to database at: {}",
                database_url.split('@').next_back().unwrap_or("unknown")
            );
            let db = Database::new(database_url)
                .await
                .context("Failed to initialize database")?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations");
            db.run_migrations()
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Database migrations completed successfully");

            let store = PgRecordStore::connect(db)
                .await
                .context("Failed to start change listener")?;
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store, records will not survive a restart");
            Ok(Arc::new(MemoryRecordStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting athlete registration server");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded successfully");

    let store = open_store(&config).await?;

    let exporter = PdfExporter::new(ExportSettings {
        logo_url: config.logo_url.clone(),
        base_url: Some(config.public_base_url.clone()),
    })
    .context("Failed to build PDF exporter")?;

    let app = web::app(AppState::new(store, exporter), &config.assets_dir);

    let bind_address = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "Swagger UI available at http://{}/swagger-ui/",
        bind_address
    );
    tracing::info!("Serving assets from {}", config.assets_dir.display());

    axum::serve(listener, app).await?;

    Ok(())
}
